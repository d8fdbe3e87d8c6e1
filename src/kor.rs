use crate::error::{Error, Result};
use crate::utils::{scalar_from_decimal, scalar_to_decimal};
use bls12_381::Scalar;
use std::fmt;
use std::str::FromStr;

/// A Schnorr-style Knowledge-of-Representation proof, Fiat-Shamir
/// transformed into the non-interactive tuple `(c, s1, s2, s3)`.
///
/// The same shape backs both the voter's commitment proof built during
/// Prepare and the possession proof built during Prove; what differs is the
/// relation the challenge was hashed over, which lives with the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct KorProof {
    pub c: Scalar,
    pub s1: Scalar,
    pub s2: Scalar,
    pub s3: Scalar,
}

/// Wire form: four whitespace-separated base-10 field elements.
impl fmt::Display for KorProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            scalar_to_decimal(&self.c),
            scalar_to_decimal(&self.s1),
            scalar_to_decimal(&self.s2),
            scalar_to_decimal(&self.s3)
        )
    }
}

impl FromStr for KorProof {
    type Err = Error;

    /// Parses the wire form. Anything malformed is a `ProofParsing` fault,
    /// which verifiers treat as an invalid credential rather than a crash.
    fn from_str(s: &str) -> Result<Self> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        if tokens.len() != 4 {
            return Err(Error::ProofParsing(format!(
                "expected 4 proof tokens, got {}",
                tokens.len()
            )));
        }
        Ok(KorProof {
            c: scalar_from_decimal(tokens[0])?,
            s1: scalar_from_decimal(tokens[1])?,
            s2: scalar_from_decimal(tokens[2])?,
            s3: scalar_from_decimal(tokens[3])?,
        })
    }
}
