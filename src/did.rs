use crate::error::{Error, Result};
use crate::utils::{be_bytes_to_scalar, scalar_to_decimal, sha512_hex};
use bls12_381::Scalar;
use ff::Field;
use rand_core::{CryptoRng, RngCore};

/// A voter's pseudonymous digital identifier.
///
/// Binds the real identity string to a fresh secret scalar `x` through a
/// SHA-512 digest; only the digest travels into later protocol phases, so
/// nothing downstream can be linked back to `real_id` without `x`.
#[derive(Clone, Debug)]
pub struct Did {
    real_id: String,
    x: Scalar,
    did: String,
}

impl Did {
    /// Derives a DID for `real_id` with a fresh uniform scalar from `rng`.
    ///
    /// Callers must hand in an independent, non-deterministic source per
    /// voter; reusing a stream across voters links their identifiers.
    pub fn create<R: RngCore + CryptoRng>(real_id: &str, rng: &mut R) -> Did {
        let x = Scalar::random(&mut *rng);
        let did = sha512_hex(format!("{}{}", real_id, scalar_to_decimal(&x)).as_bytes());
        Did {
            real_id: real_id.to_string(),
            x,
            did,
        }
    }

    /// The real identity string the DID was derived from.
    pub fn real_id(&self) -> &str {
        &self.real_id
    }

    /// The secret scalar behind the digest. Kept only so the derivation can
    /// be reproduced; treat as secret everywhere else.
    pub fn x(&self) -> Scalar {
        self.x
    }

    /// The 128-hex-character identifier, `SHA512hex(real_id || decimal(x))`.
    pub fn did(&self) -> &str {
        &self.did
    }

    /// The identifier as the Z_r attribute value committed to downstream.
    pub fn to_scalar(&self) -> Result<Scalar> {
        did_to_scalar(&self.did)
    }
}

/// Interprets a hex DID digest as a big-endian integer reduced mod r.
pub fn did_to_scalar(did_hex: &str) -> Result<Scalar> {
    let bytes = hex::decode(did_hex)
        .map_err(|e| Error::ProofParsing(format!("DID is not valid hex: {}", e)))?;
    be_bytes_to_scalar(&bytes)
}
