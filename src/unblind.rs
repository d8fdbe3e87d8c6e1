use crate::blind_sign::{BlindSignature, PrepareOutput};
use crate::error::{Error, Result};
use crate::keygen::EaPublicKey;
use crate::params::Params;
use crate::utils::{g1_pair_from_bytes, g1_pair_to_bytes, hash_to_g1};
use bls12_381::{G1Projective, Scalar};

/// A partial signature with the voter's blinding removed.
///
/// `sm = cm·vk3^{-o}`, which leaves `h` raised to the authority's share of
/// the joint key. Only values that have passed the pairing check against
/// that authority's public share ever take this form.
#[derive(Clone, Debug, PartialEq)]
pub struct UnblindSignature {
    pub h: G1Projective,
    pub sm: G1Projective,
}

impl UnblindSignature {
    /// Canonical wire form: compressed `h` followed by compressed `sm`.
    pub fn to_bytes(&self) -> [u8; 96] {
        g1_pair_to_bytes(&self.h, &self.sm)
    }
}

impl TryFrom<&[u8]> for UnblindSignature {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let (h, sm) = g1_pair_from_bytes(bytes)?;
        Ok(UnblindSignature { h, sm })
    }
}

/// Strips the blinding factor from an authority's blind signature and
/// checks the result against that authority's own public key.
///
/// Both failure modes are hard errors: a base-point mismatch means the
/// commitment was tampered with in flight, and a pairing mismatch means
/// this partial signature is worthless and must not reach aggregation.
/// Either way the voter retries with a different authority.
pub fn unblind_signature(
    params: &Params,
    prep: &PrepareOutput,
    sig: &BlindSignature,
    ea_public: &EaPublicKey,
    did: &Scalar,
) -> Result<UnblindSignature> {
    if hash_to_g1(params, &prep.comi) != prep.h || sig.h != prep.h {
        return Err(Error::CommitmentConsistency);
    }

    let sm = sig.cm - ea_public.vk3 * prep.blinding_factor();

    // e(h, vk1·vk2^{did}) must equal e(sm, g2) for this authority's share.
    let lhs = Params::pair(&sig.h, &(ea_public.vk1 + ea_public.vk2 * did));
    let rhs = Params::pair(&sm, &params.g2());
    if lhs != rhs {
        return Err(Error::InvalidPartialSignature);
    }

    Ok(UnblindSignature { h: sig.h, sm })
}
