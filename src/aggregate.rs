use crate::error::{Error, Result};
use crate::keygen::MasterVerKey;
use crate::params::Params;
use crate::unblind::UnblindSignature;
use crate::utils::{g1_pair_from_bytes, g1_pair_to_bytes};
use bls12_381::{G1Projective, Scalar};
use ff::Field;
use log::debug;

/// The single credential signature combined from `t` partial signatures.
///
/// `s = prod_i sm_i^{lambda_i}` over the participating authority set. The
/// Lagrange weights reconstruct, in the exponent only, what one signer
/// holding the full secret would have produced; the secret itself is never
/// materialized anywhere.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregateSignature {
    pub h: G1Projective,
    pub s: G1Projective,
}

impl AggregateSignature {
    /// Canonical wire form: compressed `h` followed by compressed `s`.
    pub fn to_bytes(&self) -> [u8; 96] {
        g1_pair_to_bytes(&self.h, &self.s)
    }
}

impl TryFrom<&[u8]> for AggregateSignature {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let (h, s) = g1_pair_from_bytes(bytes)?;
        Ok(AggregateSignature { h, s })
    }
}

/// Combines unblinded partial signatures tagged with their authority ids.
///
/// Ids are 0-based authority identifiers; the interpolation point for id
/// `i` is `i + 1`, since point 0 is where the joint secret lives. The id
/// set may be any subset of authorities, not necessarily `0..t`.
///
/// Degenerate inputs are hard faults: fewer than `t` partial signatures,
/// duplicate ids, and partial signatures that disagree on `h` are all
/// rejected before any interpolation. The final pairing check against the
/// master verification key then catches corrupted partials that survive
/// the count.
pub fn aggregate(
    params: &Params,
    t: usize,
    parts: &[(u64, UnblindSignature)],
    master_vk: &MasterVerKey,
    did: &Scalar,
) -> Result<AggregateSignature> {
    if parts.len() < t {
        return Err(Error::ThresholdReconstruction(format!(
            "{} partial signatures, threshold is {}",
            parts.len(),
            t
        )));
    }
    let (first, rest) = parts.split_first().ok_or_else(|| {
        Error::ThresholdReconstruction("no partial signatures to aggregate".into())
    })?;
    let h = first.1.h;
    if rest.iter().any(|(_, sig)| sig.h != h) {
        return Err(Error::CommitmentConsistency);
    }

    let ids: Vec<u64> = parts.iter().map(|(id, _)| *id).collect();
    for (i, id) in ids.iter().enumerate() {
        if ids[..i].contains(id) {
            return Err(Error::ThresholdReconstruction(format!(
                "duplicate authority id {}",
                id
            )));
        }
    }

    let points: Vec<u64> = ids.iter().map(|id| id + 1).collect();
    let lambda = lagrange_at_zero(&points)?;
    let s: G1Projective = parts
        .iter()
        .zip(&lambda)
        .map(|((_, sig), weight)| sig.sm * weight)
        .sum();

    // What a holder of the full secret would have signed; short id sets and
    // corrupted partials both die here instead of leaking out as a
    // plausible-looking credential.
    let lhs = Params::pair(&h, &(master_vk.alpha2 + master_vk.beta2 * did));
    let rhs = Params::pair(&s, &params.g2());
    if lhs != rhs {
        return Err(Error::InvalidAggregate);
    }

    debug!("aggregated {} partial signatures", parts.len());
    Ok(AggregateSignature { h, s })
}

/// Lagrange basis values at zero for the given interpolation points:
/// `lambda_i = prod_{j != i} x_j / (x_j - x_i) mod r`.
fn lagrange_at_zero(points: &[u64]) -> Result<Vec<Scalar>> {
    let mut weights = Vec::with_capacity(points.len());
    for (i, &xi) in points.iter().enumerate() {
        let xi = Scalar::from(xi);
        let mut num = Scalar::ONE;
        let mut den = Scalar::ONE;
        for (j, &xj) in points.iter().enumerate() {
            if i == j {
                continue;
            }
            let xj = Scalar::from(xj);
            num *= xj;
            den *= xj - xi;
        }
        let den_inv = Option::<Scalar>::from(den.invert()).ok_or_else(|| {
            Error::ThresholdReconstruction("singular Lagrange denominator".into())
        })?;
        weights.push(num * den_inv);
    }
    Ok(weights)
}
