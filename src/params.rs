use crate::error::{Error, Result};
use bls12_381::{Bls12, G1Projective, G2Projective, Gt};
use group::{Curve, Group};
use log::debug;
use pairing::Engine;
use rand_core::{CryptoRng, RngCore};

/// Generator sampling retries before setup gives up.
const MAX_SETUP_ATTEMPTS: usize = 32;

/// The public domain parameters every protocol phase reads.
///
/// Two independent generators of G1 (`g1` for blinding factors, `h1` for the
/// identity attribute) and one generator of G2, over the BLS12-381 pairing
/// groups of prime order r. Built once per protocol run and immutable
/// afterwards; everything downstream borrows it read-only, so sharing one
/// `Params` across worker threads is safe.
#[derive(Clone, Debug)]
pub struct Params {
    g1: G1Projective,
    h1: G1Projective,
    g2: G2Projective,
}

impl Params {
    /// Samples the three generators uniformly, rejecting any identity
    /// element and any pair with a degenerate pairing.
    ///
    /// On BLS12-381 a degenerate draw is vanishingly unlikely, but the
    /// retry bound keeps a broken randomness source from looping forever.
    pub fn setup<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Params> {
        for attempt in 0..MAX_SETUP_ATTEMPTS {
            let g1 = G1Projective::random(&mut *rng);
            let h1 = G1Projective::random(&mut *rng);
            let g2 = G2Projective::random(&mut *rng);

            if bool::from(g1.is_identity())
                || bool::from(h1.is_identity())
                || bool::from(g2.is_identity())
            {
                continue;
            }
            if Self::pair(&g1, &g2) == Gt::identity() {
                continue;
            }

            debug!("domain parameters fixed after {} attempt(s)", attempt + 1);
            return Ok(Params { g1, h1, g2 });
        }
        Err(Error::Setup(format!(
            "no non-degenerate generators found in {} attempts",
            MAX_SETUP_ATTEMPTS
        )))
    }

    /// First generator of G1.
    pub fn g1(&self) -> G1Projective {
        self.g1
    }

    /// Second, independent generator of G1.
    pub fn h1(&self) -> G1Projective {
        self.h1
    }

    /// Generator of G2.
    pub fn g2(&self) -> G2Projective {
        self.g2
    }

    /// The bilinear map e: G1 x G2 -> GT.
    pub(crate) fn pair(p: &G1Projective, q: &G2Projective) -> Gt {
        Bls12::pairing(&p.to_affine(), &q.to_affine())
    }
}
