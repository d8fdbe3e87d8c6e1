use crate::error::{Error, Result};
use crate::keygen::EaKeyShare;
use crate::kor::KorProof;
use crate::params::Params;
use crate::utils::{challenge_scalar, g1_pair_from_bytes, g1_pair_to_bytes, g1_to_hex, hash_to_g1};
use bls12_381::{G1Projective, Scalar};
use ff::Field;
use log::debug;
use rand_core::{CryptoRng, RngCore};

/// Voter-side output of the Prepare step.
///
/// `comi = g1^{o_i}·h1^{did}` anchors the base point `h = H_G1(comi)`, and
/// `com = g1^{o}·h^{did}` is what the authorities actually sign. The
/// blinding factor `o` stays with the voter; `pi_s` proves in zero knowledge
/// that the two commitments really open to the same identity attribute.
#[derive(Clone, Debug)]
pub struct PrepareOutput {
    pub comi: G1Projective,
    pub h: G1Projective,
    pub com: G1Projective,
    o: Scalar,
    pub pi_s: KorProof,
}

impl PrepareOutput {
    /// The secret blinding factor `o`, retained for Unblind and Prove.
    pub fn blinding_factor(&self) -> Scalar {
        self.o
    }
}

/// An authority's signature over the blinded commitment.
#[derive(Clone, Debug, PartialEq)]
pub struct BlindSignature {
    pub h: G1Projective,
    /// `h^{sgk1}·com^{sgk2}` for the signing authority's secret share.
    pub cm: G1Projective,
}

impl BlindSignature {
    /// Canonical wire form: compressed `h` followed by compressed `cm`.
    pub fn to_bytes(&self) -> [u8; 96] {
        g1_pair_to_bytes(&self.h, &self.cm)
    }
}

impl TryFrom<&[u8]> for BlindSignature {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let (h, cm) = g1_pair_from_bytes(bytes)?;
        Ok(BlindSignature { h, cm })
    }
}

/// Builds the voter's commitment pair and its knowledge proof.
///
/// `did` is the identity attribute (the digest scalar from [`crate::Did`]);
/// `o_i` is consumed here, `o` survives inside the output.
pub fn prepare_blind_sign<R: RngCore + CryptoRng>(
    params: &Params,
    did: &Scalar,
    rng: &mut R,
) -> PrepareOutput {
    let o_i = Scalar::random(&mut *rng);
    let comi = params.g1() * o_i + params.h1() * did;
    let h = hash_to_g1(params, &comi);

    let o = Scalar::random(&mut *rng);
    let com = params.g1() * o + h * did;

    // Schnorr commitments for (o_i, did, o).
    let r1 = Scalar::random(&mut *rng);
    let r2 = Scalar::random(&mut *rng);
    let r3 = Scalar::random(&mut *rng);
    let comi_blind = params.g1() * r1 + params.h1() * r2;
    let com_blind = params.g1() * r3 + h * r2;

    let c = prepare_challenge(params, &h, &com, &com_blind, &comi, &comi_blind);
    let pi_s = KorProof {
        c,
        s1: r1 - c * o_i,
        s2: r2 - c * did,
        s3: r3 - c * o,
    };

    debug!("prepared blind-sign commitment over h = {}", g1_to_hex(&h));
    PrepareOutput {
        comi,
        h,
        com,
        o,
        pi_s,
    }
}

/// Checks the Prepare-phase proof `pi_s` against the commitments it covers.
///
/// Signers are free to run this, but the issuance flow does not gate on it;
/// the credential verifier is the party that must not be fooled.
pub fn verify_prepare_proof(params: &Params, prep: &PrepareOutput) -> bool {
    let pi = &prep.pi_s;
    let comi_blind = params.g1() * pi.s1 + params.h1() * pi.s2 + prep.comi * pi.c;
    let com_blind = params.g1() * pi.s3 + prep.h * pi.s2 + prep.com * pi.c;

    prepare_challenge(params, &prep.h, &prep.com, &com_blind, &prep.comi, &comi_blind) == pi.c
}

/// One authority's half of the blind-issuance exchange.
///
/// Recomputes `H_G1(comi)` and refuses to sign against a tampered base
/// point, then signs the blinded commitment with its secret share.
pub fn blind_sign(
    params: &Params,
    prep: &PrepareOutput,
    share: &EaKeyShare,
) -> Result<BlindSignature> {
    if hash_to_g1(params, &prep.comi) != prep.h {
        return Err(Error::CommitmentConsistency);
    }

    let cm = prep.h * share.sgk1() + prep.com * share.sgk2();
    debug!("authority {} signed a blinded commitment", share.index());
    Ok(BlindSignature { h: prep.h, cm })
}

/// `c = H_Zr(g1 || h || h1 || com || com' || comi || com'_i)`, every element
/// in canonical hex.
fn prepare_challenge(
    params: &Params,
    h: &G1Projective,
    com: &G1Projective,
    com_blind: &G1Projective,
    comi: &G1Projective,
    comi_blind: &G1Projective,
) -> Scalar {
    challenge_scalar(&[
        g1_to_hex(&params.g1()),
        g1_to_hex(h),
        g1_to_hex(&params.h1()),
        g1_to_hex(com),
        g1_to_hex(com_blind),
        g1_to_hex(comi),
        g1_to_hex(comi_blind),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::did::Did;
    use crate::keygen::keygen;

    #[test]
    fn prepare_satisfies_its_invariants() -> crate::Result<()> {
        let mut rng = rand::thread_rng();
        let params = Params::setup(&mut rng)?;
        let did = Did::create("12345678901", &mut rng).to_scalar()?;

        let prep = prepare_blind_sign(&params, &did, &mut rng);

        assert_eq!(prep.h, hash_to_g1(&params, &prep.comi));
        assert_eq!(
            prep.com,
            params.g1() * prep.blinding_factor() + prep.h * did
        );
        Ok(())
    }

    #[test]
    fn honest_prepare_proof_verifies() -> crate::Result<()> {
        let mut rng = rand::thread_rng();
        let params = Params::setup(&mut rng)?;
        let did = Did::create("12345678901", &mut rng).to_scalar()?;

        let prep = prepare_blind_sign(&params, &did, &mut rng);
        assert!(verify_prepare_proof(&params, &prep));
        Ok(())
    }

    #[test]
    fn tampered_prepare_proof_fails() -> crate::Result<()> {
        let mut rng = rand::thread_rng();
        let params = Params::setup(&mut rng)?;
        let did = Did::create("12345678901", &mut rng).to_scalar()?;

        let mut prep = prepare_blind_sign(&params, &did, &mut rng);
        prep.pi_s.s2 += Scalar::ONE;
        assert!(!verify_prepare_proof(&params, &prep));
        Ok(())
    }

    #[test]
    fn signing_a_tampered_commitment_aborts() -> crate::Result<()> {
        let mut rng = rand::thread_rng();
        let params = Params::setup(&mut rng)?;
        let keys = keygen(&params, 2, 3, &mut rng)?;
        let did = Did::create("12345678901", &mut rng).to_scalar()?;

        let mut prep = prepare_blind_sign(&params, &did, &mut rng);
        prep.comi += params.g1();

        match blind_sign(&params, &prep, &keys.shares[0]) {
            Err(Error::CommitmentConsistency) => Ok(()),
            other => panic!("expected a commitment consistency fault, got {:?}", other),
        }
    }

    #[test]
    fn wire_round_trip() -> crate::Result<()> {
        let mut rng = rand::thread_rng();
        let params = Params::setup(&mut rng)?;
        let keys = keygen(&params, 2, 3, &mut rng)?;
        let did = Did::create("12345678901", &mut rng).to_scalar()?;

        let prep = prepare_blind_sign(&params, &did, &mut rng);
        let sig = blind_sign(&params, &prep, &keys.shares[0])?;

        let decoded = BlindSignature::try_from(sig.to_bytes().as_slice())?;
        assert_eq!(decoded, sig);
        Ok(())
    }

    #[test]
    fn blind_signature_uses_the_share_exponents() -> crate::Result<()> {
        let mut rng = rand::thread_rng();
        let params = Params::setup(&mut rng)?;
        let keys = keygen(&params, 2, 3, &mut rng)?;
        let did = Did::create("12345678901", &mut rng).to_scalar()?;

        let prep = prepare_blind_sign(&params, &did, &mut rng);
        let sig = blind_sign(&params, &prep, &keys.shares[1])?;

        assert_eq!(sig.h, prep.h);
        assert_eq!(
            sig.cm,
            prep.h * keys.shares[1].sgk1() + prep.com * keys.shares[1].sgk2()
        );
        Ok(())
    }
}
