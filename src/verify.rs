use crate::aggregate::AggregateSignature;
use crate::keygen::MasterVerKey;
use crate::params::Params;
use crate::prove::{possession_challenge, ProveCredentialOutput};
use bls12_381::{G1Projective, Scalar};
use ff::Field;
use log::debug;

/// Verifier-side check of a credential presentation.
///
/// `com` is the commitment the credential was issued over
/// (`g1^{o}·h^{did}` from the Prepare step) and `agg` is the signature the
/// proof's challenge was hashed over. Validity is the
/// conjunction of the Knowledge-of-Representation check and the pairing
/// equation; a failure of either is reported as `false`, never raised, so
/// one bad credential cannot take down a verification batch.
pub fn verify_credential(
    params: &Params,
    prove_out: &ProveCredentialOutput,
    master_vk: &MasterVerKey,
    agg: &AggregateSignature,
    com: &G1Projective,
) -> bool {
    let kor_ok = check_kor(params, prove_out, master_vk, agg, com);
    let pairing_ok = check_pairing(params, prove_out);
    if !kor_ok || !pairing_ok {
        debug!(
            "credential rejected: kor_ok={}, pairing_ok={}",
            kor_ok, pairing_ok
        );
    }
    kor_ok && pairing_ok
}

/// Recomputes the prover's Schnorr commitments from the responses and
/// checks that the challenge closes over them.
///
/// `k'' = g2^{s1}·alpha2^{1-c}·k^{c}·beta2^{s2}` and
/// `com'' = g1^{s3}·h^{s2}·com^{c}` collapse to the prover's `k'` and
/// `com'` exactly when the responses were formed from the real witnesses.
fn check_kor(
    params: &Params,
    prove_out: &ProveCredentialOutput,
    master_vk: &MasterVerKey,
    agg: &AggregateSignature,
    com: &G1Projective,
) -> bool {
    let pi = &prove_out.pi_v;
    let one_minus_c = Scalar::ONE - pi.c;

    let k_check = params.g2() * pi.s1
        + master_vk.alpha2 * one_minus_c
        + prove_out.k * pi.c
        + master_vk.beta2 * pi.s2;
    let com_check = params.g1() * pi.s3 + agg.h * pi.s2 + com * pi.c;

    possession_challenge(params, agg, com, &com_check, &prove_out.k, &k_check) == pi.c
}

/// The unforgeability core: `e(h'', k) == e(s'', g2)`.
fn check_pairing(params: &Params, prove_out: &ProveCredentialOutput) -> bool {
    Params::pair(&prove_out.h_rand, &prove_out.k)
        == Params::pair(&prove_out.s_rand, &params.g2())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::blind_sign::{blind_sign, prepare_blind_sign, verify_prepare_proof, PrepareOutput};
    use crate::did::Did;
    use crate::keygen::{keygen, KeyGenOutput};
    use crate::prove::prove_credential;
    use crate::unblind::unblind_signature;
    use group::Group;
    use rand::rngs::ThreadRng;
    use rand::thread_rng;

    struct Credential {
        params: Params,
        keys: KeyGenOutput,
        prep: PrepareOutput,
        agg: AggregateSignature,
        prove_out: ProveCredentialOutput,
    }

    /// Runs the whole pipeline for one voter against the given authorities.
    fn issue(real_id: &str, t: usize, ne: usize, ids: &[u64], rng: &mut ThreadRng) -> crate::Result<Credential> {
        let params = Params::setup(rng)?;
        let keys = keygen(&params, t, ne, rng)?;
        let did = Did::create(real_id, rng).to_scalar()?;
        let prep = prepare_blind_sign(&params, &did, rng);

        let mut parts = Vec::new();
        for &id in ids {
            let share = &keys.shares[id as usize];
            let sig = blind_sign(&params, &prep, share)?;
            parts.push((id, unblind_signature(&params, &prep, &sig, share.public(), &did)?));
        }
        let agg = aggregate(&params, t, &parts, &keys.master_vk, &did)?;
        let o = prep.blinding_factor();
        let prove_out = prove_credential(&params, &agg, &keys.master_vk, &did, &o, rng);
        Ok(Credential {
            params,
            keys,
            prep,
            agg,
            prove_out,
        })
    }

    #[test]
    fn end_to_end_scenario() -> crate::Result<()> {
        let mut rng = thread_rng();
        // ne=3, t=2, authorities {0, 2}.
        let cred = issue("12345678901", 2, 3, &[0, 2], &mut rng)?;

        assert!(verify_prepare_proof(&cred.params, &cred.prep));
        assert!(verify_credential(
            &cred.params,
            &cred.prove_out,
            &cred.keys.master_vk,
            &cred.agg,
            &cred.prep.com,
        ));

        // A forged aggregate must not slip past the same proof.
        let mut forged = cred.agg.clone();
        forged.s += G1Projective::random(&mut rng);
        assert!(!verify_credential(
            &cred.params,
            &cred.prove_out,
            &cred.keys.master_vk,
            &forged,
            &cred.prep.com,
        ));
        Ok(())
    }

    #[test]
    fn doctored_aggregate_invalidates_an_honest_proof() -> crate::Result<()> {
        let mut rng = thread_rng();
        let cred = issue("12345678901", 2, 3, &[0, 1], &mut rng)?;

        // The proof commits to both halves of the aggregate, so neither
        // component may be swapped after the fact.
        let mut forged = cred.agg.clone();
        forged.s += G1Projective::random(&mut rng);
        assert!(!verify_credential(
            &cred.params,
            &cred.prove_out,
            &cred.keys.master_vk,
            &forged,
            &cred.prep.com,
        ));

        let mut forged = cred.agg.clone();
        forged.h += G1Projective::random(&mut rng);
        assert!(!verify_credential(
            &cred.params,
            &cred.prove_out,
            &cred.keys.master_vk,
            &forged,
            &cred.prep.com,
        ));
        Ok(())
    }

    #[test]
    fn both_threshold_subsets_yield_valid_credentials() -> crate::Result<()> {
        let mut rng = thread_rng();
        let params = Params::setup(&mut rng)?;
        let keys = keygen(&params, 2, 3, &mut rng)?;
        let did = Did::create("12345678901", &mut rng).to_scalar()?;
        let prep = prepare_blind_sign(&params, &did, &mut rng);
        let o = prep.blinding_factor();

        for ids in [[0u64, 1], [1, 2]] {
            let mut parts = Vec::new();
            for &id in &ids {
                let share = &keys.shares[id as usize];
                let sig = blind_sign(&params, &prep, share)?;
                parts.push((id, unblind_signature(&params, &prep, &sig, share.public(), &did)?));
            }
            let agg = aggregate(&params, 2, &parts, &keys.master_vk, &did)?;
            let prove_out = prove_credential(&params, &agg, &keys.master_vk, &did, &o, &mut rng);
            assert!(verify_credential(&params, &prove_out, &keys.master_vk, &agg, &prep.com));
        }
        Ok(())
    }

    #[test]
    fn kor_responses_are_bit_sensitive() -> crate::Result<()> {
        let mut rng = thread_rng();
        let cred = issue("12345678901", 2, 3, &[0, 1], &mut rng)?;

        let perturbations: [fn(&mut ProveCredentialOutput); 4] = [
            |p| p.pi_v.c += Scalar::ONE,
            |p| p.pi_v.s1 += Scalar::ONE,
            |p| p.pi_v.s2 += Scalar::ONE,
            |p| p.pi_v.s3 += Scalar::ONE,
        ];
        for perturb in perturbations {
            let mut mutated = cred.prove_out.clone();
            perturb(&mut mutated);
            assert!(!verify_credential(
                &cred.params,
                &mutated,
                &cred.keys.master_vk,
                &cred.agg,
                &cred.prep.com,
            ));
        }
        Ok(())
    }

    #[test]
    fn presentation_elements_are_tamper_sensitive() -> crate::Result<()> {
        let mut rng = thread_rng();
        let cred = issue("12345678901", 2, 3, &[0, 1], &mut rng)?;

        // com
        let bad_com = cred.prep.com + cred.params.g1();
        assert!(!verify_credential(
            &cred.params,
            &cred.prove_out,
            &cred.keys.master_vk,
            &cred.agg,
            &bad_com,
        ));

        // k
        let mut mutated = cred.prove_out.clone();
        mutated.k += cred.params.g2();
        assert!(!verify_credential(
            &cred.params,
            &mutated,
            &cred.keys.master_vk,
            &cred.agg,
            &cred.prep.com,
        ));

        // h''
        let mut mutated = cred.prove_out.clone();
        mutated.h_rand += cred.params.g1();
        assert!(!verify_credential(
            &cred.params,
            &mutated,
            &cred.keys.master_vk,
            &cred.agg,
            &cred.prep.com,
        ));

        // s''
        let mut mutated = cred.prove_out.clone();
        mutated.s_rand += cred.params.g1();
        assert!(!verify_credential(
            &cred.params,
            &mutated,
            &cred.keys.master_vk,
            &cred.agg,
            &cred.prep.com,
        ));
        Ok(())
    }

    #[test]
    fn wire_round_tripped_proof_still_verifies() -> crate::Result<()> {
        let mut rng = thread_rng();
        let cred = issue("12345678901", 2, 3, &[1, 2], &mut rng)?;

        let mut reparsed = cred.prove_out.clone();
        reparsed.pi_v = cred.prove_out.pi_v.to_string().parse()?;
        assert!(verify_credential(
            &cred.params,
            &reparsed,
            &cred.keys.master_vk,
            &cred.agg,
            &cred.prep.com,
        ));
        Ok(())
    }

    #[test]
    fn voters_verify_independently_across_threads() -> crate::Result<()> {
        let mut rng = thread_rng();
        let params = Params::setup(&mut rng)?;
        let keys = keygen(&params, 2, 3, &mut rng)?;

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|voter| {
                    let params = &params;
                    let keys = &keys;
                    scope.spawn(move || -> crate::Result<bool> {
                        let mut rng = thread_rng();
                        let real_id = format!("1234567890{}", voter);
                        let did = Did::create(&real_id, &mut rng).to_scalar()?;
                        let prep = prepare_blind_sign(params, &did, &mut rng);

                        let mut parts = Vec::new();
                        for id in [0u64, 2] {
                            let share = &keys.shares[id as usize];
                            let sig = blind_sign(params, &prep, share)?;
                            parts.push((
                                id,
                                unblind_signature(params, &prep, &sig, share.public(), &did)?,
                            ));
                        }
                        let agg = aggregate(params, 2, &parts, &keys.master_vk, &did)?;
                        let o = prep.blinding_factor();
                        let prove_out =
                            prove_credential(params, &agg, &keys.master_vk, &did, &o, &mut rng);
                        Ok(verify_credential(
                            params,
                            &prove_out,
                            &keys.master_vk,
                            &agg,
                            &prep.com,
                        ))
                    })
                })
                .collect();

            for handle in handles {
                assert!(handle.join().expect("voter thread panicked")?);
            }
            Ok(())
        })
    }
}
