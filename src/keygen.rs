use crate::error::{Error, Result};
use crate::params::Params;
use bls12_381::{G1Projective, G2Projective, Scalar};
use ff::Field;
use group::Group;
use log::debug;
use rand_core::{CryptoRng, RngCore};

/// The public master verification key produced by key generation.
///
/// Each component is the product of all authorities' constant-term
/// commitments; no single party ever holds the matching signing scalars.
#[derive(Clone, Debug, PartialEq)]
pub struct MasterVerKey {
    /// `g2^{sum of all x_i(0)}`.
    pub alpha2: G2Projective,
    /// `g2^{sum of all y_i(0)}`.
    pub beta2: G2Projective,
    /// `g1^{sum of all y_i(0)}`.
    pub beta1: G1Projective,
}

/// The public half of one authority's key share.
#[derive(Clone, Debug, PartialEq)]
pub struct EaPublicKey {
    /// `g2^{sgk1}`.
    pub vk1: G2Projective,
    /// `g2^{sgk2}`.
    pub vk2: G2Projective,
    /// `g1^{sgk2}`; the voter strips blinding against this during Unblind.
    pub vk3: G1Projective,
}

/// One Election Authority's long-term key share.
///
/// `sgk1`/`sgk2` are the sums of every authority's polynomials evaluated at
/// this authority's index. They never leave this struct and are never
/// combined in plaintext with another authority's share.
#[derive(Clone, Debug)]
pub struct EaKeyShare {
    index: u64,
    sgk1: Scalar,
    sgk2: Scalar,
    public: EaPublicKey,
}

impl EaKeyShare {
    /// The authority's 1-based evaluation point; point 0 holds the secret.
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn public(&self) -> &EaPublicKey {
        &self.public
    }

    pub(crate) fn sgk1(&self) -> Scalar {
        self.sgk1
    }

    pub(crate) fn sgk2(&self) -> Scalar {
        self.sgk2
    }
}

/// One authority's published commitments to its polynomial coefficients.
///
/// `vx[j] = g2^{F[j]}`, `vy[j] = g2^{G[j]}`, `vy_prime[j] = g1^{G[j]}`.
/// Public material: the share-verification check and the master-key product
/// are computed from these alone.
#[derive(Clone, Debug)]
pub struct CoefficientCommitments {
    pub vx: Vec<G2Projective>,
    pub vy: Vec<G2Projective>,
    pub vy_prime: Vec<G1Projective>,
}

/// Everything key generation hands back to the orchestration layer.
#[derive(Clone, Debug)]
pub struct KeyGenOutput {
    pub master_vk: MasterVerKey,
    /// One share per authority; each must be delivered to its owner only.
    pub shares: Vec<EaKeyShare>,
    /// The public coefficient commitments, kept so auditors can re-derive
    /// the master key without trusting this process.
    pub commitments: Vec<CoefficientCommitments>,
}

/// A uniformly random polynomial over Z_r; ephemeral DKG state that is
/// dropped as soon as the shares are cut.
struct Polynomial {
    coeffs: Vec<Scalar>,
}

impl Polynomial {
    fn random<R: RngCore + CryptoRng>(coeff_count: usize, rng: &mut R) -> Polynomial {
        Polynomial {
            coeffs: (0..coeff_count).map(|_| Scalar::random(&mut *rng)).collect(),
        }
    }

    /// Horner evaluation at `x`.
    fn eval(&self, x: Scalar) -> Scalar {
        self.coeffs
            .iter()
            .rev()
            .fold(Scalar::ZERO, |acc, coeff| acc * x + coeff)
    }
}

/// Pedersen distributed key generation for `ne` authorities, threshold `t`.
///
/// Each authority samples two degree-`(t-1)` polynomials and commits to the
/// coefficients in public. Every share is checked against those commitments
/// before anything is returned; a mismatch aborts key generation for the
/// whole authority set with a `ShareVerification` error naming the culprit.
pub fn keygen<R: RngCore + CryptoRng>(
    params: &Params,
    t: usize,
    ne: usize,
    rng: &mut R,
) -> Result<KeyGenOutput> {
    if t < 1 || t > ne {
        return Err(Error::Setup(format!(
            "threshold {} out of range for {} authorities",
            t, ne
        )));
    }

    // Degree t-1, so any t shares interpolate the constant term.
    let f_polys: Vec<Polynomial> = (0..ne).map(|_| Polynomial::random(t, rng)).collect();
    let g_polys: Vec<Polynomial> = (0..ne).map(|_| Polynomial::random(t, rng)).collect();

    let commitments: Vec<CoefficientCommitments> = f_polys
        .iter()
        .zip(&g_polys)
        .map(|(f, g)| CoefficientCommitments {
            vx: f.coeffs.iter().map(|a| params.g2() * a).collect(),
            vy: g.coeffs.iter().map(|b| params.g2() * b).collect(),
            vy_prime: g.coeffs.iter().map(|b| params.g1() * b).collect(),
        })
        .collect();

    verify_shares(params, &f_polys, &g_polys, &commitments, ne)?;

    let master_vk = MasterVerKey {
        alpha2: commitments.iter().map(|c| c.vx[0]).sum(),
        beta2: commitments.iter().map(|c| c.vy[0]).sum(),
        beta1: commitments.iter().map(|c| c.vy_prime[0]).sum(),
    };

    let shares: Vec<EaKeyShare> = (1..=ne as u64)
        .map(|m| {
            let at = Scalar::from(m);
            let sgk1: Scalar = f_polys.iter().map(|p| p.eval(at)).sum();
            let sgk2: Scalar = g_polys.iter().map(|p| p.eval(at)).sum();
            EaKeyShare {
                index: m,
                sgk1,
                sgk2,
                public: EaPublicKey {
                    vk1: params.g2() * sgk1,
                    vk2: params.g2() * sgk2,
                    vk3: params.g1() * sgk2,
                },
            }
        })
        .collect();

    debug!(
        "key generation complete: {} authorities, threshold {}",
        ne, t
    );
    Ok(KeyGenOutput {
        master_vk,
        shares,
        commitments,
    })
}

/// The verifiable-secret-sharing check: for every authority and every
/// evaluation point `L = 1..=ne`, the polynomial evaluations must match the
/// products of the published coefficient commitments.
fn verify_shares(
    params: &Params,
    f_polys: &[Polynomial],
    g_polys: &[Polynomial],
    commitments: &[CoefficientCommitments],
    ne: usize,
) -> Result<()> {
    for (authority, ((f, g), comm)) in f_polys
        .iter()
        .zip(g_polys)
        .zip(commitments)
        .enumerate()
    {
        for point in 1..=ne as u64 {
            let at = Scalar::from(point);

            let consistent = params.g2() * f.eval(at) == eval_commitments_g2(&comm.vx, at)
                && params.g2() * g.eval(at) == eval_commitments_g2(&comm.vy, at)
                && params.g1() * g.eval(at) == eval_commitments_g1(&comm.vy_prime, at);
            if !consistent {
                return Err(Error::ShareVerification { authority, point });
            }
        }
    }
    Ok(())
}

/// `prod_j v[j]^{x^j}` in G2.
fn eval_commitments_g2(v: &[G2Projective], x: Scalar) -> G2Projective {
    let mut power = Scalar::ONE;
    let mut acc = G2Projective::identity();
    for vj in v {
        acc += vj * power;
        power *= x;
    }
    acc
}

/// `prod_j v[j]^{x^j}` in G1.
fn eval_commitments_g1(v: &[G1Projective], x: Scalar) -> G1Projective {
    let mut power = Scalar::ONE;
    let mut acc = G1Projective::identity();
    for vj in v {
        acc += vj * power;
        power *= x;
    }
    acc
}
