//! Threshold-issued anonymous credentials for pseudonymous voter
//! identities.
//!
//! A set of Election Authorities jointly holds a signing key through a
//! Pedersen DKG; a voter collects blind partial signatures from any
//! threshold subset, aggregates them via Lagrange interpolation in the
//! exponent, and later presents a re-randomized, unlinkable proof of
//! possession that any holder of the master verification key can check.

mod aggregate;
mod blind_sign;
mod did;
mod error;
mod keygen;
mod kor;
mod params;
mod prove;
mod unblind;
mod utils;
mod verify;

pub use crate::aggregate::{aggregate, AggregateSignature};
pub use crate::blind_sign::{
    blind_sign, prepare_blind_sign, verify_prepare_proof, BlindSignature, PrepareOutput,
};
pub use crate::did::{did_to_scalar, Did};
pub use crate::error::{CredentialError, Error, Result};
pub use crate::keygen::{
    keygen, CoefficientCommitments, EaKeyShare, EaPublicKey, KeyGenOutput, MasterVerKey,
};
pub use crate::kor::KorProof;
pub use crate::params::Params;
pub use crate::prove::{prove_credential, ProveCredentialOutput};
pub use crate::unblind::{unblind_signature, UnblindSignature};
pub use crate::verify::verify_credential;
