use std::array::TryFromSliceError;
use thiserror::Error;

/// Specialisation of `std::Result`.
pub type Result<T, E = CredentialError> = std::result::Result<T, E>;
pub type Error = CredentialError;

#[derive(Error, Debug)]
/// error variants.
///
/// Faults raised during issuance (prepare, blind-sign, unblind, aggregate)
/// are fail-fast: no usable-looking output is ever produced alongside one of
/// these. Verification of a finished credential never raises; it reports a
/// plain `false` instead.
pub enum CredentialError {
    #[error("domain parameter setup failed: {0}")]
    Setup(String),

    #[error("authority {authority} published commitments that do not match its share at point {point}")]
    ShareVerification { authority: usize, point: u64 },

    #[error("commitment is inconsistent with its hash: Hash(comi) != h")]
    CommitmentConsistency,

    #[error("threshold reconstruction impossible: {0}")]
    ThresholdReconstruction(String),

    #[error("partial signature fails the pairing check against its authority's public key")]
    InvalidPartialSignature,

    #[error("aggregate signature fails the pairing check against the master verification key")]
    InvalidAggregate,

    #[error("malformed proof encoding: {0}")]
    ProofParsing(String),

    #[error("deserialization from bytes failed")]
    InvalidBytes(#[from] TryFromSliceError),
}
