use crate::error::{Error, Result};
use crate::params::Params;
use bls12_381::{G1Affine, G1Projective, G2Projective, Scalar};
use group::Curve;
use num_bigint::BigUint;
use sha2::{Digest, Sha512};

// A SHA-512 digest is 64 bytes, which is also the widest integer
// `Scalar::from_bytes_wide` reduces. Everything scalar-shaped funnels
// through that one reduction.
const WIDE_BYTES: usize = 64;

// Order of the scalar field, base 10. Wire tokens at or above this value
// are not canonical and are refused rather than reduced.
const SCALAR_MODULUS_DEC: &str =
    "52435875175126190479447740508185965837690552500527637822603658699938581184513";

/// Interprets a big-endian byte string as an integer and reduces it mod r.
///
/// Input longer than 64 bytes cannot come from any of our digests or wire
/// tokens, so the caller gets an error rather than a silent truncation.
pub(crate) fn be_bytes_to_scalar(bytes: &[u8]) -> Result<Scalar> {
    if bytes.len() > WIDE_BYTES {
        return Err(Error::ProofParsing(format!(
            "integer of {} bytes does not fit a field element",
            bytes.len()
        )));
    }
    let mut wide = [0u8; WIDE_BYTES];
    // reverse into little-endian, which is what from_bytes_wide expects
    for (dst, src) in wide.iter_mut().zip(bytes.iter().rev()) {
        *dst = *src;
    }
    Ok(Scalar::from_bytes_wide(&wide))
}

/// H_Zr: SHA-512 of the input, read as a big-endian integer, reduced mod r.
pub(crate) fn hash_to_scalar(input: &[u8]) -> Scalar {
    let digest = Sha512::digest(input);
    // digest is always 64 bytes, so this cannot fail
    be_bytes_to_scalar(&digest).expect("SHA-512 digest fits a wide scalar")
}

/// SHA-512 of the input rendered as 128 lowercase hex characters.
pub(crate) fn sha512_hex(input: &[u8]) -> String {
    hex::encode(Sha512::digest(input))
}

/// H_G1: maps a G1 element onto G1 as `g1^{H_Zr(hex(elem))}`.
///
/// The hash input is the lowercase-hex rendering of the element's canonical
/// compressed encoding, matching what every challenge hash feeds on.
pub(crate) fn hash_to_g1(params: &Params, elem: &G1Projective) -> G1Projective {
    params.g1() * hash_to_scalar(g1_to_hex(elem).as_bytes())
}

/// Fiat-Shamir challenge over an ordered sequence of hex-encoded elements.
pub(crate) fn challenge_scalar(parts: &[String]) -> Scalar {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    let digest = hasher.finalize();
    be_bytes_to_scalar(&digest).expect("SHA-512 digest fits a wide scalar")
}

/// Canonical 48-byte compressed encoding of a G1 element.
pub(crate) fn g1_to_bytes(p: &G1Projective) -> [u8; 48] {
    p.to_affine().to_compressed()
}

/// Decodes the canonical compressed form of a G1 element.
pub(crate) fn g1_from_bytes(bytes: &[u8; 48]) -> Result<G1Projective> {
    Option::<G1Affine>::from(G1Affine::from_compressed(bytes))
        .map(G1Projective::from)
        .ok_or_else(|| Error::ProofParsing("bytes do not encode a G1 element".into()))
}

/// Canonical lowercase-hex form of a G1 element (48-byte compressed).
pub(crate) fn g1_to_hex(p: &G1Projective) -> String {
    hex::encode(g1_to_bytes(p))
}

/// Packs an `(h, s)`-style G1 pair into its 96-byte wire form.
pub(crate) fn g1_pair_to_bytes(a: &G1Projective, b: &G1Projective) -> [u8; 96] {
    let mut out = [0u8; 96];
    out[..48].copy_from_slice(&g1_to_bytes(a));
    out[48..].copy_from_slice(&g1_to_bytes(b));
    out
}

/// Unpacks a 96-byte wire form back into its two G1 elements.
pub(crate) fn g1_pair_from_bytes(bytes: &[u8]) -> Result<(G1Projective, G1Projective)> {
    let bytes: &[u8; 96] = bytes.try_into()?;
    let a = g1_from_bytes(bytes[..48].try_into()?)?;
    let b = g1_from_bytes(bytes[48..].try_into()?)?;
    Ok((a, b))
}

/// Canonical lowercase-hex form of a G2 element (96-byte compressed).
pub(crate) fn g2_to_hex(p: &G2Projective) -> String {
    hex::encode(p.to_affine().to_compressed())
}

/// Canonical base-10 rendering of a field element, as used on the wire.
pub(crate) fn scalar_to_decimal(s: &Scalar) -> String {
    // Scalar::to_bytes is little-endian
    BigUint::from_bytes_le(&s.to_bytes()).to_str_radix(10)
}

/// Parses the base-10 wire form of a field element.
///
/// Only the canonical representative is accepted: a token at or above the
/// field order is a parse fault, not an alias for its reduction.
pub(crate) fn scalar_from_decimal(token: &str) -> Result<Scalar> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::ProofParsing(format!(
            "'{}' is not a decimal field element",
            token
        )));
    }
    let n = BigUint::parse_bytes(token.as_bytes(), 10)
        .ok_or_else(|| Error::ProofParsing(format!("'{}' is not a decimal integer", token)))?;
    let modulus = BigUint::parse_bytes(SCALAR_MODULUS_DEC.as_bytes(), 10)
        .expect("the modulus constant is a decimal integer");
    if n >= modulus {
        return Err(Error::ProofParsing(
            "decimal token is not a canonical field element".into(),
        ));
    }
    let le = n.to_bytes_le();
    let mut wide = [0u8; WIDE_BYTES];
    wide[..le.len()].copy_from_slice(&le);
    Ok(Scalar::from_bytes_wide(&wide))
}
