//! Decoding for the two DER structures a key service hands back: an X.509
//! SubjectPublicKeyInfo and an `ECDSA-Sig-Value` (RFC 5912).
//!
//! These functions are pure and hold no state; everything they reject maps
//! to [`SignerError::MalformedKey`] or [`SignerError::MalformedSignature`].

use k256::ecdsa::{Signature, VerifyingKey};
use spki::{ObjectIdentifier, SubjectPublicKeyInfoRef};

use crate::error::SignerError;

/// id-ecPublicKey (RFC 5480).
const ID_EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

/// The secp256k1 named curve.
const ID_SECP256K1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.10");

/// Decode a DER SubjectPublicKeyInfo into a secp256k1 verifying key.
///
/// The algorithm identifier must name id-ecPublicKey with secp256k1 as its
/// parameters, and the BIT STRING payload must be a 65-byte uncompressed
/// SEC1 point (`0x04 || X || Y`).
pub fn decode_public_key(der_bytes: &[u8]) -> Result<VerifyingKey, SignerError> {
    let info = SubjectPublicKeyInfoRef::try_from(der_bytes)
        .map_err(|e| SignerError::MalformedKey(e.to_string()))?;

    if info.algorithm.oid != ID_EC_PUBLIC_KEY {
        return Err(SignerError::MalformedKey(format!(
            "unexpected algorithm OID {}",
            info.algorithm.oid
        )));
    }
    let curve = info
        .algorithm
        .parameters_oid()
        .map_err(|e| SignerError::MalformedKey(format!("bad curve parameters: {e}")))?;
    if curve != ID_SECP256K1 {
        return Err(SignerError::MalformedKey(format!("unexpected curve OID {curve}")));
    }

    let point = info.subject_public_key.raw_bytes();
    if point.len() != 65 || point[0] != 0x04 {
        return Err(SignerError::MalformedKey(format!(
            "expected a 65-byte uncompressed point, got {} bytes",
            point.len()
        )));
    }
    VerifyingKey::from_sec1_bytes(point).map_err(|e| SignerError::MalformedKey(e.to_string()))
}

/// Decode a DER `ECDSA-Sig-Value ::= SEQUENCE { r INTEGER, s INTEGER }`.
///
/// Strict DER only: non-minimal lengths, missing or superfluous sign
/// padding, and scalars outside `(0, n)` are all rejected.
pub fn decode_signature(der_bytes: &[u8]) -> Result<Signature, SignerError> {
    Signature::from_der(der_bytes).map_err(|e| SignerError::MalformedSignature(e.to_string()))
}
