/// Failure classes for signer operations.
///
/// Remote-service failures and cryptographic faults stay distinct so
/// callers can tell "the key service call failed" apart from "the decoded
/// material violated an invariant"; the latter must never be retried or
/// papered over.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    /// DER public key had the wrong structure, or named an algorithm/curve
    /// other than ECDSA over secp256k1.
    #[error("malformed DER public key: {0}")]
    MalformedKey(String),
    /// DER signature had the wrong structure, a non-canonical encoding, or
    /// out-of-range integers.
    #[error("malformed DER signature: {0}")]
    MalformedSignature(String),
    /// The remote key service call failed (transport, auth, throttling,
    /// unknown key, incomplete response). Retry policy is the caller's.
    #[error("signing service error: {0}")]
    SigningService(String),
    /// Neither candidate recovery id reproduced the signer's address.
    #[error("signature recovery failed: recovered address matches neither recovery id")]
    SignatureRecoveryFailed,
}
