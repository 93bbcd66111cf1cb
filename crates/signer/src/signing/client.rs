use async_trait::async_trait;

use crate::error::SignerError;

/// Capability handle to a remote signing key.
///
/// The key service never reveals the private scalar; it returns DER-encoded
/// material that the signer decodes locally. Implementations own transport
/// and auth; failures surface as [`SignerError::SigningService`] and are
/// never retried by the signer, so any retry policy lives behind this trait
/// or above it.
#[async_trait]
pub trait KeyService: Send + Sync {
    /// DER-encoded SubjectPublicKeyInfo of the signing key.
    async fn public_key(&self) -> Result<Vec<u8>, SignerError>;

    /// DER-encoded ECDSA signature over a 32-byte digest.
    ///
    /// The service must treat the input as a digest and sign it as-is,
    /// not hash it again.
    async fn sign_digest(&self, digest: [u8; 32]) -> Result<Vec<u8>, SignerError>;
}
