use alloy_primitives::{Address, eip191_hash_message};
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature, SigningKey};
use sha2::{Digest, Sha256};

use super::recovery::{self, RecoverableSignature};
use crate::error::SignerError;

/// In-process secp256k1 signer producing the same Ethereum-compatible
/// recoverable signatures as [`KmsSigner`](super::KmsSigner).
///
/// The local-key counterpart for call sites that hold the private key
/// directly instead of a key-service handle. Signing is deterministic
/// (RFC 6979) and always low-s.
pub struct LocalSigner {
    signing_key: SigningKey,
}

impl LocalSigner {
    /// Derive a key from a seed string: the SHA-256 hash of the seed
    /// becomes the 32-byte private key.
    pub fn from_seed(seed: &str) -> Result<Self, SignerError> {
        let hash = Sha256::digest(seed.as_bytes());
        let signing_key = SigningKey::from_bytes((&hash).into())
            .map_err(|e| SignerError::MalformedKey(format!("invalid seed: {e}")))?;
        Ok(Self { signing_key })
    }

    /// Use a raw 32-byte private key.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignerError> {
        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|e| SignerError::MalformedKey(format!("invalid private key: {e}")))?;
        Ok(Self { signing_key })
    }

    /// Ethereum address of the key.
    pub fn address(&self) -> Address {
        recovery::public_key_address(self.signing_key.verifying_key())
    }

    /// SEC1 compressed public key: parity prefix (0x02/0x03) + 32-byte X.
    pub fn compressed_public_key(&self) -> [u8; 33] {
        let point = self.signing_key.verifying_key().to_encoded_point(true);
        let mut bytes = [0u8; 33];
        bytes.copy_from_slice(point.as_bytes());
        bytes
    }

    /// Sign a 32-byte digest.
    pub fn sign_digest(&self, digest: [u8; 32]) -> Result<RecoverableSignature, SignerError> {
        let (signature, recovery_id): (Signature, RecoveryId) = self
            .signing_key
            .sign_prehash(&digest)
            .map_err(|e| SignerError::SigningService(format!("local signing failed: {e}")))?;
        Ok(RecoverableSignature::new(signature, recovery_id))
    }

    /// Sign a message under the EIP-191 personal-message prefix.
    pub fn sign_message(&self, message: &[u8]) -> Result<RecoverableSignature, SignerError> {
        self.sign_digest(eip191_hash_message(message).0)
    }
}
