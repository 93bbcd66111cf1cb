use alloy_primitives::{Address, eip191_hash_message};
use k256::ecdsa::VerifyingKey;
use tokio::sync::OnceCell;
use tracing::debug;

use super::client::KeyService;
use super::recovery::{self, RecoverableSignature};
use crate::der;
use crate::error::SignerError;

/// Identity of the remote key, derived once from its public key.
#[derive(Clone)]
struct KeyIdentity {
    key: VerifyingKey,
    address: Address,
}

/// Ethereum-style signer over a remote [`KeyService`] key.
///
/// The service hands back raw DER blobs; this type owns the decoding,
/// low-s normalization and recovery-id resolution that turn them into
/// 65-byte recoverable signatures. The key's identity (verifying key and
/// address) is fetched and derived once per instance, then reused: a
/// signing key does not change identity, so a rotated remote key must be
/// given a fresh signer rather than silently merged into this one.
pub struct KmsSigner<S> {
    service: S,
    identity: OnceCell<KeyIdentity>,
}

impl<S: KeyService> KmsSigner<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            identity: OnceCell::new(),
        }
    }

    /// Cached identity; concurrent first callers race into a single remote
    /// public-key fetch, steady-state reads take no lock.
    async fn identity(&self) -> Result<&KeyIdentity, SignerError> {
        self.identity
            .get_or_try_init(|| async {
                let der_key = self.service.public_key().await?;
                let key = der::decode_public_key(&der_key)?;
                let address = recovery::public_key_address(&key);
                debug!(%address, "derived signer identity from remote public key");
                Ok(KeyIdentity { key, address })
            })
            .await
    }

    /// Ethereum address of the remote key.
    pub async fn address(&self) -> Result<Address, SignerError> {
        Ok(self.identity().await?.address)
    }

    /// SEC1 compressed public key: parity prefix (0x02/0x03) + 32-byte X.
    pub async fn compressed_public_key(&self) -> Result<[u8; 33], SignerError> {
        let identity = self.identity().await?;
        let point = identity.key.to_encoded_point(true);
        let mut bytes = [0u8; 33];
        bytes.copy_from_slice(point.as_bytes());
        Ok(bytes)
    }

    /// SEC1 uncompressed public key: 0x04 + 32-byte X + 32-byte Y.
    pub async fn uncompressed_public_key(&self) -> Result<[u8; 65], SignerError> {
        let identity = self.identity().await?;
        let point = identity.key.to_encoded_point(false);
        let mut bytes = [0u8; 65];
        bytes.copy_from_slice(point.as_bytes());
        Ok(bytes)
    }

    /// Sign a 32-byte digest, returning a recoverable signature whose
    /// recovery byte verifies against [`address`](Self::address).
    ///
    /// The digest is signed as-is; the hashing scheme (message hash,
    /// transaction hash, typed-data hash) is the caller's concern. The
    /// operation is atomic: any remote, decoding or recovery fault surfaces
    /// as its own [`SignerError`] variant, never a partial result.
    pub async fn sign_digest(&self, digest: [u8; 32]) -> Result<RecoverableSignature, SignerError> {
        // The identity fetch and the remote signing call are independent.
        let (identity, der_signature) =
            tokio::try_join!(self.identity(), self.service.sign_digest(digest))?;

        let signature = recovery::normalize_s(der::decode_signature(&der_signature)?);
        let recovery_id = recovery::resolve_recovery_id(&digest, &signature, &identity.address)?;
        Ok(RecoverableSignature::new(signature, recovery_id))
    }

    /// Sign a message under the EIP-191 personal-message prefix.
    pub async fn sign_message(&self, message: &[u8]) -> Result<RecoverableSignature, SignerError> {
        self.sign_digest(eip191_hash_message(message).0).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use k256::ecdsa::signature::hazmat::PrehashSigner;
    use k256::ecdsa::{Signature, SigningKey};
    use k256::pkcs8::EncodePublicKey;
    use sha2::{Digest, Sha256};

    /// Key service double backed by an in-memory key, speaking DER like the
    /// real service does.
    struct InMemoryKeyService {
        key: SigningKey,
        public_key_calls: Arc<AtomicUsize>,
    }

    impl InMemoryKeyService {
        fn new(seed: &[u8]) -> Self {
            let hash = Sha256::digest(seed);
            Self {
                key: SigningKey::from_bytes((&hash).into()).unwrap(),
                public_key_calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl KeyService for InMemoryKeyService {
        async fn public_key(&self) -> Result<Vec<u8>, SignerError> {
            self.public_key_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.key.verifying_key().to_public_key_der().unwrap().into_vec())
        }

        async fn sign_digest(&self, digest: [u8; 32]) -> Result<Vec<u8>, SignerError> {
            let signature: Signature = self.key.sign_prehash(&digest).unwrap();
            Ok(signature.to_der().as_bytes().to_vec())
        }
    }

    struct FailingKeyService;

    #[async_trait]
    impl KeyService for FailingKeyService {
        async fn public_key(&self) -> Result<Vec<u8>, SignerError> {
            Err(SignerError::SigningService("kms unavailable".into()))
        }

        async fn sign_digest(&self, _digest: [u8; 32]) -> Result<Vec<u8>, SignerError> {
            Err(SignerError::SigningService("kms unavailable".into()))
        }
    }

    #[tokio::test]
    async fn address_is_fetched_once() {
        let service = InMemoryKeyService::new(b"cache-test");
        let calls = service.public_key_calls.clone();
        let signer = KmsSigner::new(service);

        let first = signer.address().await.unwrap();
        let second = signer.address().await.unwrap();
        signer.sign_digest([1u8; 32]).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn service_failures_propagate() {
        let signer = KmsSigner::new(FailingKeyService);
        let result = signer.sign_digest([2u8; 32]).await;
        assert!(matches!(result, Err(SignerError::SigningService(_))));

        let result = signer.address().await;
        assert!(matches!(result, Err(SignerError::SigningService(_))));
    }
}
