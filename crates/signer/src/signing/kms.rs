use std::time::Duration;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, retry::RetryConfig, timeout::TimeoutConfig};
use aws_sdk_kms::config::Credentials;
use aws_sdk_kms::error::DisplayErrorContext;
use aws_sdk_kms::primitives::Blob;
use aws_sdk_kms::types::{MessageType, SigningAlgorithmSpec};
use tracing::debug;

use super::client::KeyService;
use crate::error::SignerError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection parameters for a signing key held in AWS KMS.
///
/// When the static credential pair is unset, the SDK's default provider
/// chain (environment, profile, instance role) applies.
#[derive(Debug, Clone)]
pub struct AwsKmsConfig {
    pub key_id: String,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Per-operation timeout for KMS calls.
    pub timeout: Duration,
}

impl AwsKmsConfig {
    pub fn new(key_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            region: region.into(),
            access_key_id: None,
            secret_access_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_static_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// [`KeyService`] backed by an asymmetric AWS KMS key.
///
/// Signs with `ECDSA_SHA_256` in digest mode, so KMS signs the caller's
/// 32-byte digest as-is. SDK retries are disabled: this layer's contract is
/// to surface remote failures, not to hide them behind a retry loop.
pub struct AwsKmsService {
    client: aws_sdk_kms::Client,
    key_id: String,
}

impl AwsKmsService {
    /// Build a KMS client from explicit connection parameters.
    pub async fn connect(config: AwsKmsConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region))
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(config.timeout)
                    .build(),
            );
        if let (Some(id), Some(secret)) = (config.access_key_id, config.secret_access_key) {
            loader = loader.credentials_provider(Credentials::new(id, secret, None, None, "static"));
        }
        let sdk_config = loader.load().await;
        Self {
            client: aws_sdk_kms::Client::new(&sdk_config),
            key_id: config.key_id,
        }
    }

    /// Wrap an already-configured KMS client.
    pub fn from_client(client: aws_sdk_kms::Client, key_id: impl Into<String>) -> Self {
        Self {
            client,
            key_id: key_id.into(),
        }
    }
}

#[async_trait]
impl KeyService for AwsKmsService {
    async fn public_key(&self) -> Result<Vec<u8>, SignerError> {
        debug!(key_id = %self.key_id, "fetching public key from KMS");
        let output = self
            .client
            .get_public_key()
            .key_id(&self.key_id)
            .send()
            .await
            .map_err(|e| SignerError::SigningService(DisplayErrorContext(&e).to_string()))?;
        output
            .public_key()
            .map(|blob| blob.as_ref().to_vec())
            .ok_or_else(|| SignerError::SigningService("GetPublicKey returned no key material".into()))
    }

    async fn sign_digest(&self, digest: [u8; 32]) -> Result<Vec<u8>, SignerError> {
        debug!(key_id = %self.key_id, "requesting signature from KMS");
        let output = self
            .client
            .sign()
            .key_id(&self.key_id)
            .message(Blob::new(digest.to_vec()))
            .message_type(MessageType::Digest)
            .signing_algorithm(SigningAlgorithmSpec::EcdsaSha256)
            .send()
            .await
            .map_err(|e| SignerError::SigningService(DisplayErrorContext(&e).to_string()))?;
        output
            .signature()
            .map(|blob| blob.as_ref().to_vec())
            .ok_or_else(|| SignerError::SigningService("Sign returned no signature".into()))
    }
}
