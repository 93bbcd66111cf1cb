mod client;
mod kms;
mod local;
mod recovery;
mod signer;

pub use client::KeyService;
pub use kms::{AwsKmsConfig, AwsKmsService};
pub use local::LocalSigner;
pub use recovery::{RecoverableSignature, normalize_s, public_key_address, resolve_recovery_id};
pub use signer::KmsSigner;
