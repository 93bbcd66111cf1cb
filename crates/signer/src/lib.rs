pub mod der;
pub mod error;
pub mod signing;

pub use error::SignerError;
pub use signing::{
    AwsKmsConfig, AwsKmsService, KeyService, KmsSigner, LocalSigner, RecoverableSignature,
};
