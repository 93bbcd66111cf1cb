use core::fmt;

use alloy_primitives::{Address, keccak256};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

use crate::error::SignerError;

/// Rewrite a signature into low-s canonical form.
///
/// (r, s) and (r, n - s) both verify; secp256k1 verifiers in this domain
/// accept only the low half, and recovery-id resolution is defined against
/// it. Already-low signatures pass through unchanged.
pub fn normalize_s(signature: Signature) -> Signature {
    signature.normalize_s().unwrap_or(signature)
}

/// Ethereum address of a public key: the low 20 bytes of keccak256 over the
/// uncompressed point without its 0x04 prefix.
pub fn public_key_address(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

/// Find the recovery id under which `signature` recovers to `address`.
///
/// Expects the signature in low-s form. Tries id 0, then id 1. If neither
/// candidate reproduces the address, the signature was not made over this
/// digest by the claimed key: a hard fault surfaced as
/// [`SignerError::SignatureRecoveryFailed`], never guessed around.
pub fn resolve_recovery_id(
    digest: &[u8; 32],
    signature: &Signature,
    address: &Address,
) -> Result<RecoveryId, SignerError> {
    let candidates = [RecoveryId::new(false, false), RecoveryId::new(true, false)];
    for candidate in candidates {
        let matched = VerifyingKey::recover_from_prehash(digest, signature, candidate)
            .map(|key| public_key_address(&key) == *address)
            .unwrap_or(false);
        if matched {
            return Ok(candidate);
        }
    }
    Err(SignerError::SignatureRecoveryFailed)
}

/// Recoverable secp256k1 signature in the 65-byte Ethereum layout:
/// r (32 bytes, big-endian) || s (32 bytes, big-endian) || v, with v in {27, 28}.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoverableSignature {
    signature: Signature,
    v: u8,
}

impl RecoverableSignature {
    pub fn new(signature: Signature, recovery_id: RecoveryId) -> Self {
        Self {
            signature,
            v: 27 + recovery_id.is_y_odd() as u8,
        }
    }

    /// The normalized (r, s) pair.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn r_bytes(&self) -> [u8; 32] {
        self.signature.split_bytes().0.into()
    }

    pub fn s_bytes(&self) -> [u8; 32] {
        self.signature.split_bytes().1.into()
    }

    /// Recovery byte under the 27/28 convention.
    pub fn v(&self) -> u8 {
        self.v
    }

    pub fn recovery_id(&self) -> RecoveryId {
        RecoveryId::new(self.v == 28, false)
    }

    /// The joined 65-byte signature, r || s || v.
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[..64].copy_from_slice(&self.signature.to_bytes());
        bytes[64] = self.v;
        bytes
    }
}

impl fmt::Display for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.to_bytes()))
    }
}
