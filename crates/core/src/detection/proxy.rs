//! Proxy shape detection: EIP-1167 minimal proxies by byte signature and EIP-1967 proxies by
//! their implementation storage slot.

use crate::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use vigil_utils::errors::CollaboratorError;

/// Runtime prefix of an EIP-1167 minimal proxy, up to and including the `PUSH20` that embeds
/// the implementation address.
pub const EIP1167_SIGNATURE: [u8; 10] =
    [0x36, 0x3d, 0x3d, 0x37, 0x3d, 0x3d, 0x3d, 0x36, 0x3d, 0x73];

/// `keccak256("eip1967.proxy.implementation") - 1`
pub const EIP1967_IMPLEMENTATION_SLOT: [u8; 32] = [
    0x36, 0x08, 0x94, 0xa1, 0x3b, 0xa1, 0xa3, 0x21, 0x06, 0x67, 0xc8, 0x28, 0x49, 0x2d, 0xb9, 0x8d,
    0xca, 0x3e, 0x20, 0x76, 0xcc, 0x37, 0x35, 0xa9, 0x20, 0xa3, 0xca, 0x50, 0x5d, 0x38, 0x2b, 0xbc,
];

/// Read access to contract storage on chain.
#[async_trait]
pub trait StorageReader: Send + Sync {
    /// Returns the 32-byte word stored at `slot` of `address`.
    async fn storage_at(
        &self,
        address: &Address,
        slot: &[u8; 32],
    ) -> Result<[u8; 32], CollaboratorError>;
}

/// Storage reader for runs without chain access; every read fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineStorage;

#[async_trait]
impl StorageReader for OfflineStorage {
    async fn storage_at(
        &self,
        _address: &Address,
        _slot: &[u8; 32],
    ) -> Result<[u8; 32], CollaboratorError> {
        Err(CollaboratorError::Unavailable("offline storage reader"))
    }
}

/// Outcome of proxy detection. The two signals are independent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyFinding {
    /// Implementation address read from the EIP-1967 slot, if non-zero.
    pub eip1967_implementation: Option<Address>,
    /// The EIP-1167 runtime signature occurs somewhere in the code.
    pub looks_like_eip1167: bool,
}

impl ProxyFinding {
    /// True when either signal fired.
    pub const fn is_proxy(&self) -> bool {
        self.eip1967_implementation.is_some() || self.looks_like_eip1167
    }
}

/// Substring test for the EIP-1167 signature.
///
/// Not instruction-aligned: the clone template is a literal byte run wherever it lands.
pub fn looks_like_eip1167(bytecode: &[u8]) -> bool {
    bytecode
        .windows(EIP1167_SIGNATURE.len())
        .any(|window| window == EIP1167_SIGNATURE)
}

/// Interprets an EIP-1967 slot word: the low 20 bytes, unless they are all zero.
pub fn implementation_from_slot(word: &[u8; 32]) -> Option<Address> {
    let address = Address::from_word(word);
    (!address.is_zero()).then_some(address)
}

/// Reads the EIP-1967 implementation slot of `address`.
///
/// Errors and timeouts are absorbed and reported as "no implementation".
pub async fn read_eip1967_implementation(
    reader: &dyn StorageReader,
    address: &Address,
    timeout: Duration,
) -> Option<Address> {
    let read = reader.storage_at(address, &EIP1967_IMPLEMENTATION_SLOT);
    match tokio::time::timeout(timeout, read).await {
        Ok(Ok(word)) => implementation_from_slot(&word),
        Ok(Err(e)) => {
            tracing::warn!("EIP-1967 slot read for {} failed: {}", address, e);
            None
        }
        Err(_) => {
            tracing::warn!(
                "EIP-1967 slot read for {} failed: {}",
                address,
                CollaboratorError::Timeout(timeout)
            );
            None
        }
    }
}

/// Runs both proxy checks.
///
/// The storage read is skipped when no contract address is known, e.g. when analysing bytecode
/// pasted by a user.
pub async fn detect_proxy(
    bytecode: &[u8],
    address: Option<&Address>,
    reader: &dyn StorageReader,
    timeout: Duration,
) -> ProxyFinding {
    let eip1967_implementation = match address {
        Some(address) => read_eip1967_implementation(reader, address, timeout).await,
        None => None,
    };

    ProxyFinding {
        eip1967_implementation,
        looks_like_eip1167: looks_like_eip1167(bytecode),
    }
}
