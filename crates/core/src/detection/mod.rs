/// Module for recognising structure in decoded bytecode.
///
/// `dispatcher` recovers the function selectors a contract dispatches on from its instruction
/// stream; `proxy` decides whether the code is a known proxy shape, consulting contract storage
/// through a [`StorageReader`] for EIP-1967.
///
/// # Usage
/// ```rust,ignore
/// use vigil_core::{decoder, detection};
///
/// let (instructions, _, bytes) = decoder::decode_bytecode("0x63a9059cbb811461004057", false)?;
/// let selectors = detection::extract_selectors(&instructions, 40);
/// let proxy = detection::detect_proxy(&bytes, None, &detection::OfflineStorage, timeout).await;
/// ```
pub mod dispatcher;
pub mod proxy;

pub use dispatcher::{
    detect_selectors, extract_selectors, has_dispatcher, DispatcherScan, FunctionSelector,
    DEFAULT_DISPATCHER_WINDOW, DEFAULT_MAX_SELECTORS,
};

pub use proxy::{
    detect_proxy, implementation_from_slot, looks_like_eip1167, read_eip1967_implementation,
    OfflineStorage, ProxyFinding, StorageReader, EIP1167_SIGNATURE, EIP1967_IMPLEMENTATION_SLOT,
};
