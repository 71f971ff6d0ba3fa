//! Network-backed collaborators for the analyzer: a JSON-RPC storage reader and a remote
//! signature database client, plus the wiring that picks them from an [`AnalyzerConfig`].

mod openchain;
mod storage;

pub use openchain::OpenChainResolver;
pub use storage::{parse_storage_word, JsonRpcStorageReader};

use std::{sync::Arc, time::Duration};
use vigil_analysis::{
    Analyzer, AnalyzerConfig, CachedResolver, FallbackResolver, KnownSignatures,
    SignatureResolver,
};
use vigil_core::detection::{OfflineStorage, StorageReader};
use vigil_utils::errors::CollaboratorError;

fn transport_error(e: reqwest::Error, timeout: Duration) -> CollaboratorError {
    if e.is_timeout() {
        CollaboratorError::Timeout(timeout)
    } else {
        CollaboratorError::Transport(e.to_string())
    }
}

/// Builds an analyzer whose collaborators follow `config`.
///
/// Without `rpc_url` storage reads are disabled. Without `signature_api_url` only the built-in
/// signature table is consulted; with it, remote answers are cached and the built-in table
/// covers lookups the remote cannot answer.
pub fn build_analyzer(config: AnalyzerConfig) -> Result<Analyzer, CollaboratorError> {
    let storage: Arc<dyn StorageReader> = match &config.rpc_url {
        Some(url) => Arc::new(JsonRpcStorageReader::new(url.clone(), config.storage_timeout)?),
        None => Arc::new(OfflineStorage),
    };

    let resolver: Arc<dyn SignatureResolver> = match &config.signature_api_url {
        Some(url) => {
            let remote = OpenChainResolver::new(url.clone(), config.signature_timeout)?;
            Arc::new(CachedResolver::new(
                FallbackResolver::new(remote, KnownSignatures::builtin()),
                config.signature_cache_ttl,
            ))
        }
        None => Arc::new(KnownSignatures::builtin()),
    };

    tracing::debug!(
        "analyzer wired: rpc={:?} signatures={:?}",
        config.rpc_url,
        config.signature_api_url
    );
    Ok(Analyzer::new(config, storage, resolver))
}
