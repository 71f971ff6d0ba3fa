use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};
use vigil_core::detection::{DEFAULT_DISPATCHER_WINDOW, DEFAULT_MAX_SELECTORS};
use vigil_utils::errors::ConfigError;

/// Public signature database queried when no other resolver is configured.
pub const DEFAULT_SIGNATURE_API_URL: &str =
    "https://api.openchain.xyz/signature-database/v1/lookup";

/// Tunables of the analysis pipeline.
///
/// Durations are written as whole seconds in JSON. Missing fields take their defaults, so a
/// config file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Cap on dispatcher selectors reported per contract
    pub max_selectors: usize,
    /// Instructions searched after each PUSH4 for the comparison shape
    pub dispatcher_window: usize,
    /// Budget for the EIP-1967 storage read
    #[serde(with = "seconds")]
    pub storage_timeout: Duration,
    /// Budget for each signature lookup
    #[serde(with = "seconds")]
    pub signature_timeout: Duration,
    /// How long resolved signatures stay cached
    #[serde(with = "seconds")]
    pub signature_cache_ttl: Duration,
    /// JSON-RPC endpoint for storage reads; `None` disables chain access
    pub rpc_url: Option<String>,
    /// Remote signature database; `None` keeps lookups local
    pub signature_api_url: Option<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_selectors: DEFAULT_MAX_SELECTORS,
            dispatcher_window: DEFAULT_DISPATCHER_WINDOW,
            storage_timeout: Duration::from_secs(5),
            signature_timeout: Duration::from_secs(5),
            signature_cache_ttl: Duration::from_secs(60 * 60),
            rpc_url: None,
            signature_api_url: Some(DEFAULT_SIGNATURE_API_URL.to_string()),
        }
    }
}

impl AnalyzerConfig {
    /// Defaults with every remote collaborator switched off.
    pub fn offline() -> Self {
        Self {
            rpc_url: None,
            signature_api_url: None,
            ..Self::default()
        }
    }

    /// True when neither chain reads nor remote lookups are configured.
    pub const fn is_offline(&self) -> bool {
        self.rpc_url.is_none() && self.signature_api_url.is_none()
    }

    /// Loads a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = serde_json::from_str(&raw)?;
        tracing::debug!("loaded analyzer config from {}", path.display());
        Ok(config)
    }
}

mod seconds {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(
        value: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
