use async_trait::async_trait;
use serde::Deserialize;
use std::{collections::HashMap, time::Duration};
use vigil_analysis::SignatureResolver;
use vigil_core::Selector;
use vigil_utils::errors::CollaboratorError;

/// Looks selectors up in an OpenChain-compatible signature database.
#[derive(Debug, Clone)]
pub struct OpenChainResolver {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    ok: bool,
    result: Option<LookupResult>,
}

#[derive(Debug, Default, Deserialize)]
struct LookupResult {
    #[serde(default)]
    function: HashMap<String, Option<Vec<SignatureEntry>>>,
}

#[derive(Debug, Deserialize)]
struct SignatureEntry {
    name: String,
}

impl OpenChainResolver {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CollaboratorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CollaboratorError::Transport(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into(),
            client,
            timeout,
        })
    }
}

#[async_trait]
impl SignatureResolver for OpenChainResolver {
    async fn resolve(&self, selector: Selector) -> Result<Vec<String>, CollaboratorError> {
        let key = selector.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("function", key.as_str()), ("filter", "true")])
            .send()
            .await
            .map_err(|e| crate::transport_error(e, self.timeout))?;
        if !response.status().is_success() {
            return Err(CollaboratorError::Transport(format!(
                "http status {}",
                response.status()
            )));
        }

        let body: LookupResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::Malformed(e.to_string()))?;
        let names = signatures_for(body, &key)?;
        tracing::debug!("{} resolved to {} signatures", key, names.len());
        Ok(names)
    }
}

fn signatures_for(body: LookupResponse, key: &str) -> Result<Vec<String>, CollaboratorError> {
    if !body.ok {
        return Err(CollaboratorError::Malformed("lookup reported ok=false".into()));
    }
    let mut result = body.result.unwrap_or_default();
    Ok(result
        .function
        .remove(key)
        .flatten()
        .unwrap_or_default()
        .into_iter()
        .map(|entry| entry.name)
        .collect())
}
