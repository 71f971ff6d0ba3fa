use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use vigil_core::{detection::StorageReader, Address};
use vigil_utils::errors::CollaboratorError;

/// Reads contract storage through an Ethereum JSON-RPC endpoint (`eth_getStorageAt`).
#[derive(Debug, Clone)]
pub struct JsonRpcStorageReader {
    url: String,
    client: reqwest::Client,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl JsonRpcStorageReader {
    /// Builds a reader whose requests give up after `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, CollaboratorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CollaboratorError::Transport(e.to_string()))?;
        Ok(Self {
            url: url.into(),
            client,
            timeout,
        })
    }
}

#[async_trait]
impl StorageReader for JsonRpcStorageReader {
    async fn storage_at(
        &self,
        address: &Address,
        slot: &[u8; 32],
    ) -> Result<[u8; 32], CollaboratorError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_getStorageAt",
            "params": [address.to_string(), format!("0x{}", hex::encode(slot)), "latest"],
        });
        tracing::debug!("eth_getStorageAt {} via {}", address, self.url);

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| crate::transport_error(e, self.timeout))?;
        if !response.status().is_success() {
            return Err(CollaboratorError::Transport(format!(
                "http status {}",
                response.status()
            )));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::Malformed(e.to_string()))?;
        parse_storage_response(body)
    }
}

fn parse_storage_response(body: RpcResponse) -> Result<[u8; 32], CollaboratorError> {
    if let Some(error) = body.error {
        return Err(CollaboratorError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    let result = body.result.ok_or_else(|| {
        CollaboratorError::Malformed("response has neither result nor error".into())
    })?;
    parse_storage_word(&result)
}

/// Decodes a quantity-style hex word into 32 bytes, left-padding short values.
pub fn parse_storage_word(value: &str) -> Result<[u8; 32], CollaboratorError> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| CollaboratorError::Malformed(format!("missing 0x prefix: {value}")))?;
    let digits = if digits.len() % 2 == 1 {
        format!("0{digits}")
    } else {
        digits.to_string()
    };
    let bytes = hex::decode(&digits).map_err(|e| CollaboratorError::Malformed(e.to_string()))?;
    if bytes.len() > 32 {
        return Err(CollaboratorError::Malformed(format!(
            "storage word is {} bytes",
            bytes.len()
        )));
    }

    let mut word = [0u8; 32];
    word[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(word)
}
