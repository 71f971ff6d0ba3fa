//! Selector-to-signature resolution.
//!
//! Resolution is an external lookup per selector. Lookups are independent, so [`resolve_all`]
//! issues them concurrently and waits for all of them before classification. Failures and
//! timeouts only mean missing information.

use crate::risk::SignatureSet;
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use vigil_core::Selector;
use vigil_utils::errors::CollaboratorError;

/// Resolves a selector to the human-readable signatures known for it.
#[async_trait]
pub trait SignatureResolver: Send + Sync {
    /// Zero or more candidate signatures; an unknown selector is `Ok(vec![])`.
    async fn resolve(&self, selector: Selector) -> Result<Vec<String>, CollaboratorError>;
}

/// Resolves every selector concurrently, each bounded by `timeout`, and merges the results.
pub async fn resolve_all(
    resolver: &dyn SignatureResolver,
    selectors: &[Selector],
    timeout: Duration,
) -> SignatureSet {
    let lookups = selectors.iter().map(|selector| async move {
        match tokio::time::timeout(timeout, resolver.resolve(*selector)).await {
            Ok(Ok(found)) => found,
            Ok(Err(e)) => {
                tracing::warn!("signature lookup for {} failed: {}", selector, e);
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(
                    "signature lookup for {} failed: {}",
                    selector,
                    CollaboratorError::Timeout(timeout)
                );
                Vec::new()
            }
        }
    });

    let signatures: SignatureSet = join_all(lookups).await.into_iter().flatten().collect();
    tracing::debug!(
        "resolved {} signatures for {} selectors",
        signatures.len(),
        selectors.len()
    );
    signatures
}

/// Common signatures worth recognising without a remote database.
const WELL_KNOWN: &[&str] = &[
    "name()",
    "symbol()",
    "decimals()",
    "totalSupply()",
    "balanceOf(address)",
    "transfer(address,uint256)",
    "allowance(address,address)",
    "approve(address,uint256)",
    "transferFrom(address,address,uint256)",
    "increaseAllowance(address,uint256)",
    "decreaseAllowance(address,uint256)",
    "permit(address,address,uint256,uint256,uint8,bytes32,bytes32)",
    "nonces(address)",
    "DOMAIN_SEPARATOR()",
    "ownerOf(uint256)",
    "getApproved(uint256)",
    "isApprovedForAll(address,address)",
    "setApprovalForAll(address,bool)",
    "safeTransferFrom(address,address,uint256)",
    "safeTransferFrom(address,address,uint256,bytes)",
    "tokenURI(uint256)",
    "supportsInterface(bytes4)",
    "owner()",
    "renounceOwnership()",
    "transferOwnership(address)",
    "implementation()",
    "admin()",
    "upgradeTo(address)",
    "upgradeToAndCall(address,bytes)",
    "changeAdmin(address)",
    "proxiableUUID()",
    "initialize()",
    "initialize(address)",
    "multicall(bytes[])",
    "execute(address,uint256,bytes)",
    "execTransaction(address,uint256,bytes,uint8,uint256,uint256,uint256,address,address,bytes)",
    "mint(address,uint256)",
    "burn(uint256)",
    "pause()",
    "unpause()",
    "paused()",
    "withdraw()",
    "deposit()",
];

/// In-memory resolver; selectors are computed from their signatures at construction.
#[derive(Debug, Clone, Default)]
pub struct KnownSignatures {
    table: HashMap<Selector, Vec<String>>,
}

impl KnownSignatures {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table seeded with common token, ownership and proxy signatures.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for signature in WELL_KNOWN {
            table.insert(signature);
        }
        table
    }

    /// Adds a signature under its computed selector.
    pub fn insert(&mut self, signature: &str) {
        let entry = self
            .table
            .entry(Selector::of_signature(signature))
            .or_default();
        if !entry.iter().any(|known| known == signature) {
            entry.push(signature.to_string());
        }
    }

    /// Number of distinct selectors in the table.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// True when the table holds nothing.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[async_trait]
impl SignatureResolver for KnownSignatures {
    async fn resolve(&self, selector: Selector) -> Result<Vec<String>, CollaboratorError> {
        Ok(self.table.get(&selector).cloned().unwrap_or_default())
    }
}

/// Asks `primary` first and falls back to `secondary` when it fails or knows nothing.
#[derive(Debug)]
pub struct FallbackResolver<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> FallbackResolver<P, S> {
    pub const fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl<P, S> SignatureResolver for FallbackResolver<P, S>
where
    P: SignatureResolver,
    S: SignatureResolver,
{
    async fn resolve(&self, selector: Selector) -> Result<Vec<String>, CollaboratorError> {
        match self.primary.resolve(selector).await {
            Ok(found) if !found.is_empty() => Ok(found),
            Ok(_) => self.secondary.resolve(selector).await,
            Err(e) => {
                tracing::debug!("primary resolver failed for {}: {}", selector, e);
                self.secondary.resolve(selector).await
            }
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    signatures: Vec<String>,
    stored_at: Instant,
}

/// Caches successful lookups of an inner resolver for `ttl`.
///
/// An entry is served for `ttl` after it was stored and never after. Every insert first evicts
/// all expired entries, so the map holds at most the selectors resolved within the last `ttl`
/// (plus the one being inserted). [`CachedResolver::purge_expired`] runs the same sweep on
/// demand. Failures are never cached.
#[derive(Debug)]
pub struct CachedResolver<R> {
    inner: R,
    ttl: Duration,
    entries: RwLock<HashMap<Selector, CacheEntry>>,
}

impl<R> CachedResolver<R> {
    pub fn new(inner: R, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Drops every expired entry, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        evict_expired(&mut entries, self.ttl)
    }

    /// Number of cached selectors, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True when nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

fn evict_expired(entries: &mut HashMap<Selector, CacheEntry>, ttl: Duration) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
    before - entries.len()
}

#[async_trait]
impl<R: SignatureResolver> SignatureResolver for CachedResolver<R> {
    async fn resolve(&self, selector: Selector) -> Result<Vec<String>, CollaboratorError> {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(&selector) {
                if entry.stored_at.elapsed() < self.ttl {
                    tracing::trace!("signature cache hit for {}", selector);
                    return Ok(entry.signatures.clone());
                }
            }
        }

        let signatures = self.inner.resolve(selector).await?;

        let mut entries = self.entries.write().await;
        let evicted = evict_expired(&mut entries, self.ttl);
        if evicted > 0 {
            tracing::trace!("evicted {} expired signature cache entries", evicted);
        }
        entries.insert(
            selector,
            CacheEntry {
                signatures: signatures.clone(),
                stored_at: Instant::now(),
            },
        );
        Ok(signatures)
    }
}
