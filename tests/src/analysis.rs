use crate::fixtures::{init_tracing, minimal_proxy, CLONE_TARGET, TOKEN_DISPATCHER};
use async_trait::async_trait;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;
use vigil_analysis::{
    AnalysisOutcome, Analyzer, AnalyzerConfig, CachedResolver, KnownSignatures, Severity,
    SignatureResolver,
};
use vigil_core::{detection::StorageReader, Address, Selector};
use vigil_utils::errors::CollaboratorError;

/// Storage holding an EIP-1967 implementation for every address.
struct UpgradeableStorage(Address);

#[async_trait]
impl StorageReader for UpgradeableStorage {
    async fn storage_at(
        &self,
        _address: &Address,
        _slot: &[u8; 32],
    ) -> Result<[u8; 32], CollaboratorError> {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&self.0 .0);
        Ok(word)
    }
}

/// Counts how often the remote is consulted.
struct CountingRemote(Arc<AtomicUsize>);

#[async_trait]
impl SignatureResolver for CountingRemote {
    async fn resolve(&self, selector: Selector) -> Result<Vec<String>, CollaboratorError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        KnownSignatures::builtin().resolve(selector).await
    }
}

#[tokio::test]
async fn test_token_dispatcher_is_medium() {
    init_tracing();
    let outcome = Analyzer::offline()
        .analyze_hex(TOKEN_DISPATCHER, None)
        .await
        .unwrap();
    let AnalysisOutcome::Contract(report) = outcome else {
        panic!("expected a contract");
    };

    assert_eq!(report.selectors.len(), 3);
    assert_eq!(
        report.signatures.iter().cloned().collect::<Vec<_>>(),
        vec![
            "approve(address,uint256)",
            "totalSupply()",
            "transferFrom(address,address,uint256)",
        ]
    );
    assert_eq!(report.risk.severity, Severity::Medium);
    assert_eq!(report.risk.risks.len(), 2);
    assert!(report.risk.risks[0].starts_with("approve()"));
    assert!(report.risk.risks[1].starts_with("transferFrom()"));
}

#[tokio::test]
async fn test_minimal_proxy_is_high() {
    let outcome = Analyzer::offline().analyze(&minimal_proxy(), None).await;
    let report = outcome.report().unwrap();

    assert!(report.proxy.looks_like_eip1167);
    assert!(report.selectors.is_empty());
    assert_eq!(report.opcode_counters.delegatecall, 1);
    assert_eq!(report.risk.severity, Severity::High);
    assert_eq!(report.risk.risks.len(), 1);
    assert!(report.risk.risks[0].starts_with("DELEGATECALL x1"));
    assert_eq!(report.code_hash.len(), 66);
    assert_eq!(report.byte_length, 10 + CLONE_TARGET.len() + 15);
}

#[tokio::test]
async fn test_eip1967_implementation_reported() {
    let implementation = Address([0x77; 20]);
    let analyzer = Analyzer::new(
        AnalyzerConfig::offline(),
        Arc::new(UpgradeableStorage(implementation)),
        Arc::new(KnownSignatures::builtin()),
    );

    let proxy = Address([0x01; 20]);
    let with_address = analyzer.analyze(&[0x00], Some(proxy)).await;
    assert_eq!(
        with_address.report().unwrap().proxy.eip1967_implementation,
        Some(implementation)
    );

    let without_address = analyzer.analyze(&[0x00], None).await;
    assert_eq!(
        without_address.report().unwrap().proxy.eip1967_implementation,
        None
    );
}

#[tokio::test]
async fn test_cached_remote_consulted_once_per_selector() {
    let calls = Arc::new(AtomicUsize::new(0));
    let remote = Arc::new(CachedResolver::new(
        CountingRemote(calls.clone()),
        Duration::from_secs(3600),
    ));
    let analyzer = Analyzer::new(
        AnalyzerConfig::offline(),
        Arc::new(vigil_core::detection::OfflineStorage),
        remote.clone(),
    );

    let first = analyzer.analyze_hex(TOKEN_DISPATCHER, None).await.unwrap();
    let second = analyzer.analyze_hex(TOKEN_DISPATCHER, None).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(remote.len().await, 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_not_a_contract() {
    let outcome = Analyzer::offline().analyze_hex("", None).await.unwrap();
    assert_eq!(outcome, AnalysisOutcome::NotAContract);
    assert_eq!(
        serde_json::to_value(&outcome).unwrap(),
        serde_json::json!({ "status": "notAContract" })
    );
}
