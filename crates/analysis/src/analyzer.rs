//! The analysis pipeline: walk, extract selectors, resolve signatures, profile opcodes, detect
//! proxy shapes and classify.
//!
//! Signature resolution and the proxy storage read are independent, so both run concurrently.
//! Everything else is a pure function of the bytecode.

use crate::{
    config::AnalyzerConfig,
    profile::{profile, OpcodeProfile},
    risk::{classify, RiskVerdict, SignatureSet},
    signatures::{resolve_all, KnownSignatures, SignatureResolver},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use vigil_core::{
    decoder::{decode_bytecode_from_bytes, SourceType},
    detection::{
        detect_proxy, detect_selectors, DispatcherScan, OfflineStorage, ProxyFinding,
        StorageReader,
    },
    Address, Bytecode, Selector,
};
use vigil_utils::errors::AnalyzeError;

/// Everything learned about one deployed contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub byte_length: usize,
    /// `0x`-prefixed keccak-256 of the runtime code
    pub code_hash: String,
    pub instruction_count: usize,
    /// Dispatcher selectors in first-encountered order
    pub selectors: Vec<Selector>,
    /// Signatures resolved for `selectors`, sorted
    pub signatures: SignatureSet,
    pub opcode_counters: OpcodeProfile,
    pub proxy: ProxyFinding,
    pub risk: RiskVerdict,
}

/// Result of analysing one address or blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum AnalysisOutcome {
    /// The bytecode was empty: an externally owned account or a destroyed contract.
    NotAContract,
    Contract(AnalysisReport),
}

impl AnalysisOutcome {
    /// The report, if there was code to analyse.
    pub const fn report(&self) -> Option<&AnalysisReport> {
        match self {
            Self::Contract(report) => Some(report),
            Self::NotAContract => None,
        }
    }
}

/// Runs the pipeline against injected collaborators.
#[derive(Clone)]
pub struct Analyzer {
    config: AnalyzerConfig,
    storage: Arc<dyn StorageReader>,
    resolver: Arc<dyn SignatureResolver>,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Analyzer {
    pub fn new(
        config: AnalyzerConfig,
        storage: Arc<dyn StorageReader>,
        resolver: Arc<dyn SignatureResolver>,
    ) -> Self {
        Self {
            config,
            storage,
            resolver,
        }
    }

    /// An analyzer that never leaves the process: no storage reads, built-in signatures only.
    pub fn offline() -> Self {
        Self::new(
            AnalyzerConfig::offline(),
            Arc::new(OfflineStorage),
            Arc::new(KnownSignatures::builtin()),
        )
    }

    pub const fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyses raw runtime bytecode. `address` enables the EIP-1967 storage check.
    ///
    /// Never fails: collaborator errors degrade to missing information.
    pub async fn analyze(&self, bytecode: &[u8], address: Option<Address>) -> AnalysisOutcome {
        if bytecode.is_empty() {
            tracing::info!("no code to analyse, not a contract");
            return AnalysisOutcome::NotAContract;
        }

        let (instructions, info) = decode_bytecode_from_bytes(bytecode, SourceType::Bytes);

        let scan = DispatcherScan {
            max_selectors: self.config.max_selectors,
            window: self.config.dispatcher_window,
        };
        let selectors: Vec<Selector> = detect_selectors(&instructions, scan)
            .into_iter()
            .map(|found| found.selector)
            .collect();
        tracing::debug!("extracted {} selectors", selectors.len());

        let (signatures, proxy) = tokio::join!(
            resolve_all(
                self.resolver.as_ref(),
                &selectors,
                self.config.signature_timeout
            ),
            detect_proxy(
                bytecode,
                address.as_ref(),
                self.storage.as_ref(),
                self.config.storage_timeout
            ),
        );

        let opcode_counters = profile(&instructions);
        let risk = classify(&signatures, &opcode_counters);

        tracing::info!(
            "analysed {} bytes: {} selectors, severity {}, proxy {}",
            info.byte_length,
            selectors.len(),
            risk.severity,
            proxy.is_proxy()
        );

        AnalysisOutcome::Contract(AnalysisReport {
            byte_length: info.byte_length,
            code_hash: format!("0x{}", hex::encode(info.keccak_hash)),
            instruction_count: instructions.len(),
            selectors,
            signatures,
            opcode_counters,
            proxy,
            risk,
        })
    }

    /// Parses hex text, then analyses it.
    pub async fn analyze_hex(
        &self,
        input: &str,
        address: Option<Address>,
    ) -> Result<AnalysisOutcome, AnalyzeError> {
        let bytecode = Bytecode::from_hex(input)?;
        Ok(self.analyze(bytecode.as_bytes(), address).await)
    }
}
