//! Contract-level analysis on top of `vigil-core`: opcode profiling, signature resolution,
//! risk classification and the pipeline that ties them together.

pub mod analyzer;
pub mod config;
pub mod profile;
pub mod risk;
pub mod signatures;

pub use analyzer::{AnalysisOutcome, AnalysisReport, Analyzer};
pub use config::AnalyzerConfig;
pub use profile::{profile, OpcodeProfile, TrackedOpcode};
pub use risk::{classify, RiskVerdict, Severity, SignatureSet};
pub use signatures::{
    resolve_all, CachedResolver, FallbackResolver, KnownSignatures, SignatureResolver,
};
