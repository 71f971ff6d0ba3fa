/// Module for the `analyze` subcommand: runs the full pipeline and prints the verdict.
use async_trait::async_trait;
use clap::Args;
use std::error::Error;
use std::path::PathBuf;
use vigil_analysis::{AnalysisOutcome, AnalysisReport, AnalyzerConfig};
use vigil_core::Address;
use vigil_rpc::build_analyzer;

/// Arguments for the `analyze` subcommand.
#[derive(Args)]
pub(crate) struct AnalyzeArgs {
    /// Input bytecode as a hex string or @file
    pub input: String,
    /// Contract address; enables the EIP-1967 implementation-slot read
    #[arg(long)]
    pub address: Option<Address>,
    /// JSON-RPC endpoint used for storage reads
    #[arg(long, env = "VIGIL_RPC_URL")]
    pub rpc_url: Option<String>,
    /// Never contact the network; built-in signatures only
    #[arg(long)]
    pub offline: bool,
    /// JSON analyzer config file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl AnalyzeArgs {
    fn resolve_config(&self) -> Result<AnalyzerConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => AnalyzerConfig::from_file(path)?,
            None => AnalyzerConfig::default(),
        };
        if let Some(url) = &self.rpc_url {
            config.rpc_url = Some(url.clone());
        }
        if self.offline {
            config.rpc_url = None;
            config.signature_api_url = None;
        }
        Ok(config)
    }
}

#[async_trait]
impl super::Command for AnalyzeArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let bytes = super::read_input(&self.input)?;
        let analyzer = build_analyzer(self.resolve_config()?)?;
        let outcome = analyzer.analyze(&bytes, self.address).await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            return Ok(());
        }

        match outcome {
            AnalysisOutcome::NotAContract => println!("not a contract: no runtime code"),
            AnalysisOutcome::Contract(report) => print_summary(&report),
        }
        Ok(())
    }
}

fn print_summary(report: &AnalysisReport) {
    println!("code:        {} bytes, {}", report.byte_length, report.code_hash);
    println!("selectors:   {}", report.selectors.len());
    for signature in &report.signatures {
        println!("  {signature}");
    }

    let counters = &report.opcode_counters;
    println!(
        "opcodes:     CALL {} CALLCODE {} DELEGATECALL {} STATICCALL {} SELFDESTRUCT {} CREATE2 {}",
        counters.call,
        counters.callcode,
        counters.delegatecall,
        counters.staticcall,
        counters.selfdestruct,
        counters.create2
    );

    match &report.proxy.eip1967_implementation {
        Some(implementation) => println!("proxy:       EIP-1967 -> {implementation}"),
        None if report.proxy.looks_like_eip1167 => println!("proxy:       EIP-1167 minimal proxy"),
        None => println!("proxy:       none detected"),
    }

    println!("severity:    {}", report.risk.severity);
    for risk in &report.risk.risks {
        println!("  - {risk}");
    }
}
