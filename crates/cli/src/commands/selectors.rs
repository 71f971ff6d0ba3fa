use async_trait::async_trait;
use clap::Args;
use std::error::Error;
use vigil_core::{
    decoder::decode,
    detection::{detect_selectors, DispatcherScan, DEFAULT_MAX_SELECTORS},
};

/// Arguments for the `selectors` subcommand.
#[derive(Args)]
pub(crate) struct SelectorsArgs {
    /// Input bytecode as a hex string or @file
    pub input: String,
    /// Maximum number of selectors to report
    #[arg(long, default_value_t = DEFAULT_MAX_SELECTORS)]
    pub max: usize,
}

#[async_trait]
impl super::Command for SelectorsArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let bytes = super::read_input(&self.input)?;
        let scan = DispatcherScan {
            max_selectors: self.max,
            ..Default::default()
        };
        for found in detect_selectors(&decode(&bytes), scan) {
            println!("{}  pc=0x{:04x}", found.selector, found.pc);
        }
        Ok(())
    }
}
