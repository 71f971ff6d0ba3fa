use async_trait::async_trait;
use clap::Subcommand;
use std::error::Error;
use vigil_core::decoder::input_to_bytes;
use vigil_utils::errors::DecodeError;

pub(crate) mod analyze;
pub(crate) mod decode;
pub(crate) mod selectors;

#[derive(Subcommand)]
pub(crate) enum Cmd {
    /// Decode bytecode to an instruction listing
    Decode(decode::DecodeArgs),

    /// List the function selectors found in the dispatcher
    Selectors(selectors::SelectorsArgs),

    /// Run the full analysis and print a risk report
    Analyze(analyze::AnalyzeArgs),
}

#[async_trait]
pub(crate) trait Command {
    async fn execute(self) -> Result<(), Box<dyn Error>>;
}

#[async_trait]
impl Command for Cmd {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        match self {
            Cmd::Decode(args) => args.execute().await,
            Cmd::Selectors(args) => args.execute().await,
            Cmd::Analyze(args) => args.execute().await,
        }
    }
}

/// Splits a CLI input into (text, is_file): `@path` names a file holding hex.
pub(crate) fn split_input(input: &str) -> (&str, bool) {
    match input.strip_prefix('@') {
        Some(path) => (path, true),
        None => (input, false),
    }
}

/// Reads bytecode from a hex string or an `@path` file.
pub(crate) fn read_input(input: &str) -> Result<Vec<u8>, DecodeError> {
    let (text, is_file) = split_input(input);
    input_to_bytes(text, is_file)
}
