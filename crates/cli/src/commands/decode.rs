/// Module for the `decode` subcommand, which prints the instruction stream of EVM bytecode.
use async_trait::async_trait;
use clap::Args;
use std::error::Error;
use vigil_core::decoder::decode_bytecode;

/// Arguments for the `decode` subcommand.
#[derive(Args)]
pub(crate) struct DecodeArgs {
    /// Input bytecode as a hex string or @file
    pub input: String,
}

#[async_trait]
impl super::Command for DecodeArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let (text, is_file) = super::split_input(&self.input);
        let (instructions, info, _) = decode_bytecode(text, is_file)?;

        println!(
            "; {} bytes, {} instructions, keccak256 0x{}",
            info.byte_length,
            instructions.len(),
            hex::encode(info.keccak_hash)
        );
        for instr in instructions {
            println!("{instr}");
        }
        Ok(())
    }
}
