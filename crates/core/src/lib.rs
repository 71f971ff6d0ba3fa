//! Bytecode-level building blocks of the vigil analyzer: the instruction walker, dispatcher
//! selector extraction and proxy shape detection. Opcodes come from `eot`.

pub mod decoder;
pub mod detection;
pub mod types;

pub use eot::UnifiedOpcode as Opcode;
pub use types::{Address, Bytecode, Selector};

use tiny_keccak::{Hasher, Keccak};

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut keccak = Keccak::v256();
    keccak.update(data);
    let mut hash = [0u8; 32];
    keccak.finalize(&mut hash);
    hash
}
