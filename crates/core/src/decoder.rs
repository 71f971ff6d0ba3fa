//! vigil's single entry-point for turning byte-sequences into instruction streams.
//!
//! The walker is the one place that knows PUSH immediates are data: every consumer downstream
//! (selector extraction, opcode profiling) works on the [`Instruction`] records produced here and
//! never rescans raw bytes, so a byte inside a PUSH immediate can never be mistaken for an opcode.

use crate::{keccak256, Opcode};
use std::{fmt, fs, path::Path};
use vigil_utils::errors::DecodeError;

/// Represents a single decoded instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// the instruction's program counter (byte offset of the opcode itself)
    pub pc: usize,
    /// decoded opcode
    pub op: Opcode,
    /// declared immediate length; non-zero only for PUSH1..PUSH32
    pub imm_len: usize,
    /// immediate bytes actually present in the buffer; shorter than `imm_len` only for a
    /// PUSH truncated by the end of the code
    pub imm: Vec<u8>,
}

/// Metadata about the decoded bytecode blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeInfo {
    /// number of bytes
    pub byte_length: usize,
    /// a 32-byte Keccak-256 hash of the raw bytes
    pub keccak_hash: [u8; 32],
    /// input from the variants of SourceType
    pub source: SourceType,
}

/// Source type of the bytecode input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    HexString,
    File,
    Bytes,
}

/// Normalizes hex strings by removing whitespace, 0x prefix, and ensuring even length
pub fn normalize_hex_string(input: &str) -> Result<String, DecodeError> {
    let compact = input.trim().replace(['\n', '\r', ' ', '\t'], "");
    let clean = compact
        .strip_prefix("0x")
        .or_else(|| compact.strip_prefix("0X"))
        .unwrap_or(&compact);

    if let Some((index, c)) = clean.char_indices().find(|(_, c)| !c.is_ascii_hexdigit()) {
        return Err(DecodeError::HexDecode(
            hex::FromHexError::InvalidHexCharacter { c, index },
        ));
    }

    // Ensure even length by padding with leading zero if necessary
    Ok(if clean.len() % 2 == 1 {
        format!("0{}", clean.to_ascii_lowercase())
    } else {
        clean.to_ascii_lowercase()
    })
}

/// Normalizes input into a byte vector from hex string or file.
pub fn input_to_bytes(input: &str, is_file: bool) -> Result<Vec<u8>, DecodeError> {
    let normalized = if is_file {
        let path = Path::new(input);
        let file_content = fs::read_to_string(path).map_err(|e| DecodeError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;
        normalize_hex_string(&file_content)?
    } else {
        normalize_hex_string(input)?
    };
    Ok(hex::decode(normalized)?)
}

/// Walks raw bytecode into an instruction stream.
///
/// Total: never fails and never reads past the end of `bytes`. A PUSH whose immediate runs past
/// the end is emitted with its declared `imm_len` and whatever bytes remain, then the walk ends.
///
/// # Examples
/// ```
/// use vigil_core::{decoder::decode, Opcode};
///
/// // PUSH2 0xf4ff, DELEGATECALL
/// let instrs = decode(&[0x61, 0xf4, 0xff, 0xf4]);
/// assert_eq!(instrs.len(), 2);
/// assert_eq!(instrs[1].op, Opcode::DELEGATECALL);
/// assert_eq!(instrs[1].pc, 3);
/// ```
pub fn decode(bytes: &[u8]) -> Vec<Instruction> {
    let mut instructions = Vec::with_capacity(bytes.len() / 2);
    let mut pc = 0usize;

    while pc < bytes.len() {
        let (op, imm_len) = Opcode::parse(bytes[pc]);
        let imm_start = pc + 1;
        let imm_end = imm_start.saturating_add(imm_len).min(bytes.len());
        let imm = bytes[imm_start..imm_end].to_vec();

        instructions.push(Instruction {
            pc,
            op,
            imm_len,
            imm,
        });
        pc = imm_start + imm_len;
    }

    instructions
}

/// Decodes raw EVM bytecode into an instruction stream with metadata.
///
/// # Arguments
/// * `bytes` - The raw EVM bytecode bytes to decode.
/// * `source` - The source type indicating how the bytes were obtained.
pub fn decode_bytecode_from_bytes(
    bytes: &[u8],
    source: SourceType,
) -> (Vec<Instruction>, DecodeInfo) {
    let info = DecodeInfo {
        byte_length: bytes.len(),
        keccak_hash: keccak256(bytes),
        source,
    };
    let instructions = decode(bytes);
    tracing::debug!(
        "decoded {} instructions from {} bytes",
        instructions.len(),
        info.byte_length
    );
    (instructions, info)
}

/// Decodes hex text (or a file holding hex text) into an instruction stream with metadata.
///
/// This is a convenience wrapper around [`decode_bytecode_from_bytes`] that handles input
/// normalization from hex strings or file paths.
///
/// # Returns
/// A tuple of (instructions, DecodeInfo, raw bytes), or an error if the text is not hex.
pub fn decode_bytecode(
    input: &str,
    is_file: bool,
) -> Result<(Vec<Instruction>, DecodeInfo, Vec<u8>), DecodeError> {
    let bytes = input_to_bytes(input, is_file)?;
    let source = if is_file {
        SourceType::File
    } else {
        SourceType::HexString
    };
    let (instructions, info) = decode_bytecode_from_bytes(&bytes, source);
    Ok((instructions, info, bytes))
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pc: six-digit hex, opcode left-padded to 8 chars, then optional imm
        if self.imm_len > 0 {
            write!(
                f,
                "{:06x}  {:<8} 0x{}",
                self.pc,
                self.op.to_string(),
                hex::encode(&self.imm)
            )?;
            if self.is_truncated() {
                write!(f, " (truncated, {} of {} bytes)", self.imm.len(), self.imm_len)?;
            }
            Ok(())
        } else {
            write!(f, "{:06x}  {}", self.pc, self.op)
        }
    }
}

impl Instruction {
    /// Returns the number of bytes this instruction occupies in bytecode.
    #[inline]
    pub const fn byte_size(&self) -> usize {
        1 + self.imm_len
    }

    /// True when the code ended before the declared immediate did.
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.imm.len() < self.imm_len
    }

    /// The complete PUSH4 immediate, if this is a PUSH4 whose four bytes are all present.
    pub fn push4_value(&self) -> Option<[u8; 4]> {
        if self.op != Opcode::PUSH(4) {
            return None;
        }
        self.imm.as_slice().try_into().ok()
    }
}
