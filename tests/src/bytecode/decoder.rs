use crate::fixtures::{init_tracing, TOKEN_DISPATCHER};
use std::io::Write;
use vigil_core::{
    decoder::{decode, decode_bytecode, decode_bytecode_from_bytes, SourceType},
    keccak256, Opcode,
};
use vigil_utils::errors::DecodeError;

// Fixture: PUSH1 0x01, PUSH1 0x02, ADD, PUSH1 0x00, JUMPI
const BYTECODE: &str = "0x6001600201600057";

#[test]
fn test_hex_roundtrip() {
    init_tracing();
    let (ins, info, bytes) = decode_bytecode(BYTECODE, false).unwrap();
    for instr in &ins {
        tracing::debug!("{}", instr);
    }
    assert_eq!(ins.len(), 5);
    assert_eq!(info.byte_length, bytes.len());
    assert_eq!(info.source, SourceType::HexString);
    assert_eq!(info.keccak_hash, keccak256(&bytes));
}

#[test]
fn test_decode_from_bytes() {
    let bytes = hex::decode(BYTECODE.trim_start_matches("0x")).unwrap();
    let (ins, info) = decode_bytecode_from_bytes(&bytes, SourceType::HexString);
    assert_eq!(ins.len(), 5);
    assert_eq!(info.byte_length, bytes.len());

    // Source type only changes the metadata
    let (ins2, info2) = decode_bytecode_from_bytes(&bytes, SourceType::File);
    assert_eq!(ins2, ins);
    assert_eq!(info2.keccak_hash, info.keccak_hash);
    assert_eq!(info2.source, SourceType::File);
}

#[test]
fn test_file_input() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    writeln!(tmp, "{BYTECODE}").unwrap();

    let path = tmp.path().to_str().unwrap();
    let (ins, info, _) = decode_bytecode(path, true).unwrap();
    assert_eq!(ins.len(), 5);
    assert_eq!(info.source, SourceType::File);
}

#[test]
fn test_invalid_hex() {
    let result = decode_bytecode("0x60zz", false);
    assert!(matches!(result, Err(DecodeError::HexDecode(_))));
}

#[test]
fn test_dispatcher_fixture_listing() {
    let bytes = hex::decode(TOKEN_DISPATCHER).unwrap();
    let ins = decode(&bytes);
    assert_eq!(ins.len(), 34);
    assert_eq!(ins[13].op, Opcode::PUSH(4));
    assert_eq!(ins[13].imm, vec![0x09, 0x5e, 0xa7, 0xb3]);
    assert_eq!(ins[13].to_string(), "000013  PUSH4    0x095ea7b3");
    assert_eq!(ins.last().map(|i| &i.op), Some(&Opcode::STOP));
}

#[test]
fn test_truncated_push_ends_walk() {
    // PUSH3 with a single byte left
    let ins = decode(&[0x00, 0x62, 0xaa]);
    assert_eq!(ins.len(), 2);
    assert_eq!(ins[1].imm_len, 3);
    assert!(ins[1].is_truncated());
    assert!(ins[1].to_string().ends_with("(truncated, 1 of 3 bytes)"));
}
