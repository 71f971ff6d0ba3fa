use crate::fixtures::{arm, minimal_proxy, TOKEN_DISPATCHER};
use async_trait::async_trait;
use std::time::Duration;
use tiny_keccak::{Hasher, Keccak};
use vigil_core::{
    decoder::decode,
    detection::{
        detect_proxy, detect_selectors, extract_selectors, has_dispatcher, looks_like_eip1167,
        DispatcherScan, StorageReader, EIP1967_IMPLEMENTATION_SLOT,
    },
    Address, Selector,
};
use vigil_utils::errors::CollaboratorError;

fn selector_of(signature: &str) -> [u8; 4] {
    let mut keccak = Keccak::v256();
    keccak.update(signature.as_bytes());
    let mut hash = [0u8; 32];
    keccak.finalize(&mut hash);
    [hash[0], hash[1], hash[2], hash[3]]
}

#[test]
fn test_well_known_selectors() {
    for (signature, expected) in [
        ("transfer(address,uint256)", 0xa9059cbb),
        ("approve(address,uint256)", 0x095ea7b3),
        ("totalSupply()", 0x18160ddd),
        ("transferFrom(address,address,uint256)", 0x23b872dd),
        ("upgradeTo(address)", 0x3659cfe6),
    ] {
        assert_eq!(selector_of(signature), u32::to_be_bytes(expected), "{signature}");
        assert_eq!(Selector::of_signature(signature), Selector::from_u32(expected));
    }
}

#[test]
fn test_dispatcher_selectors_in_order() {
    let ins = decode(&hex::decode(TOKEN_DISPATCHER).unwrap());
    let found = detect_selectors(&ins, DispatcherScan::default());

    let selectors: Vec<_> = found.iter().map(|f| f.selector).collect();
    assert_eq!(
        selectors,
        vec![
            Selector::from_u32(0x095ea7b3),
            Selector::from_u32(0x18160ddd),
            Selector::from_u32(0x23b872dd),
        ]
    );
    assert_eq!(found[0].pc, 0x13);
    // the 0xffffffff mask is never reported
    assert!(!selectors.contains(&Selector::from_u32(0xffffffff)));
}

#[test]
fn test_window_only_looks_forward() {
    // DUP1 PUSH4 aabbccdd EQ PUSH2 0x0010 JUMPI PUSH2 0x0020 JUMP JUMPDEST STOP STOP STOP
    let code = hex::decode("8063aabbccdd1461001057610020565b000000").unwrap();
    assert!(extract_selectors(&decode(&code), 40).is_empty());

    // the same arm followed by another DUP is accepted
    let code = hex::decode("8063aabbccdd146100105780").unwrap();
    assert_eq!(
        extract_selectors(&decode(&code), 40),
        vec![Selector::from_u32(0xaabbccdd)]
    );
}

#[test]
fn test_no_dispatcher_in_proxy() {
    assert!(!has_dispatcher(&decode(&minimal_proxy())));
}

#[test]
fn test_selector_cap_keeps_first() {
    let mut code = Vec::new();
    for sel in 1..=50u32 {
        code.extend(arm(sel, 0x100));
    }
    let selectors = extract_selectors(&decode(&code), 40);
    assert_eq!(selectors.len(), 40);
    assert_eq!(selectors.first(), Some(&Selector::from_u32(1)));
    assert_eq!(selectors.last(), Some(&Selector::from_u32(40)));
}

#[test]
fn test_push4_inside_immediate_is_data() {
    // PUSH32 whose immediate spells a dispatcher arm
    let mut code = vec![0x7f];
    let mut imm = arm(0x12345678, 0x10);
    imm.resize(32, 0x00);
    code.extend(imm);
    assert!(extract_selectors(&decode(&code), 40).is_empty());
}

struct Slot([u8; 32]);

#[async_trait]
impl StorageReader for Slot {
    async fn storage_at(
        &self,
        _address: &Address,
        slot: &[u8; 32],
    ) -> Result<[u8; 32], CollaboratorError> {
        if slot == &EIP1967_IMPLEMENTATION_SLOT {
            Ok(self.0)
        } else {
            Ok([0u8; 32])
        }
    }
}

#[tokio::test]
async fn test_minimal_proxy_detected() {
    let code = minimal_proxy();
    assert!(looks_like_eip1167(&code));

    let finding = detect_proxy(&code, None, &Slot([0u8; 32]), Duration::from_secs(1)).await;
    assert!(finding.looks_like_eip1167);
    assert_eq!(finding.eip1967_implementation, None);
}

#[tokio::test]
async fn test_eip1967_slot_read() {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(&[0x42; 20]);
    let proxy = Address([0x01; 20]);

    let finding = detect_proxy(&[0x00], Some(&proxy), &Slot(word), Duration::from_secs(1)).await;
    assert_eq!(finding.eip1967_implementation, Some(Address([0x42; 20])));
    assert!(!finding.looks_like_eip1167);
    assert!(finding.is_proxy());
}
