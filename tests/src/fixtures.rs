//! Bytecode fixtures shared by the test modules.

/// Solc-style runtime prefix with a three-arm dispatcher (approve, totalSupply, transferFrom)
/// followed by a masking `PUSH4 0xffffffff AND` that is not a selector check. Each arm's window
/// reaches the `DUP1` of the next arm; the last one reaches the `DUP1` of the revert tail.
pub(crate) const TOKEN_DISPATCHER: &str = concat!(
    "6080604052",           // PUSH1 80 PUSH1 40 MSTORE
    "60043610603057",       // PUSH1 04 CALLDATASIZE LT PUSH1 30 JUMPI
    "60003560e01c",         // PUSH1 00 CALLDATALOAD PUSH1 e0 SHR
    "8063095ea7b314604157", // DUP1 PUSH4 approve EQ PUSH1 41 JUMPI
    "806318160ddd14605b57", // DUP1 PUSH4 totalSupply EQ PUSH1 5b JUMPI
    "806323b872dd14607057", // DUP1 PUSH4 transferFrom EQ PUSH1 70 JUMPI
    "5b5f80fd",             // JUMPDEST PUSH0 DUP1 REVERT
    "63ffffffff1600",       // PUSH4 ffffffff AND STOP
);

/// Implementation address embedded in [`minimal_proxy`].
pub(crate) const CLONE_TARGET: [u8; 20] = [0xbe; 20];

/// EIP-1167 minimal proxy runtime delegating to [`CLONE_TARGET`].
pub(crate) fn minimal_proxy() -> Vec<u8> {
    let mut code = hex::decode("363d3d373d3d3d363d73").unwrap();
    code.extend_from_slice(&CLONE_TARGET);
    code.extend(hex::decode("5af43d82803e903d91602b57fd5bf3").unwrap());
    code
}

/// One self-contained dispatcher arm: `PUSH4 <selector> DUP2 EQ PUSH2 <dest> JUMPI`.
pub(crate) fn arm(selector: u32, dest: u16) -> Vec<u8> {
    let mut code = vec![0x63];
    code.extend_from_slice(&selector.to_be_bytes());
    code.push(0x81);
    code.push(0x14);
    code.push(0x61);
    code.extend_from_slice(&dest.to_be_bytes());
    code.push(0x57);
    code
}

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
