use crate::decoder::Instruction;
use crate::{Opcode, Selector};
use indexmap::IndexMap;

/// Upper bound on selectors reported per contract; bounds signature-lookup fan-out.
pub const DEFAULT_MAX_SELECTORS: usize = 40;

/// Number of instructions after a `PUSH4` searched for the `DUP`/`EQ`/`JUMPI` of a selector
/// comparison.
pub const DEFAULT_DISPATCHER_WINDOW: usize = 6;

/// Parameters of a dispatcher scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherScan {
    /// Selectors beyond this many are silently dropped (first encountered win).
    pub max_selectors: usize,
    /// Forward window searched after each `PUSH4`.
    pub window: usize,
}

impl Default for DispatcherScan {
    fn default() -> Self {
        Self {
            max_selectors: DEFAULT_MAX_SELECTORS,
            window: DEFAULT_DISPATCHER_WINDOW,
        }
    }
}

/// Represents a function selector found in the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSelector {
    /// 4-byte function selector (first 4 bytes of keccak256(function_signature))
    pub selector: Selector,
    /// Program counter of the `PUSH4` carrying the selector
    pub pc: usize,
    /// Index in the instruction sequence of that `PUSH4`
    pub instruction_index: usize,
}

/// Detects selectors compared by a Solidity-style function dispatcher.
///
/// Every `PUSH4` is a candidate. It is accepted only when a `DUP*`, an `EQ` and a `JUMPI` all
/// occur within the `scan.window` instructions that follow it, in any order. In a compiled
/// dispatcher the arms run back to back, so the `DUP` of the next arm usually lands there:
///
/// ```text
/// DUP1 PUSH4 <selector> EQ PUSH2 <dest> JUMPI DUP1 PUSH4 ...
/// ```
///
/// Instructions before the `PUSH4` are never consulted. Constants pushed for arithmetic, masks
/// or addresses lack this shape and are rejected.
///
/// Duplicates are collapsed and the result keeps first-encountered order, truncated to
/// `scan.max_selectors`.
pub fn detect_selectors(
    instructions: &[Instruction],
    scan: DispatcherScan,
) -> Vec<FunctionSelector> {
    let mut found: IndexMap<Selector, FunctionSelector> = IndexMap::new();

    for (index, instr) in instructions.iter().enumerate() {
        if found.len() >= scan.max_selectors {
            tracing::debug!(
                "selector cap of {} reached at instruction {}",
                scan.max_selectors,
                index
            );
            break;
        }

        let Some(raw) = instr.push4_value() else {
            continue;
        };
        let selector = Selector(raw);
        if found.contains_key(&selector) {
            continue;
        }

        if is_selector_check(instructions, index, scan.window) {
            tracing::debug!("found selector {} at pc 0x{:x}", selector, instr.pc);
            found.insert(
                selector,
                FunctionSelector {
                    selector,
                    pc: instr.pc,
                    instruction_index: index,
                },
            );
        }
    }

    found.into_values().collect()
}

/// Extracts dispatcher selectors with the default window, capped at `max_selectors`.
///
/// # Examples
/// ```
/// use vigil_core::{decoder::decode, detection::extract_selectors, Selector};
///
/// // PUSH4 a9059cbb DUP2 EQ PUSH2 0x0040 JUMPI
/// let code = hex::decode("63a9059cbb811461004057").unwrap();
/// let selectors = extract_selectors(&decode(&code), 40);
/// assert_eq!(selectors, vec![Selector::from_u32(0xa9059cbb)]);
/// ```
pub fn extract_selectors(instructions: &[Instruction], max_selectors: usize) -> Vec<Selector> {
    let scan = DispatcherScan {
        max_selectors,
        ..Default::default()
    };
    detect_selectors(instructions, scan)
        .into_iter()
        .map(|f| f.selector)
        .collect()
}

/// Returns true iff at least one dispatcher arm was found.
pub fn has_dispatcher(instructions: &[Instruction]) -> bool {
    !detect_selectors(
        instructions,
        DispatcherScan {
            max_selectors: 1,
            ..Default::default()
        },
    )
    .is_empty()
}

/// Checks the `window` instructions after the `PUSH4` at `index` for the DUP/EQ/JUMPI triple.
fn is_selector_check(instructions: &[Instruction], index: usize, window: usize) -> bool {
    let end = index.saturating_add(window).min(instructions.len().saturating_sub(1));
    let following = instructions.get(index + 1..=end).unwrap_or_default();

    let mut saw_dup = false;
    let mut saw_eq = false;
    let mut saw_jumpi = false;

    for instr in following {
        match instr.op {
            Opcode::DUP(_) => saw_dup = true,
            Opcode::EQ => saw_eq = true,
            Opcode::JUMPI => saw_jumpi = true,
            _ => {}
        }
    }

    saw_dup && saw_eq && saw_jumpi
}
