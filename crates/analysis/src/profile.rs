/// Module for counting risk-relevant opcodes over a decoded instruction stream.
///
/// Counting works on `Instruction` records from the walker, so bytes inside PUSH immediates are
/// never counted. Each instruction contributes to at most one counter.
use serde::{Deserialize, Serialize};
use std::fmt;
use vigil_core::{decoder::Instruction, Opcode};

/// The closed set of opcodes the profiler tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrackedOpcode {
    /// `CALL` (0xf1)
    Call,
    /// `CALLCODE` (0xf2)
    CallCode,
    /// `DELEGATECALL` (0xf4)
    DelegateCall,
    /// `STATICCALL` (0xfa)
    StaticCall,
    /// `SELFDESTRUCT` (0xff)
    SelfDestruct,
    /// `CREATE2` (0xf5)
    Create2,
}

impl TrackedOpcode {
    /// Maps an opcode onto its tracked counterpart.
    pub const fn from_opcode(op: &Opcode) -> Option<Self> {
        match op {
            Opcode::CALL => Some(Self::Call),
            Opcode::CALLCODE => Some(Self::CallCode),
            Opcode::DELEGATECALL => Some(Self::DelegateCall),
            Opcode::STATICCALL => Some(Self::StaticCall),
            Opcode::SELFDESTRUCT => Some(Self::SelfDestruct),
            Opcode::CREATE2 => Some(Self::Create2),
            _ => None,
        }
    }

    /// The underlying opcode.
    pub const fn opcode(&self) -> Opcode {
        match self {
            Self::Call => Opcode::CALL,
            Self::CallCode => Opcode::CALLCODE,
            Self::DelegateCall => Opcode::DELEGATECALL,
            Self::StaticCall => Opcode::STATICCALL,
            Self::SelfDestruct => Opcode::SELFDESTRUCT,
            Self::Create2 => Opcode::CREATE2,
        }
    }
}

impl fmt::Display for TrackedOpcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode())
    }
}

/// Occurrence counts of the tracked opcodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpcodeProfile {
    /// external calls
    #[serde(rename = "CALL")]
    pub call: usize,
    /// legacy calls running foreign code in this contract's context
    #[serde(rename = "CALLCODE")]
    pub callcode: usize,
    /// calls executing foreign code against this contract's storage
    #[serde(rename = "DELEGATECALL")]
    pub delegatecall: usize,
    /// read-only external calls
    #[serde(rename = "STATICCALL")]
    pub staticcall: usize,
    /// self-destruct sites
    #[serde(rename = "SELFDESTRUCT")]
    pub selfdestruct: usize,
    /// deterministic-address deployments
    #[serde(rename = "CREATE2")]
    pub create2: usize,
}

impl OpcodeProfile {
    /// Count for one tracked opcode.
    pub const fn get(&self, op: TrackedOpcode) -> usize {
        match op {
            TrackedOpcode::Call => self.call,
            TrackedOpcode::CallCode => self.callcode,
            TrackedOpcode::DelegateCall => self.delegatecall,
            TrackedOpcode::StaticCall => self.staticcall,
            TrackedOpcode::SelfDestruct => self.selfdestruct,
            TrackedOpcode::Create2 => self.create2,
        }
    }

    fn slot_mut(&mut self, op: TrackedOpcode) -> &mut usize {
        match op {
            TrackedOpcode::Call => &mut self.call,
            TrackedOpcode::CallCode => &mut self.callcode,
            TrackedOpcode::DelegateCall => &mut self.delegatecall,
            TrackedOpcode::StaticCall => &mut self.staticcall,
            TrackedOpcode::SelfDestruct => &mut self.selfdestruct,
            TrackedOpcode::Create2 => &mut self.create2,
        }
    }

    /// Sum of all counters.
    pub const fn total(&self) -> usize {
        self.call
            + self.callcode
            + self.delegatecall
            + self.staticcall
            + self.selfdestruct
            + self.create2
    }

    /// Sets a single counter, for building profiles by hand.
    pub fn with(mut self, op: TrackedOpcode, count: usize) -> Self {
        *self.slot_mut(op) = count;
        self
    }
}

/// Counts tracked opcodes across `instructions`. Linear in the instruction count.
pub fn profile(instructions: &[Instruction]) -> OpcodeProfile {
    let mut counts = OpcodeProfile::default();
    for tracked in instructions
        .iter()
        .filter_map(|instr| TrackedOpcode::from_opcode(&instr.op))
    {
        *counts.slot_mut(tracked) += 1;
    }
    counts
}
