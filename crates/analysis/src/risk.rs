//! Severity classification from resolved signatures and the opcode profile.
//!
//! The policy is a fixed, ordered list of checks. Check order determines the order of the
//! reported risks, so the output is reproducible byte for byte.

use crate::profile::{OpcodeProfile, TrackedOpcode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// De-duplicated human-readable function signatures, e.g. `transfer(address,uint256)`.
pub type SignatureSet = BTreeSet<String>;

/// Verdict severity, ordered from harmless to dangerous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// No sensitive function or opcode found.
    None,
    /// Exactly one finding.
    Low,
    /// Two or more findings, none of them an upgrade or arbitrary-execution marker.
    Medium,
    /// A delegatecall, upgrade, admin-change or arbitrary-execution finding.
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

/// Severity plus the findings that produced it, in check order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskVerdict {
    /// Overall verdict derived from `risks`.
    pub severity: Severity,
    /// Findings, signature checks first, then opcode checks.
    pub risks: Vec<String>,
}

/// A sensitive function family: names matched exactly against a signature's function name.
struct SignatureRule {
    names: &'static [&'static str],
    finding: &'static str,
}

const SIGNATURE_RULES: &[SignatureRule] = &[
    SignatureRule {
        names: &["approve"],
        finding: "approve(): holders can grant token spending rights to third parties",
    },
    SignatureRule {
        names: &["increaseAllowance", "decreaseAllowance"],
        finding: "increaseAllowance/decreaseAllowance: spending allowances can be adjusted",
    },
    SignatureRule {
        names: &["permit"],
        finding: "permit(): approvals can be granted with an off-chain signature",
    },
    SignatureRule {
        names: &["setApprovalForAll"],
        finding: "setApprovalForAll(): an operator may move every token of an owner",
    },
    SignatureRule {
        names: &["transferFrom"],
        finding: "transferFrom(): tokens can be moved on behalf of holders",
    },
    SignatureRule {
        names: &["safeTransferFrom"],
        finding: "safeTransferFrom(): NFTs can be moved on behalf of holders",
    },
    SignatureRule {
        names: &["upgradeTo"],
        finding: "upgradeTo(): contract logic can be replaced",
    },
    SignatureRule {
        names: &["upgradeToAndCall"],
        finding: "upgradeToAndCall(): contract logic can be replaced and initialised in one call",
    },
    SignatureRule {
        names: &["changeAdmin"],
        finding: "changeAdmin(): proxy admin can be reassigned",
    },
    SignatureRule {
        names: &["transferOwnership"],
        finding: "transferOwnership(): ownership can be handed to another account",
    },
    SignatureRule {
        names: &["initialize"],
        finding: "initialize(): exposed initializer, check it cannot be called twice",
    },
    SignatureRule {
        names: &["multicall"],
        finding: "multicall(): batches arbitrary calls into this contract",
    },
    SignatureRule {
        names: &["execute", "execTransaction"],
        finding: "execute/execTransaction: arbitrary calls can be made from this contract",
    },
];

/// Opcode checks in reporting order.
const OPCODE_RULES: &[(TrackedOpcode, &str)] = &[
    (
        TrackedOpcode::DelegateCall,
        "runs foreign code against this contract's storage",
    ),
    (
        TrackedOpcode::CallCode,
        "legacy call that borrows foreign code",
    ),
    (TrackedOpcode::SelfDestruct, "contract can be destroyed"),
    (
        TrackedOpcode::Create2,
        "deploys contracts at precomputable addresses",
    ),
];

/// Findings mentioning any of these escalate straight to `high`.
const HIGH_MARKERS: &[&str] = &["DELEGATECALL", "upgradeTo", "changeAdmin", "execute"];

/// Function name of a signature: everything before the first `(`.
fn function_name(signature: &str) -> &str {
    signature
        .split_once('(')
        .map_or(signature, |(name, _)| name)
        .trim()
}

/// Classifies a contract from its resolved signatures and opcode counts. Pure and deterministic.
pub fn classify(signatures: &SignatureSet, profile: &OpcodeProfile) -> RiskVerdict {
    let mut risks = Vec::new();

    for rule in SIGNATURE_RULES {
        let matched = signatures
            .iter()
            .map(|sig| function_name(sig))
            .any(|name| rule.names.contains(&name));
        if matched {
            risks.push(rule.finding.to_string());
        }
    }

    for (op, description) in OPCODE_RULES {
        let count = profile.get(*op);
        if count > 0 {
            risks.push(format!("{op} x{count}: {description}"));
        }
    }

    let severity = if risks
        .iter()
        .any(|risk| HIGH_MARKERS.iter().any(|marker| risk.contains(marker)))
    {
        Severity::High
    } else {
        match risks.len() {
            0 => Severity::None,
            1 => Severity::Low,
            _ => Severity::Medium,
        }
    };

    RiskVerdict { severity, risks }
}
