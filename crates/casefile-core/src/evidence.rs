//! The fixed evidence domain and the cosmetic colour palette

use serde::{Deserialize, Serialize};

/// Number of distinct evidence values (`1..=12`)
pub const DOMAIN_SIZE: u8 = 12;

/// A single kind of evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub value: u8,
    pub label: &'static str,
}

/// All evidence kinds, ordered by value
pub const EVIDENCE: [Evidence; DOMAIN_SIZE as usize] = [
    Evidence { value: 1, label: "Fingerprint" },
    Evidence { value: 2, label: "Footprint" },
    Evidence { value: 3, label: "Witness statement" },
    Evidence { value: 4, label: "Security footage" },
    Evidence { value: 5, label: "Phone record" },
    Evidence { value: 6, label: "Receipt" },
    Evidence { value: 7, label: "Fiber sample" },
    Evidence { value: 8, label: "Alibi" },
    Evidence { value: 9, label: "Weapon" },
    Evidence { value: 10, label: "Diary" },
    Evidence { value: 11, label: "Bank transfer" },
    Evidence { value: 12, label: "Confession" },
];

/// Piece colours, assigned cyclically by piece id
pub const PALETTE: [&str; 9] = [
    "#e74c3c", "#3498db", "#2ecc71", "#f39c12", "#9b59b6", "#1abc9c", "#e67e22", "#34495e",
    "#16a085",
];

/// Whether `value` belongs to the evidence domain
pub fn in_domain(value: u8) -> bool {
    (1..=DOMAIN_SIZE).contains(&value)
}

/// Look up the evidence for a value
pub fn evidence(value: u8) -> Option<&'static Evidence> {
    if in_domain(value) {
        Some(&EVIDENCE[(value - 1) as usize])
    } else {
        None
    }
}

/// Display label for a value ("?" outside the domain)
pub fn label(value: u8) -> &'static str {
    evidence(value).map(|e| e.label).unwrap_or("?")
}
