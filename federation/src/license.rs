//! Process-wide SPDX license gating table (SPEC_FULL.md §4.I). Unknown
//! identifiers default to blocked with reason "unrecognized".

use std::collections::HashMap;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseCategory {
    Permissive,
    WeakCopyleft,
    StrongCopyleft,
}

#[derive(Debug, Clone)]
pub struct LicenseEntry {
    pub allowed: bool,
    pub category: LicenseCategory,
    pub reason: &'static str,
}

static LICENSE_TABLE: LazyLock<HashMap<&'static str, LicenseEntry>> = LazyLock::new(|| {
    let mut table = HashMap::new();
    table.insert(
        "MIT",
        LicenseEntry {
            allowed: true,
            category: LicenseCategory::Permissive,
            reason: "permissive",
        },
    );
    table.insert(
        "Apache-2.0",
        LicenseEntry {
            allowed: true,
            category: LicenseCategory::Permissive,
            reason: "permissive",
        },
    );
    table.insert(
        "BSD-2-Clause",
        LicenseEntry {
            allowed: true,
            category: LicenseCategory::Permissive,
            reason: "permissive",
        },
    );
    table.insert(
        "BSD-3-Clause",
        LicenseEntry {
            allowed: true,
            category: LicenseCategory::Permissive,
            reason: "permissive",
        },
    );
    table.insert(
        "ISC",
        LicenseEntry {
            allowed: true,
            category: LicenseCategory::Permissive,
            reason: "permissive",
        },
    );
    table.insert(
        "MPL-2.0",
        LicenseEntry {
            allowed: true,
            category: LicenseCategory::WeakCopyleft,
            reason: "weak copyleft",
        },
    );
    table.insert(
        "LGPL-2.1",
        LicenseEntry {
            allowed: true,
            category: LicenseCategory::WeakCopyleft,
            reason: "weak copyleft",
        },
    );
    table.insert(
        "GPL-3.0",
        LicenseEntry {
            allowed: false,
            category: LicenseCategory::StrongCopyleft,
            reason: "strong copyleft requires override",
        },
    );
    table.insert(
        "AGPL-3.0",
        LicenseEntry {
            allowed: false,
            category: LicenseCategory::StrongCopyleft,
            reason: "strong copyleft requires override",
        },
    );
    table
});

/// Whether `spdx_id` clears the share gate. `allow_copyleft_override` lets
/// strong-copyleft entries through anyway (weak copyleft and permissive
/// licenses never need the override).
pub fn is_allowed(spdx_id: &str, allow_copyleft_override: bool) -> (bool, &'static str) {
    match LICENSE_TABLE.get(spdx_id) {
        Some(entry) if entry.allowed => (true, entry.reason),
        Some(entry) if allow_copyleft_override && entry.category == LicenseCategory::StrongCopyleft => {
            (true, "copyleft override")
        }
        Some(entry) => (false, entry.reason),
        None => (false, "unrecognized"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permissive_license_is_allowed() {
        let (allowed, _) = is_allowed("MIT", false);
        assert!(allowed);
    }

    #[test]
    fn strong_copyleft_is_blocked_without_override() {
        let (allowed, reason) = is_allowed("GPL-3.0", false);
        assert!(!allowed);
        assert_eq!(reason, "strong copyleft requires override");
    }

    #[test]
    fn strong_copyleft_is_allowed_with_override() {
        let (allowed, _) = is_allowed("GPL-3.0", true);
        assert!(allowed);
    }

    #[test]
    fn unknown_license_is_blocked_as_unrecognized() {
        let (allowed, reason) = is_allowed("Some-Made-Up-License", true);
        assert!(!allowed);
        assert_eq!(reason, "unrecognized");
    }
}
