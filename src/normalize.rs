//! Abbreviation key normalization.
//!
//! Every abbreviation reaching the registry passes through [`normalize`]
//! first, so two inputs that differ only in case or surrounding whitespace
//! land on the same [`CanonicalKey`].
//!
//! ```rust
//! use abkverz::normalize;
//!
//! assert_eq!(normalize("  ksc ").as_str(), "KSC");
//! ```

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Trimmed, upper-cased abbreviation used for all storage and lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `raw` is already in canonical form.
    pub fn is_canonical(raw: &str) -> bool {
        normalize(raw).as_str() == raw
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CanonicalKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Trims leading/trailing whitespace, then upper-cases.
///
/// Total and idempotent. Never applied to meanings.
pub fn normalize(raw: &str) -> CanonicalKey {
    CanonicalKey(raw.trim().to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn trims_and_uppercases() {
        assert_eq!(normalize("ksc").as_str(), "KSC");
        assert_eq!(normalize("\t Ooo \n").as_str(), "OOO");
        assert_eq!(normalize("").as_str(), "");
    }

    #[test]
    fn inner_whitespace_is_kept() {
        assert_eq!(normalize(" a b ").as_str(), "A B");
    }

    #[test]
    fn umlauts_are_uppercased() {
        assert_eq!(normalize("über").as_str(), "ÜBER");
    }

    #[test]
    fn canonical_check() {
        assert!(CanonicalKey::is_canonical("KSC"));
        assert!(!CanonicalKey::is_canonical("ksc"));
        assert!(!CanonicalKey::is_canonical(" KSC"));
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(raw in "\\PC*") {
            let once = normalize(&raw);
            let twice = normalize(once.as_str());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn case_and_padding_collide(raw in "[a-zA-Z]{1,8}", pad in " {0,3}") {
            let padded = format!("{pad}{}{pad}", raw.to_lowercase());
            prop_assert_eq!(normalize(&padded), normalize(&raw.to_uppercase()));
        }
    }
}
