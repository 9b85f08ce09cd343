//! Reserved bag-info element names.

/// The oxum field: `<octets>.<file count>` of the payload.
pub const PAYLOAD_OXUM: &str = "Payload-Oxum";

/// Element names declared by the BagIt format, in their canonical casing.
pub const RESERVED_ELEMENTS: [&str; 14] = [
    "Source-Organization",
    "Organization-Address",
    "Contact-Name",
    "Contact-Phone",
    "Contact-Email",
    "External-Description",
    "Bagging-Date",
    "External-Identifier",
    PAYLOAD_OXUM,
    "Bag-Size",
    "Bag-Group-Identifier",
    "Bag-Count",
    "Internal-Sender-Identifier",
    "Internal-Sender-Description",
];

/// Fields that may appear at most once, compared case-insensitively.
const MUST_NOT_REPEAT: [&str; 1] = [PAYLOAD_OXUM];

/// Map `key` to the canonical casing of a reserved element.
///
/// Non-reserved keys come back trimmed but otherwise unchanged.
pub fn canonicalize(key: &str) -> String {
    let key = key.trim();
    RESERVED_ELEMENTS
        .iter()
        .find(|name| name.eq_ignore_ascii_case(key))
        .map(|name| name.to_string())
        .unwrap_or_else(|| key.to_string())
}

pub fn is_non_repeatable(key: &str) -> bool {
    let key = key.trim();
    MUST_NOT_REPEAT.iter().any(|name| name.eq_ignore_ascii_case(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn reserved_keys_take_declared_case() {
        assert_eq!(canonicalize("source-organization"), "Source-Organization");
        assert_eq!(canonicalize("SOURCE-ORGANIZATION"), "Source-Organization");
        assert_eq!(canonicalize(" bag-size "), "Bag-Size");
    }

    #[test]
    fn other_keys_keep_their_case() {
        assert_eq!(canonicalize("DC-Author"), "DC-Author");
        assert_eq!(canonicalize("dc-author"), "dc-author");
    }

    #[test]
    fn only_oxum_is_non_repeatable() {
        assert!(is_non_repeatable("payload-oxum"));
        assert!(is_non_repeatable("Payload-Oxum"));
        assert!(!is_non_repeatable("Bag-Size"));
    }

    proptest! {
        #[test]
        fn canonicalize_is_idempotent(key in "[A-Za-z-]{1,30}") {
            let once = canonicalize(&key);
            prop_assert_eq!(canonicalize(&once), once.clone());
        }

        #[test]
        fn reserved_match_ignores_case(idx in 0usize..14, upper in any::<bool>()) {
            let name = RESERVED_ELEMENTS[idx];
            let query = if upper { name.to_uppercase() } else { name.to_lowercase() };
            prop_assert_eq!(canonicalize(&query), name);
        }
    }
}
