use sha2::{Digest, Sha256};

/// Prefix of the fallback namespace used when a file key has no printable
/// ASCII characters left after normalisation.
const FALLBACK_PREFIX: &str = "ns-";

/// Number of hex digits of the key digest kept in a fallback namespace.
const FALLBACK_DIGEST_LEN: usize = 16;

/// Derive the vector-index namespace for a file key.
///
/// Keeps printable ASCII characters (`' '..='~'`) in their original order and
/// drops everything else. A key with nothing left to keep maps to
/// `ns-<digest>`, where `<digest>` is a prefix of the key's SHA-256, so
/// distinct non-ASCII keys still land in distinct namespaces.
pub fn derive_namespace(file_key: &str) -> String {
    let ascii: String = file_key
        .chars()
        .filter(|ch| (' '..='~').contains(ch))
        .collect();
    if !ascii.is_empty() {
        return ascii;
    }

    let digest = format!("{:x}", Sha256::digest(file_key.as_bytes()));
    format!("{FALLBACK_PREFIX}{}", &digest[..FALLBACK_DIGEST_LEN])
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn plain_ascii_key_is_unchanged() {
        assert_eq!(
            derive_namespace("uploads/1700000000000report.pdf"),
            "uploads/1700000000000report.pdf"
        );
    }

    #[test]
    fn non_ascii_characters_are_dropped() {
        assert_eq!(derive_namespace("uploads/résumé 2024.pdf"), "uploads/rsum 2024.pdf");
        assert_eq!(derive_namespace("報告-final.pdf"), "-final.pdf");
    }

    #[test]
    fn control_characters_are_dropped() {
        assert_eq!(derive_namespace("a\tb\nc\u{7f}d"), "abcd");
    }

    #[test]
    fn spaces_survive() {
        assert_eq!(derive_namespace("my file.pdf"), "my file.pdf");
    }

    #[test]
    fn empty_key_gets_digest_namespace() {
        let ns = derive_namespace("");
        assert!(ns.starts_with(FALLBACK_PREFIX));
        assert_eq!(ns.len(), FALLBACK_PREFIX.len() + FALLBACK_DIGEST_LEN);
    }

    #[test]
    fn all_non_ascii_keys_get_distinct_namespaces() {
        let a = derive_namespace("東京");
        let b = derive_namespace("大阪");
        assert!(a.starts_with(FALLBACK_PREFIX));
        assert!(b.starts_with(FALLBACK_PREFIX));
        assert_ne!(a, b);
    }

    proptest! {
        #[test]
        fn derivation_is_deterministic(key in any::<String>()) {
            prop_assert_eq!(derive_namespace(&key), derive_namespace(&key));
        }

        #[test]
        fn output_is_printable_ascii_and_non_empty(key in any::<String>()) {
            let ns = derive_namespace(&key);
            prop_assert!(!ns.is_empty());
            prop_assert!(ns.chars().all(|c| (' '..='~').contains(&c)));
        }
    }
}
