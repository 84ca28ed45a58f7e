use sha2::{Digest, Sha256};

/// Hex digest of `parts`, prefixed for readability.
///
/// Parts are NUL-separated so `["ab", "c"]` and `["a", "bc"]` differ.
pub(crate) fn digest_id(prefix: &str, parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update(b"\0");
        }
        hasher.update(part.as_bytes());
    }
    let hash = hasher.finalize();
    let hex: String = hash[..12].iter().map(|b| format!("{b:02x}")).collect();
    format!("{prefix}_{hex}")
}
