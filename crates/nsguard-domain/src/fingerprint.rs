use sha2::{Digest, Sha256};

/// Compute a stable SHA-256 fingerprint for an edge issue.
///
/// Identity fields:
/// - code
/// - from namespace
/// - to namespace
/// - source path (as reported by the edge source)
pub fn fingerprint_for_edge(code: &str, from: &str, to: &str, path: &str) -> String {
    let canonical = [code, from, to, path].join("|");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_depends_on_every_field() {
        let base = fingerprint_for_edge("illegal_dependency", "A", "B", "a.cs");
        assert_ne!(base, fingerprint_for_edge("visibility_violation", "A", "B", "a.cs"));
        assert_ne!(base, fingerprint_for_edge("illegal_dependency", "A", "C", "a.cs"));
        assert_ne!(base, fingerprint_for_edge("illegal_dependency", "A", "B", "b.cs"));
    }
}
