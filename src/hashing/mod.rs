//! BLAKE3-based identifiers.
//!
//! Everything that must stay stable across rebuilds is derived from content here, never
//! from catalog row position.

/// Hex characters kept for an assessment id.
const ASSESSMENT_ID_HEX_LEN: usize = 16;

/// Hex characters kept for a fingerprint digest.
pub const FINGERPRINT_HEX_LEN: usize = 12;

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// With 64 bits the birthday bound sits around four billion items, far beyond any
/// assessment catalog. Used for Qdrant point ids and cache keys.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(bytes)
}

/// Stable assessment id derived from its URL.
#[inline]
pub fn assessment_id(url: &str) -> String {
    let hex = blake3::hash(url.trim().as_bytes()).to_hex();
    hex.as_str()[..ASSESSMENT_ID_HEX_LEN].to_string()
}

/// Qdrant point id for an assessment URL.
#[inline]
pub fn point_id(url: &str) -> u64 {
    hash_to_u64(url.trim().as_bytes())
}

/// Digest of the index configuration (collection alias + embedding identity).
pub fn fingerprint_digest(collection: &str, model: &str, dimensions: usize) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(collection.as_bytes());
    hasher.update(b"|");
    hasher.update(model.as_bytes());
    hasher.update(b"|");
    hasher.update(&(dimensions as u64).to_le_bytes());
    let hex = hasher.finalize().to_hex();
    hex.as_str()[..FINGERPRINT_HEX_LEN].to_string()
}

/// Cache key for a query embedding.
#[inline]
pub fn query_key(query: &str) -> u64 {
    hash_to_u64(query.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_assessment_id_is_stable_and_trimmed() {
        let a = assessment_id("https://example.com/catalog/java-8/");
        let b = assessment_id("  https://example.com/catalog/java-8/ ");

        assert_eq!(a, b);
        assert_eq!(a.len(), ASSESSMENT_ID_HEX_LEN);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_assessment_id_uniqueness() {
        let urls = [
            "https://example.com/a",
            "https://example.com/b",
            "https://example.com/a/",
            "https://example.com/A",
        ];

        let ids: HashSet<_> = urls.iter().map(|u| assessment_id(u)).collect();
        assert_eq!(ids.len(), urls.len());
    }

    #[test]
    fn test_point_id_matches_hash_of_trimmed_url() {
        assert_eq!(
            point_id(" https://example.com/a "),
            hash_to_u64(b"https://example.com/a")
        );
    }

    #[test]
    fn test_fingerprint_digest_changes_with_each_component() {
        let base = fingerprint_digest("assessments", "all-MiniLM-L6-v2", 384);

        assert_eq!(base, fingerprint_digest("assessments", "all-MiniLM-L6-v2", 384));
        assert_ne!(base, fingerprint_digest("other", "all-MiniLM-L6-v2", 384));
        assert_ne!(base, fingerprint_digest("assessments", "bge-small", 384));
        assert_ne!(base, fingerprint_digest("assessments", "all-MiniLM-L6-v2", 768));
        assert_eq!(base.len(), FINGERPRINT_HEX_LEN);
    }

    #[test]
    fn test_query_key_is_case_sensitive() {
        assert_ne!(query_key("Java developer"), query_key("java developer"));
    }
}
