//! Canonicalises a search query into a 16-hex-character dedup key (C8).
//!
//! Order- and punctuation-insensitive, case-insensitive, deterministic:
//! lowercase, strip anything that isn't alphanumeric or whitespace, split on
//! whitespace, sort tokens, rejoin with single spaces, SHA-256, take the
//! first 16 hex characters.

use sha2::{Digest, Sha256};

pub fn fingerprint(query: &str) -> String {
    let lowered = query.to_lowercase();
    let cleaned: String = lowered
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    tokens.sort_unstable();
    let canonical = tokens.join(" ");

    let digest = Sha256::digest(canonical.as_bytes());
    let hex = format!("{:x}", digest);
    hex[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_tokens_different_order_match() {
        assert_eq!(fingerprint("senior rust engineer"), fingerprint("engineer rust senior"));
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(fingerprint("Senior Rust Engineer"), fingerprint("senior rust engineer"));
    }

    #[test]
    fn punctuation_insensitive() {
        assert_eq!(fingerprint("senior, rust! engineer?"), fingerprint("senior rust engineer"));
    }

    #[test]
    fn deterministic_length_16() {
        let fp = fingerprint("anything at all");
        assert_eq!(fp.len(), 16);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_queries_produce_different_fingerprints() {
        assert_ne!(fingerprint("rust engineer"), fingerprint("python engineer"));
    }

    #[test]
    fn whitespace_variations_collapse() {
        assert_eq!(fingerprint("rust   engineer"), fingerprint("rust engineer"));
    }
}
