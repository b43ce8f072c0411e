//! Additive payload checksum used by the story load response.

/// Computes the story checksum over a cipher-encoded payload.
///
/// Each character is lowercased and offset so that `'a'` contributes 1;
/// the sum is then scaled and shifted. The client recomputes this over
/// `extra3 + CS` and rejects the response on mismatch.
#[must_use]
pub fn story_checksum(payload: &str) -> i64 {
    let sum: i64 = payload
        .chars()
        .map(|c| c.to_ascii_lowercase() as i64 - 96)
        .sum();
    sum * 3 + 45
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload() {
        assert_eq!(story_checksum(""), 45);
    }

    #[test]
    fn single_letter() {
        // 'a' is 1, scaled to 3, shifted to 48.
        assert_eq!(story_checksum("a"), 48);
    }

    #[test]
    fn uppercase_is_folded() {
        assert_eq!(story_checksum("A"), story_checksum("a"));
    }

    #[test]
    fn checksum_is_deterministic() {
        let payload = "woqywcyrwycywyyrwwwcqapycym";
        assert_eq!(story_checksum(payload), story_checksum(payload));
    }

    #[test]
    fn known_vector() {
        // "abc" -> (1 + 2 + 3) * 3 + 45
        assert_eq!(story_checksum("abc"), 63);
    }
}
