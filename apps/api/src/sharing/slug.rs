use rand::Rng;

pub const SLUG_LEN: usize = 12;

// URL-safe alphabet, 64 symbols: 12 characters give 72 bits of entropy,
// enough to make slug enumeration impractical.
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Generates a random public slug. Uniqueness is enforced by the database's
/// unique constraint, not here.
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    (0..SLUG_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_has_fixed_length() {
        assert_eq!(generate().len(), SLUG_LEN);
    }

    #[test]
    fn slug_uses_url_safe_characters() {
        for _ in 0..100 {
            let slug = generate();
            assert!(slug
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
        }
    }

    #[test]
    fn consecutive_slugs_differ() {
        // 64^12 outcomes; a collision here means the RNG is broken.
        assert_ne!(generate(), generate());
    }
}
