//! Short random identifiers for records with generated keys.

use crate::error::{DeskError, Result};
use rand::Rng;

/// Length of a generated identifier.
pub const ID_LENGTH: usize = 9;

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Give up after this many colliding candidates.
const MAX_ATTEMPTS: usize = 32;

/// Generate a 9-character lowercase base-36 identifier.
#[must_use]
pub fn generate_id() -> String {
    let mut rng = rand::rng();
    (0..ID_LENGTH)
        .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
        .collect()
}

/// Generate an identifier that `is_taken` reports as unused.
///
/// # Errors
///
/// Propagates errors from `is_taken`, and returns `IdExhausted` if every
/// attempt collided.
pub fn generate_unique_id<F>(store: &'static str, mut is_taken: F) -> Result<String>
where
    F: FnMut(&str) -> Result<bool>,
{
    for _ in 0..MAX_ATTEMPTS {
        let candidate = generate_id();
        if !is_taken(&candidate)? {
            return Ok(candidate);
        }
        tracing::debug!(store, candidate = %candidate, "Generated id collided, retrying");
    }
    Err(DeskError::IdExhausted {
        store,
        attempts: MAX_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ids_have_fixed_length_and_alphabet() {
        for _ in 0..100 {
            let id = generate_id();
            assert_eq!(id.len(), ID_LENGTH);
            assert!(id.bytes().all(|b| ALPHABET.contains(&b)), "bad id {id}");
        }
    }

    #[test]
    fn unique_id_skips_taken_candidates() {
        let mut calls = 0;
        let id = generate_unique_id("projects", |_| {
            calls += 1;
            Ok(calls < 3)
        })
        .unwrap();
        assert_eq!(calls, 3);
        assert_eq!(id.len(), ID_LENGTH);
    }

    #[test]
    fn unique_id_gives_up_when_everything_collides() {
        let err = generate_unique_id("tags", |_| Ok(true)).unwrap_err();
        assert!(matches!(err, DeskError::IdExhausted { store: "tags", .. }));
    }

    proptest! {
        #[test]
        fn probe_errors_propagate(msg in "[a-z]{1,12}") {
            let err = generate_unique_id("notes", |_| Err(DeskError::Config(msg.clone()))).unwrap_err();
            prop_assert_eq!(err.to_string(), msg);
        }
    }
}
