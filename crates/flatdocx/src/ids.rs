//! Short identifiers for numbering definitions, equations and bookmarks.

use ecow::{EcoString, eco_format};

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Allocates short tokens that are unique within one serialization.
///
/// The generator is owned by the serialization state, so every call to the
/// serializer starts counting from scratch and the output is deterministic.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    /// Creates a generator that starts at the first token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh token of the form `{prefix}-{n}`, `n` in base 36.
    pub fn next(&mut self, prefix: &str) -> EcoString {
        self.next += 1;
        eco_format!("{prefix}-{}", base36(self.next))
    }
}

fn base36(mut n: u64) -> EcoString {
    if n == 0 {
        return "0".into();
    }

    let mut digits = Vec::new();
    while n > 0 {
        digits.push(ALPHABET[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();

    digits.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique_and_sequential() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next("num"), "num-1");
        assert_eq!(ids.next("eq"), "eq-2");

        for _ in 0..33 {
            ids.next("x");
        }
        assert_eq!(ids.next("x"), "x-10");
    }

    #[test]
    fn generators_do_not_share_state() {
        let mut a = IdGenerator::new();
        let mut b = IdGenerator::new();
        a.next("n");
        assert_eq!(b.next("n"), "n-1");
    }
}
