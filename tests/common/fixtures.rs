//! Reusable test payload generators.

/// Deterministic non-repeating-ish byte pattern. The 251 modulus keeps block
/// boundaries from lining up with pattern repeats.
pub fn patterned_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Bytes guaranteed to differ from `patterned_bytes` at every position.
pub fn inverted_bytes(len: usize) -> Vec<u8> {
    patterned_bytes(len).into_iter().map(|b| !b).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_differs_everywhere() {
        let a = patterned_bytes(300);
        let b = inverted_bytes(300);
        assert!(a.iter().zip(&b).all(|(x, y)| x != y));
    }
}
