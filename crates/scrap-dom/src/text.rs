//! UTF-16 offset helpers
//!
//! Rust strings are indexed by byte, DOM offsets by UTF-16 code unit.

/// Length of `s` in UTF-16 code units
#[inline]
pub fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Convert a UTF-16 offset into a byte index of `s`.
///
/// Returns `None` when the offset is past the end or falls between the two
/// halves of a surrogate pair.
pub fn utf16_to_byte(s: &str, offset: usize) -> Option<usize> {
    let mut units = 0;
    for (byte, ch) in s.char_indices() {
        if units == offset {
            return Some(byte);
        }
        units += ch.len_utf16();
        if units > offset {
            return None;
        }
    }
    (units == offset).then_some(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii() {
        assert_eq!(utf16_len("quick"), 5);
        assert_eq!(utf16_to_byte("quick", 0), Some(0));
        assert_eq!(utf16_to_byte("quick", 5), Some(5));
        assert_eq!(utf16_to_byte("quick", 6), None);
    }

    #[test]
    fn test_multibyte_bmp() {
        // Hangul syllables are 3 bytes in UTF-8, 1 unit in UTF-16
        let s = "인공지능";
        assert_eq!(utf16_len(s), 4);
        assert_eq!(utf16_to_byte(s, 2), Some(6));
    }

    #[test]
    fn test_surrogate_pair() {
        let s = "a🚀b";
        assert_eq!(utf16_len(s), 4);
        assert_eq!(utf16_to_byte(s, 1), Some(1));
        assert_eq!(utf16_to_byte(s, 2), None);
        assert_eq!(utf16_to_byte(s, 3), Some(5));
    }
}
