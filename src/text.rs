// File: ./src/text.rs
//! String conveniences: base64 in both directions and length measures.
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use unicode_width::UnicodeWidthStr;

/// Base64 of the UTF-8 bytes of `text` (standard alphabet, padded).
pub fn base64_encode(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Inverse of [`base64_encode`]. `None` for malformed input or a payload that
/// is not UTF-8.
pub fn base64_decode(encoded: &str) -> Option<String> {
    let bytes = STANDARD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

pub fn bytes_to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes base64 while skipping anything outside the alphabet, such as the
/// line breaks mail and plist encoders insert.
pub fn bytes_from_base64_lenient(encoded: &str) -> Option<Vec<u8>> {
    let cleaned: String = encoded
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
        .collect();
    STANDARD.decode(cleaned).ok()
}

/// Number of Unicode scalar values.
pub fn char_length(text: &str) -> usize {
    text.chars().count()
}

/// Columns the text occupies in a terminal (wide CJK glyphs count twice).
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_string() {
        assert_eq!(base64_encode("Test"), "VGVzdA==");
        assert_eq!(base64_decode("VGVzdA==").as_deref(), Some("Test"));
        assert_eq!(base64_decode(&base64_encode("ação ✓")).as_deref(), Some("ação ✓"));
    }

    #[test]
    fn test_base64_decode_rejects_garbage() {
        assert_eq!(base64_decode("not base64!"), None);
        // Valid base64, invalid UTF-8
        assert_eq!(base64_decode(&bytes_to_base64(&[0xFF, 0xFE, 0x00])), None);
    }

    #[test]
    fn test_lenient_bytes() {
        let bytes: Vec<u8> = (0u8..=200).collect();
        let encoded = bytes_to_base64(&bytes);
        let wrapped: String = encoded
            .as_bytes()
            .chunks(64)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\r\n");

        assert_eq!(bytes_from_base64_lenient(&wrapped), Some(bytes));
        assert!(STANDARD.decode(&wrapped).is_err());
    }

    #[test]
    fn test_lengths() {
        assert_eq!(char_length("Test"), 4);
        assert_eq!(char_length("ação"), 4);
        assert_eq!(display_width("日本"), 4);
        assert_eq!(display_width("abc"), 3);
    }
}
