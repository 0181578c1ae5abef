//! Character encoding detection from response bytes.
//!
//! Servers regularly declare the wrong charset (or none) in their
//! `Content-Type` header, so the header is ignored and the encoding is
//! sniffed from the body itself:
//!
//! 1. A byte order mark wins outright.
//! 2. Bytes that are valid UTF-8 are treated as UTF-8.
//! 3. A `<meta charset>` / `http-equiv` declaration in the first 1024 bytes.
//! 4. windows-1252, the WHATWG fallback for legacy Western pages.

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use once_cell::sync::Lazy;
use regex::Regex;

/// `<meta charset="...">`
static CHARSET_META_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s/>;]+)"#).expect("valid regex")
});

/// `<meta http-equiv="Content-Type" content="text/html; charset=...">`
static CONTENT_TYPE_CHARSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+http-equiv\s*=\s*["']?content-type["']?[^>]+content\s*=\s*["']?[^"'>]*;\s*charset\s*=\s*([^"'\s>]+)"#)
        .expect("valid regex")
});

/// Work out which encoding `bytes` are actually in.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if let Some((encoding, _bom_len)) = Encoding::for_bom(bytes) {
        return encoding;
    }

    if std::str::from_utf8(bytes).is_ok() {
        return UTF_8;
    }

    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(1024)]);
    let declared = CONTENT_TYPE_CHARSET_RE
        .captures(&head)
        .or_else(|| CHARSET_META_RE.captures(&head))
        .and_then(|c| c.get(1))
        .and_then(|m| Encoding::for_label(m.as_str().as_bytes()));

    match declared {
        // The bytes already failed UTF-8 validation, so a UTF-8 declaration is a lie.
        Some(encoding) if encoding != UTF_8 => encoding,
        _ => WINDOWS_1252,
    }
}

/// Decode `bytes` to a `String` using the sniffed encoding.
///
/// Returns the text and the name of the encoding used. Malformed sequences
/// become U+FFFD rather than failing.
pub fn decode_body(bytes: &[u8]) -> (String, &'static str) {
    let encoding = detect_encoding(bytes);
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!(encoding = used.name(), "Body contained malformed sequences");
    }
    (text.into_owned(), used.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_utf8() {
        let html = "<html><body>Café 東京</body></html>".as_bytes();
        assert_eq!(detect_encoding(html), UTF_8);
        let (text, name) = decode_body(html);
        assert!(text.contains("Café 東京"));
        assert_eq!(name, "UTF-8");
    }

    #[test]
    fn test_bom_wins() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "hi".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(detect_encoding(&bytes).name(), "UTF-16LE");
        let (text, _) = decode_body(&bytes);
        assert_eq!(text, "hi");
    }

    #[test]
    fn test_meta_charset_used_for_non_utf8_bytes() {
        let html = b"<html><head><meta charset=\"Shift_JIS\"></head><body>\x93\x8c\x8b\x9e</body></html>";
        assert_eq!(detect_encoding(html).name(), "Shift_JIS");
        let (text, _) = decode_body(html);
        assert!(text.contains("東京"));
    }

    #[test]
    fn test_wrong_utf8_declaration_falls_back() {
        let html = b"<html><head><meta charset=\"utf-8\"></head><body>Caf\xE9</body></html>";
        assert_eq!(detect_encoding(html), WINDOWS_1252);
        let (text, _) = decode_body(html);
        assert!(text.contains("Café"));
    }

    #[test]
    fn test_http_equiv_declaration() {
        let html = b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=ISO-8859-1\"><p>\xE9t\xE9</p>";
        assert_eq!(detect_encoding(html).name(), "windows-1252");
    }
}
