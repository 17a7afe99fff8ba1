//! Text decoding utilities

use encoding_rs::Encoding;

use super::types::error::{DslError, Result};

/// Resolve an encoding label such as `utf-8`, `cp1251` or `gbk`.
pub fn parse_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| DslError::UnknownEncoding(label.to_string()))
}

/// Bring source bytes into UTF-8.
///
/// A byte order mark wins over everything; then an explicit encoding. Without
/// either, the bytes are returned unchanged so that invalid
/// UTF-8 can later be reported per entry instead of failing the whole file.
pub fn decode_source(bytes: Vec<u8>, encoding: Option<&'static Encoding>) -> Vec<u8> {
    if let Some((bom_encoding, bom_len)) = Encoding::for_bom(&bytes) {
        if bom_encoding == encoding_rs::UTF_8 {
            return bytes[bom_len..].to_vec();
        }
        let (text, _, _) = bom_encoding.decode(&bytes);
        return text.into_owned().into_bytes();
    }
    match encoding {
        Some(enc) if enc != encoding_rs::UTF_8 => {
            let (text, _, _) = enc.decode(&bytes);
            text.into_owned().into_bytes()
        }
        _ => bytes,
    }
}
