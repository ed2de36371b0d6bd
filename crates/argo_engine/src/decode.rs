use encoding_rs::{Encoding, UTF_8};

use crate::TransportError;

/// Decode a payload into text using: BOM -> Content-Type charset -> UTF-8.
/// A leading BOM is consumed.
pub fn decode_payload(bytes: &[u8], content_type: Option<&str>) -> Result<String, TransportError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(label) = content_type.and_then(extract_charset) {
        if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
            return decode_with(bytes, encoding);
        }
    }

    decode_with(bytes, UTF_8)
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']).to_string())
    })
}

fn decode_with(bytes: &[u8], encoding: &'static Encoding) -> Result<String, TransportError> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(TransportError::Decode {
            encoding: encoding.name().to_string(),
        });
    }
    Ok(text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::{decode_payload, extract_charset};

    #[test]
    fn bom_is_stripped() {
        let bytes = b"\xEF\xBB\xBFa,b\n";
        assert_eq!(decode_payload(bytes, None).unwrap(), "a,b\n");
    }

    #[test]
    fn charset_label_is_honoured() {
        let bytes = b"caf\xE9";
        let text = decode_payload(bytes, Some("text/csv; Charset=\"ISO-8859-1\"")).unwrap();
        assert_eq!(text, "café");
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert!(decode_payload(b"ok\xC3", None).is_err());
    }

    #[test]
    fn charset_missing() {
        assert_eq!(extract_charset("text/csv"), None);
    }
}
