use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

const INDENT: &[u8] = b"    ";

/// Re-serialize a JSON document with 4-space indentation.
///
/// Object keys keep their parsed order, numbers keep their digits and
/// non-ASCII text is written as-is.
/// Returns `None` if `raw` is not valid JSON.
pub(super) fn pretty(raw: &str) -> Option<String> {
    let value: Value = serde_json::from_str(raw).ok()?;

    let mut out = Vec::with_capacity(raw.len() * 2);
    let formatter = PrettyFormatter::with_indent(INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer).ok()?;

    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_order_preserved() {
        let out = pretty(r#"{"b":1,"a":2}"#).unwrap();
        assert_eq!(out, "{\n    \"b\": 1,\n    \"a\": 2\n}");
    }

    #[test]
    fn test_nested_indentation() {
        let out = pretty(r#"{"a":[1,{"c":null}]}"#).unwrap();
        assert_eq!(
            out,
            "{\n    \"a\": [\n        1,\n        {\n            \"c\": null\n        }\n    ]\n}"
        );
    }

    #[test]
    fn test_non_ascii_unescaped() {
        let out = pretty(r#"{"name":"大象","emoji":"é"}"#).unwrap();
        assert!(out.contains("\"大象\""));
        assert!(out.contains("\"é\""));
    }

    #[test]
    fn test_numbers_written_back_exactly() {
        let out = pretty(r#"{"id":123456789012345678901234567890,"big":-98765432109876543210}"#)
            .unwrap();
        assert_eq!(
            out,
            "{\n    \"id\": 123456789012345678901234567890,\n    \"big\": -98765432109876543210\n}"
        );
        assert_eq!(
            pretty("[0.1000000000000000055511151231257827]").unwrap(),
            "[\n    0.1000000000000000055511151231257827\n]"
        );
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(pretty("{}").unwrap(), "{}");
        assert_eq!(pretty("[]").unwrap(), "[]");
    }

    #[test]
    fn test_invalid() {
        assert!(pretty("{broken").is_none());
        assert!(pretty("[1,2").is_none());
        assert!(pretty("{} trailing").is_none());
    }
}
