//! Extraction of the classification object from a model answer

use rubro_domain::SENTINEL_UNKNOWN_RUBRO;
use serde_json::{Map, Value};

/// Justification used when the object has none
pub const UNPROCESSED_JUSTIFICATION: &str = "Respuesta no procesada";

/// Parse the slice between the first `{` and the last `}` as a JSON object
///
/// Returns `None` when either brace is missing, they are out of order, or
/// the slice is not a JSON object. Several objects in one answer, or prose
/// containing braces around the object, are not disentangled.
pub fn extract_object(text: &str) -> Option<Map<String, Value>> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start >= end {
        tracing::debug!("No JSON object between braces");
        return None;
    }
    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("Failed to decode JSON object: {}", e);
            None
        }
    }
}

/// Rubros and justification extracted from a classification answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationReply {
    /// Assigned rubros (may be empty when the model is unsure)
    pub rubros: Vec<String>,

    /// Model justification
    pub justification: String,
}

impl ClassificationReply {
    /// Map a decoded object to a reply
    ///
    /// An empty object counts as no answer. A missing `main_rubros` becomes
    /// `["UNKNOWN_RUBRO"]`; a missing justification becomes
    /// `"Respuesta no procesada"`. A bare string rubro is wrapped in a list.
    pub fn from_object(object: &Map<String, Value>) -> Option<Self> {
        if object.is_empty() {
            return None;
        }
        let rubros = match object.get("main_rubros") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .filter(|s| !s.is_empty())
                .collect(),
            Some(Value::String(single)) if !single.trim().is_empty() => {
                vec![single.trim().to_string()]
            }
            _ => vec![SENTINEL_UNKNOWN_RUBRO.to_string()],
        };
        let justification = match object.get("justification") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => UNPROCESSED_JUSTIFICATION.to_string(),
            Some(other) => other.to_string(),
        };
        Some(Self {
            rubros,
            justification,
        })
    }

    /// Extract and map the object of a raw answer
    pub fn from_text(text: &str) -> Option<Self> {
        extract_object(text).as_ref().and_then(Self::from_object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_embedded_object() {
        let map = extract_object(r#"blah {"a":1} blah"#).unwrap();
        assert_eq!(map.get("a"), Some(&Value::from(1)));
    }

    #[test]
    fn test_no_braces() {
        assert!(extract_object("no braces here").is_none());
    }

    #[test]
    fn test_broken_object() {
        assert!(extract_object("{broken").is_none());
        assert!(extract_object("} reversed {").is_none());
        assert!(extract_object("{not: json}").is_none());
    }

    #[test]
    fn test_multiple_objects_fail() {
        assert!(extract_object(r#"{"a":1} y {"b":2}"#).is_none());
    }

    #[test]
    fn test_reply_from_text() {
        let text = "<think>..</think> ```json\n{\"main_rubros\": [\"CONSTRUCCION\"], \"justification\": \"vende cemento\"}\n```";
        let reply = ClassificationReply::from_text(text).unwrap();
        assert_eq!(reply.rubros, vec!["CONSTRUCCION"]);
        assert_eq!(reply.justification, "vende cemento");
    }

    #[test]
    fn test_reply_defaults() {
        let reply = ClassificationReply::from_text(r#"{"otro": 1}"#).unwrap();
        assert_eq!(reply.rubros, vec!["UNKNOWN_RUBRO"]);
        assert_eq!(reply.justification, "Respuesta no procesada");
    }

    #[test]
    fn test_reply_empty_rubro_list_is_kept() {
        let reply = ClassificationReply::from_text(r#"{"main_rubros": [], "justification": "no sé"}"#).unwrap();
        assert!(reply.rubros.is_empty());
    }

    #[test]
    fn test_reply_single_string_rubro() {
        let reply = ClassificationReply::from_text(r#"{"main_rubros": "ENSEÑANZA"}"#).unwrap();
        assert_eq!(reply.rubros, vec!["ENSEÑANZA"]);
    }

    #[test]
    fn test_empty_object_is_no_reply() {
        assert!(ClassificationReply::from_text("{}").is_none());
    }
}
