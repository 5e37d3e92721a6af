use serde_json::Value;

/// One inbound webhook event, reduced to the fields the gateway acts on.
///
/// Platform payloads arrive either bare or wrapped in a `result` envelope;
/// missing fields become empty strings rather than errors.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub sender_id: String,
    pub message_text: String,
    pub raw: Value,
}

impl InboundEvent {
    pub fn from_value(value: Value) -> Self {
        let payload = value.get("result").unwrap_or(&value);
        let message = payload.get("message");

        let sender_id = message
            .and_then(|m| m.get("from"))
            .and_then(|f| f.get("id"))
            .map(json_to_string)
            .unwrap_or_default();

        let message_text = message
            .and_then(|m| m.get("text"))
            .and_then(|t| t.as_str())
            .unwrap_or_default()
            .to_string();

        Self {
            sender_id,
            message_text,
            raw: value,
        }
    }

    /// Display name of the sender, for transcript logging.
    pub fn sender_name(&self) -> String {
        let payload = self.raw.get("result").unwrap_or(&self.raw);
        payload
            .get("message")
            .and_then(|m| m.get("from"))
            .and_then(|f| f.get("display_name"))
            .and_then(|n| n.as_str())
            .unwrap_or("Unknown")
            .to_string()
    }
}

/// Sender ids arrive as strings or numbers depending on platform version.
fn json_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Parse a webhook body, tolerating the stray control characters the
/// platform sometimes injects into text fields.
///
/// Strict parse first; on failure, strip every control byte and re-parse.
/// Raw control bytes are illegal inside JSON strings anyway, so removing
/// them cannot corrupt a well-formed document.
pub fn parse_body(raw: &str) -> Result<Value, serde_json::Error> {
    match serde_json::from_str(raw) {
        Ok(v) => Ok(v),
        Err(first_err) => {
            let cleaned: String = raw.chars().filter(|c| !c.is_control()).collect();
            serde_json::from_str(&cleaned).map_err(|_| first_err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwraps_result_envelope() {
        let event = InboundEvent::from_value(json!({
            "result": {
                "message": {
                    "from": { "id": "U1", "display_name": "Anna" },
                    "text": "!ask what is grace"
                }
            }
        }));
        assert_eq!(event.sender_id, "U1");
        assert_eq!(event.message_text, "!ask what is grace");
        assert_eq!(event.sender_name(), "Anna");
    }

    #[test]
    fn test_accepts_bare_payload() {
        let event = InboundEvent::from_value(json!({
            "message": { "from": { "id": "U2" }, "text": "hello" }
        }));
        assert_eq!(event.sender_id, "U2");
        assert_eq!(event.message_text, "hello");
        assert_eq!(event.sender_name(), "Unknown");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let event = InboundEvent::from_value(json!({ "result": {} }));
        assert_eq!(event.sender_id, "");
        assert_eq!(event.message_text, "");

        let event = InboundEvent::from_value(json!({}));
        assert_eq!(event.sender_id, "");
        assert_eq!(event.message_text, "");
    }

    #[test]
    fn test_numeric_sender_id() {
        let event = InboundEvent::from_value(json!({
            "message": { "from": { "id": 12345 }, "text": "hi" }
        }));
        assert_eq!(event.sender_id, "12345");
    }

    #[test]
    fn test_parse_body_strict() {
        let v = parse_body(r#"{"message":{"text":"ok"}}"#).unwrap();
        assert_eq!(v["message"]["text"], "ok");
    }

    #[test]
    fn test_parse_body_recovers_from_control_chars() {
        let raw = "{\"message\":{\"text\":\"line\u{0001}break\"}}";
        let v = parse_body(raw).unwrap();
        assert_eq!(v["message"]["text"], "linebreak");
    }

    #[test]
    fn test_parse_body_rejects_garbage() {
        assert!(parse_body("not json at all").is_err());
    }
}
