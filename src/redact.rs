//! Redaction of sensitive fields before anything reaches a log sink.

use serde_json::{Map, Value};

pub const REDACTED: &str = "[REDACTED]";

/// Key fragments that mark a field as sensitive (matched case-insensitively).
const SENSITIVE_KEYS: &[&str] = &["password", "token", "secret", "key", "authorization"];

pub fn is_sensitive(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEYS.iter().any(|fragment| key.contains(fragment))
}

/// Copy of `value` with every sensitive object key masked, at any depth.
pub fn redact(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let redacted: Map<String, Value> = map
                .iter()
                .map(|(key, inner)| {
                    let inner = if is_sensitive(key) {
                        Value::String(REDACTED.to_string())
                    } else {
                        redact(inner)
                    };
                    (key.clone(), inner)
                })
                .collect();
            Value::Object(redacted)
        }
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn masks_sensitive_keys_at_any_depth() {
        let input = json!({
            "email": "a@x.com",
            "password": "Abc12345!",
            "nested": {
                "accessToken": "eyJ...",
                "items": [{ "apiKey": "k", "name": "pen" }]
            },
            "Authorization": "Bearer abc"
        });

        let output = redact(&input);
        assert_eq!(output["email"], "a@x.com");
        assert_eq!(output["password"], REDACTED);
        assert_eq!(output["nested"]["accessToken"], REDACTED);
        assert_eq!(output["nested"]["items"][0]["apiKey"], REDACTED);
        assert_eq!(output["nested"]["items"][0]["name"], "pen");
        assert_eq!(output["Authorization"], REDACTED);
    }

    #[test]
    fn leaves_scalars_untouched() {
        assert_eq!(redact(&json!(42)), json!(42));
        assert_eq!(redact(&json!("password")), json!("password"));
    }
}
