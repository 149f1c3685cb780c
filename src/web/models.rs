use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::TalkError;
use crate::web::personality::Personality;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u64 = 220;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Keeps `assistant` and `system`; anything else is treated as `user`.
    pub fn sanitize(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str) {
            Some("assistant") => Role::Assistant,
            Some("system") => Role::System,
            _ => Role::User,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Builds a message from a loosely typed `{role, content}` entry.
    /// Entries without fields (strings, numbers) become an empty user
    /// message; a `null` entry is rejected.
    pub fn from_loose(field: &str, index: usize, entry: &Value) -> Result<Self, TalkError> {
        if entry.is_null() {
            return Err(TalkError::Internal(format!(
                "{}[{}] is null, expected {{role, content}}",
                field, index
            )));
        }

        Ok(Self {
            role: Role::sanitize(entry.get("role")),
            content: entry.get("content").map(stringify).unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: Number,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TalkReply {
    pub reply: String,
    pub model: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusReply {
    pub ok: bool,
    pub endpoint: String,
    pub expect: String,
}

/// The request body after normalisation. Parsing never fails: anything that
/// cannot be read as JSON degrades to an empty object.
#[derive(Debug, Clone)]
pub struct TalkInput {
    pub body: Value,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: Number,
    pub personality: Personality,
}

impl TalkInput {
    pub fn parse(raw: &[u8]) -> Self {
        Self::from_body(parse_body(raw))
    }

    pub fn from_body(body: Value) -> Self {
        let model = body
            .get("model")
            .and_then(Value::as_str)
            .filter(|model| !model.is_empty())
            .unwrap_or(DEFAULT_MODEL)
            .to_string();

        let temperature = body
            .get("temperature")
            .and_then(Value::as_f64)
            .unwrap_or(DEFAULT_TEMPERATURE);

        let max_tokens = match body.get("max_tokens") {
            Some(Value::Number(n)) => n.clone(),
            _ => Number::from(DEFAULT_MAX_TOKENS),
        };

        let personality = body
            .get("personality")
            .and_then(Value::as_str)
            .map(Personality::from_tag)
            .unwrap_or_default();

        Self {
            body,
            model,
            temperature,
            max_tokens,
            personality,
        }
    }

    /// Assembles the upstream conversation. The first shape that matches wins:
    /// `userMessage` (+ `history`), a non-empty `messages` array, then
    /// `message`. Returns `None` when none of them is present.
    pub fn messages(&self) -> Result<Option<Vec<ChatMessage>>, TalkError> {
        let system_prompt = self.personality.system_prompt();

        if let Some(user_message) = self.field("userMessage").filter(|v| is_truthy(v)) {
            let history: &[Value] = match self.field("history") {
                Some(Value::Array(entries)) => entries.as_slice(),
                _ => &[],
            };

            let mut messages = Vec::with_capacity(history.len() + 2);
            messages.push(ChatMessage::system(system_prompt));
            for (index, entry) in history.iter().enumerate() {
                messages.push(ChatMessage::from_loose("history", index, entry)?);
            }
            messages.push(ChatMessage::user(stringify(user_message)));
            return Ok(Some(messages));
        }

        // Caller-supplied conversations are sent without the preset prompt.
        if let Some(Value::Array(entries)) = self.field("messages") {
            if !entries.is_empty() {
                let messages = entries
                    .iter()
                    .enumerate()
                    .map(|(index, entry)| ChatMessage::from_loose("messages", index, entry))
                    .collect::<Result<Vec<_>, _>>()?;
                return Ok(Some(messages));
            }
        }

        if let Some(message) = self.field("message").filter(|v| is_truthy(v)) {
            return Ok(Some(vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(stringify(message)),
            ]));
        }

        Ok(None)
    }

    pub fn completion_request(&self) -> Result<Option<CompletionRequest>, TalkError> {
        Ok(self.messages()?.map(|messages| CompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens.clone(),
        }))
    }

    fn field(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }
}

/// Reads the raw body. A JSON string is itself decoded as JSON; unreadable
/// input and `null` become `{}`.
pub fn parse_body(raw: &[u8]) -> Value {
    let body = match serde_json::from_slice::<Value>(raw) {
        Ok(Value::String(text)) => serde_json::from_str(&text).unwrap_or(Value::Null),
        Ok(value) => value,
        Err(_) => Value::Null,
    };

    match body {
        Value::Null => Value::Object(Map::new()),
        other => other,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text form of a loose value for message content:
/// arrays join their items with `,`, objects collapse to `[object Object]`
/// and integral floats drop their fraction.
fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_text(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn number_text(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }

    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::personality::{CREATIVE_PROMPT, FRIENDLY_PROMPT};
    use serde_json::json;

    fn input(body: Value) -> TalkInput {
        TalkInput::from_body(body)
    }

    #[test]
    fn role_sanitization() {
        assert_eq!(Role::sanitize(Some(&json!("assistant"))), Role::Assistant);
        assert_eq!(Role::sanitize(Some(&json!("system"))), Role::System);
        assert_eq!(Role::sanitize(Some(&json!("user"))), Role::User);
        assert_eq!(Role::sanitize(Some(&json!("tool"))), Role::User);
        assert_eq!(Role::sanitize(Some(&json!("Assistant"))), Role::User);
        assert_eq!(Role::sanitize(Some(&json!(1))), Role::User);
        assert_eq!(Role::sanitize(None), Role::User);
    }

    #[test]
    fn body_parsing_is_lenient() {
        assert_eq!(parse_body(b""), json!({}));
        assert_eq!(parse_body(b"null"), json!({}));
        assert_eq!(parse_body(b"not json"), json!({}));
        assert_eq!(parse_body(br#"{"message":"hi"}"#), json!({ "message": "hi" }));
        assert_eq!(
            parse_body(br#""{\"message\":\"hi\"}""#),
            json!({ "message": "hi" })
        );
        assert_eq!(parse_body(br#""garbage""#), json!({}));
    }

    #[test]
    fn defaults_fill_missing_parameters() {
        let parsed = input(json!({ "temperature": "hot", "max_tokens": "lots", "model": "" }));
        assert_eq!(parsed.model, DEFAULT_MODEL);
        assert_eq!(parsed.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(parsed.max_tokens, Number::from(DEFAULT_MAX_TOKENS));
        assert_eq!(parsed.personality, Personality::Friendly);
    }

    #[test]
    fn explicit_parameters_are_kept() {
        let parsed = input(json!({
            "model": "gpt-4o",
            "temperature": 0,
            "max_tokens": 64,
            "personality": "創造",
        }));
        assert_eq!(parsed.model, "gpt-4o");
        assert_eq!(parsed.temperature, 0.0);
        assert_eq!(parsed.max_tokens, Number::from(64));
        assert_eq!(parsed.personality, Personality::Creative);
    }

    #[test]
    fn single_message_gets_system_prompt() {
        let messages = input(json!({ "message": "hi" })).messages().unwrap().unwrap();
        assert_eq!(
            messages,
            vec![ChatMessage::system(FRIENDLY_PROMPT), ChatMessage::user("hi")]
        );
    }

    #[test]
    fn user_message_with_history() {
        let messages = input(json!({
            "userMessage": "hi",
            "personality": "創造",
            "history": [
                { "role": "assistant", "content": "yo" },
                { "role": "narrator", "content": "..." },
                { "role": "system" },
            ],
        }))
        .messages()
        .unwrap()
        .unwrap();

        assert_eq!(
            messages,
            vec![
                ChatMessage::system(CREATIVE_PROMPT),
                ChatMessage::new(Role::Assistant, "yo"),
                ChatMessage::user("..."),
                ChatMessage::system(""),
                ChatMessage::user("hi"),
            ]
        );
    }

    #[test]
    fn history_that_is_not_an_array_is_ignored() {
        let messages = input(json!({ "userMessage": "hi", "history": "nope" }))
            .messages()
            .unwrap()
            .unwrap();
        assert_eq!(
            messages,
            vec![ChatMessage::system(FRIENDLY_PROMPT), ChatMessage::user("hi")]
        );
    }

    #[test]
    fn user_message_wins_over_other_shapes() {
        let messages = input(json!({
            "userMessage": "first",
            "messages": [{ "role": "user", "content": "second" }],
            "message": "third",
        }))
        .messages()
        .unwrap()
        .unwrap();
        assert_eq!(messages.last(), Some(&ChatMessage::user("first")));
    }

    #[test]
    fn messages_array_skips_the_system_prompt() {
        let messages = input(json!({
            "personality": "情熱",
            "messages": [
                { "role": "system", "content": "be brief" },
                { "role": "bot", "content": 42 },
            ],
        }))
        .messages()
        .unwrap()
        .unwrap();
        assert_eq!(
            messages,
            vec![ChatMessage::system("be brief"), ChatMessage::user("42")]
        );
    }

    #[test]
    fn empty_messages_array_falls_through_to_message() {
        let messages = input(json!({ "messages": [], "message": "hi" }))
            .messages()
            .unwrap()
            .unwrap();
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn falsy_values_are_not_input() {
        assert!(input(json!({})).messages().unwrap().is_none());
        assert!(input(json!({ "userMessage": "", "message": 0 })).messages().unwrap().is_none());
        assert!(input(json!({ "messages": [] })).messages().unwrap().is_none());
        assert!(input(json!(["hi"])).messages().unwrap().is_none());
    }

    #[test]
    fn completion_request_carries_parameters() {
        let request = input(json!({ "message": "hi", "max_tokens": 12 }))
            .completion_request()
            .unwrap()
            .unwrap();
        let wire = serde_json::to_value(&request).unwrap();
        assert_eq!(wire["model"], json!(DEFAULT_MODEL));
        assert_eq!(wire["temperature"], json!(0.7));
        assert_eq!(wire["max_tokens"], json!(12));
        assert_eq!(wire["messages"][1], json!({ "role": "user", "content": "hi" }));
    }

    #[test]
    fn null_conversation_entries_are_rejected() {
        let err = input(json!({ "userMessage": "hi", "history": [null] }))
            .messages()
            .unwrap_err();
        assert!(matches!(err, TalkError::Internal(ref detail) if detail.contains("history[0]")));

        let err = input(json!({ "messages": [{ "content": "a" }, null] }))
            .messages()
            .unwrap_err();
        assert!(matches!(err, TalkError::Internal(ref detail) if detail.contains("messages[1]")));
    }

    #[test]
    fn scalar_conversation_entries_become_empty_user_messages() {
        let messages = input(json!({ "messages": ["text", 7, false] }))
            .messages()
            .unwrap()
            .unwrap();
        assert_eq!(messages, vec![ChatMessage::user(""); 3]);
    }

    #[test]
    fn loose_values_are_rendered_as_text() {
        assert_eq!(stringify(&json!({ "a": 1 })), "[object Object]");
        assert_eq!(stringify(&json!(["a", "b"])), "a,b");
        assert_eq!(stringify(&json!([1, null, [2, 3], { "x": 1 }])), "1,,2,3,[object Object]");
        assert_eq!(stringify(&json!(1.0)), "1");
        assert_eq!(stringify(&json!(-0.0)), "0");
        assert_eq!(stringify(&json!(2.5)), "2.5");
        assert_eq!(stringify(&json!(42)), "42");
        assert_eq!(stringify(&json!(true)), "true");
        assert_eq!(stringify(&Value::Null), "");
    }

    #[test]
    fn object_message_is_sent_as_placeholder_text() {
        let messages = input(json!({ "message": { "text": "hi" } }))
            .messages()
            .unwrap()
            .unwrap();
        assert_eq!(messages[1], ChatMessage::user("[object Object]"));
    }
}
