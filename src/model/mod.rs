use log::{debug, error, info};
use reqwest::Client;
use serde_json::Value;

use crate::error::TalkError;
use crate::web::models::CompletionRequest;

// A wrapper for the OpenAI chat completions API
pub struct CompletionClient {
    api_url: String,
    client: Client,
}

impl CompletionClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        let api_url = api_url.into();
        info!("Using completion API at: {}", api_url);

        Self {
            api_url,
            client: Client::new(),
        }
    }

    /// Sends one completion request and returns the trimmed reply text.
    /// A reply without `choices[0].message.content` yields an empty string;
    /// content that is present but not text is an internal error.
    pub async fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<String, TalkError> {
        info!(
            "Sending {} messages to {} (max_tokens: {})",
            request.messages.len(),
            request.model,
            request.max_tokens
        );
        debug!("Messages: {:?}", request.messages);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!("Completion API returned {}: {}", status, text);
            return Err(TalkError::Upstream {
                status: status.as_u16(),
                detail: text,
            });
        }

        let data: Value = match serde_json::from_str(&text) {
            Ok(data) => data,
            Err(e) => {
                error!("Completion API returned invalid JSON: {}", e);
                return Err(TalkError::BadUpstreamJson { raw: text });
            }
        };
        debug!("Response JSON: {}", data);

        let reply = extract_reply(&data)?;
        info!("Reply length: {} characters", reply.len());
        Ok(reply)
    }
}

fn extract_reply(data: &Value) -> Result<String, TalkError> {
    let content = data
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"));

    match content {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(text)) => Ok(text.trim().to_string()),
        Some(other) => Err(TalkError::Internal(format!(
            "choices[0].message.content is not a string: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reply_is_trimmed() {
        let data = json!({ "choices": [{ "message": { "content": "  Hello  \n" } }] });
        assert_eq!(extract_reply(&data).unwrap(), "Hello");
    }

    #[test]
    fn missing_content_is_empty() {
        assert_eq!(extract_reply(&json!({})).unwrap(), "");
        assert_eq!(extract_reply(&json!(null)).unwrap(), "");
        assert_eq!(extract_reply(&json!({ "choices": [] })).unwrap(), "");
        assert_eq!(extract_reply(&json!({ "choices": [null] })).unwrap(), "");
        assert_eq!(extract_reply(&json!({ "choices": [{ "message": {} }] })).unwrap(), "");
        assert_eq!(
            extract_reply(&json!({ "choices": [{ "message": { "content": null } }] })).unwrap(),
            ""
        );
    }

    #[test]
    fn non_text_content_is_an_error() {
        for content in [json!(42), json!(["a"]), json!({ "text": "hi" }), json!(true)] {
            let data = json!({ "choices": [{ "message": { "content": content } }] });
            assert!(matches!(extract_reply(&data), Err(TalkError::Internal(_))));
        }
    }
}
