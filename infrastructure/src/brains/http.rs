//! Shared plumbing for the HTTP brain adapters

use mirror_application::BrainError;
use mirror_domain::{ConversationMessage, Role};
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Read an API key from `var`, failing with a message that names it
pub(crate) fn api_key_from_env(var: &str) -> Result<String, BrainError> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(BrainError::MissingApiKey(var.to_string())),
    }
}

pub(crate) fn client() -> Result<reqwest::Client, BrainError> {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(|e| BrainError::Request(e.to_string()))
}

/// History without system turns; the system prompt travels separately
pub(crate) fn dialogue(messages: &[ConversationMessage]) -> impl Iterator<Item = &ConversationMessage> {
    messages.iter().filter(|m| m.role != Role::System)
}

pub(crate) fn request_error(e: reqwest::Error) -> BrainError {
    BrainError::Request(e.to_string())
}

/// Turn a non-success response into [`BrainError::Http`]
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, BrainError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    Err(BrainError::Http {
        status: status.as_u16(),
        body,
    })
}

pub(crate) fn trim_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_names_variable() {
        let err = api_key_from_env("MIRROR_TEST_SURELY_UNSET_KEY").unwrap_err();
        assert_eq!(
            err,
            BrainError::MissingApiKey("MIRROR_TEST_SURELY_UNSET_KEY".to_string())
        );
        assert!(err.to_string().contains("MIRROR_TEST_SURELY_UNSET_KEY"));
    }

    #[test]
    fn test_dialogue_drops_system_turns() {
        let messages = vec![
            ConversationMessage::system("ignored"),
            ConversationMessage::user("hi"),
            ConversationMessage::assistant("hello"),
        ];
        let kept: Vec<_> = dialogue(&messages).map(|m| m.role).collect();
        assert_eq!(kept, vec![Role::User, Role::Assistant]);
    }

    #[test]
    fn test_trim_base_url() {
        assert_eq!(trim_base_url("http://localhost:8080/v1/"), "http://localhost:8080/v1");
    }
}
