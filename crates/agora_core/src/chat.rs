use crate::error::{AgoraError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Session identifier used when no user name accompanies a request.
pub const UNKNOWN_SESSION: &str = "unknown";

/// Raw chat request body as received from the HTTP surface.
///
/// Optional fields stay loose JSON values so `validate` can report the
/// offending field by its wire name instead of a generic serde error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub history: Option<Value>,
    #[serde(default, rename = "branchId")]
    pub branch_id: Option<Value>,
    #[serde(default, rename = "fileContent")]
    pub file_content: Option<Value>,
    #[serde(default, rename = "userName")]
    pub user_name: Option<Value>,
    #[serde(default, rename = "filePath")]
    pub file_path: Option<Value>,
}

/// One prior turn of the conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
    pub timestamp: Option<i64>,
}

/// A validated chat request, ready for dispatch to the MCP server.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatQuery {
    pub message: String,
    pub history: Vec<ChatTurn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl ChatQuery {
    /// Session identifier for audit logging.
    pub fn session_id(&self) -> &str {
        self.user_name.as_deref().unwrap_or(UNKNOWN_SESSION)
    }
}

impl ChatRequest {
    /// Type-check the request and produce a `ChatQuery`.
    ///
    /// `message` must be a non-empty string; `history`, if present, must be
    /// an array of turn objects; every other field, if present, must be a
    /// string. There is no cross-field validation.
    pub fn validate(self) -> Result<ChatQuery> {
        let message = match self.message {
            Some(Value::String(s)) if !s.is_empty() => s,
            _ => {
                return Err(AgoraError::validation(
                    "message must be a non-empty string",
                ))
            }
        };

        let history = match self.history {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| {
                    serde_json::from_value::<ChatTurn>(item).map_err(|_| {
                        AgoraError::validation("history must be an array of turn objects")
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            Some(_) => return Err(AgoraError::validation("history must be an array")),
        };

        Ok(ChatQuery {
            message,
            history,
            branch_id: optional_string(self.branch_id, "branchId")?,
            file_content: optional_string(self.file_content, "fileContent")?,
            user_name: optional_string(self.user_name, "userName")?,
            file_path: optional_string(self.file_path, "filePath")?,
        })
    }
}

fn optional_string(value: Option<Value>, field: &str) -> Result<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(AgoraError::validation(format!("{field} must be a string"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: Value) -> ChatRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_minimal_valid_request() {
        let query = request(json!({"message": "hello"})).validate().unwrap();
        assert_eq!(query.message, "hello");
        assert!(query.history.is_empty());
        assert_eq!(query.session_id(), UNKNOWN_SESSION);
    }

    #[test]
    fn test_full_valid_request() {
        let query = request(json!({
            "message": "summarize this",
            "history": [
                {"role": "user", "content": "hi", "timestamp": 1700000000},
                {"role": "assistant", "content": "hello"}
            ],
            "branchId": "draft-2",
            "fileContent": "# Policy",
            "userName": "alice",
            "filePath": "docs/policy.md"
        }))
        .validate()
        .unwrap();

        assert_eq!(query.history.len(), 2);
        assert_eq!(query.history[0].role, "user");
        assert_eq!(query.history[1].timestamp, None);
        assert_eq!(query.branch_id.as_deref(), Some("draft-2"));
        assert_eq!(query.session_id(), "alice");
    }

    #[test]
    fn test_missing_message_is_validation_error() {
        let err = request(json!({})).validate().unwrap_err();
        assert!(matches!(err, AgoraError::Validation(_)));
    }

    #[test]
    fn test_empty_message_is_validation_error() {
        let err = request(json!({"message": ""})).validate().unwrap_err();
        assert!(matches!(err, AgoraError::Validation(_)));
    }

    #[test]
    fn test_non_string_message_is_validation_error() {
        let err = request(json!({"message": 42})).validate().unwrap_err();
        assert!(matches!(err, AgoraError::Validation(_)));
    }

    #[test]
    fn test_wrong_typed_optional_field_names_the_field() {
        let err = request(json!({"message": "hi", "branchId": 7}))
            .validate()
            .unwrap_err();
        assert_eq!(err, AgoraError::validation("branchId must be a string"));

        let err = request(json!({"message": "hi", "userName": ["a"]}))
            .validate()
            .unwrap_err();
        assert_eq!(err, AgoraError::validation("userName must be a string"));

        let err = request(json!({"message": "hi", "fileContent": true}))
            .validate()
            .unwrap_err();
        assert_eq!(err, AgoraError::validation("fileContent must be a string"));

        let err = request(json!({"message": "hi", "filePath": {}}))
            .validate()
            .unwrap_err();
        assert_eq!(err, AgoraError::validation("filePath must be a string"));
    }

    #[test]
    fn test_history_must_be_a_sequence() {
        let err = request(json!({"message": "hi", "history": {"role": "user"}}))
            .validate()
            .unwrap_err();
        assert_eq!(err, AgoraError::validation("history must be an array"));
    }

    #[test]
    fn test_null_optionals_are_treated_as_absent() {
        let query = request(json!({
            "message": "hi",
            "history": null,
            "branchId": null
        }))
        .validate()
        .unwrap();
        assert!(query.history.is_empty());
        assert!(query.branch_id.is_none());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let query = request(json!({"message": "hi", "themeId": "t-1"}))
            .validate()
            .unwrap();
        assert_eq!(query.message, "hi");
    }

    #[test]
    fn test_query_serializes_with_wire_names() {
        let query = request(json!({"message": "hi", "branchId": "b"}))
            .validate()
            .unwrap();
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value["branchId"], "b");
        assert!(value.get("fileContent").is_none());
        assert_eq!(value["history"], json!([]));
    }
}
