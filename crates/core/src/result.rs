//! Result envelopes handed back to whoever submitted a command.
//!
//! The type signals whether the execution succeeded. Warnings and errors carry a
//! `code` that uniquely identifies the cause plus a human-readable `message`.
//! A result may carry optional data.

use serde::{Deserialize, Serialize};

use crate::error::CommandError;

/// Outcome category of a result envelope.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultType {
    Ok,
    Warning,
    Error,
}

/// Result envelope with optional data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult<D = ()> {
    #[serde(rename = "type")]
    result_type: ResultType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<D>,
}

impl<D> CommandResult<D> {
    pub fn new(
        result_type: ResultType,
        code: Option<String>,
        message: Option<String>,
        data: Option<D>,
    ) -> Self {
        Self {
            result_type,
            code,
            message,
            data,
        }
    }

    /// Success without data.
    pub fn ok() -> Self {
        Self::new(ResultType::Ok, None, None, None)
    }

    /// Success carrying data.
    pub fn ok_with(data: D) -> Self {
        Self::new(ResultType::Ok, None, None, Some(data))
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ResultType::Warning, Some(code.into()), Some(message.into()), None)
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ResultType::Error, Some(code.into()), Some(message.into()), None)
    }

    /// Error envelope for a failed dispatch; the code comes from [`CommandError::code`].
    pub fn from_error(error: &CommandError) -> Self {
        Self::error(error.code(), error.to_string())
    }

    pub fn result_type(&self) -> ResultType {
        self.result_type
    }

    pub fn is_ok(&self) -> bool {
        self.result_type == ResultType::Ok
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn data(&self) -> Option<&D> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<D> {
        self.data
    }
}

impl<D> From<Result<D, CommandError>> for CommandResult<D> {
    fn from(value: Result<D, CommandError>) -> Self {
        match value {
            Ok(data) => Self::ok_with(data),
            Err(err) => Self::from_error(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::KindId;

    #[test]
    fn ok_result_serializes_without_optional_fields() {
        let result: CommandResult = CommandResult::ok();
        assert_eq!(serde_json::to_value(&result).unwrap(), json!({ "type": "OK" }));
    }

    #[test]
    fn data_result_round_trips() {
        let result = CommandResult::ok_with(json!({ "id": 42 }));
        let text = serde_json::to_string(&result).unwrap();
        let back: CommandResult<serde_json::Value> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, result);
        assert_eq!(back.data(), Some(&json!({ "id": 42 })));
    }

    #[test]
    fn error_envelope_from_dispatch_failure() {
        let failed: Result<u32, CommandError> =
            Err(CommandError::unroutable(KindId::from_static("Cancel")));
        let result = CommandResult::from(failed);

        assert_eq!(result.result_type(), ResultType::Error);
        assert_eq!(result.code(), Some("UNROUTABLE_COMMAND"));
        assert_eq!(
            result.message(),
            Some("no executor found for command kind 'Cancel'")
        );
        assert!(result.data().is_none());
    }

    #[test]
    fn warning_keeps_code_and_message() {
        let result: CommandResult = CommandResult::warning("W1", "almost");
        assert!(!result.is_ok());
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({ "type": "WARNING", "code": "W1", "message": "almost" })
        );
    }
}
