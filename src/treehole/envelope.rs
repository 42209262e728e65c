//! Wire-level response envelope shared by every Treehole endpoint.
//!
//! The service wraps each payload in `{ code, message, timestamp, success,
//! data? }`. [`ResponseEnvelope`] turns that shape into a tagged union so
//! call sites must handle the failure variant explicitly.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};

use super::error::TreeholeError;

/// Decoded response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseEnvelope<T> {
    /// The request succeeded and carries a payload.
    Success {
        /// Application-level status code.
        code: i64,
        /// Server message.
        message: String,
        /// Server timestamp.
        timestamp: i64,
        /// The payload.
        data: T,
    },
    /// The request was rejected by the application.
    Failure {
        /// Application-level status code.
        code: i64,
        /// Server message explaining the failure.
        message: String,
        /// Server timestamp.
        timestamp: i64,
    },
}

impl<T> ResponseEnvelope<T> {
    /// Returns true for the success variant.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the envelope's application code.
    #[must_use]
    pub const fn code(&self) -> i64 {
        match self {
            Self::Success { code, .. } | Self::Failure { code, .. } => *code,
        }
    }

    /// Returns the envelope's server message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::Failure { message, .. } => message,
        }
    }

    /// Returns the envelope's server timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> i64 {
        match self {
            Self::Success { timestamp, .. } | Self::Failure { timestamp, .. } => *timestamp,
        }
    }

    /// Converts the envelope into its payload.
    ///
    /// # Errors
    ///
    /// Returns [`TreeholeError::ApiFailure`] carrying the server message and
    /// code for the failure variant.
    pub fn into_result(self) -> Result<T, TreeholeError> {
        match self {
            Self::Success { data, .. } => Ok(data),
            Self::Failure { code, message, .. } => Err(TreeholeError::ApiFailure { code, message }),
        }
    }
}

#[derive(Deserialize)]
struct RawEnvelope {
    code: i64,
    message: String,
    timestamp: i64,
    success: bool,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

impl<'de, T> Deserialize<'de> for ResponseEnvelope<T>
where
    T: DeserializeOwned,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawEnvelope::deserialize(deserializer)?;
        if !raw.success {
            return Ok(Self::Failure {
                code: raw.code,
                message: raw.message,
                timestamp: raw.timestamp,
            });
        }

        let payload = raw
            .data
            .ok_or_else(|| D::Error::custom("successful envelope is missing `data`"))?;
        let data = serde_json::from_value(payload).map_err(D::Error::custom)?;
        Ok(Self::Success {
            code: raw.code,
            message: raw.message,
            timestamp: raw.timestamp,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::ResponseEnvelope;
    use crate::treehole::error::TreeholeError;
    use crate::treehole::models::{Comment, Page};

    #[rstest]
    fn decodes_success_with_payload() {
        let envelope: ResponseEnvelope<Vec<u32>> = serde_json::from_value(json!({
            "code": 20000,
            "message": "success",
            "timestamp": 1_700_000_000,
            "success": true,
            "data": [1, 2]
        }))
        .expect("success envelope should decode");

        assert!(envelope.is_success());
        assert_eq!(envelope.code(), 20000);
        assert_eq!(envelope.timestamp(), 1_700_000_000);
        assert_eq!(envelope.into_result(), Ok(vec![1, 2]));
    }

    #[rstest]
    #[case::null_payload(json!(null))]
    #[case::empty_list_payload(json!([]))]
    #[case::empty_object_payload(json!({}))]
    fn failure_ignores_payload_and_keeps_message(#[case] payload: serde_json::Value) {
        let envelope: ResponseEnvelope<Page<Comment>> = serde_json::from_value(json!({
            "code": 40001,
            "message": "未登录",
            "timestamp": 1_700_000_000,
            "success": false,
            "data": payload
        }))
        .expect("failure envelope should decode");

        assert!(!envelope.is_success());
        assert_eq!(envelope.message(), "未登录");
        assert_eq!(
            envelope.into_result(),
            Err(TreeholeError::ApiFailure {
                code: 40001,
                message: "未登录".to_owned(),
            })
        );
    }

    #[rstest]
    fn success_with_mismatched_payload_is_rejected() {
        let result = serde_json::from_value::<ResponseEnvelope<Page<Comment>>>(json!({
            "code": 20000,
            "message": "success",
            "timestamp": 1,
            "success": true,
            "data": []
        }));
        assert!(result.is_err(), "expected decode failure, got {result:?}");
    }

    #[rstest]
    #[case::missing_data(json!({"code": 0, "message": "ok", "timestamp": 1, "success": true}))]
    #[case::null_data(json!({"code": 0, "message": "ok", "timestamp": 1, "success": true, "data": null}))]
    #[case::missing_success_flag(json!({"code": 0, "message": "ok", "timestamp": 1, "data": [1]}))]
    #[case::failure_without_message(json!({"code": 40001, "timestamp": 1, "success": false}))]
    #[case::missing_code(json!({"message": "ok", "timestamp": 1, "success": true, "data": [1]}))]
    #[case::missing_timestamp(json!({"code": 0, "message": "ok", "success": true, "data": [1]}))]
    fn rejects_structurally_incomplete_envelopes(#[case] body: serde_json::Value) {
        let result = serde_json::from_value::<ResponseEnvelope<Vec<u32>>>(body);
        assert!(result.is_err(), "expected decode failure, got {result:?}");
    }
}
