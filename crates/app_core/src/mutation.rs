//! Mutation requests and their JSON results

use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Body of every API response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overwritten: Option<bool>,
}

impl MutationResult {
    pub fn success() -> Self {
        Self {
            ok: true,
            error: None,
            overwritten: None,
        }
    }

    pub fn favorited(overwritten: bool) -> Self {
        Self {
            overwritten: Some(overwritten),
            ..Self::success()
        }
    }

    /// Failure carrying only the generic message for `err`
    pub fn failure(err: &AppError) -> Self {
        Self {
            ok: false,
            error: Some(err.user_message().to_string()),
            overwritten: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    Delete,
    Favorite,
}

impl MutationKind {
    /// HTTP method and path of the endpoint
    pub fn endpoint(self) -> (&'static str, &'static str) {
        match self {
            MutationKind::Delete => ("DELETE", "/api/delete"),
            MutationKind::Favorite => ("POST", "/api/favorite"),
        }
    }
}

/// A mutation the viewer asked for and has not seen the result of
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMutation {
    pub kind: MutationKind,
    pub relative_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_json_shape() {
        let json = serde_json::to_string(&MutationResult::success()).unwrap();
        assert_eq!(json, r#"{"ok":true}"#);

        let json = serde_json::to_string(&MutationResult::favorited(true)).unwrap();
        assert_eq!(json, r#"{"ok":true,"overwritten":true}"#);

        let err = AppError::NotFound("/srv/media/secret.jpg".into());
        let json = serde_json::to_string(&MutationResult::failure(&err)).unwrap();
        assert_eq!(json, r#"{"ok":false,"error":"File not found"}"#);
    }
}
