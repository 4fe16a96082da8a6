//! APIエラーハンドリング
//!
//! 統一されたエラーレスポンス形式を提供する。
//! すべてのエラーはJSON形式で返却され、`error`と`message`フィールドを含む。

use thiserror::Error;
use tracing::error;

use crate::domain::{MembershipError, ValidationError};
use crate::infrastructure::{ConfigError, RepositoryError, StorageError};

/// APIエラーレスポンスのボディ
#[derive(Debug, Clone, PartialEq, Eq)]
struct ApiErrorBody {
    /// エラー種別（例: "bad_request", "forbidden", "not_found", "internal_error"）
    error: String,
    /// 詳細なエラーメッセージ
    message: String,
}

/// APIエラー
///
/// ステータスコードとJSON形式のエラーボディを含む。
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{status} {}: {}", .body.error, .body.message)]
pub struct ApiError {
    /// HTTPステータスコード
    status: u16,
    /// エラーレスポンスボディ
    body: ApiErrorBody,
}

impl ApiError {
    pub fn new(status: u16, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorBody {
                error: error.into(),
                message: message.into(),
            },
        }
    }

    /// 400 Bad Request
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, "bad_request", message)
    }

    /// 401 Unauthorized
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(401, "unauthorized", message)
    }

    /// 403 Forbidden
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(403, "forbidden", message)
    }

    /// 404 Not Found
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, "not_found", message)
    }

    /// 500 Internal Server Error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(500, "internal_error", message)
    }

    /// このLambdaが扱わないルート
    pub fn route_not_found() -> Self {
        Self::not_found("Route not found")
    }

    /// 空の部分更新
    pub fn nothing_to_update() -> Self {
        Self::bad_request("Nothing to update")
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn error(&self) -> &str {
        &self.body.error
    }

    pub fn message(&self) -> &str {
        &self.body.message
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::bad_request(format!("Validation error: {}", err))
    }
}

impl From<MembershipError> for ApiError {
    fn from(err: MembershipError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        error!(error = %err, "DynamoDB操作エラー");
        ApiError::internal_error("Internal server error")
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        error!(error = %err, "S3操作エラー");
        ApiError::internal_error("Internal server error")
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        error!(error = %err, "設定読み込みエラー");
        ApiError::internal_error("Internal server error")
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        error!(error = %err, "レスポンスのシリアライズエラー");
        ApiError::internal_error("Internal server error")
    }
}
