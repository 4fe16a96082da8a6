//! API Gatewayプロキシ形式のレスポンス
//!
//! `{statusCode, headers, body}` の `body` はJSON文字列として返す。

use serde::Serialize;
use serde_json::{json, Value};

use super::api_error::ApiError;

/// ハンドラーの処理結果
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// 200 OK
    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    /// 201 Created
    pub fn created(body: Value) -> Self {
        Self::new(201, body)
    }

    /// `{message}` のみを返すレスポンス
    pub fn message(status: u16, message: &str) -> Self {
        Self::new(status, json!({ "message": message }))
    }

    /// シリアライズ可能な値から200 OKを作成
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ApiError> {
        Ok(Self::ok(serde_json::to_value(value)?))
    }

    /// Lambdaの戻り値（API Gatewayプロキシ形式）に変換
    pub fn into_lambda(self) -> Value {
        json!({
            "statusCode": self.status,
            "headers": {
                "Content-Type": "application/json",
                "Access-Control-Allow-Origin": "*",
                "Access-Control-Allow-Credentials": "true",
            },
            "body": self.body.to_string(),
        })
    }
}

impl From<ApiError> for ApiResponse {
    fn from(err: ApiError) -> Self {
        let body = json!({ "error": err.error(), "message": err.message() });
        Self::new(err.status(), body)
    }
}

/// ハンドラーの結果をLambdaの戻り値に変換
pub fn respond(result: Result<ApiResponse, ApiError>) -> Value {
    result.unwrap_or_else(ApiResponse::from).into_lambda()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_lambda_has_cors_headers_and_string_body() {
        let value = ApiResponse::created(json!({"id": "g-1"})).into_lambda();

        assert_eq!(value["statusCode"], 201);
        assert_eq!(value["headers"]["Access-Control-Allow-Origin"], "*");
        assert_eq!(value["headers"]["Access-Control-Allow-Credentials"], "true");
        assert_eq!(value["headers"]["Content-Type"], "application/json");

        let body: Value = serde_json::from_str(value["body"].as_str().unwrap()).unwrap();
        assert_eq!(body, json!({"id": "g-1"}));
    }

    #[test]
    fn test_respond_with_error() {
        let value = respond(Err(ApiError::forbidden("Only group admins can perform this action")));

        assert_eq!(value["statusCode"], 403);
        let body: Value = serde_json::from_str(value["body"].as_str().unwrap()).unwrap();
        assert_eq!(body["error"], "forbidden");
        assert_eq!(body["message"], "Only group admins can perform this action");
    }

    #[test]
    fn test_message_response() {
        let response = ApiResponse::message(200, "Group deleted");
        assert_eq!(response.body, json!({"message": "Group deleted"}));
    }
}
