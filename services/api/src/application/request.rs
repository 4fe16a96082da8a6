//! API Gatewayプロキシイベントの解析
//!
//! REST API（`httpMethod` + `resource`、`authorizer.claims`）と
//! HTTP API（`routeKey`、`authorizer.jwt.claims`）の両方の形式を受け付ける。

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::api_error::ApiError;
use crate::domain::Caller;

/// 解析済みのリクエスト
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTPメソッド（大文字）
    pub method: String,
    /// リソーステンプレート（例: `/groups/{groupId}`）
    pub resource: String,
    pub path_parameters: HashMap<String, String>,
    /// 未解析のボディ（文字列またはJSON）
    pub body: Option<Value>,
    /// 認証済みの呼び出し元（`sub` クレームが無ければNone）
    pub caller: Option<Caller>,
}

impl ApiRequest {
    pub fn from_event(event: &Value) -> Self {
        let (method, resource) = Self::route_parts(event);

        let path_parameters = event
            .get("pathParameters")
            .and_then(|v| v.as_object())
            .map(|params| {
                params
                    .iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        let body = event.get("body").filter(|v| !v.is_null()).cloned();

        Self {
            method,
            resource,
            path_parameters,
            body,
            caller: Self::caller_from_claims(event),
        }
    }

    /// ルートキー `METHOD /resource`
    pub fn route_key(&self) -> String {
        format!("{} {}", self.method, self.resource)
    }

    /// パスパラメータを取得（欠落・空文字は400）
    pub fn path_param(&self, name: &str) -> Result<&str, ApiError> {
        self.path_parameters
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ApiError::bad_request(format!("Missing path parameter: {}", name)))
    }

    /// 呼び出し元を取得（未認証は401）
    pub fn caller(&self) -> Result<&Caller, ApiError> {
        self.caller
            .as_ref()
            .ok_or_else(|| ApiError::unauthorized("Unauthorized"))
    }

    /// ボディをJSONとして型に変換（ボディが無い場合は空オブジェクト扱い）
    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let value = match &self.body {
            None => Value::Object(Map::new()),
            Some(Value::String(raw)) if raw.trim().is_empty() => Value::Object(Map::new()),
            Some(Value::String(raw)) => serde_json::from_str(raw).map_err(|e| {
                ApiError::bad_request(format!("Validation error: invalid JSON body ({})", e))
            })?,
            Some(other) => other.clone(),
        };

        serde_json::from_value(value)
            .map_err(|e| ApiError::bad_request(format!("Validation error: {}", e)))
    }

    fn route_parts(event: &Value) -> (String, String) {
        let route_key = event
            .get("routeKey")
            .and_then(|v| v.as_str())
            .filter(|key| *key != "$default");

        if let Some((method, resource)) = route_key.and_then(|key| key.split_once(' ')) {
            return (method.to_ascii_uppercase(), resource.to_string());
        }

        let method = event
            .get("httpMethod")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_ascii_uppercase();
        let resource = event
            .get("resource")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        (method, resource)
    }

    fn caller_from_claims(event: &Value) -> Option<Caller> {
        let authorizer = event.get("requestContext")?.get("authorizer")?;
        let claims = authorizer
            .get("claims")
            .or_else(|| authorizer.get("jwt").and_then(|jwt| jwt.get("claims")))?;

        let claim = |name: &str| {
            claims
                .get(name)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Some(Caller {
            user_id: claim("sub")?,
            name: claim("name"),
            email: claim("email"),
            picture: claim("picture"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GroupUpdate;
    use serde_json::json;

    #[test]
    fn test_rest_api_event() {
        let event = json!({
            "httpMethod": "get",
            "resource": "/groups/{groupId}",
            "pathParameters": {"groupId": "g-1"},
            "requestContext": {
                "authorizer": {"claims": {"sub": "u-1", "name": "Ana", "email": ""}}
            },
            "body": null
        });

        let request = ApiRequest::from_event(&event);

        assert_eq!(request.route_key(), "GET /groups/{groupId}");
        assert_eq!(request.path_param("groupId").unwrap(), "g-1");
        let caller = request.caller().unwrap();
        assert_eq!(caller.user_id, "u-1");
        assert_eq!(caller.name.as_deref(), Some("Ana"));
        assert!(caller.email.is_none());
        assert!(request.body.is_none());
    }

    #[test]
    fn test_http_api_event() {
        let event = json!({
            "routeKey": "POST /groups",
            "requestContext": {
                "authorizer": {"jwt": {"claims": {"sub": "u-2"}}}
            },
            "body": "{\"name\":\"Runners\"}"
        });

        let request = ApiRequest::from_event(&event);

        assert_eq!(request.method, "POST");
        assert_eq!(request.resource, "/groups");
        assert_eq!(request.caller().unwrap().user_id, "u-2");
        let update: GroupUpdate = request.json_body().unwrap();
        assert_eq!(update.name.as_deref(), Some("Runners"));
    }

    #[test]
    fn test_missing_sub_is_unauthorized() {
        let event = json!({
            "routeKey": "GET /groups",
            "requestContext": {"authorizer": {"claims": {"name": "Ana"}}}
        });

        let error = ApiRequest::from_event(&event).caller().unwrap_err();
        assert_eq!(error.status(), 401);
    }

    #[test]
    fn test_missing_path_param() {
        let request = ApiRequest::from_event(&json!({"routeKey": "GET /groups/{groupId}"}));

        let error = request.path_param("groupId").unwrap_err();
        assert_eq!(error.status(), 400);
        assert_eq!(error.message(), "Missing path parameter: groupId");
    }

    #[test]
    fn test_json_body_variants() {
        // ボディ無しは空オブジェクト
        let request = ApiRequest::from_event(&json!({"routeKey": "PATCH /groups/{groupId}"}));
        let update: GroupUpdate = request.json_body().unwrap();
        assert!(update.is_empty());

        // 解析済みオブジェクト
        let request = ApiRequest::from_event(&json!({
            "routeKey": "PATCH /groups/{groupId}",
            "body": {"description": "weekly runs"}
        }));
        let update: GroupUpdate = request.json_body().unwrap();
        assert_eq!(update.description.as_deref(), Some("weekly runs"));

        // 不正なJSON
        let request = ApiRequest::from_event(&json!({
            "routeKey": "PATCH /groups/{groupId}",
            "body": "{not json"
        }));
        let error = request.json_body::<GroupUpdate>().unwrap_err();
        assert_eq!(error.status(), 400);
        assert!(error.message().starts_with("Validation error"));
    }
}
