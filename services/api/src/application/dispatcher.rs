/// リクエストのディスパッチ
///
/// プロキシイベントを解析し、ルート解決・認証・ユーザー同期を行ってから
/// 各Lambdaのハンドラーに処理を委譲する。
use async_trait::async_trait;
use serde_json::Value;
use tracing::{error, info, info_span, warn, Instrument};

use super::api_error::ApiError;
use super::request::ApiRequest;
use super::response::ApiResponse;
use super::route::Route;
use super::user_sync::UserSync;
use crate::domain::Caller;
use crate::infrastructure::UserRepository;

/// ルートごとの処理を提供するハンドラー
#[async_trait]
pub trait RouteHandler: Send + Sync {
    /// 担当外のルートには`ApiError::route_not_found()`を返す
    async fn handle(
        &self,
        route: Route,
        request: &ApiRequest,
        caller: &Caller,
    ) -> Result<ApiResponse, ApiError>;
}

/// プロキシイベントを処理してレスポンスを返す
pub async fn dispatch<H, U>(handler: &H, user_sync: &UserSync<U>, event: &Value) -> ApiResponse
where
    H: RouteHandler,
    U: UserRepository,
{
    let request = ApiRequest::from_event(event);
    let route_key = request.route_key();
    let user_id = request
        .caller
        .as_ref()
        .map(|caller| caller.user_id.clone())
        .unwrap_or_default();

    let span = info_span!("request", route = %route_key, user_id = %user_id);

    async {
        let result = process(handler, user_sync, &request).await;

        match &result {
            Ok(response) => info!(status = response.status, "リクエスト処理完了"),
            Err(err) if err.status() >= 500 => {
                error!(status = err.status(), error = %err, "リクエスト処理失敗")
            }
            Err(err) if err.status() == 401 || err.status() == 403 => {
                warn!(status = err.status(), error = %err, "アクセス拒否")
            }
            Err(err) => info!(status = err.status(), error = %err, "リクエスト拒否"),
        }

        result.unwrap_or_else(ApiResponse::from)
    }
    .instrument(span)
    .await
}

async fn process<H, U>(
    handler: &H,
    user_sync: &UserSync<U>,
    request: &ApiRequest,
) -> Result<ApiResponse, ApiError>
where
    H: RouteHandler,
    U: UserRepository,
{
    let route = Route::from_request(request).ok_or_else(ApiError::route_not_found)?;
    let caller = request.caller()?;

    info!(route = ?route, mutation = route.is_mutation(), "リクエスト受信");

    user_sync.sync(caller).await?;
    handler.handle(route, request, caller).await
}
