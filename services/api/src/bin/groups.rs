/// グループAPIハンドラー
///
/// `/groups` と `/groups/{groupId}` の作成・一覧・取得・更新・削除を処理する。
use api::application::{dispatch, respond, ApiError, GroupHandler, UserSync};
use api::infrastructure::{init_logging, AppConfig};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    // Lambda関数を初期化して実行
    let func = service_fn(handler);
    lambda_runtime::run(func).await?;
    Ok(())
}

/// Lambda関数のメインハンドラー
///
/// # 処理フロー
/// 1. 共有設定（DynamoDB/S3クライアント）を取得
/// 2. リポジトリを組み立ててGroupHandlerを作成
/// 3. ルート解決・ユーザー同期を経てハンドラーに委譲
async fn handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let config = match AppConfig::shared().await {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "設定の読み込みに失敗");
            return Ok(respond(Err(ApiError::from(err))));
        }
    };

    let handler = GroupHandler::new(
        config.group_repository(),
        config.membership_repository(),
        config.event_repository(),
        config.user_repository(),
        config.image_storage(),
    );
    let user_sync = UserSync::new(config.user_repository(), config.user_sync_enabled());

    Ok(dispatch(&handler, &user_sync, &event.payload)
        .await
        .into_lambda())
}
