/// メンバーシップAPIハンドラー
///
/// グループへの参加・退会、メンバー一覧、管理者によるメンバーシップ変更を処理する。
use api::application::{dispatch, respond, ApiError, MembershipHandler, UserSync};
use api::infrastructure::{init_logging, AppConfig};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();

    let func = service_fn(handler);
    lambda_runtime::run(func).await?;
    Ok(())
}

async fn handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let config = match AppConfig::shared().await {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "設定の読み込みに失敗");
            return Ok(respond(Err(ApiError::from(err))));
        }
    };

    let handler = MembershipHandler::new(
        config.group_repository(),
        config.membership_repository(),
        config.user_repository(),
    );
    let user_sync = UserSync::new(config.user_repository(), config.user_sync_enabled());

    Ok(dispatch(&handler, &user_sync, &event.payload)
        .await
        .into_lambda())
}
