/// 呼び出し元プロフィールの同期
///
/// リクエストごとに、Usersテーブルに呼び出し元のレコードが無ければ
/// 認証クレームから作成する。既存レコードは上書きしない。
use tracing::info;

use super::api_error::ApiError;
use crate::domain::timestamp::now_iso;
use crate::domain::Caller;
use crate::infrastructure::UserRepository;

pub struct UserSync<U>
where
    U: UserRepository,
{
    users: U,
    /// USER_SYNC_ENABLED
    enabled: bool,
}

impl<U> UserSync<U>
where
    U: UserRepository,
{
    pub fn new(users: U, enabled: bool) -> Self {
        Self { users, enabled }
    }

    /// 呼び出し元のプロフィールが無ければ作成
    pub async fn sync(&self, caller: &Caller) -> Result<(), ApiError> {
        if !self.enabled {
            return Ok(());
        }

        if self.users.get(&caller.user_id).await?.is_none() {
            self.users.put(&caller.to_profile(&now_iso())).await?;
            info!(user_id = %caller.user_id, "ユーザープロフィール作成");
        }

        Ok(())
    }
}
