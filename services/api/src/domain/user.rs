// ユーザープロフィールと呼び出し元の識別情報

use serde::{Deserialize, Serialize};

/// Usersテーブルに保存されるプロフィール
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

/// 上流の認証基盤が検証済みのクレームから得た呼び出し元
#[derive(Debug, Clone, PartialEq)]
pub struct Caller {
    /// `sub` クレーム
    pub user_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub picture: Option<String>,
}

impl Caller {
    /// 識別情報のみの呼び出し元を作成
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: None,
            email: None,
            picture: None,
        }
    }

    /// クレームからプロフィールを作成
    pub fn to_profile(&self, now: &str) -> UserProfile {
        UserProfile {
            id: self.user_id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            picture: self.picture.clone(),
            created_at: now.to_string(),
        }
    }
}
