//! グループメンバーシップのデータモデルと状態遷移
//!
//! (groupId, userId) ごとに最大1レコード。参加・退会・再参加を
//! 繰り返してもレコードは上書きされ、重複しない。

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::group::{Group, GroupType};

/// グループ内の役割
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Participant,
}

/// メンバーシップの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Active,
    /// 非公開グループで管理者の承認待ち
    Pending,
    /// 退会済み、または管理者により除名済み
    Inactive,
}

impl MembershipStatus {
    /// 参加時の初期状態をグループの公開種別から決定
    pub fn for_join(group_type: GroupType) -> Self {
        match group_type {
            GroupType::Open => MembershipStatus::Active,
            GroupType::Closed => MembershipStatus::Pending,
        }
    }
}

/// メンバーシップの一意キー
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MembershipKey {
    pub group_id: String,
    pub user_id: String,
}

/// メンバーシップレコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: String,
    pub group_id: String,
    pub user_id: String,
    pub role: Role,
    pub status: MembershipStatus,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// メンバーシップ状態遷移のエラー
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MembershipError {
    /// 既に有効（または承認待ち）のメンバーシップが存在する
    #[error("Already a member")]
    AlreadyMember,
}

impl Membership {
    /// グループ作成者を管理者として登録するメンバーシップを生成
    pub fn founder(id: String, group_id: &str, user_id: &str, now: &str) -> Self {
        Self {
            id,
            group_id: group_id.to_string(),
            user_id: user_id.to_string(),
            role: Role::Admin,
            status: MembershipStatus::Active,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    /// 参加リクエストを処理
    ///
    /// 既存レコードが退会済み（inactive）の場合は同じIDと作成日時のまま上書きし、
    /// それ以外の既存レコードがある場合は`AlreadyMember`を返す。
    pub fn join(
        existing: Option<&Membership>,
        group: &Group,
        user_id: &str,
        new_id: String,
        now: &str,
    ) -> Result<Self, MembershipError> {
        let (id, created_at) = match existing {
            Some(current) if current.is_current() => return Err(MembershipError::AlreadyMember),
            Some(current) => (current.id.clone(), current.created_at.clone()),
            None => (new_id, now.to_string()),
        };

        Ok(Self {
            id,
            group_id: group.id.clone(),
            user_id: user_id.to_string(),
            role: Role::Participant,
            status: MembershipStatus::for_join(group.group_type),
            created_at,
            updated_at: now.to_string(),
        })
    }

    /// 退会（レコードは再参加と監査のため保持する）
    pub fn leave(&mut self, now: &str) {
        self.status = MembershipStatus::Inactive;
        self.updated_at = now.to_string();
    }

    /// 退会済みでないか（active または pending）
    pub fn is_current(&self) -> bool {
        self.status != MembershipStatus::Inactive
    }

    pub fn key(&self) -> MembershipKey {
        MembershipKey {
            group_id: self.group_id.clone(),
            user_id: self.user_id.clone(),
        }
    }
}

/// 管理者による操作の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipAction {
    /// 除名（status を inactive にする省略形）
    Remove,
}

/// 管理者によるメンバーシップ変更リクエスト
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MembershipChange {
    #[serde(default)]
    pub status: Option<MembershipStatus>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub action: Option<MembershipAction>,
}

impl MembershipChange {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.role.is_none() && self.action.is_none()
    }

    /// 変更を適用（`remove` は status 指定より優先する）
    pub fn apply(&self, membership: &mut Membership, now: &str) {
        if let Some(status) = self.status {
            membership.status = status;
        }
        if let Some(role) = self.role {
            membership.role = role;
        }
        if self.action == Some(MembershipAction::Remove) {
            membership.status = MembershipStatus::Inactive;
        }
        membership.updated_at = now.to_string();
    }
}
