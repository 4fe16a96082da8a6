// 認可判定
//
// グループの変更権限は (グループ, 要求ユーザーのメンバーシップ) から
// 純粋関数として判定する。状態の要件は呼び出し側が明示的に指定する。

use super::membership::{Membership, MembershipStatus, Role};

/// 管理者判定に要求するメンバーシップ状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusRequirement {
    /// 役割のみを確認し、状態は問わない
    Any,
    /// 状態が active であることも要求する
    Active,
}

/// メンバーシップが管理者権限を持つか判定
///
/// メンバーシップが存在しない場合は常にfalse。
pub fn is_admin_member(membership: Option<&Membership>, requirement: StatusRequirement) -> bool {
    let Some(membership) = membership else {
        return false;
    };

    if membership.role != Role::Admin {
        return false;
    }

    match requirement {
        StatusRequirement::Any => true,
        StatusRequirement::Active => membership.status == MembershipStatus::Active,
    }
}

/// 有効な（active）メンバーか判定
pub fn is_active_member(membership: Option<&Membership>) -> bool {
    membership.is_some_and(|m| m.status == MembershipStatus::Active)
}
