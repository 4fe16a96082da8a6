/// ハンドラー共通の読み込みと権限チェック
///
/// 存在しない・論理削除済みのリソースは404、権限不足は403に変換する。
use std::collections::HashMap;

use tracing::warn;

use super::api_error::ApiError;
use crate::domain::{is_admin_member, Event, Group, Membership, StatusRequirement, UserProfile};
use crate::infrastructure::{EventRepository, GroupRepository, MembershipRepository, UserRepository};

/// 論理削除されていないグループを読み込む
pub async fn load_live_group<G: GroupRepository>(
    groups: &G,
    group_id: &str,
) -> Result<Group, ApiError> {
    match groups.get(group_id).await? {
        Some(group) if group.is_live() => Ok(group),
        _ => Err(ApiError::not_found("Group not found")),
    }
}

/// パスのグループに属するイベントを読み込む
pub async fn load_group_event<E: EventRepository>(
    events: &E,
    group_id: &str,
    event_id: &str,
) -> Result<Event, ApiError> {
    match events.get(event_id).await? {
        Some(event) if event.is_live_in(group_id) => Ok(event),
        _ => Err(ApiError::not_found("Event not found")),
    }
}

/// 呼び出し元がグループの管理者であることを確認
pub async fn require_admin<M: MembershipRepository>(
    memberships: &M,
    group_id: &str,
    user_id: &str,
    requirement: StatusRequirement,
) -> Result<Membership, ApiError> {
    match memberships.get(group_id, user_id).await? {
        Some(membership) if is_admin_member(Some(&membership), requirement) => Ok(membership),
        _ => {
            warn!(group_id = %group_id, user_id = %user_id, "管理者権限なし");
            Err(ApiError::forbidden("Only group admins can perform this action"))
        }
    }
}

/// ユーザープロフィールをIDで引けるように読み込む
pub async fn load_profiles<U: UserRepository>(
    users: &U,
    user_ids: &[String],
) -> Result<HashMap<String, UserProfile>, ApiError> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let profiles = users.batch_get(user_ids).await?;
    Ok(profiles
        .into_iter()
        .map(|profile| (profile.id.clone(), profile))
        .collect())
}
