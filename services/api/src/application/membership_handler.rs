/// メンバーシップハンドラー
///
/// 参加・退会・メンバー一覧・管理者によるメンバーシップ変更を処理する。
use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use super::access::{load_live_group, load_profiles, require_admin};
use super::api_error::ApiError;
use super::dispatcher::RouteHandler;
use super::request::ApiRequest;
use super::response::ApiResponse;
use super::route::Route;
use crate::domain::timestamp::{new_id, now_iso};
use crate::domain::{
    Caller, GroupType, Membership, MembershipChange, MembershipStatus, Role, StatusRequirement,
};
use crate::infrastructure::{GroupRepository, MembershipRepository, UserRepository};

/// メンバー一覧の各エントリ
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MemberEntry {
    user_id: String,
    role: Role,
    status: MembershipStatus,
    name: Option<String>,
    email: Option<String>,
    picture: Option<String>,
    joined_at: String,
}

/// メンバー一覧
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct MemberList {
    active: Vec<MemberEntry>,
    pending: Vec<MemberEntry>,
    is_closed: bool,
}

pub struct MembershipHandler<G, M, U>
where
    G: GroupRepository,
    M: MembershipRepository,
    U: UserRepository,
{
    groups: G,
    memberships: M,
    users: U,
}

impl<G, M, U> MembershipHandler<G, M, U>
where
    G: GroupRepository,
    M: MembershipRepository,
    U: UserRepository,
{
    pub fn new(groups: G, memberships: M, users: U) -> Self {
        Self {
            groups,
            memberships,
            users,
        }
    }

    /// グループに参加
    ///
    /// 公開グループは即時active、非公開グループはpendingで登録する。
    pub async fn join(&self, caller: &Caller, group_id: &str) -> Result<ApiResponse, ApiError> {
        let group = load_live_group(&self.groups, group_id).await?;
        let existing = self.memberships.get(group_id, &caller.user_id).await?;

        let membership = Membership::join(
            existing.as_ref(),
            &group,
            &caller.user_id,
            new_id(),
            &now_iso(),
        )?;

        self.memberships.put(&membership).await?;

        info!(
            group_id = %group_id,
            user_id = %caller.user_id,
            status = ?membership.status,
            "グループ参加"
        );

        ApiResponse::json(&membership)
    }

    /// グループから退会（レコードはinactiveとして残す）
    pub async fn leave(&self, caller: &Caller, group_id: &str) -> Result<ApiResponse, ApiError> {
        load_live_group(&self.groups, group_id).await?;

        let mut membership = self
            .memberships
            .get(group_id, &caller.user_id)
            .await?
            .filter(Membership::is_current)
            .ok_or_else(|| ApiError::not_found("Membership not found"))?;

        membership.leave(&now_iso());
        self.memberships.put(&membership).await?;

        info!(group_id = %group_id, user_id = %caller.user_id, "グループ退会");
        Ok(ApiResponse::message(200, "Successfully left the group"))
    }

    /// メンバー一覧（承認待ちと参加中に分ける）
    pub async fn list(&self, group_id: &str) -> Result<ApiResponse, ApiError> {
        let group = load_live_group(&self.groups, group_id).await?;

        let memberships: Vec<Membership> = self
            .memberships
            .list_by_group(group_id)
            .await?
            .into_iter()
            .filter(Membership::is_current)
            .collect();

        let user_ids: Vec<String> = memberships.iter().map(|m| m.user_id.clone()).collect();
        let mut profiles = load_profiles(&self.users, &user_ids).await?;

        let mut list = MemberList {
            is_closed: group.group_type == GroupType::Closed,
            ..Default::default()
        };

        for membership in memberships {
            // プロフィール未作成のユーザーは表示しない
            let Some(profile) = profiles.remove(&membership.user_id) else {
                continue;
            };

            let entry = MemberEntry {
                user_id: membership.user_id,
                role: membership.role,
                status: membership.status,
                name: profile.name,
                email: profile.email,
                picture: profile.picture,
                joined_at: membership.created_at,
            };

            match entry.status {
                MembershipStatus::Pending => list.pending.push(entry),
                _ => list.active.push(entry),
            }
        }

        ApiResponse::json(&list)
    }

    /// 管理者による役割・状態の変更
    pub async fn update(
        &self,
        caller: &Caller,
        group_id: &str,
        user_id: &str,
        change: MembershipChange,
    ) -> Result<ApiResponse, ApiError> {
        load_live_group(&self.groups, group_id).await?;
        require_admin(
            &self.memberships,
            group_id,
            &caller.user_id,
            StatusRequirement::Active,
        )
        .await?;

        let mut membership = self
            .memberships
            .get(group_id, user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Membership not found"))?;

        if change.is_empty() {
            return Err(ApiError::bad_request(
                "At least one of status, role or action is required",
            ));
        }

        change.apply(&mut membership, &now_iso());
        self.memberships.put(&membership).await?;

        info!(
            group_id = %group_id,
            user_id = %user_id,
            role = ?membership.role,
            status = ?membership.status,
            updated_by = %caller.user_id,
            "メンバーシップ更新"
        );

        ApiResponse::json(&membership)
    }
}

#[async_trait]
impl<G, M, U> RouteHandler for MembershipHandler<G, M, U>
where
    G: GroupRepository,
    M: MembershipRepository,
    U: UserRepository,
{
    async fn handle(
        &self,
        route: Route,
        request: &ApiRequest,
        caller: &Caller,
    ) -> Result<ApiResponse, ApiError> {
        match route {
            Route::JoinGroup => self.join(caller, request.path_param("groupId")?).await,
            Route::LeaveGroup => self.leave(caller, request.path_param("groupId")?).await,
            Route::ListMembers => self.list(request.path_param("groupId")?).await,
            Route::UpdateMembership => {
                let group_id = request.path_param("groupId")?;
                let user_id = request.path_param("userId")?;
                self.update(caller, group_id, user_id, request.json_body()?)
                    .await
            }
            _ => Err(ApiError::route_not_found()),
        }
    }
}
