/// グループハンドラー
///
/// グループの作成・一覧・取得・更新・削除を処理する。
/// 削除は論理削除とメンバーシップの一括削除からなる再実行可能な手順で行う。
use std::collections::HashSet;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use super::access::{load_live_group, load_profiles, require_admin};
use super::api_error::ApiError;
use super::dispatcher::RouteHandler;
use super::request::ApiRequest;
use super::response::ApiResponse;
use super::route::Route;
use crate::domain::image::object_key_from_url;
use crate::domain::timestamp::{new_id, now_iso};
use crate::domain::{
    Caller, Event, Group, GroupUpdate, ImageResource, Membership, MembershipKey,
    MembershipStatus, NewGroup, Role, StatusRequirement,
};
use crate::infrastructure::dynamo::BATCH_WRITE_SIZE;
use crate::infrastructure::{
    EventRepository, GroupRepository, ImageStorage, MembershipRepository, UserRepository,
};

/// 一覧の各グループ
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupListItem<'a> {
    #[serde(flatten)]
    group: &'a Group,
    members_count: usize,
    is_member: bool,
}

/// グループ詳細のメンバー
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MemberSummary<'a> {
    user_id: &'a str,
    role: Role,
    status: MembershipStatus,
    name: Option<&'a str>,
    picture: Option<&'a str>,
}

/// グループ詳細
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupDetail<'a> {
    #[serde(flatten)]
    group: &'a Group,
    role: Option<Role>,
    status: Option<MembershipStatus>,
    is_member: bool,
    members_count: usize,
    members: Vec<MemberSummary<'a>>,
    events: Vec<Event>,
}

/// グループ操作を処理するハンドラー
pub struct GroupHandler<G, M, E, U, S>
where
    G: GroupRepository,
    M: MembershipRepository,
    E: EventRepository,
    U: UserRepository,
    S: ImageStorage,
{
    groups: G,
    memberships: M,
    events: E,
    users: U,
    storage: S,
}

impl<G, M, E, U, S> GroupHandler<G, M, E, U, S>
where
    G: GroupRepository,
    M: MembershipRepository,
    E: EventRepository,
    U: UserRepository,
    S: ImageStorage,
{
    pub fn new(groups: G, memberships: M, events: E, users: U, storage: S) -> Self {
        Self {
            groups,
            memberships,
            events,
            users,
            storage,
        }
    }

    /// グループを作成し、作成者を管理者として登録
    ///
    /// 2つの書き込みは独立しており、メンバーシップの書き込みに失敗すると
    /// 管理者のいないグループが残る。
    pub async fn create(&self, caller: &Caller, input: NewGroup) -> Result<ApiResponse, ApiError> {
        let now = now_iso();
        let group = input.into_group(new_id(), &now)?;

        self.groups.put(&group).await?;
        let founder = Membership::founder(new_id(), &group.id, &caller.user_id, &now);
        self.memberships.put(&founder).await?;

        info!(group_id = %group.id, user_id = %caller.user_id, "グループ作成");

        Ok(ApiResponse::created(json!({
            "message": "Group created",
            "group": group,
        })))
    }

    /// アクティブなグループ一覧（メンバー数と参加状況付き）
    pub async fn list(&self, caller: &Caller) -> Result<ApiResponse, ApiError> {
        let groups: Vec<Group> = self
            .groups
            .list_active()
            .await?
            .into_iter()
            .filter(Group::is_live)
            .collect();

        let joined: HashSet<String> = self
            .memberships
            .list_by_user(&caller.user_id)
            .await?
            .into_iter()
            .filter(Membership::is_current)
            .map(|membership| membership.group_id)
            .collect();

        // グループごとに件数クエリを1回ずつ発行する
        let mut items = Vec::with_capacity(groups.len());
        for group in &groups {
            items.push(GroupListItem {
                group,
                members_count: self.memberships.count_active_by_group(&group.id).await?,
                is_member: joined.contains(&group.id),
            });
        }

        ApiResponse::json(&items)
    }

    /// グループ詳細（メンバー、イベント、呼び出し元の役割付き）
    pub async fn get(&self, caller: &Caller, group_id: &str) -> Result<ApiResponse, ApiError> {
        let group = load_live_group(&self.groups, group_id).await?;

        let memberships = self.memberships.list_by_group(group_id).await?;
        let own = memberships.iter().find(|m| m.user_id == caller.user_id);

        let current: Vec<&Membership> = memberships.iter().filter(|m| m.is_current()).collect();
        let user_ids: Vec<String> = current.iter().map(|m| m.user_id.clone()).collect();
        let profiles = load_profiles(&self.users, &user_ids).await?;

        let members = current
            .iter()
            .map(|m| {
                let profile = profiles.get(&m.user_id);
                MemberSummary {
                    user_id: &m.user_id,
                    role: m.role,
                    status: m.status,
                    name: profile.and_then(|p| p.name.as_deref()),
                    picture: profile.and_then(|p| p.picture.as_deref()),
                }
            })
            .collect();

        let detail = GroupDetail {
            group: &group,
            role: own.map(|m| m.role),
            status: own.map(|m| m.status),
            is_member: own.is_some_and(|m| m.is_current()),
            members_count: self.memberships.count_active_by_group(group_id).await?,
            members,
            events: self.events.list_by_group(group_id).await?,
        };

        ApiResponse::json(&detail)
    }

    /// グループを部分更新（管理者のみ）
    ///
    /// 画像が差し替えられる場合は、レコード更新の前に旧画像を削除する。
    pub async fn update(
        &self,
        caller: &Caller,
        group_id: &str,
        update: GroupUpdate,
    ) -> Result<ApiResponse, ApiError> {
        let mut group = load_live_group(&self.groups, group_id).await?;
        require_admin(
            &self.memberships,
            group_id,
            &caller.user_id,
            StatusRequirement::Active,
        )
        .await?;

        if update.is_empty() {
            return Err(ApiError::nothing_to_update());
        }
        update.validate()?;

        if let Some(old_url) = group.replaced_image(&update) {
            self.delete_image(old_url).await?;
        }

        group.apply_update(update, &now_iso());
        self.groups.put(&group).await?;

        info!(group_id = %group_id, "グループ更新");

        Ok(ApiResponse::ok(json!({
            "message": "Group updated",
            "group": group,
        })))
    }

    /// グループを削除
    ///
    /// 1. 論理削除し、カスケード保留フラグを立てる
    /// 2. メンバーシップを25件ずつ削除する
    /// 3. カスケード保留フラグを下ろす
    ///
    /// 2で失敗した場合はフラグが残り、同じリクエストの再実行で2から再開する。
    /// 論理削除は認可済みのため、再開時は権限チェックを行わない。
    pub async fn delete(&self, caller: &Caller, group_id: &str) -> Result<ApiResponse, ApiError> {
        let mut group = self
            .groups
            .get(group_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Group not found"))?;

        if group.is_live() {
            require_admin(
                &self.memberships,
                group_id,
                &caller.user_id,
                StatusRequirement::Active,
            )
            .await?;

            group.mark_deleted(&now_iso());
            self.groups.put(&group).await?;
            info!(group_id = %group_id, user_id = %caller.user_id, "グループ論理削除");
        } else if group.cascade_pending {
            info!(group_id = %group_id, "メンバーシップ削除を再開");
        } else {
            return Err(ApiError::not_found("Group not found"));
        }

        let purged = self.purge_memberships(group_id).await?;

        group.complete_cascade(&now_iso());
        self.groups.put(&group).await?;

        info!(group_id = %group_id, purged = purged, "グループ削除完了");
        Ok(ApiResponse::message(200, "Group deleted"))
    }

    /// グループの全メンバーシップを順番にバッチ削除し、削除件数を返す
    async fn purge_memberships(&self, group_id: &str) -> Result<usize, ApiError> {
        let keys: Vec<MembershipKey> = self
            .memberships
            .list_by_group(group_id)
            .await?
            .iter()
            .map(Membership::key)
            .collect();

        for chunk in keys.chunks(BATCH_WRITE_SIZE) {
            self.memberships.delete_batch(chunk).await?;
        }

        Ok(keys.len())
    }

    async fn delete_image(&self, image_url: &str) -> Result<(), ApiError> {
        match object_key_from_url(image_url) {
            Some(key) => Ok(self.storage.delete_object(ImageResource::Group, &key).await?),
            None => {
                warn!(image_url = %image_url, "画像URLからオブジェクトキーを取得できない");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl<G, M, E, U, S> RouteHandler for GroupHandler<G, M, E, U, S>
where
    G: GroupRepository,
    M: MembershipRepository,
    E: EventRepository,
    U: UserRepository,
    S: ImageStorage,
{
    async fn handle(
        &self,
        route: Route,
        request: &ApiRequest,
        caller: &Caller,
    ) -> Result<ApiResponse, ApiError> {
        match route {
            Route::CreateGroup => self.create(caller, request.json_body()?).await,
            Route::ListGroups => self.list(caller).await,
            Route::GetGroup => self.get(caller, request.path_param("groupId")?).await,
            Route::UpdateGroup => {
                let group_id = request.path_param("groupId")?;
                self.update(caller, group_id, request.json_body()?).await
            }
            Route::DeleteGroup => self.delete(caller, request.path_param("groupId")?).await,
            _ => Err(ApiError::route_not_found()),
        }
    }
}
