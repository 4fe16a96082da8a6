/// 呼び出し元ユーザーの参加グループ・登録イベント一覧
use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use serde::Serialize;

use super::api_error::ApiError;
use super::dispatcher::RouteHandler;
use super::request::ApiRequest;
use super::response::ApiResponse;
use super::route::Route;
use crate::domain::timestamp::now_iso;
use crate::domain::{Caller, Event, Group, Membership, MembershipStatus, Role, Schedule};
use crate::infrastructure::{
    EventRepository, GroupRepository, MembershipRepository, RegistrationRepository,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MyGroup {
    #[serde(flatten)]
    group: Group,
    role: Role,
    status: MembershipStatus,
    members_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MyEvent {
    #[serde(flatten)]
    event: Event,
    group_name: String,
}

pub struct UserHandler<G, M, E, R>
where
    G: GroupRepository,
    M: MembershipRepository,
    E: EventRepository,
    R: RegistrationRepository,
{
    groups: G,
    memberships: M,
    events: E,
    registrations: R,
}

impl<G, M, E, R> UserHandler<G, M, E, R>
where
    G: GroupRepository,
    M: MembershipRepository,
    E: EventRepository,
    R: RegistrationRepository,
{
    pub fn new(groups: G, memberships: M, events: E, registrations: R) -> Self {
        Self {
            groups,
            memberships,
            events,
            registrations,
        }
    }

    /// 参加中（承認待ちを含む）のグループ一覧
    pub async fn my_groups(&self, caller: &Caller) -> Result<ApiResponse, ApiError> {
        let memberships: HashMap<String, Membership> = self
            .memberships
            .list_by_user(&caller.user_id)
            .await?
            .into_iter()
            .filter(Membership::is_current)
            .map(|membership| (membership.group_id.clone(), membership))
            .collect();

        if memberships.is_empty() {
            return ApiResponse::json(&Vec::<MyGroup>::new());
        }

        let group_ids: Vec<String> = memberships.keys().cloned().collect();
        let mut groups: Vec<Group> = self
            .groups
            .batch_get(&group_ids)
            .await?
            .into_iter()
            .filter(Group::is_live)
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let mut items = Vec::with_capacity(groups.len());
        for group in groups {
            let Some(membership) = memberships.get(&group.id) else {
                continue;
            };
            let members_count = self.memberships.count_active_by_group(&group.id).await?;
            items.push(MyGroup {
                role: membership.role,
                status: membership.status,
                members_count,
                group,
            });
        }

        ApiResponse::json(&items)
    }

    /// 参加登録済みイベント一覧（今後と過去に分割）
    ///
    /// 削除済みのイベントや、論理削除されたグループのイベントは含めない。
    pub async fn my_events(&self, caller: &Caller) -> Result<ApiResponse, ApiError> {
        let event_ids: Vec<String> = self
            .registrations
            .list_by_user(&caller.user_id)
            .await?
            .into_iter()
            .map(|registration| registration.event_id)
            .collect();

        let events: Vec<Event> = if event_ids.is_empty() {
            Vec::new()
        } else {
            self.events
                .batch_get(&event_ids)
                .await?
                .into_iter()
                .filter(|event| event.deleted_at.is_none())
                .collect()
        };

        let group_ids: Vec<String> = events
            .iter()
            .map(|event| event.group_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let group_names: HashMap<String, String> = if group_ids.is_empty() {
            HashMap::new()
        } else {
            self.groups
                .batch_get(&group_ids)
                .await?
                .into_iter()
                .filter(Group::is_live)
                .map(|group| (group.id, group.name))
                .collect()
        };

        let items: Vec<MyEvent> = events
            .into_iter()
            .filter_map(|event| {
                let group_name = group_names.get(&event.group_id)?.clone();
                Some(MyEvent { event, group_name })
            })
            .collect();

        let schedule = Schedule::partition(items, &now_iso(), |item| item.event.date.as_str());
        ApiResponse::json(&schedule)
    }
}

#[async_trait]
impl<G, M, E, R> RouteHandler for UserHandler<G, M, E, R>
where
    G: GroupRepository,
    M: MembershipRepository,
    E: EventRepository,
    R: RegistrationRepository,
{
    async fn handle(
        &self,
        route: Route,
        _request: &ApiRequest,
        caller: &Caller,
    ) -> Result<ApiResponse, ApiError> {
        match route {
            Route::MyGroups => self.my_groups(caller).await,
            Route::MyEvents => self.my_events(caller).await,
            _ => Err(ApiError::route_not_found()),
        }
    }
}
