/// イベントハンドラー
///
/// グループ内イベントの作成・一覧・取得・更新・削除を処理する。
/// 作成・更新・削除はグループのアクティブな管理者のみが行える。
use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use super::access::{load_group_event, load_live_group, load_profiles, require_admin};
use super::api_error::ApiError;
use super::dispatcher::RouteHandler;
use super::request::ApiRequest;
use super::response::ApiResponse;
use super::route::Route;
use crate::domain::image::object_key_from_url;
use crate::domain::timestamp::{new_id, now_iso};
use crate::domain::{
    Caller, Event, EventUpdate, ImageResource, NewEvent, Schedule, StatusRequirement,
};
use crate::infrastructure::{
    EventRepository, GroupRepository, ImageStorage, MembershipRepository,
    RegistrationRepository, UserRepository,
};

/// イベント詳細の参加者
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Attendee {
    user_id: String,
    name: Option<String>,
    picture: Option<String>,
    registered_at: String,
}

/// イベント詳細
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventDetail {
    #[serde(flatten)]
    event: Event,
    is_registered: bool,
    registrations_count: usize,
    registrations: Vec<Attendee>,
}

pub struct EventHandler<G, M, E, R, U, S>
where
    G: GroupRepository,
    M: MembershipRepository,
    E: EventRepository,
    R: RegistrationRepository,
    U: UserRepository,
    S: ImageStorage,
{
    groups: G,
    memberships: M,
    events: E,
    registrations: R,
    users: U,
    storage: S,
}

impl<G, M, E, R, U, S> EventHandler<G, M, E, R, U, S>
where
    G: GroupRepository,
    M: MembershipRepository,
    E: EventRepository,
    R: RegistrationRepository,
    U: UserRepository,
    S: ImageStorage,
{
    pub fn new(groups: G, memberships: M, events: E, registrations: R, users: U, storage: S) -> Self {
        Self {
            groups,
            memberships,
            events,
            registrations,
            users,
            storage,
        }
    }

    /// イベントを作成（管理者のみ）
    pub async fn create(
        &self,
        caller: &Caller,
        group_id: &str,
        input: NewEvent,
    ) -> Result<ApiResponse, ApiError> {
        load_live_group(&self.groups, group_id).await?;
        require_admin(
            &self.memberships,
            group_id,
            &caller.user_id,
            StatusRequirement::Active,
        )
        .await?;

        let event = input.into_event(new_id(), group_id, &now_iso())?;
        self.events.put(&event).await?;

        info!(group_id = %group_id, event_id = %event.id, "イベント作成");

        Ok(ApiResponse::created(json!({
            "message": "Event created",
            "event": event,
        })))
    }

    /// グループのイベント一覧（今後と過去に分割）
    pub async fn list(&self, group_id: &str) -> Result<ApiResponse, ApiError> {
        load_live_group(&self.groups, group_id).await?;

        let events: Vec<Event> = self
            .events
            .list_by_group(group_id)
            .await?
            .into_iter()
            .filter(|event| event.is_live_in(group_id))
            .collect();

        let schedule = Schedule::partition(events, &now_iso(), |event| event.date.as_str());
        ApiResponse::json(&schedule)
    }

    /// イベント詳細（参加登録者付き）
    pub async fn get(
        &self,
        caller: &Caller,
        group_id: &str,
        event_id: &str,
    ) -> Result<ApiResponse, ApiError> {
        load_live_group(&self.groups, group_id).await?;
        let event = load_group_event(&self.events, group_id, event_id).await?;

        let registrations = self.registrations.list_by_event(event_id).await?;
        let user_ids: Vec<String> = registrations.iter().map(|r| r.user_id.clone()).collect();
        let mut profiles = load_profiles(&self.users, &user_ids).await?;

        let is_registered = registrations.iter().any(|r| r.user_id == caller.user_id);
        let attendees: Vec<Attendee> = registrations
            .into_iter()
            .map(|registration| {
                let profile = profiles.remove(&registration.user_id);
                Attendee {
                    name: profile.as_ref().and_then(|p| p.name.clone()),
                    picture: profile.and_then(|p| p.picture),
                    user_id: registration.user_id,
                    registered_at: registration.created_at,
                }
            })
            .collect();

        ApiResponse::json(&EventDetail {
            event,
            is_registered,
            registrations_count: attendees.len(),
            registrations: attendees,
        })
    }

    /// イベントを部分更新（管理者のみ）
    pub async fn update(
        &self,
        caller: &Caller,
        group_id: &str,
        event_id: &str,
        update: EventUpdate,
    ) -> Result<ApiResponse, ApiError> {
        load_live_group(&self.groups, group_id).await?;
        require_admin(
            &self.memberships,
            group_id,
            &caller.user_id,
            StatusRequirement::Active,
        )
        .await?;
        let mut event = load_group_event(&self.events, group_id, event_id).await?;

        if update.is_empty() {
            return Err(ApiError::nothing_to_update());
        }
        update.validate()?;
        if let Some(old_url) = event.replaced_image(&update) {
            self.delete_image(old_url).await?;
        }

        event.apply_update(update, &now_iso())?;
        self.events.put(&event).await?;

        info!(group_id = %group_id, event_id = %event_id, "イベント更新");

        Ok(ApiResponse::ok(json!({
            "message": "Event updated",
            "event": event,
        })))
    }

    /// イベントを削除（管理者のみ、物理削除）
    pub async fn delete(
        &self,
        caller: &Caller,
        group_id: &str,
        event_id: &str,
    ) -> Result<ApiResponse, ApiError> {
        load_live_group(&self.groups, group_id).await?;
        require_admin(
            &self.memberships,
            group_id,
            &caller.user_id,
            StatusRequirement::Active,
        )
        .await?;
        load_group_event(&self.events, group_id, event_id).await?;

        self.events.delete(event_id).await?;

        info!(
            group_id = %group_id,
            event_id = %event_id,
            deleted_by = %caller.user_id,
            "イベント削除"
        );
        Ok(ApiResponse::message(200, "Event deleted"))
    }

    async fn delete_image(&self, image_url: &str) -> Result<(), ApiError> {
        match object_key_from_url(image_url) {
            Some(key) => Ok(self.storage.delete_object(ImageResource::Event, &key).await?),
            None => {
                warn!(image_url = %image_url, "画像URLからオブジェクトキーを取得できない");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl<G, M, E, R, U, S> RouteHandler for EventHandler<G, M, E, R, U, S>
where
    G: GroupRepository,
    M: MembershipRepository,
    E: EventRepository,
    R: RegistrationRepository,
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
            Route::CreateEvent => {
                let group_id = request.path_param("groupId")?;
                self.create(caller, group_id, request.json_body()?).await
            }
            Route::ListEvents => self.list(request.path_param("groupId")?).await,
            Route::GetEvent => {
                let group_id = request.path_param("groupId")?;
                let event_id = request.path_param("eventId")?;
                self.get(caller, group_id, event_id).await
            }
            Route::UpdateEvent => {
                let group_id = request.path_param("groupId")?;
                let event_id = request.path_param("eventId")?;
                self.update(caller, group_id, event_id, request.json_body()?)
                    .await
            }
            Route::DeleteEvent => {
                let group_id = request.path_param("groupId")?;
                let event_id = request.path_param("eventId")?;
                self.delete(caller, group_id, event_id).await
            }
            _ => Err(ApiError::route_not_found()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::World;
    use crate::domain::event::tests::sample_event;
    use crate::domain::group::tests::sample_group;
    use crate::domain::membership::tests::sample_membership;
    use crate::domain::{GroupType, MembershipStatus, Registration, Role, UserProfile};

    fn caller(user_id: &str) -> Caller {
        Caller::new(user_id)
    }

    /// 管理者u-admin、一般メンバーu-member、イベントe-1を持つグループ
    fn seeded_world() -> World {
        let world = World::new();
        world.groups.insert(sample_group("g-1", GroupType::Open));
        world.memberships.insert(sample_membership(
            "g-1",
            "u-admin",
            Role::Admin,
            MembershipStatus::Active,
        ));
        world.memberships.insert(sample_membership(
            "g-1",
            "u-member",
            Role::Participant,
            MembershipStatus::Active,
        ));
        world
            .events
            .insert(sample_event("e-1", "g-1", "2030-01-01T09:00:00.000Z"));
        world
    }

    #[tokio::test]
    async fn test_create_event_normalizes_date() {
        let world = seeded_world();
        let input: NewEvent = serde_json::from_value(json!({
            "name": "Long run",
            "date": "2030-05-01T09:00:00+02:00",
            "groupId": "ignored"
        }))
        .unwrap();

        let response = world
            .event_handler()
            .create(&caller("u-admin"), "g-1", input)
            .await
            .unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.body["message"], "Event created");
        assert_eq!(response.body["event"]["groupId"], "g-1");
        assert_eq!(response.body["event"]["date"], "2030-05-01T07:00:00.000Z");
        assert_eq!(world.events.event_count(), 2);
    }

    #[tokio::test]
    async fn test_create_event_requires_admin() {
        let world = seeded_world();
        let input: NewEvent =
            serde_json::from_value(json!({"name": "Long run", "date": "2030-05-01T07:00:00Z"}))
                .unwrap();

        let error = world
            .event_handler()
            .create(&caller("u-member"), "g-1", input)
            .await
            .unwrap_err();

        assert_eq!(error.status(), 403);
        assert_eq!(error.message(), "Only group admins can perform this action");
        assert_eq!(world.events.event_count(), 1);
    }

    #[tokio::test]
    async fn test_create_event_invalid_date() {
        let world = seeded_world();
        let input: NewEvent =
            serde_json::from_value(json!({"name": "Long run", "date": "next friday"})).unwrap();

        let error = world
            .event_handler()
            .create(&caller("u-admin"), "g-1", input)
            .await
            .unwrap_err();

        assert_eq!(error.status(), 400);
        assert!(error.message().starts_with("Validation error"));
    }

    #[tokio::test]
    async fn test_list_splits_upcoming_and_past() {
        let world = seeded_world();
        world
            .events
            .insert(sample_event("e-2", "g-1", "2031-01-01T09:00:00.000Z"));
        world
            .events
            .insert(sample_event("e-old", "g-1", "2020-01-01T09:00:00.000Z"));
        world
            .events
            .insert(sample_event("e-other", "g-2", "2030-01-01T09:00:00.000Z"));

        let response = world.event_handler().list("g-1").await.unwrap();
        let upcoming: Vec<&str> = response.body["upcoming"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["id"].as_str().unwrap())
            .collect();

        assert_eq!(upcoming, vec!["e-1", "e-2"]);
        assert_eq!(response.body["past"][0]["id"], "e-old");
    }

    #[tokio::test]
    async fn test_get_event_with_registrations() {
        let world = seeded_world();
        world.registrations.insert(Registration::new(
            "r-1".to_string(),
            "u-member",
            "e-1",
            "2025-03-01T00:00:00.000Z",
        ));
        world.users.insert(UserProfile {
            id: "u-member".to_string(),
            name: Some("Mia".to_string()),
            email: None,
            picture: None,
            created_at: "2025-01-01T00:00:00.000Z".to_string(),
        });

        let response = world
            .event_handler()
            .get(&caller("u-member"), "g-1", "e-1")
            .await
            .unwrap();
        let body = response.body;

        assert_eq!(body["id"], "e-1");
        assert_eq!(body["isRegistered"], true);
        assert_eq!(body["registrationsCount"], 1);
        assert_eq!(body["registrations"][0]["name"], "Mia");
        assert_eq!(
            body["registrations"][0]["registeredAt"],
            "2025-03-01T00:00:00.000Z"
        );
    }

    #[tokio::test]
    async fn test_get_event_of_another_group() {
        let world = seeded_world();
        world.groups.insert(sample_group("g-2", GroupType::Open));

        let error = world
            .event_handler()
            .get(&caller("u-member"), "g-2", "e-1")
            .await
            .unwrap_err();

        assert_eq!(error.status(), 404);
        assert_eq!(error.message(), "Event not found");
    }

    #[tokio::test]
    async fn test_update_with_empty_body() {
        let world = seeded_world();

        let error = world
            .event_handler()
            .update(&caller("u-admin"), "g-1", "e-1", EventUpdate::default())
            .await
            .unwrap_err();

        assert_eq!(error.status(), 400);
        assert_eq!(error.message(), "Nothing to update");
    }

    #[tokio::test]
    async fn test_update_with_empty_body_on_missing_event() {
        let world = seeded_world();

        let error = world
            .event_handler()
            .update(&caller("u-admin"), "g-1", "e-missing", EventUpdate::default())
            .await
            .unwrap_err();

        assert_eq!(error.status(), 404);
    }

    #[tokio::test]
    async fn test_update_location_only() {
        let world = seeded_world();
        let before = world.events.get_event("e-1").unwrap();
        let update = EventUpdate {
            location: Some("Riverside".to_string()),
            ..Default::default()
        };

        let response = world
            .event_handler()
            .update(&caller("u-admin"), "g-1", "e-1", update)
            .await
            .unwrap();

        assert_eq!(response.body["message"], "Event updated");
        let after = world.events.get_event("e-1").unwrap();
        assert_eq!(after.location.as_deref(), Some("Riverside"));
        assert_eq!(after.name, before.name);
        assert_eq!(after.date, before.date);
        assert_ne!(after.updated_at, before.updated_at);
    }

    #[tokio::test]
    async fn test_update_replaces_image() {
        let world = seeded_world();
        world.events.insert(Event {
            image_url: Some("https://event-images.s3.amazonaws.com/event/old.webp".to_string()),
            ..sample_event("e-1", "g-1", "2030-01-01T09:00:00.000Z")
        });
        let update = EventUpdate {
            image_url: Some("https://event-images.s3.amazonaws.com/event/new.webp".to_string()),
            ..Default::default()
        };

        world
            .event_handler()
            .update(&caller("u-admin"), "g-1", "e-1", update)
            .await
            .unwrap();

        assert_eq!(
            world.storage.deleted(),
            vec![(ImageResource::Event, "event/old.webp".to_string())]
        );
    }

    #[tokio::test]
    async fn test_delete_event() {
        let world = seeded_world();

        let error = world
            .event_handler()
            .delete(&caller("u-member"), "g-1", "e-1")
            .await
            .unwrap_err();
        assert_eq!(error.status(), 403);

        let response = world
            .event_handler()
            .delete(&caller("u-admin"), "g-1", "e-1")
            .await
            .unwrap();
        assert_eq!(response.body["message"], "Event deleted");
        assert_eq!(world.events.event_count(), 0);

        let error = world
            .event_handler()
            .delete(&caller("u-admin"), "g-1", "e-1")
            .await
            .unwrap_err();
        assert_eq!(error.status(), 404);
    }
}
