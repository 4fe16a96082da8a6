/// イベント参加登録ハンドラー
use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use super::access::{load_group_event, load_live_group};
use super::api_error::ApiError;
use super::dispatcher::RouteHandler;
use super::request::ApiRequest;
use super::response::ApiResponse;
use super::route::Route;
use crate::domain::timestamp::{new_id, now_iso};
use crate::domain::{Caller, Registration};
use crate::infrastructure::{EventRepository, GroupRepository, RegistrationRepository};

pub struct RegistrationHandler<G, E, R>
where
    G: GroupRepository,
    E: EventRepository,
    R: RegistrationRepository,
{
    groups: G,
    events: E,
    registrations: R,
}

impl<G, E, R> RegistrationHandler<G, E, R>
where
    G: GroupRepository,
    E: EventRepository,
    R: RegistrationRepository,
{
    pub fn new(groups: G, events: E, registrations: R) -> Self {
        Self {
            groups,
            events,
            registrations,
        }
    }

    /// イベントに参加登録（1ユーザー1イベントにつき1件）
    pub async fn register(
        &self,
        caller: &Caller,
        group_id: &str,
        event_id: &str,
    ) -> Result<ApiResponse, ApiError> {
        load_live_group(&self.groups, group_id).await?;
        load_group_event(&self.events, group_id, event_id).await?;

        if self
            .registrations
            .get(&caller.user_id, event_id)
            .await?
            .is_some()
        {
            return Err(ApiError::bad_request("Already registered"));
        }

        let registration = Registration::new(new_id(), &caller.user_id, event_id, &now_iso());
        self.registrations.put(&registration).await?;

        info!(event_id = %event_id, user_id = %caller.user_id, "参加登録");

        Ok(ApiResponse::created(json!({
            "message": "Registration created",
            "registration": registration,
        })))
    }

    /// 参加登録を取り消す（物理削除）
    pub async fn unregister(
        &self,
        caller: &Caller,
        group_id: &str,
        event_id: &str,
    ) -> Result<ApiResponse, ApiError> {
        load_live_group(&self.groups, group_id).await?;
        load_group_event(&self.events, group_id, event_id).await?;

        if self
            .registrations
            .get(&caller.user_id, event_id)
            .await?
            .is_none()
        {
            return Err(ApiError::not_found("Registration not found"));
        }

        self.registrations.delete(&caller.user_id, event_id).await?;

        info!(event_id = %event_id, user_id = %caller.user_id, "参加登録取り消し");
        Ok(ApiResponse::message(200, "Registration cancelled"))
    }
}

#[async_trait]
impl<G, E, R> RouteHandler for RegistrationHandler<G, E, R>
where
    G: GroupRepository,
    E: EventRepository,
    R: RegistrationRepository,
{
    async fn handle(
        &self,
        route: Route,
        request: &ApiRequest,
        caller: &Caller,
    ) -> Result<ApiResponse, ApiError> {
        let register = match route {
            Route::Register => true,
            Route::Unregister => false,
            _ => return Err(ApiError::route_not_found()),
        };

        let group_id = request.path_param("groupId")?;
        let event_id = request.path_param("eventId")?;

        if register {
            self.register(caller, group_id, event_id).await
        } else {
            self.unregister(caller, group_id, event_id).await
        }
    }
}
