//! ハンドラーテスト用のモック一式とイベント生成

use serde_json::{json, Map, Value};

use super::event_handler::EventHandler;
use super::group_handler::GroupHandler;
use super::membership_handler::MembershipHandler;
use super::registration_handler::RegistrationHandler;
use super::training_handler::TrainingHandler;
use super::upload_handler::UploadHandler;
use super::user_handler::UserHandler;
use super::user_sync::UserSync;
use crate::infrastructure::event_repository::tests::MockEventRepository;
use crate::infrastructure::group_repository::tests::MockGroupRepository;
use crate::infrastructure::image_storage::tests::MockImageStorage;
use crate::infrastructure::membership_repository::tests::MockMembershipRepository;
use crate::infrastructure::performance_repository::tests::MockPerformanceRepository;
use crate::infrastructure::registration_repository::tests::MockRegistrationRepository;
use crate::infrastructure::training_repository::tests::MockTrainingRepository;
use crate::infrastructure::user_repository::tests::MockUserRepository;

/// 全テーブルとバケットのモック
///
/// モックは内部状態を共有するため、ハンドラーを複数作っても同じデータを参照する。
#[derive(Debug, Clone, Default)]
pub struct World {
    pub groups: MockGroupRepository,
    pub memberships: MockMembershipRepository,
    pub events: MockEventRepository,
    pub registrations: MockRegistrationRepository,
    pub users: MockUserRepository,
    pub trainings: MockTrainingRepository,
    pub performances: MockPerformanceRepository,
    pub storage: MockImageStorage,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group_handler(
        &self,
    ) -> GroupHandler<
        MockGroupRepository,
        MockMembershipRepository,
        MockEventRepository,
        MockUserRepository,
        MockImageStorage,
    > {
        GroupHandler::new(
            self.groups.clone(),
            self.memberships.clone(),
            self.events.clone(),
            self.users.clone(),
            self.storage.clone(),
        )
    }

    pub fn membership_handler(
        &self,
    ) -> MembershipHandler<MockGroupRepository, MockMembershipRepository, MockUserRepository> {
        MembershipHandler::new(
            self.groups.clone(),
            self.memberships.clone(),
            self.users.clone(),
        )
    }

    pub fn event_handler(
        &self,
    ) -> EventHandler<
        MockGroupRepository,
        MockMembershipRepository,
        MockEventRepository,
        MockRegistrationRepository,
        MockUserRepository,
        MockImageStorage,
    > {
        EventHandler::new(
            self.groups.clone(),
            self.memberships.clone(),
            self.events.clone(),
            self.registrations.clone(),
            self.users.clone(),
            self.storage.clone(),
        )
    }

    pub fn registration_handler(
        &self,
    ) -> RegistrationHandler<MockGroupRepository, MockEventRepository, MockRegistrationRepository>
    {
        RegistrationHandler::new(
            self.groups.clone(),
            self.events.clone(),
            self.registrations.clone(),
        )
    }

    pub fn training_handler(
        &self,
    ) -> TrainingHandler<
        MockGroupRepository,
        MockMembershipRepository,
        MockTrainingRepository,
        MockPerformanceRepository,
    > {
        TrainingHandler::new(
            self.groups.clone(),
            self.memberships.clone(),
            self.trainings.clone(),
            self.performances.clone(),
        )
    }

    pub fn upload_handler(&self) -> UploadHandler<MockImageStorage> {
        UploadHandler::new(self.storage.clone())
    }

    pub fn user_handler(
        &self,
    ) -> UserHandler<
        MockGroupRepository,
        MockMembershipRepository,
        MockEventRepository,
        MockRegistrationRepository,
    > {
        UserHandler::new(
            self.groups.clone(),
            self.memberships.clone(),
            self.events.clone(),
            self.registrations.clone(),
        )
    }

    pub fn user_sync(&self) -> UserSync<MockUserRepository> {
        UserSync::new(self.users.clone(), true)
    }
}

/// API Gatewayのプロキシイベントを作成
///
/// `route_key` は "METHOD /resource/{param}" 形式。ボディはJSON文字列として埋め込む。
pub fn proxy_event(
    route_key: &str,
    path: &[(&str, &str)],
    user: Option<&str>,
    body: Option<Value>,
) -> Value {
    let path_parameters: Map<String, Value> = path
        .iter()
        .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
        .collect();

    let mut event = json!({
        "routeKey": route_key,
        "pathParameters": path_parameters,
        "requestContext": {},
        "body": body.map(|b| b.to_string()),
    });

    if let Some(user_id) = user {
        event["requestContext"]["authorizer"] = json!({
            "claims": {
                "sub": user_id,
                "name": format!("User {}", user_id),
                "email": format!("{}@example.com", user_id),
            }
        });
    }

    event
}
