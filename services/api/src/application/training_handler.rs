/// トレーニングハンドラー
///
/// トレーニングの作成・一覧と、メンバーによるパフォーマンス記録を処理する。
use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use super::access::{load_live_group, require_admin};
use super::api_error::ApiError;
use super::dispatcher::RouteHandler;
use super::request::ApiRequest;
use super::response::ApiResponse;
use super::route::Route;
use crate::domain::timestamp::{new_id, now_iso};
use crate::domain::{
    is_active_member, Caller, NewPerformance, NewTraining, StatusRequirement, Training,
};
use crate::infrastructure::{
    GroupRepository, MembershipRepository, PerformanceRepository, TrainingRepository,
};

pub struct TrainingHandler<G, M, T, P>
where
    G: GroupRepository,
    M: MembershipRepository,
    T: TrainingRepository,
    P: PerformanceRepository,
{
    groups: G,
    memberships: M,
    trainings: T,
    performances: P,
}

impl<G, M, T, P> TrainingHandler<G, M, T, P>
where
    G: GroupRepository,
    M: MembershipRepository,
    T: TrainingRepository,
    P: PerformanceRepository,
{
    pub fn new(groups: G, memberships: M, trainings: T, performances: P) -> Self {
        Self {
            groups,
            memberships,
            trainings,
            performances,
        }
    }

    /// トレーニングを作成（管理者のみ）
    pub async fn create(
        &self,
        caller: &Caller,
        group_id: &str,
        input: NewTraining,
    ) -> Result<ApiResponse, ApiError> {
        load_live_group(&self.groups, group_id).await?;
        require_admin(
            &self.memberships,
            group_id,
            &caller.user_id,
            StatusRequirement::Active,
        )
        .await?;

        let training = input.into_training(new_id(), group_id, &now_iso())?;
        self.trainings.put(&training).await?;

        info!(group_id = %group_id, training_id = %training.id, "トレーニング作成");

        Ok(ApiResponse::created(json!({
            "message": "Training created",
            "training": training,
        })))
    }

    /// グループのトレーニング一覧（日付の新しい順）
    pub async fn list(&self, group_id: &str) -> Result<ApiResponse, ApiError> {
        load_live_group(&self.groups, group_id).await?;

        let mut trainings = self.trainings.list_by_group(group_id).await?;
        trainings.sort_by(|a, b| b.date.cmp(&a.date));

        ApiResponse::json(&trainings)
    }

    /// パフォーマンスを記録（アクティブなメンバーのみ）
    pub async fn record(
        &self,
        caller: &Caller,
        group_id: &str,
        training_id: &str,
        input: NewPerformance,
    ) -> Result<ApiResponse, ApiError> {
        load_live_group(&self.groups, group_id).await?;
        let training = self.load_training(group_id, training_id).await?;

        let membership = self.memberships.get(group_id, &caller.user_id).await?;
        if !is_active_member(membership.as_ref()) {
            warn!(group_id = %group_id, user_id = %caller.user_id, "アクティブなメンバーではない");
            return Err(ApiError::forbidden(
                "Only active members can record performances",
            ));
        }

        let performance = input.into_performance(new_id(), &training, &caller.user_id, &now_iso())?;
        self.performances.put(&performance).await?;

        info!(
            training_id = %training_id,
            user_id = %caller.user_id,
            time_in_seconds = performance.time_in_seconds,
            distance_in_meters = performance.distance_in_meters,
            "パフォーマンス記録"
        );

        Ok(ApiResponse::created(json!({
            "message": "Performance recorded",
            "performance": performance,
        })))
    }

    /// トレーニングのパフォーマンス一覧（記録の新しい順）
    pub async fn list_performances(
        &self,
        group_id: &str,
        training_id: &str,
    ) -> Result<ApiResponse, ApiError> {
        load_live_group(&self.groups, group_id).await?;
        self.load_training(group_id, training_id).await?;

        let mut performances = self.performances.list_by_training(training_id).await?;
        performances.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        ApiResponse::json(&performances)
    }

    async fn load_training(&self, group_id: &str, training_id: &str) -> Result<Training, ApiError> {
        match self.trainings.get(training_id).await? {
            Some(training) if training.group_id == group_id => Ok(training),
            _ => Err(ApiError::not_found("Training not found")),
        }
    }
}

#[async_trait]
impl<G, M, T, P> RouteHandler for TrainingHandler<G, M, T, P>
where
    G: GroupRepository,
    M: MembershipRepository,
    T: TrainingRepository,
    P: PerformanceRepository,
{
    async fn handle(
        &self,
        route: Route,
        request: &ApiRequest,
        caller: &Caller,
    ) -> Result<ApiResponse, ApiError> {
        match route {
            Route::CreateTraining => {
                let group_id = request.path_param("groupId")?;
                self.create(caller, group_id, request.json_body()?).await
            }
            Route::ListTrainings => self.list(request.path_param("groupId")?).await,
            Route::RecordPerformance => {
                let group_id = request.path_param("groupId")?;
                let training_id = request.path_param("trainingId")?;
                self.record(caller, group_id, training_id, request.json_body()?)
                    .await
            }
            Route::ListPerformances => {
                let group_id = request.path_param("groupId")?;
                let training_id = request.path_param("trainingId")?;
                self.list_performances(group_id, training_id).await
            }
            _ => Err(ApiError::route_not_found()),
        }
    }
}
