//! トレーニングとパフォーマンス記録のデータモデル
//!
//! トレーニングはグループに属する練習メニューで、
//! パフォーマンスは各メンバーがトレーニングに対して記録するタイムと距離。

use serde::{Deserialize, Serialize};

use super::timestamp::normalize_iso;
use super::validation::{require_min_chars, require_positive};
use super::ValidationError;

/// トレーニングレコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Training {
    pub id: String,
    pub group_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: String,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// トレーニング作成リクエスト
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewTraining {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: String,
}

impl NewTraining {
    pub fn into_training(
        self,
        id: String,
        group_id: &str,
        now: &str,
    ) -> Result<Training, ValidationError> {
        require_min_chars("name", &self.name, 1)?;
        let date = normalize_iso("date", &self.date)?;

        Ok(Training {
            id,
            group_id: group_id.to_string(),
            name: self.name,
            description: self.description,
            date,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        })
    }
}

/// パフォーマンス記録
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    pub id: String,
    pub group_id: String,
    pub training_id: String,
    pub user_id: String,
    pub time_in_seconds: f64,
    pub distance_in_meters: f64,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// パフォーマンス記録リクエスト
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPerformance {
    pub time_in_seconds: f64,
    pub distance_in_meters: f64,
}

impl NewPerformance {
    pub fn into_performance(
        self,
        id: String,
        training: &Training,
        user_id: &str,
        now: &str,
    ) -> Result<Performance, ValidationError> {
        require_positive("timeInSeconds", self.time_in_seconds)?;
        require_positive("distanceInMeters", self.distance_in_meters)?;

        Ok(Performance {
            id,
            group_id: training.group_id.clone(),
            training_id: training.id.clone(),
            user_id: user_id.to_string(),
            time_in_seconds: self.time_in_seconds,
            distance_in_meters: self.distance_in_meters,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        })
    }
}
