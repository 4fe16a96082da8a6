/// Performancesテーブルのリポジトリ
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;

use super::dynamo::{describe, from_items, query_all, to_item, RepositoryError};
use crate::domain::Performance;

/// トレーニングIDから記録を引くためのインデックス
const TRAINING_ID_INDEX: &str = "TrainingIdIndex";

/// パフォーマンス記録永続化用トレイト
#[async_trait]
pub trait PerformanceRepository: Send + Sync {
    async fn put(&self, performance: &Performance) -> Result<(), RepositoryError>;

    /// トレーニングの全記録を取得
    async fn list_by_training(
        &self,
        training_id: &str,
    ) -> Result<Vec<Performance>, RepositoryError>;
}

/// PerformanceRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoPerformanceRepository {
    /// DynamoDBクライアント
    client: DynamoDbClient,
    /// パフォーマンステーブル名
    table_name: String,
}

impl DynamoPerformanceRepository {
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        Self { client, table_name }
    }
}

#[async_trait]
impl PerformanceRepository for DynamoPerformanceRepository {
    async fn put(&self, performance: &Performance) -> Result<(), RepositoryError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_item(performance)?))
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(describe(e)))?;

        Ok(())
    }

    async fn list_by_training(
        &self,
        training_id: &str,
    ) -> Result<Vec<Performance>, RepositoryError> {
        let query = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(TRAINING_ID_INDEX)
            .key_condition_expression("trainingId = :tid")
            .expression_attribute_values(":tid", AttributeValue::S(training_id.to_string()));

        from_items(query_all(query).await?)
    }
}
