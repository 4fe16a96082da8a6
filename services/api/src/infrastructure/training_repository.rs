/// Trainingsテーブルのリポジトリ
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;

use super::dynamo::{describe, from_item, from_items, query_all, string_key, to_item, RepositoryError};
use crate::domain::Training;

/// グループIDからトレーニングを引くためのインデックス
const GROUP_ID_INDEX: &str = "GroupIdIndex";

/// トレーニング永続化用トレイト
#[async_trait]
pub trait TrainingRepository: Send + Sync {
    async fn get(&self, training_id: &str) -> Result<Option<Training>, RepositoryError>;

    async fn put(&self, training: &Training) -> Result<(), RepositoryError>;

    /// グループに属する全トレーニングを取得
    async fn list_by_group(&self, group_id: &str) -> Result<Vec<Training>, RepositoryError>;
}

/// TrainingRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoTrainingRepository {
    /// DynamoDBクライアント
    client: DynamoDbClient,
    /// トレーニングテーブル名
    table_name: String,
}

impl DynamoTrainingRepository {
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        Self { client, table_name }
    }
}

#[async_trait]
impl TrainingRepository for DynamoTrainingRepository {
    async fn get(&self, training_id: &str) -> Result<Option<Training>, RepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(string_key("id", training_id)))
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(describe(e)))?;

        result.item.map(from_item).transpose()
    }

    async fn put(&self, training: &Training) -> Result<(), RepositoryError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_item(training)?))
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(describe(e)))?;

        Ok(())
    }

    async fn list_by_group(&self, group_id: &str) -> Result<Vec<Training>, RepositoryError> {
        let query = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(GROUP_ID_INDEX)
            .key_condition_expression("groupId = :gid")
            .expression_attribute_values(":gid", AttributeValue::S(group_id.to_string()));

        from_items(query_all(query).await?)
    }
}
