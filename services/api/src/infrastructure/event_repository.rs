/// Eventsテーブルのリポジトリ
///
/// イベントは物理削除。グループ単位の一覧はGroupIdIndexから取得する。
use std::collections::BTreeSet;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;

use super::dynamo::{
    batch_get_all, describe, from_item, from_items, query_all, string_key, to_item,
    RepositoryError,
};
use crate::domain::Event;

/// グループIDからイベントを引くためのインデックス
const GROUP_ID_INDEX: &str = "GroupIdIndex";

/// イベント永続化用トレイト
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn get(&self, event_id: &str) -> Result<Option<Event>, RepositoryError>;

    async fn put(&self, event: &Event) -> Result<(), RepositoryError>;

    /// イベントを物理削除（存在しない場合も成功）
    async fn delete(&self, event_id: &str) -> Result<(), RepositoryError>;

    /// グループに属する全イベントを取得
    async fn list_by_group(&self, group_id: &str) -> Result<Vec<Event>, RepositoryError>;

    /// 複数IDのイベントをまとめて取得（存在しないIDは無視）
    async fn batch_get(&self, event_ids: &[String]) -> Result<Vec<Event>, RepositoryError>;
}

/// EventRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoEventRepository {
    /// DynamoDBクライアント
    client: DynamoDbClient,
    /// イベントテーブル名
    table_name: String,
}

impl DynamoEventRepository {
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        Self { client, table_name }
    }
}

#[async_trait]
impl EventRepository for DynamoEventRepository {
    async fn get(&self, event_id: &str) -> Result<Option<Event>, RepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(string_key("id", event_id)))
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(describe(e)))?;

        result.item.map(from_item).transpose()
    }

    async fn put(&self, event: &Event) -> Result<(), RepositoryError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_item(event)?))
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(describe(e)))?;

        Ok(())
    }

    async fn delete(&self, event_id: &str) -> Result<(), RepositoryError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(string_key("id", event_id)))
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(describe(e)))?;

        Ok(())
    }

    async fn list_by_group(&self, group_id: &str) -> Result<Vec<Event>, RepositoryError> {
        let query = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(GROUP_ID_INDEX)
            .key_condition_expression("groupId = :gid")
            .expression_attribute_values(":gid", AttributeValue::S(group_id.to_string()));

        from_items(query_all(query).await?)
    }

    async fn batch_get(&self, event_ids: &[String]) -> Result<Vec<Event>, RepositoryError> {
        let unique: BTreeSet<&String> = event_ids.iter().collect();
        let keys = unique.into_iter().map(|id| string_key("id", id)).collect();

        from_items(batch_get_all(&self.client, &self.table_name, keys).await?)
    }
}
