/// Groupsテーブルのリポジトリ
///
/// グループは論理削除のため、物理削除の操作は持たない。
/// 一覧はIsActiveIndex（`isActive = 1`）から取得する。
use std::collections::BTreeSet;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;

use super::dynamo::{
    batch_get_all, describe, from_item, from_items, query_all, string_key, to_item,
    RepositoryError,
};
use crate::domain::Group;

/// アクティブなグループを引くためのインデックス
const IS_ACTIVE_INDEX: &str = "IsActiveIndex";

/// グループ永続化用トレイト
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// IDでグループを取得（論理削除済みも含む）
    async fn get(&self, group_id: &str) -> Result<Option<Group>, RepositoryError>;

    /// グループを保存（上書き）
    async fn put(&self, group: &Group) -> Result<(), RepositoryError>;

    /// `isActive = 1` のグループを全件取得
    async fn list_active(&self) -> Result<Vec<Group>, RepositoryError>;

    /// 複数IDのグループをまとめて取得（存在しないIDは無視）
    async fn batch_get(&self, group_ids: &[String]) -> Result<Vec<Group>, RepositoryError>;
}

/// GroupRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoGroupRepository {
    /// DynamoDBクライアント
    client: DynamoDbClient,
    /// グループテーブル名
    table_name: String,
}

impl DynamoGroupRepository {
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        Self { client, table_name }
    }
}

#[async_trait]
impl GroupRepository for DynamoGroupRepository {
    async fn get(&self, group_id: &str) -> Result<Option<Group>, RepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(string_key("id", group_id)))
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(describe(e)))?;

        result.item.map(from_item).transpose()
    }

    async fn put(&self, group: &Group) -> Result<(), RepositoryError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_item(group)?))
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(describe(e)))?;

        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<Group>, RepositoryError> {
        let query = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(IS_ACTIVE_INDEX)
            .key_condition_expression("isActive = :active")
            .expression_attribute_values(":active", AttributeValue::N("1".to_string()));

        from_items(query_all(query).await?)
    }

    async fn batch_get(&self, group_ids: &[String]) -> Result<Vec<Group>, RepositoryError> {
        // BatchGetItemは重複キーを受け付けない
        let unique: BTreeSet<&String> = group_ids.iter().collect();
        let keys = unique.into_iter().map(|id| string_key("id", id)).collect();

        from_items(batch_get_all(&self.client, &self.table_name, keys).await?)
    }
}
