/// GroupMembershipテーブルのリポジトリ
///
/// キーは (groupId, userId)。ユーザー側からの参照にはUserIdIndexを使う。
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;

use super::dynamo::{
    batch_delete_all, composite_key, count_all, describe, from_item, from_items, query_all,
    to_item, RepositoryError,
};
use crate::domain::{Membership, MembershipKey};

/// ユーザーIDからメンバーシップを引くためのインデックス
const USER_ID_INDEX: &str = "UserIdIndex";

/// メンバーシップ永続化用トレイト
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// (groupId, userId) でメンバーシップを取得
    async fn get(&self, group_id: &str, user_id: &str)
        -> Result<Option<Membership>, RepositoryError>;

    /// メンバーシップを保存（同じキーのレコードは上書き）
    async fn put(&self, membership: &Membership) -> Result<(), RepositoryError>;

    /// グループの全メンバーシップを取得（退会済みを含む）
    async fn list_by_group(&self, group_id: &str) -> Result<Vec<Membership>, RepositoryError>;

    /// ユーザーの全メンバーシップを取得（退会済みを含む）
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Membership>, RepositoryError>;

    /// グループの status = active のメンバー数を取得（件数のみのクエリ）
    async fn count_active_by_group(&self, group_id: &str) -> Result<usize, RepositoryError>;

    /// キーの一覧を一括削除
    ///
    /// 1回の呼び出しは1回のバッチ書き込みに相当する（25件以下で呼ぶこと）。
    /// 未処理のアイテムが残った場合はエラー。
    async fn delete_batch(&self, keys: &[MembershipKey]) -> Result<(), RepositoryError>;
}

/// MembershipRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoMembershipRepository {
    /// DynamoDBクライアント
    client: DynamoDbClient,
    /// メンバーシップテーブル名
    table_name: String,
}

impl DynamoMembershipRepository {
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        Self { client, table_name }
    }

    fn key(group_id: &str, user_id: &str) -> super::dynamo::Item {
        composite_key("groupId", group_id, "userId", user_id)
    }
}

#[async_trait]
impl MembershipRepository for DynamoMembershipRepository {
    async fn get(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<Option<Membership>, RepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(Self::key(group_id, user_id)))
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(describe(e)))?;

        result.item.map(from_item).transpose()
    }

    async fn put(&self, membership: &Membership) -> Result<(), RepositoryError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_item(membership)?))
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(describe(e)))?;

        Ok(())
    }

    async fn list_by_group(&self, group_id: &str) -> Result<Vec<Membership>, RepositoryError> {
        // パーティションキーがgroupIdのためテーブル本体をクエリする
        let query = self
            .client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression("groupId = :gid")
            .expression_attribute_values(":gid", AttributeValue::S(group_id.to_string()));

        from_items(query_all(query).await?)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Membership>, RepositoryError> {
        let query = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(USER_ID_INDEX)
            .key_condition_expression("userId = :uid")
            .expression_attribute_values(":uid", AttributeValue::S(user_id.to_string()));

        from_items(query_all(query).await?)
    }

    async fn count_active_by_group(&self, group_id: &str) -> Result<usize, RepositoryError> {
        // statusは予約語のため属性名プレースホルダーを使う
        let query = self
            .client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression("groupId = :gid")
            .filter_expression("#status = :active")
            .expression_attribute_names("#status", "status")
            .expression_attribute_values(":gid", AttributeValue::S(group_id.to_string()))
            .expression_attribute_values(":active", AttributeValue::S("active".to_string()));

        count_all(query).await
    }

    async fn delete_batch(&self, keys: &[MembershipKey]) -> Result<(), RepositoryError> {
        if keys.is_empty() {
            return Ok(());
        }

        let keys = keys
            .iter()
            .map(|key| Self::key(&key.group_id, &key.user_id))
            .collect();

        batch_delete_all(&self.client, &self.table_name, keys).await
    }
}
