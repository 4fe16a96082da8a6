//! グループのデータモデル
//!
//! グループは公開種別（open/closed）を持ち、削除は論理削除
//! （`deletedAt` の設定と `isActive` のクリア）で行う。
//! 論理削除されたグループは終端状態であり、一覧にも再び現れない。

use serde::{Deserialize, Serialize};

use super::validation::{require_min_chars, require_url};
use super::ValidationError;

/// グループ名の最小文字数
pub const GROUP_NAME_MIN_CHARS: usize = 3;

/// グループの公開種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupType {
    /// 参加申請が即時承認される
    Open,
    /// 参加には管理者の承認が必要
    Closed,
}

/// グループレコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub group_type: GroupType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// IsActiveIndexのキーとして使うため数値（1/0）で保存する
    #[serde(with = "active_flag")]
    pub is_active: bool,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
    /// 論理削除後のメンバーシップ一括削除が未完了であることを示す
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cascade_pending: bool,
}

impl Group {
    /// 論理削除されていないか
    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// 更新で置き換えられる既存画像のURLを取得
    ///
    /// 新しい画像URLが指定され、かつ既存の画像URLと異なる場合のみ返す。
    pub fn replaced_image(&self, update: &GroupUpdate) -> Option<&str> {
        match (&self.image_url, &update.image_url) {
            (Some(current), Some(next)) if current != next => Some(current.as_str()),
            _ => None,
        }
    }

    /// 部分更新を適用
    pub fn apply_update(&mut self, update: GroupUpdate, now: &str) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(image_url) = update.image_url {
            self.image_url = Some(image_url);
        }
        self.updated_at = now.to_string();
    }

    /// 論理削除としてマークし、カスケード削除を保留状態にする
    pub fn mark_deleted(&mut self, now: &str) {
        self.deleted_at = Some(now.to_string());
        self.is_active = false;
        self.cascade_pending = true;
        self.updated_at = now.to_string();
    }

    /// カスケード削除の完了を記録
    pub fn complete_cascade(&mut self, now: &str) {
        self.cascade_pending = false;
        self.updated_at = now.to_string();
    }
}

/// グループ作成リクエスト
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGroup {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub group_type: GroupType,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewGroup {
    /// 入力を検証してグループレコードを生成
    pub fn into_group(self, id: String, now: &str) -> Result<Group, ValidationError> {
        require_min_chars("name", &self.name, GROUP_NAME_MIN_CHARS)?;
        if let Some(image_url) = &self.image_url {
            require_url("imageUrl", image_url)?;
        }

        Ok(Group {
            id,
            name: self.name,
            description: self.description,
            group_type: self.group_type,
            image_url: self.image_url,
            is_active: true,
            created_at: now.to_string(),
            updated_at: now.to_string(),
            deleted_at: None,
            cascade_pending: false,
        })
    }
}

/// グループ更新リクエスト（公開種別は変更不可）
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl GroupUpdate {
    /// 更新対象のフィールドが1つもないか
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.image_url.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            require_min_chars("name", name, GROUP_NAME_MIN_CHARS)?;
        }
        if let Some(image_url) = &self.image_url {
            require_url("imageUrl", image_url)?;
        }
        Ok(())
    }
}

/// `isActive` を数値フラグとして読み書きする
mod active_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(u8::deserialize(deserializer)? != 0)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// テスト用のグループを作成
    pub(crate) fn sample_group(id: &str, group_type: GroupType) -> Group {
        Group {
            id: id.to_string(),
            name: "Runners".to_string(),
            description: None,
            group_type,
            image_url: None,
            is_active: true,
            created_at: "2025-01-01T00:00:00.000Z".to_string(),
            updated_at: "2025-01-01T00:00:00.000Z".to_string(),
            deleted_at: None,
            cascade_pending: false,
        }
    }

    #[test]
    fn test_new_group_into_group_sets_defaults() {
        let input: NewGroup = serde_json::from_value(json!({
            "name": "Runners",
            "type": "open"
        }))
        .unwrap();

        let group = input.into_group("g-1".to_string(), "2025-01-01T00:00:00.000Z").unwrap();

        assert_eq!(group.id, "g-1");
        assert_eq!(group.group_type, GroupType::Open);
        assert!(group.is_active);
        assert!(group.is_live());
        assert_eq!(group.created_at, group.updated_at);
    }

    #[test]
    fn test_new_group_rejects_short_name() {
        let input = NewGroup {
            name: "ab".to_string(),
            description: None,
            group_type: GroupType::Closed,
            image_url: None,
        };

        assert_eq!(
            input.into_group("g-1".to_string(), "now"),
            Err(ValidationError::TooShort { field: "name", min: 3 })
        );
    }

    #[test]
    fn test_new_group_rejects_invalid_image_url() {
        let input = NewGroup {
            name: "Runners".to_string(),
            description: None,
            group_type: GroupType::Open,
            image_url: Some("not-a-url".to_string()),
        };

        assert!(matches!(
            input.into_group("g-1".to_string(), "now"),
            Err(ValidationError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_new_group_rejects_unknown_type() {
        let result: Result<NewGroup, _> = serde_json::from_value(json!({
            "name": "Runners",
            "type": "secret"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_group_serializes_active_flag_as_number() {
        let group = sample_group("g-1", GroupType::Open);
        let value = serde_json::to_value(&group).unwrap();

        assert_eq!(value["isActive"], 1);
        assert_eq!(value["type"], "open");
        // 未設定のオプション項目は出力しない
        assert!(value.get("deletedAt").is_none());
        assert!(value.get("cascadePending").is_none());

        let back: Group = serde_json::from_value(value).unwrap();
        assert_eq!(back, group);
    }

    #[test]
    fn test_mark_deleted_clears_active_and_sets_cascade() {
        let mut group = sample_group("g-1", GroupType::Open);
        group.mark_deleted("2025-02-01T00:00:00.000Z");

        assert!(!group.is_live());
        assert!(!group.is_active);
        assert!(group.cascade_pending);
        assert_eq!(group.deleted_at.as_deref(), Some("2025-02-01T00:00:00.000Z"));

        group.complete_cascade("2025-02-01T00:00:01.000Z");
        assert!(!group.cascade_pending);
        assert!(!group.is_live());
    }

    #[test]
    fn test_replaced_image_only_when_changed() {
        let mut group = sample_group("g-1", GroupType::Open);
        let update = GroupUpdate {
            image_url: Some("https://b.s3.amazonaws.com/group/new.png".to_string()),
            ..Default::default()
        };

        // 既存画像がない場合は削除対象なし
        assert_eq!(group.replaced_image(&update), None);

        group.image_url = Some("https://b.s3.amazonaws.com/group/old.png".to_string());
        assert_eq!(
            group.replaced_image(&update),
            Some("https://b.s3.amazonaws.com/group/old.png")
        );

        group.image_url = update.image_url.clone();
        assert_eq!(group.replaced_image(&update), None);
    }

    #[test]
    fn test_apply_update_is_partial() {
        let mut group = sample_group("g-1", GroupType::Open);
        group.description = Some("old".to_string());

        group.apply_update(
            GroupUpdate {
                name: Some("Trail Runners".to_string()),
                ..Default::default()
            },
            "2025-03-01T00:00:00.000Z",
        );

        assert_eq!(group.name, "Trail Runners");
        assert_eq!(group.description.as_deref(), Some("old"));
        assert_eq!(group.updated_at, "2025-03-01T00:00:00.000Z");
    }

    #[test]
    fn test_group_update_is_empty() {
        assert!(GroupUpdate::default().is_empty());
        let update: GroupUpdate = serde_json::from_value(json!({"description": ""})).unwrap();
        assert!(!update.is_empty());
    }
}
