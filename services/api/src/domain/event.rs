//! イベントのデータモデル
//!
//! イベントは必ず1つのグループに属する。削除は物理削除。

use serde::{Deserialize, Serialize};

use super::timestamp::normalize_iso;
use super::validation::{require_min_chars, require_url};
use super::ValidationError;

/// イベント名の最小文字数
pub const EVENT_NAME_MIN_CHARS: usize = 3;

/// イベントレコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub group_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// 開催日時（UTC、ミリ秒付きISO-8601）
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    /// 旧バージョンが論理削除したレコードのみが持つ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
}

impl Event {
    /// 指定グループに属し、論理削除されていないか
    pub fn is_live_in(&self, group_id: &str) -> bool {
        self.group_id == group_id && self.deleted_at.is_none()
    }

    /// 更新で置き換えられる既存画像のURLを取得
    pub fn replaced_image(&self, update: &EventUpdate) -> Option<&str> {
        match (&self.image_url, &update.image_url) {
            (Some(current), Some(next)) if current != next => Some(current.as_str()),
            _ => None,
        }
    }

    /// 部分更新を適用（指定されたフィールドのみ変更し、updatedAtは常に更新）
    pub fn apply_update(&mut self, update: EventUpdate, now: &str) -> Result<(), ValidationError> {
        update.validate()?;

        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(date) = update.date {
            self.date = normalize_iso("date", &date)?;
        }
        if let Some(location) = update.location {
            self.location = Some(location);
        }
        if let Some(image_url) = update.image_url {
            self.image_url = Some(image_url);
        }
        self.updated_at = now.to_string();
        Ok(())
    }
}

/// イベント作成リクエスト
///
/// groupIdはパスパラメータから取得するため、ボディに含まれていても無視する。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewEvent {
    /// 入力を検証してイベントレコードを生成
    pub fn into_event(self, id: String, group_id: &str, now: &str) -> Result<Event, ValidationError> {
        require_min_chars("name", &self.name, EVENT_NAME_MIN_CHARS)?;
        let date = normalize_iso("date", &self.date)?;
        if let Some(image_url) = &self.image_url {
            require_url("imageUrl", image_url)?;
        }

        Ok(Event {
            id,
            group_id: group_id.to_string(),
            name: self.name,
            description: self.description,
            date,
            location: self.location,
            image_url: self.image_url,
            created_at: now.to_string(),
            updated_at: now.to_string(),
            deleted_at: None,
        })
    }
}

/// イベント更新リクエスト
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl EventUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.location.is_none()
            && self.image_url.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            require_min_chars("name", name, EVENT_NAME_MIN_CHARS)?;
        }
        if let Some(date) = &self.date {
            normalize_iso("date", date)?;
        }
        if let Some(image_url) = &self.image_url {
            require_url("imageUrl", image_url)?;
        }
        Ok(())
    }
}

/// 日付で「今後」と「過去」に分割した一覧
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule<T> {
    /// 日付が現在以降（日付の昇順）
    pub upcoming: Vec<T>,
    /// 日付が現在より前（日付の降順）
    pub past: Vec<T>,
}

impl<T> Schedule<T> {
    /// `now` を境に分割する
    ///
    /// 日付はすべて同一形式のUTC文字列で保存されているため、文字列比較で判定できる。
    pub fn partition<F>(items: Vec<T>, now: &str, date_of: F) -> Self
    where
        F: Fn(&T) -> &str,
    {
        let (mut upcoming, mut past): (Vec<T>, Vec<T>) =
            items.into_iter().partition(|item| date_of(item) >= now);

        upcoming.sort_by(|a, b| date_of(a).cmp(date_of(b)));
        past.sort_by(|a, b| date_of(b).cmp(date_of(a)));

        Self { upcoming, past }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// テスト用のイベントを作成
    pub(crate) fn sample_event(id: &str, group_id: &str, date: &str) -> Event {
        Event {
            id: id.to_string(),
            group_id: group_id.to_string(),
            name: "Morning run".to_string(),
            description: None,
            date: date.to_string(),
            location: Some("Park".to_string()),
            image_url: None,
            created_at: "2025-01-01T00:00:00.000Z".to_string(),
            updated_at: "2025-01-01T00:00:00.000Z".to_string(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_new_event_normalizes_date() {
        let input: NewEvent = serde_json::from_value(json!({
            "groupId": "ignored",
            "name": "Long run",
            "date": "2025-06-01T07:00:00-03:00"
        }))
        .unwrap();

        let event = input.into_event("e-1".to_string(), "g-1", "now").unwrap();

        assert_eq!(event.group_id, "g-1");
        assert_eq!(event.date, "2025-06-01T10:00:00.000Z");
    }

    #[test]
    fn test_new_event_validation() {
        let short = NewEvent {
            name: "5k".to_string(),
            description: None,
            date: "2025-06-01T07:00:00Z".to_string(),
            location: None,
            image_url: None,
        };
        assert!(matches!(
            short.into_event("e".to_string(), "g", "now"),
            Err(ValidationError::TooShort { .. })
        ));

        let bad_date = NewEvent {
            name: "Long run".to_string(),
            description: None,
            date: "tomorrow".to_string(),
            location: None,
            image_url: None,
        };
        assert_eq!(
            bad_date.into_event("e".to_string(), "g", "now"),
            Err(ValidationError::InvalidDatetime { field: "date" })
        );
    }

    #[test]
    fn test_apply_update_only_location() {
        let mut event = sample_event("e-1", "g-1", "2025-06-01T10:00:00.000Z");
        let update = EventUpdate {
            location: Some("Stadium".to_string()),
            ..Default::default()
        };

        event.apply_update(update, "2025-05-01T00:00:00.000Z").unwrap();

        assert_eq!(event.location.as_deref(), Some("Stadium"));
        assert_eq!(event.name, "Morning run");
        assert_eq!(event.date, "2025-06-01T10:00:00.000Z");
        assert_eq!(event.updated_at, "2025-05-01T00:00:00.000Z");
    }

    #[test]
    fn test_apply_update_rejects_invalid_date_without_mutation() {
        let mut event = sample_event("e-1", "g-1", "2025-06-01T10:00:00.000Z");
        let before = event.clone();
        let update = EventUpdate {
            name: Some("Renamed".to_string()),
            date: Some("soon".to_string()),
            ..Default::default()
        };

        assert!(event.apply_update(update, "now").is_err());
        assert_eq!(event, before);
    }

    #[test]
    fn test_is_live_in() {
        let mut event = sample_event("e-1", "g-1", "2025-06-01T10:00:00.000Z");
        assert!(event.is_live_in("g-1"));
        assert!(!event.is_live_in("g-2"));

        event.deleted_at = Some("2025-01-02T00:00:00.000Z".to_string());
        assert!(!event.is_live_in("g-1"));
    }

    #[test]
    fn test_schedule_partition_and_order() {
        let now = "2025-05-01T00:00:00.000Z";
        let events = vec![
            sample_event("past-old", "g", "2025-01-01T00:00:00.000Z"),
            sample_event("future-far", "g", "2025-12-01T00:00:00.000Z"),
            sample_event("now", "g", now),
            sample_event("past-recent", "g", "2025-04-30T23:59:59.999Z"),
            sample_event("future-near", "g", "2025-05-02T00:00:00.000Z"),
        ];

        let schedule = Schedule::partition(events, now, |e| e.date.as_str());

        let upcoming: Vec<_> = schedule.upcoming.iter().map(|e| e.id.as_str()).collect();
        let past: Vec<_> = schedule.past.iter().map(|e| e.id.as_str()).collect();

        // 現在時刻ちょうどは「今後」に含む
        assert_eq!(upcoming, vec!["now", "future-near", "future-far"]);
        assert_eq!(past, vec!["past-recent", "past-old"]);
    }
}
