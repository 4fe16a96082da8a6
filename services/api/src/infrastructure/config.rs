/// アプリケーション設定
///
/// テーブル名・画像バケット名・ユーザー同期フラグを環境変数から読み込み、
/// DynamoDB/S3クライアントと合わせてリポジトリを組み立てる。
/// Lambdaのウォームスタート間で共有するため、コールドスタート時に一度だけ構築する。
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_s3::Client as S3Client;
use thiserror::Error;
use tokio::sync::OnceCell;

use super::event_repository::DynamoEventRepository;
use super::group_repository::DynamoGroupRepository;
use super::image_storage::S3ImageStorage;
use super::membership_repository::DynamoMembershipRepository;
use super::performance_repository::DynamoPerformanceRepository;
use super::registration_repository::DynamoRegistrationRepository;
use super::training_repository::DynamoTrainingRepository;
use super::user_repository::DynamoUserRepository;
use crate::domain::ImageResource;

/// 設定読み込みのエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid environment variable {name}: {value}")]
    InvalidEnvVar { name: String, value: String },
}

/// 必須の環境変数を読み込む（空文字は未設定扱い）
fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

/// 真偽値の環境変数を読み込む（未設定ならデフォルト値）
fn flag(name: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Err(_) => Ok(default),
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "" => Ok(default),
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidEnvVar {
                name: name.to_string(),
                value,
            }),
        },
    }
}

/// DynamoDBテーブル名
#[derive(Debug, Clone, PartialEq)]
pub struct TableNames {
    /// GROUPS_TABLE
    pub groups: String,
    /// MEMBERSHIPS_TABLE
    pub memberships: String,
    /// EVENTS_TABLE
    pub events: String,
    /// REGISTRATIONS_TABLE
    pub registrations: String,
    /// USERS_TABLE
    pub users: String,
    /// TRAININGS_TABLE
    pub trainings: String,
    /// PERFORMANCES_TABLE
    pub performances: String,
}

impl TableNames {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            groups: required("GROUPS_TABLE")?,
            memberships: required("MEMBERSHIPS_TABLE")?,
            events: required("EVENTS_TABLE")?,
            registrations: required("REGISTRATIONS_TABLE")?,
            users: required("USERS_TABLE")?,
            trainings: required("TRAININGS_TABLE")?,
            performances: required("PERFORMANCES_TABLE")?,
        })
    }
}

/// 画像バケット名
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuckets {
    /// GROUP_IMAGE_BUCKET
    pub group: String,
    /// EVENT_IMAGE_BUCKET
    pub event: String,
}

impl ImageBuckets {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            group: required("GROUP_IMAGE_BUCKET")?,
            event: required("EVENT_IMAGE_BUCKET")?,
        })
    }

    /// リソース種別に対応するバケット名
    pub fn bucket_for(&self, resource: ImageResource) -> &str {
        match resource {
            ImageResource::Group => &self.group,
            ImageResource::Event => &self.event,
        }
    }
}

/// 環境変数から読み込む設定値
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub tables: TableNames,
    pub buckets: ImageBuckets,
    /// USER_SYNC_ENABLED（デフォルトtrue）
    pub user_sync_enabled: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            tables: TableNames::from_env()?,
            buckets: ImageBuckets::from_env()?,
            user_sync_enabled: flag("USER_SYNC_ENABLED", true)?,
        })
    }
}

/// AWSクライアントと設定値を保持するアプリケーション設定
#[derive(Debug, Clone)]
pub struct AppConfig {
    dynamodb: DynamoDbClient,
    s3: S3Client,
    settings: Settings,
}

/// コールドスタート時に一度だけ初期化する共有設定
static APP_CONFIG: OnceCell<AppConfig> = OnceCell::const_new();

impl AppConfig {
    /// 環境変数とAWSのデフォルト設定（認証情報、リージョン）から構築
    pub async fn from_env() -> Result<Self, ConfigError> {
        let settings = Settings::from_env()?;

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        Ok(Self::new(
            DynamoDbClient::new(&aws_config),
            S3Client::new(&aws_config),
            settings,
        ))
    }

    pub fn new(dynamodb: DynamoDbClient, s3: S3Client, settings: Settings) -> Self {
        Self {
            dynamodb,
            s3,
            settings,
        }
    }

    /// 共有設定を取得（初回呼び出し時に初期化）
    pub async fn shared() -> Result<&'static AppConfig, ConfigError> {
        APP_CONFIG.get_or_try_init(Self::from_env).await
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn user_sync_enabled(&self) -> bool {
        self.settings.user_sync_enabled
    }

    pub fn group_repository(&self) -> DynamoGroupRepository {
        DynamoGroupRepository::new(self.dynamodb.clone(), self.settings.tables.groups.clone())
    }

    pub fn membership_repository(&self) -> DynamoMembershipRepository {
        DynamoMembershipRepository::new(
            self.dynamodb.clone(),
            self.settings.tables.memberships.clone(),
        )
    }

    pub fn event_repository(&self) -> DynamoEventRepository {
        DynamoEventRepository::new(self.dynamodb.clone(), self.settings.tables.events.clone())
    }

    pub fn registration_repository(&self) -> DynamoRegistrationRepository {
        DynamoRegistrationRepository::new(
            self.dynamodb.clone(),
            self.settings.tables.registrations.clone(),
        )
    }

    pub fn user_repository(&self) -> DynamoUserRepository {
        DynamoUserRepository::new(self.dynamodb.clone(), self.settings.tables.users.clone())
    }

    pub fn training_repository(&self) -> DynamoTrainingRepository {
        DynamoTrainingRepository::new(
            self.dynamodb.clone(),
            self.settings.tables.trainings.clone(),
        )
    }

    pub fn performance_repository(&self) -> DynamoPerformanceRepository {
        DynamoPerformanceRepository::new(
            self.dynamodb.clone(),
            self.settings.tables.performances.clone(),
        )
    }

    pub fn image_storage(&self) -> S3ImageStorage {
        S3ImageStorage::new(self.s3.clone(), self.settings.buckets.clone())
    }
}
