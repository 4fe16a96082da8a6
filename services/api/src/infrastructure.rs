// Infrastructure layer modules
pub mod config;
pub mod dynamo;
pub mod event_repository;
pub mod group_repository;
pub mod image_storage;
pub mod logging;
pub mod membership_repository;
pub mod performance_repository;
pub mod registration_repository;
pub mod training_repository;
pub mod user_repository;

// Re-exports
pub use config::{AppConfig, ConfigError, ImageBuckets, Settings, TableNames};
pub use dynamo::RepositoryError;
pub use event_repository::{DynamoEventRepository, EventRepository};
pub use group_repository::{DynamoGroupRepository, GroupRepository};
pub use image_storage::{ImageStorage, PresignedUpload, S3ImageStorage, StorageError};
pub use logging::init_logging;
pub use membership_repository::{DynamoMembershipRepository, MembershipRepository};
pub use performance_repository::{DynamoPerformanceRepository, PerformanceRepository};
pub use registration_repository::{DynamoRegistrationRepository, RegistrationRepository};
pub use training_repository::{DynamoTrainingRepository, TrainingRepository};
pub use user_repository::{DynamoUserRepository, UserRepository};
