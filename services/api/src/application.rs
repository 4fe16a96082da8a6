// アプリケーション層モジュール
pub mod access;
pub mod api_error;
pub mod dispatcher;
pub mod event_handler;
pub mod group_handler;
pub mod membership_handler;
pub mod registration_handler;
pub mod request;
pub mod response;
pub mod route;
pub mod training_handler;
pub mod upload_handler;
pub mod user_handler;
pub mod user_sync;

#[cfg(test)]
pub(crate) mod test_support;

// 再エクスポート
pub use api_error::ApiError;
pub use dispatcher::{dispatch, RouteHandler};
pub use event_handler::EventHandler;
pub use group_handler::GroupHandler;
pub use membership_handler::MembershipHandler;
pub use registration_handler::RegistrationHandler;
pub use request::ApiRequest;
pub use response::{respond, ApiResponse};
pub use route::Route;
pub use training_handler::TrainingHandler;
pub use upload_handler::{UploadHandler, UploadRequest};
pub use user_handler::UserHandler;
pub use user_sync::UserSync;
