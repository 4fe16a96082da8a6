// Domain layer modules
pub mod authorization;
pub mod event;
pub mod group;
pub mod image;
pub mod membership;
pub mod registration;
pub mod timestamp;
pub mod training;
pub mod user;
pub mod validation;

// Re-exports
pub use authorization::{StatusRequirement, is_active_member, is_admin_member};
pub use event::{Event, EventUpdate, NewEvent, Schedule};
pub use group::{Group, GroupType, GroupUpdate, NewGroup};
pub use image::{ImageContentType, ImageResource};
pub use membership::{
    Membership, MembershipAction, MembershipChange, MembershipError, MembershipKey,
    MembershipStatus, Role,
};
pub use registration::Registration;
pub use training::{NewPerformance, NewTraining, Performance, Training};
pub use user::{Caller, UserProfile};
pub use validation::ValidationError;
