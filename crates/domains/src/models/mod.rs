//! # Domain Models
//!
//! These structs represent the core entities of the complaint platform.
//! Serialized field names follow the legacy document collections
//! (`denuncias`, `comentarios`, `usuarios`) so existing clients keep working.

mod category;
mod comment;
mod complaint;
mod user;

pub use category::{Category, UnknownCategory};
pub use comment::{Comment, CommentStatus};
pub use complaint::{Complaint, ComplaintDraft, ComplaintOrder, ComplaintStatus, LikeOutcome};
pub use user::{
    Caller, Registration, SettingsPatch, User, UserActivity, UserSettings, UserStats,
    ANONYMOUS_DISPLAY_NAME,
};
