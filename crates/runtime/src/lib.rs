/// Lets a `strum` enum be read from a TEXT column via `#[sqlx(try_from = "String")]`.
macro_rules! text_column {
    ($ty:ty) => {
        impl TryFrom<String> for $ty {
            type Error = strum::ParseError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

mod commands;
mod content;
mod error;
mod memory;
mod rating;
mod services;
mod store;
mod target;
mod user;

pub use commands::*;
pub use content::{
    ContentTemplate, ForumCategory, ForumReply, ForumThread, Post, Project, ProjectMember,
    Report, ReportStatus, MEMBER_ROLE, OWNER_ROLE,
};
pub use error::{NexusError, NexusResult};
pub use memory::MemoryStore;
pub use rating::{Rating, RatingStats, RatingSummary};
pub use services::{
    AccountSettings, Accounts, AuthenticatedUser, BadgeAwarder, ExperienceAwarder,
    FavoriteToggler, Feed, Forum, Moderation, Nexus, Projects, RatingAggregator, Search,
    SearchKind, SearchResults, Session, Templates,
};
pub use store::{NexusStore, SharedStore};
pub use target::{Target, TargetType};
pub use user::{
    level_for_experience, next_level_experience, Badge, EarnedBadge, ExperienceReward, Favorite,
    LevelInfo, Progression, User, UserBadge, UserRole,
};
