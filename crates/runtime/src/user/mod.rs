mod badge;
mod favorite;
mod progression;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum::{Display, EnumString};

pub use badge::{Badge, EarnedBadge, UserBadge};
pub use favorite::Favorite;
pub use progression::{
    level_for_experience, next_level_experience, ExperienceReward, LevelInfo, Progression,
};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Display, EnumString, Default)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
    Admin,
    Moderator,
    #[default]
    User,
}

text_column!(UserRole);

impl UserRole {
    /// Admins can do everything moderators can.
    pub fn can_moderate(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Moderator)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,

    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub avatar: Option<String>,
    pub bio: Option<String>,

    #[sqlx(try_from = "String")]
    pub role: UserRole,

    pub level: i64,
    pub experience: i64,

    pub created_at: i64,
}

impl User {
    pub fn level_info(&self) -> LevelInfo {
        LevelInfo::from_experience(self.experience)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_user_never_carries_the_password_hash() {
        let user = User {
            id: 1,
            username: "shade".into(),
            password_hash: "salt$hash".into(),
            avatar: None,
            bio: None,
            role: UserRole::User,
            level: 1,
            experience: 0,
            created_at: 0,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn only_staff_can_moderate() {
        assert!(UserRole::Admin.can_moderate());
        assert!(UserRole::Moderator.can_moderate());
        assert!(!UserRole::User.can_moderate());
        assert_eq!("moderator".parse::<UserRole>().unwrap(), UserRole::Moderator);
    }
}
