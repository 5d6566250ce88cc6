use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{NexusError, NexusResult};

/// The kinds of content a rating, favorite or report can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TargetType {
    Post,
    Thread,
    Reply,
    Project,
    Template,
}

impl TargetType {
    pub fn parse(raw: &str) -> NexusResult<Self> {
        raw.trim()
            .to_ascii_lowercase()
            .parse()
            .map_err(|_| NexusError::invalid(format!("unknown target type `{raw}`")))
    }
}

text_column!(TargetType);

/// A polymorphic reference to a rateable/favoritable entity.
/// The referenced row is not checked for existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub target_type: TargetType,
    pub target_id: i64,
}

impl Target {
    pub fn new(target_type: TargetType, target_id: i64) -> Self {
        Self { target_type, target_id }
    }

    pub fn parse(target_type: &str, target_id: i64) -> NexusResult<Self> {
        if target_id <= 0 {
            return Err(NexusError::invalid("targetId must be a positive integer"));
        }
        Ok(Self::new(TargetType::parse(target_type)?, target_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tags_case_insensitively() {
        assert_eq!(TargetType::parse("post").unwrap(), TargetType::Post);
        assert_eq!(TargetType::parse(" Project ").unwrap(), TargetType::Project);
        assert_eq!(TargetType::Thread.to_string(), "thread");
    }

    #[test]
    fn rejects_unknown_tags_and_bad_ids() {
        assert!(matches!(TargetType::parse("comment"), Err(NexusError::InvalidArgument(_))));
        assert!(matches!(Target::parse("post", 0), Err(NexusError::InvalidArgument(_))));
    }
}
