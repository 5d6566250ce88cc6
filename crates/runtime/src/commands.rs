//! Request bodies as they arrive over the wire, and the validated commands built from them.
//!
//! Every `*Request` is plain `serde` input with optional/loosely typed fields. Handlers convert
//! it with `TryFrom` into the matching command before anything touches storage, so services only
//! ever see well-formed values.

use serde::{Deserialize, Serialize};

use crate::content::ReportStatus;
use crate::error::{NexusError, NexusResult};
use crate::rating::{MAX_SCORE, MIN_SCORE};
use crate::target::Target;
use crate::user::UserRole;

const MAX_POST_LENGTH: usize = 5000;
const MAX_TAGS: usize = 10;
const MAX_TAG_LENGTH: usize = 32;
const MAX_TITLE_LENGTH: usize = 200;
const MAX_TEXT_LENGTH: usize = 20_000;
const MAX_NAME_LENGTH: usize = 100;
const MIN_PASSWORD_LENGTH: usize = 8;

fn required(field: &str, value: Option<String>, max_len: usize) -> NexusResult<String> {
    let value = value.unwrap_or_default().trim().to_string();
    if value.is_empty() {
        return Err(NexusError::invalid(format!("{field} is required")));
    }
    if value.chars().count() > max_len {
        return Err(NexusError::invalid(format!("{field} must be at most {max_len} characters")));
    }
    Ok(value)
}

fn optional(field: &str, value: Option<String>, max_len: usize) -> NexusResult<Option<String>> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(v) if v.chars().count() > max_len => Err(NexusError::invalid(format!(
            "{field} must be at most {max_len} characters"
        ))),
        other => Ok(other),
    }
}

fn positive_id(field: &str, value: Option<i64>) -> NexusResult<i64> {
    match value {
        Some(id) if id > 0 => Ok(id),
        Some(_) => Err(NexusError::invalid(format!("{field} must be a positive integer"))),
        None => Err(NexusError::invalid(format!("{field} is required"))),
    }
}

/* ACCOUNTS */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl TryFrom<CredentialsRequest> for Credentials {
    type Error = NexusError;

    fn try_from(req: CredentialsRequest) -> NexusResult<Self> {
        let username = required("username", req.username, 32)?;
        if username.chars().count() < 3 {
            return Err(NexusError::invalid("username must be at least 3 characters"));
        }
        if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(NexusError::invalid(
                "username may only contain letters, digits, `_` and `-`",
            ));
        }

        let password = req.password.unwrap_or_default();
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(NexusError::invalid(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        Ok(Self { username, password })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetRoleRequest {
    pub role: Option<String>,
}

impl TryFrom<SetRoleRequest> for UserRole {
    type Error = NexusError;

    fn try_from(req: SetRoleRequest) -> NexusResult<Self> {
        let raw = required("role", req.role, 16)?;
        raw.to_ascii_lowercase()
            .parse()
            .map_err(|_| NexusError::invalid(format!("unknown role `{raw}`")))
    }
}

/* BADGES */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBadgeRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBadge {
    pub name: String,
    pub description: String,
    pub icon: String,
}

impl TryFrom<CreateBadgeRequest> for CreateBadge {
    type Error = NexusError;

    fn try_from(req: CreateBadgeRequest) -> NexusResult<Self> {
        Ok(Self {
            name: required("name", req.name, MAX_NAME_LENGTH)?,
            description: required("description", req.description, MAX_TITLE_LENGTH)?,
            icon: required("icon", req.icon, MAX_NAME_LENGTH)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardBadgeRequest {
    pub badge_id: Option<i64>,
}

impl AwardBadgeRequest {
    pub fn badge_id(&self) -> NexusResult<i64> {
        positive_id("badgeId", self.badge_id)
    }
}

/* POSTS */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub content: Option<String>,
    pub image: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePost {
    pub content: String,
    pub image: Option<String>,
    pub tags: Vec<String>,
}

impl TryFrom<CreatePostRequest> for CreatePost {
    type Error = NexusError;

    fn try_from(req: CreatePostRequest) -> NexusResult<Self> {
        let mut tags: Vec<String> = Vec::new();
        for tag in req.tags.unwrap_or_default() {
            let tag = tag.trim().trim_start_matches('#').to_lowercase();
            if tag.is_empty() || tags.contains(&tag) {
                continue;
            }
            if tag.chars().count() > MAX_TAG_LENGTH {
                return Err(NexusError::invalid(format!(
                    "tags must be at most {MAX_TAG_LENGTH} characters"
                )));
            }
            tags.push(tag);
        }
        if tags.len() > MAX_TAGS {
            return Err(NexusError::invalid(format!("a post can carry at most {MAX_TAGS} tags")));
        }

        Ok(Self {
            content: required("content", req.content, MAX_POST_LENGTH)?,
            image: optional("image", req.image, 2048)?,
            tags,
        })
    }
}

/* FORUM */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub icon: Option<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCategory {
    pub name: String,
    pub description: String,
    pub slug: String,
    pub icon: Option<String>,
    pub order: i32,
}

impl TryFrom<CreateCategoryRequest> for CreateCategory {
    type Error = NexusError;

    fn try_from(req: CreateCategoryRequest) -> NexusResult<Self> {
        let slug = required("slug", req.slug, MAX_NAME_LENGTH)?.to_lowercase();
        if !slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(NexusError::invalid("slug may only contain letters, digits and `-`"));
        }
        Ok(Self {
            name: required("name", req.name, MAX_NAME_LENGTH)?,
            description: required("description", req.description, MAX_TITLE_LENGTH)?,
            slug,
            icon: optional("icon", req.icon, MAX_NAME_LENGTH)?,
            order: req.order.unwrap_or(0),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateThreadRequest {
    pub category_id: Option<i64>,
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateThread {
    pub category_id: i64,
    pub title: String,
    pub content: String,
}

impl TryFrom<CreateThreadRequest> for CreateThread {
    type Error = NexusError;

    fn try_from(req: CreateThreadRequest) -> NexusResult<Self> {
        Ok(Self {
            category_id: positive_id("categoryId", req.category_id)?,
            title: required("title", req.title, MAX_TITLE_LENGTH)?,
            content: required("content", req.content, MAX_TEXT_LENGTH)?,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadFlagsRequest {
    pub is_pinned: Option<bool>,
    pub is_locked: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReplyRequest {
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReply {
    pub content: String,
}

impl TryFrom<CreateReplyRequest> for CreateReply {
    type Error = NexusError;

    fn try_from(req: CreateReplyRequest) -> NexusResult<Self> {
        Ok(Self { content: required("content", req.content, MAX_TEXT_LENGTH)? })
    }
}

/* PROJECTS */

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub repository: Option<String>,
    pub website_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProject {
    pub name: String,
    pub description: String,
    pub repository: Option<String>,
    pub website_url: Option<String>,
}

impl TryFrom<CreateProjectRequest> for CreateProject {
    type Error = NexusError;

    fn try_from(req: CreateProjectRequest) -> NexusResult<Self> {
        let repository = optional("repository", req.repository, 2048)?;
        let website_url = optional("websiteUrl", req.website_url, 2048)?;
        for (field, url) in [("repository", &repository), ("websiteUrl", &website_url)] {
            if let Some(url) = url {
                if !(url.starts_with("https://") || url.starts_with("http://")) {
                    return Err(NexusError::invalid(format!("{field} must be an http(s) URL")));
                }
            }
        }
        Ok(Self {
            name: required("name", req.name, MAX_NAME_LENGTH)?,
            description: required("description", req.description, MAX_TEXT_LENGTH)?,
            repository,
            website_url,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoinProjectRequest {
    pub role: Option<String>,
}

/* TEMPLATES */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTemplate {
    pub name: String,
    pub description: String,
    pub category: String,
    pub content: String,
}

impl TryFrom<CreateTemplateRequest> for CreateTemplate {
    type Error = NexusError;

    fn try_from(req: CreateTemplateRequest) -> NexusResult<Self> {
        Ok(Self {
            name: required("name", req.name, MAX_NAME_LENGTH)?,
            description: required("description", req.description, MAX_TITLE_LENGTH)?,
            category: required("category", req.category, 64)?.to_lowercase(),
            content: required("content", req.content, MAX_TEXT_LENGTH)?,
        })
    }
}

/* RATINGS & FAVORITES */

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRequest {
    pub target_type: Option<String>,
    pub target_id: Option<i64>,
    pub score: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateTarget {
    pub target: Target,
    pub score: i32,
}

impl TryFrom<RateRequest> for RateTarget {
    type Error = NexusError;

    fn try_from(req: RateRequest) -> NexusResult<Self> {
        let target = TargetRequest { target_type: req.target_type, target_id: req.target_id }
            .try_into()?;
        let score = req.score.ok_or_else(|| NexusError::invalid("score is required"))?;
        if !(MIN_SCORE as i64..=MAX_SCORE as i64).contains(&score) {
            return Err(NexusError::invalid(format!(
                "score must be between {MIN_SCORE} and {MAX_SCORE}"
            )));
        }
        Ok(Self { target, score: score as i32 })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRequest {
    pub target_type: Option<String>,
    pub target_id: Option<i64>,
}

impl TryFrom<TargetRequest> for Target {
    type Error = NexusError;

    fn try_from(req: TargetRequest) -> NexusResult<Self> {
        let target_type = required("targetType", req.target_type, 32)?;
        let target_id = positive_id("targetId", req.target_id)?;
        Target::parse(&target_type, target_id)
    }
}

/* REPORTS */

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub target_type: Option<String>,
    pub target_id: Option<i64>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReport {
    pub target: Target,
    pub reason: String,
}

impl TryFrom<CreateReportRequest> for CreateReport {
    type Error = NexusError;

    fn try_from(req: CreateReportRequest) -> NexusResult<Self> {
        Ok(Self {
            target: TargetRequest { target_type: req.target_type, target_id: req.target_id }
                .try_into()?,
            reason: required("reason", req.reason, MAX_TITLE_LENGTH * 5)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewReportRequest {
    pub status: Option<String>,
    pub resolution: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewReport {
    pub status: ReportStatus,
    pub resolution: Option<String>,
}

impl TryFrom<ReviewReportRequest> for ReviewReport {
    type Error = NexusError;

    fn try_from(req: ReviewReportRequest) -> NexusResult<Self> {
        let raw = required("status", req.status, 16)?;
        let status = raw
            .to_ascii_lowercase()
            .parse::<ReportStatus>()
            .map_err(|_| NexusError::invalid(format!("unknown report status `{raw}`")))?;
        if status == ReportStatus::Pending {
            return Err(NexusError::invalid("a review must accept or reject the report"));
        }
        Ok(Self {
            status,
            resolution: optional("resolution", req.resolution, MAX_TEXT_LENGTH)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TargetType;

    fn credentials(username: &str, password: &str) -> NexusResult<Credentials> {
        CredentialsRequest {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        }
        .try_into()
    }

    #[test]
    fn credentials_validation() {
        assert!(credentials("night_owl", "longenough").is_ok());
        assert!(matches!(credentials("ab", "longenough"), Err(NexusError::InvalidArgument(_))));
        assert!(matches!(credentials("bad name", "longenough"), Err(NexusError::InvalidArgument(_))));
        assert!(matches!(credentials("night_owl", "short"), Err(NexusError::InvalidArgument(_))));
    }

    #[test]
    fn post_tags_are_normalized_and_deduplicated() {
        let post = CreatePost::try_from(CreatePostRequest {
            content: Some("  hello nexus  ".into()),
            image: Some("   ".into()),
            tags: Some(vec!["#Rust".into(), "rust".into(), " ".into(), "anime".into()]),
        })
        .unwrap();
        assert_eq!(post.content, "hello nexus");
        assert_eq!(post.image, None);
        assert_eq!(post.tags, vec!["rust".to_string(), "anime".to_string()]);
    }

    #[test]
    fn empty_post_is_rejected() {
        let err = CreatePost::try_from(CreatePostRequest { content: None, image: None, tags: None })
            .unwrap_err();
        assert!(matches!(err, NexusError::InvalidArgument(_)));
    }

    #[test]
    fn score_must_be_within_range() {
        let rate = |score| {
            RateTarget::try_from(RateRequest {
                target_type: Some("post".into()),
                target_id: Some(1),
                score: Some(score),
            })
        };
        assert!(matches!(rate(0), Err(NexusError::InvalidArgument(_))));
        assert!(matches!(rate(6), Err(NexusError::InvalidArgument(_))));
        let ok = rate(3).unwrap();
        assert_eq!(ok.score, 3);
        assert_eq!(ok.target, Target::new(TargetType::Post, 1));
    }

    #[test]
    fn review_cannot_reset_to_pending() {
        let review = |status: &str| {
            ReviewReport::try_from(ReviewReportRequest {
                status: Some(status.into()),
                resolution: None,
            })
        };
        assert!(review("pending").is_err());
        assert!(review("escalated").is_err());
        assert_eq!(review("Accepted").unwrap().status, ReportStatus::Accepted);
    }

    #[test]
    fn project_urls_must_be_http() {
        let project = |repo: &str| {
            CreateProject::try_from(CreateProjectRequest {
                name: Some("Shadow Engine".into()),
                description: Some("A renderer".into()),
                repository: Some(repo.into()),
                website_url: None,
            })
        };
        assert!(project("https://github.com/nexus/shadow").is_ok());
        assert!(project("javascript:alert(1)").is_err());
    }
}
