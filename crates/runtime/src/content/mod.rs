mod forum;
mod post;
mod project;
mod report;
mod template;

pub use forum::{ForumCategory, ForumReply, ForumThread};
pub use post::Post;
pub use project::{Project, ProjectMember, MEMBER_ROLE, OWNER_ROLE};
pub use report::{Report, ReportStatus};
pub use template::ContentTemplate;
