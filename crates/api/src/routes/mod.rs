mod auth;
mod badges;
mod favorites;
mod forum;
mod misc;
mod posts;
mod projects;
mod ratings;
mod reports;
mod search;
mod templates;
mod user;

pub use auth::auth_routes;
pub use badges::badge_routes;
pub use favorites::favorite_routes;
pub use forum::forum_routes;
pub use misc::misc_routes;
pub use posts::post_routes;
pub use projects::project_routes;
pub use ratings::rating_routes;
pub use reports::report_routes;
pub use search::search_routes;
pub use templates::template_routes;
pub use user::user_routes;
