mod env;
mod global_state;
mod middleware;
mod response;
mod routes;
mod utils;

use axum::Router;

pub use routes::{
    auth_routes, badge_routes, favorite_routes, forum_routes, misc_routes, post_routes,
    project_routes, rating_routes, report_routes, search_routes, template_routes, user_routes,
};

pub use env::ApiServerEnv;
pub use global_state::GlobalState;
pub use middleware::authenticate;
pub use response::{status_for, AppError, AppSuccess, GenericResponse};
pub use utils::{extract_bearer_token, setup_tracing};

/// Every route, bound to `state`. Layers (CORS, tracing, timeouts) are added by the binary.
pub fn build_router(state: GlobalState) -> Router {
    Router::new()
        .merge(auth_routes(&state))
        .merge(user_routes(&state))
        .merge(badge_routes(&state))
        .merge(post_routes(&state))
        .merge(forum_routes(&state))
        .merge(project_routes(&state))
        .merge(template_routes(&state))
        .merge(rating_routes(&state))
        .merge(favorite_routes(&state))
        .merge(report_routes(&state))
        .merge(search_routes())
        .merge(misc_routes())
        .with_state(state)
}
