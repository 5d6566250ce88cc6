use axum::routing::get;
use axum::Router;

use crate::GlobalState;

pub fn misc_routes() -> Router<GlobalState> {
    Router::new()
        .route("/health",
            get(|| async { "OK" })
        )
}
