use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::response::AppError;
use crate::utils::extract_bearer_token;
use crate::GlobalState;

/// Resolves the bearer token and stores the caller as an `AuthenticatedUser` extension.
pub async fn authenticate(
    State(state): State<GlobalState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&req)?;
    let caller = state.nexus.accounts.authenticate(&token).await?;

    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}
