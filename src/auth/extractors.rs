use anyhow::Context;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::error;

use super::dto::SessionUser;

pub const SESSION_USER_KEY: &str = "user";

/// Store the snapshot under a fresh session id. Called only after the
/// credentials were verified or the account was committed.
pub async fn start_session(session: &Session, user: &SessionUser) -> anyhow::Result<()> {
    session.cycle_id().await.context("cycle session id")?;
    session
        .insert(SESSION_USER_KEY, user)
        .await
        .context("write session user")?;
    Ok(())
}

pub async fn end_session(session: &Session) -> anyhow::Result<()> {
    session.flush().await.context("flush session")
}

/// The logged-in user, read from the session. Page routes send anonymous
/// visitors to `/login`.
pub struct CurrentUser(pub SessionUser);

/// Same as `CurrentUser` but rejects with 401 instead of redirecting.
pub struct ApiUser(pub SessionUser);

async fn session_user<S: Send + Sync>(
    parts: &mut Parts,
    state: &S,
) -> Result<Option<SessionUser>, Response> {
    let session = Session::from_request_parts(parts, state)
        .await
        .map_err(IntoResponse::into_response)?;
    session
        .get::<SessionUser>(SESSION_USER_KEY)
        .await
        .map_err(|e| {
            error!(error = %e, "read session user");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        session_user(parts, state)
            .await?
            .map(CurrentUser)
            .ok_or_else(|| Redirect::to("/login").into_response())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ApiUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        session_user(parts, state)
            .await?
            .map(ApiUser)
            .ok_or_else(|| (StatusCode::UNAUTHORIZED, "Not authenticated").into_response())
    }
}
