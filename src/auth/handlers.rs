use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use bytes::Bytes;
use tower_sessions::Session;
use tracing::{instrument, warn};

use super::{
    dto::{LoginForm, RegisterForm, SessionUser},
    extractors::{end_session, start_session, ApiUser, CurrentUser},
    services::{login_user, register_user},
};
use crate::{
    error::{AppError, UploadError},
    images::UploadedFile,
    state::AppState,
    views,
};

pub const PROFILE_IMAGE_FIELD: &str = "profile_image_upload";

pub fn auth_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/login", get(login_form).post(login))
        .route(
            "/register",
            get(register_form)
                .post(register)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/me", get(get_me))
}

pub async fn login_form() -> impl IntoResponse {
    views::login_page("", &[])
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let result = match login_user(&state, &form).await {
        Ok(user) => start_session(&session, &user)
            .await
            .map_err(AppError::from),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => views::success_page(
            "Login",
            "Login successful! Redirecting...",
            "/dashboard",
            state.config.redirect_delay_secs,
        )
        .into_response(),
        Err(e) => {
            e.log("login");
            (
                e.status(),
                views::login_page(form.email.trim(), &e.public_messages()),
            )
                .into_response()
        }
    }
}

pub async fn register_form() -> impl IntoResponse {
    views::register_page(&RegisterForm::default(), &[])
}

/// Buffer the multipart body: text fields into the form, the image part
/// (if a file was actually chosen) into an `UploadedFile`.
async fn read_registration(
    mut mp: Multipart,
) -> Result<(RegisterForm, Option<UploadedFile>), (RegisterForm, AppError)> {
    let mut form = RegisterForm::default();
    let mut upload = None;

    loop {
        let field = match mp.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "multipart read failed");
                return Err((form, UploadError::Transport.into()));
            }
        };
        let name = field.name().unwrap_or_default().to_string();

        if name == PROFILE_IMAGE_FIELD {
            let declared_name = field.file_name().map(str::to_string);
            let declared_type = field.content_type().map(str::to_string);
            let content: Bytes = match field.bytes().await {
                Ok(b) => b,
                Err(e) => {
                    warn!(error = %e, "profile image transfer failed");
                    return Err((form, UploadError::Transport.into()));
                }
            };
            let chosen = declared_name.as_deref().is_some_and(|n| !n.is_empty());
            if chosen || !content.is_empty() {
                upload = Some(UploadedFile {
                    content,
                    declared_name,
                    declared_type,
                });
            }
            continue;
        }

        match field.text().await {
            Ok(value) => form.set(&name, value),
            Err(e) => {
                warn!(error = %e, field = %name, "multipart field read failed");
                return Err((form, UploadError::Transport.into()));
            }
        }
    }

    Ok((form, upload))
}

#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    mp: Multipart,
) -> Response {
    let (form, result) = match read_registration(mp).await {
        Ok((form, upload)) => {
            let result = match register_user(&state, &form, upload).await {
                Ok(user) => start_session(&session, &user)
                    .await
                    .map_err(AppError::from),
                Err(e) => Err(e),
            };
            (form, result)
        }
        Err((form, e)) => (form, Err(e)),
    };

    match result {
        Ok(()) => views::success_page(
            "Sign up",
            "Welcome to ArtShare! Your account has been created.",
            "/dashboard",
            state.config.redirect_delay_secs,
        )
        .into_response(),
        Err(e) => {
            e.log("register");
            (e.status(), views::register_page(&form, &e.public_messages())).into_response()
        }
    }
}

#[instrument(skip_all)]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = end_session(&session).await {
        AppError::from(e).log("logout");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Redirect::to("/login").into_response()
}

pub async fn dashboard(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    views::dashboard_page(&user)
}

pub async fn get_me(ApiUser(user): ApiUser) -> Json<SessionUser> {
    Json(user)
}
