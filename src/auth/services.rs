use anyhow::Context;
use tracing::{info, warn};

use super::dto::{LoginForm, RegisterForm, SessionUser};
use super::validation::{normalize_email, validate_registration};
use crate::error::AppError;
use crate::images::{store_profile_image, UploadedFile};
use crate::state::AppState;
use crate::users::NewUser;

/// Check credentials and return the snapshot to put in the session.
///
/// An unknown email and a wrong password both yield
/// `AppError::Authentication`, so callers cannot tell them apart.
pub async fn login_user(state: &AppState, form: &LoginForm) -> Result<SessionUser, AppError> {
    let email = normalize_email(&form.email);
    if email.is_empty() || form.password.trim().is_empty() {
        return Err(AppError::Validation(vec![
            "Please enter both email and password".to_string(),
        ]));
    }

    let user = state
        .users
        .find_by_email(&email)
        .await
        .context("find user by email")?;

    let Some(user) = user else {
        state.hasher.verify_decoy(&form.password);
        warn!("login for unknown email");
        return Err(AppError::Authentication);
    };

    let ok = state
        .hasher
        .verify(&form.password, &user.password_hash)
        .with_context(|| format!("verify password for user {}", user.id))?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Authentication);
    }

    info!(user_id = %user.id, "user logged in");
    Ok(SessionUser::from(&user))
}

/// Validate, check uniqueness, store the optional image, then insert the
/// user inside one transaction.
pub async fn register_user(
    state: &AppState,
    form: &RegisterForm,
    upload: Option<UploadedFile>,
) -> Result<SessionUser, AppError> {
    let input = validate_registration(form)?;

    // Fast path only. The UNIQUE constraints catch whatever slips past.
    let existing = state
        .users
        .find_by_email_or_username(&input.email, &input.username)
        .await
        .context("check for existing user")?;
    if existing.is_some() {
        warn!(username = %input.username, "username or email already registered");
        return Err(AppError::Conflict);
    }

    let profile_image = match upload {
        Some(file) => Some(store_profile_image(state.storage.as_ref(), &file).await?),
        None => None,
    };

    let password_hash = state
        .hasher
        .hash(&input.password)
        .context("hash password")?;

    let new_user = NewUser {
        username: input.username,
        email: input.email,
        password_hash,
        profile_image,
        profile: input.profile,
    };

    let mut tx = state.users.begin().await.context("begin transaction")?;
    let inserted = tx.insert_user(&new_user).await;
    let id = match inserted {
        Ok(id) => id,
        Err(e) => {
            if let Err(rb) = tx.rollback().await {
                warn!(error = %rb, "rollback after failed insert");
            }
            if let Some(key) = &new_user.profile_image {
                warn!(key = %key, "profile image left without a user");
            }
            return Err(e.into());
        }
    };
    tx.commit().await?;

    info!(user_id = %id, username = %new_user.username, "user registered");
    Ok(SessionUser {
        id,
        username: new_user.username,
        email: new_user.email,
        profile_image: new_user.profile_image,
    })
}
