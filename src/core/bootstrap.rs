use time::{OffsetDateTime, PrimitiveDateTime};
use uuid::Uuid;

use crate::core::security;
use crate::core::state::AppState;
use crate::db::types::UserRole;
use crate::repositories;

/// Make sure a default reviewer account exists so a fresh deployment can
/// author assessments and grade submissions immediately.
pub(crate) async fn ensure_default_reviewer(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_reviewer_password.is_empty() {
        tracing::warn!("FIRST_REVIEWER_PASSWORD not configured; skipping reviewer creation");
        return Ok(());
    }

    let email = &admin.first_reviewer_email;
    let user = repositories::users::find_by_email(state.db(), email).await?;

    let now_offset = OffsetDateTime::now_utc();
    let now_primitive = PrimitiveDateTime::new(now_offset.date(), now_offset.time());

    if let Some(user) = user {
        let mut needs_update = false;
        let verified =
            security::verify_password(&admin.first_reviewer_password, &user.hashed_password)
                .unwrap_or(false);

        let hashed_password = if verified {
            user.hashed_password.clone()
        } else {
            needs_update = true;
            security::hash_password(&admin.first_reviewer_password)?
        };

        let role = if user.role != UserRole::Reviewer {
            needs_update = true;
            UserRole::Reviewer
        } else {
            user.role
        };

        let is_active = if !user.is_active {
            needs_update = true;
            true
        } else {
            user.is_active
        };

        if needs_update {
            sqlx::query(
                "UPDATE users
                 SET hashed_password = $1,
                     role = $2,
                     is_active = $3,
                     updated_at = $4
                 WHERE id = $5",
            )
            .bind(hashed_password)
            .bind(role)
            .bind(is_active)
            .bind(now_primitive)
            .bind(user.id)
            .execute(state.db())
            .await?;

            tracing::info!("Updated default reviewer {email}");
        } else {
            tracing::info!("Default reviewer already up to date");
        }

        return Ok(());
    }

    let hashed_password = security::hash_password(&admin.first_reviewer_password)?;

    sqlx::query(
        "INSERT INTO users (
            id, username, email, hashed_password, role, is_active, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&admin.first_reviewer_username)
    .bind(email)
    .bind(hashed_password)
    .bind(UserRole::Reviewer)
    .bind(true)
    .bind(now_primitive)
    .bind(now_primitive)
    .execute(state.db())
    .await?;

    tracing::info!("Created default reviewer {email}");
    Ok(())
}
