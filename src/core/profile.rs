//! Profile business logic - bootstrap on first sign-in and settings edits.

use crate::{
    entities::{Profile, profile},
    errors::{Error, Result},
    types::auth::{AuthUser, ProfileForm},
};
use chrono::Utc;
use sea_orm::{IntoActiveModel, prelude::*, sea_query::OnConflict};
use tracing::info;

/// Looks up the profile of `user_id`, if one exists.
pub async fn get_profile(db: &DatabaseConnection, user_id: Uuid) -> Result<Option<profile::Model>> {
    Profile::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the user's profile, creating it from the account metadata on first sign-in.
///
/// Creation is a single `INSERT ... ON CONFLICT (user_id) DO NOTHING`, so two sign-ins
/// racing for the same user still leave exactly one row.
pub async fn ensure_profile(db: &DatabaseConnection, user: &AuthUser) -> Result<profile::Model> {
    let row = user.profile_insert().into_active_model(Utc::now());

    let inserted = Profile::insert(row)
        .on_conflict(
            OnConflict::column(profile::Column::UserId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    if inserted > 0 {
        info!(user_id = %user.id, "Created profile on first sign-in");
    }

    get_profile(db, user.id)
        .await?
        .ok_or_else(|| Error::not_found("profile", user.id))
}

/// Applies the settings form to the user's profile.
pub async fn update_profile(
    db: &DatabaseConnection,
    user_id: Uuid,
    form: ProfileForm,
) -> Result<profile::Model> {
    let existing = get_profile(db, user_id)
        .await?
        .ok_or_else(|| Error::not_found("profile", user_id))?;

    let mut active = existing.into_active_model();
    form.into_update(Utc::now()).apply_to(&mut active);
    active.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::schema::Shape;
    use crate::test_utils::*;
    use crate::types::DEFAULT_TIMEZONE;
    use sea_orm::PaginatorTrait;
    use serde_json::json;

    #[tokio::test]
    async fn test_ensure_profile_creates_from_metadata() -> Result<()> {
        let db = setup_test_db().await?;
        let user = test_user("Ada", "Lovelace");

        let profile = ensure_profile(&db, &user).await?;
        assert_eq!(profile.user_id, user.id);
        assert_eq!(profile.first_name, "Ada");
        assert_eq!(profile.last_name, "Lovelace");
        assert_eq!(profile.timezone, DEFAULT_TIMEZONE);
        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_profile_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let user = test_user("Ada", "Lovelace");

        let first = ensure_profile(&db, &user).await?;
        let second = ensure_profile(&db, &user).await?;
        assert_eq!(first.id, second.id);

        let count = Profile::find()
            .filter(profile::Column::UserId.eq(user.id))
            .count(&db)
            .await?;
        assert_eq!(count, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_first_sign_in_leaves_one_row() -> Result<()> {
        let db = setup_test_db().await?;
        let user = test_user("Ada", "Lovelace");

        let (a, b) = tokio::join!(ensure_profile(&db, &user), ensure_profile(&db, &user));
        assert_eq!(a?.id, b?.id);
        assert_eq!(Profile::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_profile_missing() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(get_profile(&db, Uuid::new_v4()).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_profile() -> Result<()> {
        let db = setup_test_db().await?;
        let user = test_user("Ada", "");
        let created = ensure_profile(&db, &user).await?;

        let form = ProfileForm::parse(&json!({
            "firstName": "Augusta",
            "lastName": "King",
            "timezone": "Europe/London",
            "avatar_url": "https://example.com/ada.png"
        }))
        .unwrap();
        let updated = update_profile(&db, user.id, form).await?;

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.first_name, "Augusta");
        assert_eq!(updated.timezone, "Europe/London");
        assert_eq!(updated.avatar_url.as_deref(), Some("https://example.com/ada.png"));
        assert!(updated.updated_at >= created.updated_at);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_profile_requires_existing_row() -> Result<()> {
        let db = setup_test_db().await?;
        let form = ProfileForm::parse(&json!({ "firstName": "A", "lastName": "B" })).unwrap();
        let result = update_profile(&db, Uuid::new_v4(), form).await;
        assert!(matches!(result, Err(Error::NotFound { entity: "profile", .. })));
        Ok(())
    }
}
