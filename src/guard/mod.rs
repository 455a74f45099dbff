//! Uniqueness checks over the document store.
//!
//! Each check is a read followed by a conditional decision, with no
//! transactional isolation: the store offers no native uniqueness
//! constraint on arbitrary fields, so uniqueness is approximated by
//! query-then-write. Two concurrent calls with the same candidate can both
//! pass their read and both write - a known, accepted race (the Postgres
//! adapter's key constraint closes it for usernames only, since the
//! username is the Profile document's key).

use crate::error::ApiError;
use crate::identity::IdentityDirectory;
use crate::store::{collections, DocumentStore};

/// Reject the create when an Author with this name already exists.
pub async fn ensure_author_absent(
    store: &dyn DocumentStore,
    name: &str,
) -> Result<(), ApiError> {
    let matches = store.query(collections::AUTHORS, "name", name, 1).await?;
    if !matches.is_empty() {
        return Err(ApiError::already_exists("This author already exists!"));
    }
    Ok(())
}

/// Reject the create when the caller already has a Profile.
pub async fn ensure_profile_absent_for_caller(
    store: &dyn DocumentStore,
    caller_id: &str,
) -> Result<(), ApiError> {
    let matches = store
        .query(collections::PROFILES, "userId", caller_id, 1)
        .await?;
    if !matches.is_empty() {
        return Err(ApiError::already_exists(
            "This user already has a profile!",
        ));
    }
    Ok(())
}

/// Reject the create when the username (the Profile document key) is taken.
pub async fn ensure_username_free(
    store: &dyn DocumentStore,
    username: &str,
) -> Result<(), ApiError> {
    if store.get(collections::PROFILES, username).await?.is_some() {
        return Err(ApiError::already_exists(
            "This username is already taken!",
        ));
    }
    Ok(())
}

/// Attach the admin claim when the caller's registered email matches the
/// configured administrator account. Idempotent; callers with no directory
/// record or a different email are left untouched.
pub async fn maybe_promote_to_admin(
    directory: &dyn IdentityDirectory,
    caller_id: &str,
    admin_email: &str,
) {
    if admin_email.is_empty() {
        return;
    }
    if let Some(account) = directory.lookup(caller_id).await {
        if account.email == admin_email {
            directory.set_admin_claim(caller_id).await;
            tracing::info!(uid = caller_id, "granted admin claim");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::MemoryDirectory;
    use crate::store::memory::MemoryStore;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> crate::store::Fields {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn author_check_trips_on_existing_name() {
        let store = MemoryStore::new();
        assert!(ensure_author_absent(&store, "Tolkien").await.is_ok());

        store
            .add(collections::AUTHORS, fields(json!({ "name": "Tolkien" })))
            .await
            .unwrap();

        let err = ensure_author_absent(&store, "Tolkien").await.unwrap_err();
        assert_eq!(err.error_code(), "ALREADY_EXISTS");
        assert!(ensure_author_absent(&store, "Herbert").await.is_ok());
    }

    #[tokio::test]
    async fn profile_check_trips_on_existing_user_id() {
        let store = MemoryStore::new();
        store
            .set(
                collections::PROFILES,
                "alice",
                fields(json!({ "userId": "u1" })),
            )
            .await
            .unwrap();

        let err = ensure_profile_absent_for_caller(&store, "u1")
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "ALREADY_EXISTS");
        assert!(ensure_profile_absent_for_caller(&store, "u2").await.is_ok());
    }

    #[tokio::test]
    async fn username_check_is_a_key_lookup() {
        let store = MemoryStore::new();
        store
            .set(
                collections::PROFILES,
                "alice",
                fields(json!({ "userId": "u1" })),
            )
            .await
            .unwrap();

        // Taken regardless of which user owns it
        let err = ensure_username_free(&store, "alice").await.unwrap_err();
        assert_eq!(err.error_code(), "ALREADY_EXISTS");
        assert!(ensure_username_free(&store, "bob").await.is_ok());
    }

    #[tokio::test]
    async fn promotion_requires_matching_email() {
        let directory = MemoryDirectory::new();
        directory.register("u1", "admin@example.com").await;
        directory.register("u2", "user@example.com").await;

        maybe_promote_to_admin(&directory, "u1", "admin@example.com").await;
        maybe_promote_to_admin(&directory, "u2", "admin@example.com").await;
        maybe_promote_to_admin(&directory, "ghost", "admin@example.com").await;

        assert!(directory.lookup("u1").await.unwrap().admin);
        assert!(!directory.lookup("u2").await.unwrap().admin);
    }

    #[tokio::test]
    async fn promotion_disabled_when_no_admin_email_configured() {
        let directory = MemoryDirectory::new();
        directory.register("u1", "").await;
        maybe_promote_to_admin(&directory, "u1", "").await;
        assert!(!directory.lookup("u1").await.unwrap().admin);
    }
}
