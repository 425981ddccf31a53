//! Persistence of outstanding refresh tokens.
//!
//! A token value that exists in the store is either still valid or in the
//! process of being deleted; it is never considered valid past its expiry
//! even if the background sweep lags, because expiry is also enforced lazily
//! at lookup time.
//!
//! Every operation takes the connection explicitly so callers can run the
//! claim-and-reissue sequence of a rotation inside one transaction.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use entity::refresh_tokens;

use crate::error::{AppError, Result};

pub struct RefreshTokenStore;

impl RefreshTokenStore {
    /// Insert a new refresh token record.
    ///
    /// A colliding token value is astronomically unlikely at 320 bits of
    /// entropy but is still surfaced as a `Conflict` rather than ignored; a
    /// stored token must never be re-issued to a different owner.
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        user_id: i32,
        token: &str,
        expires_at: chrono::NaiveDateTime,
    ) -> Result<refresh_tokens::Model> {
        let record = refresh_tokens::ActiveModel {
            user_id: Set(user_id),
            token: Set(token.to_string()),
            expires_at: Set(expires_at),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };

        record.insert(conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict("refresh token collision")
            } else {
                AppError::from(e)
            }
        })
    }

    /// Look up a token value, enforcing expiry.
    ///
    /// Mutating lookup: an expired record is deleted as a side effect and
    /// reported as absent, so stale tokens never validate even between
    /// background sweeps.
    pub async fn find_valid<C: ConnectionTrait>(
        conn: &C,
        token: &str,
    ) -> Result<Option<refresh_tokens::Model>> {
        let record = refresh_tokens::Entity::find()
            .filter(refresh_tokens::Column::Token.eq(token))
            .one(conn)
            .await?;

        let Some(record) = record else {
            return Ok(None);
        };

        if record.expires_at <= Utc::now().naive_utc() {
            tracing::debug!(user_id = record.user_id, "deleting expired refresh token");
            Self::delete_by_token(conn, token).await?;
            return Ok(None);
        }

        Ok(Some(record))
    }

    /// Atomically claim a token value for rotation.
    ///
    /// Single conditional DELETE keyed by token value: of two concurrent
    /// `refresh` calls (or a refresh racing a logout) on the same value,
    /// exactly one observes `true`; the loser must treat the token as not
    /// found.
    pub async fn claim<C: ConnectionTrait>(conn: &C, token: &str) -> Result<bool> {
        let outcome = refresh_tokens::Entity::delete_many()
            .filter(refresh_tokens::Column::Token.eq(token))
            .exec(conn)
            .await?;
        Ok(outcome.rows_affected == 1)
    }

    /// Delete a token record if present. Idempotent; absent values are fine.
    pub async fn delete_by_token<C: ConnectionTrait>(conn: &C, token: &str) -> Result<()> {
        refresh_tokens::Entity::delete_many()
            .filter(refresh_tokens::Column::Token.eq(token))
            .exec(conn)
            .await?;
        Ok(())
    }

    /// Remove every record past its expiry. Idempotent; run periodically.
    pub async fn sweep_expired<C: ConnectionTrait>(conn: &C) -> Result<u64> {
        let outcome = refresh_tokens::Entity::delete_many()
            .filter(refresh_tokens::Column::ExpiresAt.lte(Utc::now().naive_utc()))
            .exec(conn)
            .await?;
        Ok(outcome.rows_affected)
    }
}

fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    let text = err.to_string();
    text.contains("UNIQUE constraint failed")
        || text.contains("duplicate key")
        || text.contains("Duplicate entry")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sea_orm::{DatabaseConnection, TransactionTrait};

    use crate::testing;

    async fn setup() -> (DatabaseConnection, i32) {
        let db = testing::setup_test_db().await;
        let user = testing::insert_user(&db, "store@test.com", "Secret1!").await;
        (db, user.id)
    }

    #[tokio::test]
    async fn create_then_find_valid_returns_the_record() {
        let (db, user_id) = setup().await;
        let expires = (Utc::now() + Duration::days(7)).naive_utc();

        RefreshTokenStore::create(&db, user_id, "tok-1", expires)
            .await
            .unwrap();
        let found = RefreshTokenStore::find_valid(&db, "tok-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.user_id, user_id);
    }

    #[tokio::test]
    async fn duplicate_token_value_is_a_conflict() {
        let (db, user_id) = setup().await;
        let expires = (Utc::now() + Duration::days(7)).naive_utc();

        RefreshTokenStore::create(&db, user_id, "tok-dup", expires)
            .await
            .unwrap();
        let err = RefreshTokenStore::create(&db, user_id, "tok-dup", expires)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn expired_record_is_absent_and_deleted_on_lookup() {
        let (db, user_id) = setup().await;
        let expired = (Utc::now() - Duration::minutes(1)).naive_utc();

        RefreshTokenStore::create(&db, user_id, "tok-old", expired)
            .await
            .unwrap();
        assert!(
            RefreshTokenStore::find_valid(&db, "tok-old")
                .await
                .unwrap()
                .is_none()
        );

        // The lazy delete removed the row, not just hid it.
        let raw = refresh_tokens::Entity::find()
            .filter(refresh_tokens::Column::Token.eq("tok-old"))
            .one(&db)
            .await
            .unwrap();
        assert!(raw.is_none());
    }

    #[tokio::test]
    async fn claim_succeeds_exactly_once() {
        let (db, user_id) = setup().await;
        let expires = (Utc::now() + Duration::days(7)).naive_utc();

        RefreshTokenStore::create(&db, user_id, "tok-claim", expires)
            .await
            .unwrap();
        assert!(RefreshTokenStore::claim(&db, "tok-claim").await.unwrap());
        assert!(!RefreshTokenStore::claim(&db, "tok-claim").await.unwrap());
    }

    #[tokio::test]
    async fn aborted_rotation_rolls_back_the_claim() {
        let (db, user_id) = setup().await;
        let expires = (Utc::now() + Duration::days(7)).naive_utc();

        RefreshTokenStore::create(&db, user_id, "tok-rot", expires)
            .await
            .unwrap();

        // Claim inside a transaction that never commits: the rotation was
        // abandoned between the delete and the re-insert.
        let txn = db.begin().await.unwrap();
        assert!(RefreshTokenStore::claim(&txn, "tok-rot").await.unwrap());
        txn.rollback().await.unwrap();

        // The presented token is still live; the session was not lost.
        assert!(
            RefreshTokenStore::find_valid(&db, "tok-rot")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn delete_by_token_is_idempotent() {
        let (db, _user_id) = setup().await;
        RefreshTokenStore::delete_by_token(&db, "never-existed")
            .await
            .unwrap();
        RefreshTokenStore::delete_by_token(&db, "never-existed")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn sweep_removes_only_expired_records() {
        let (db, user_id) = setup().await;
        let live = (Utc::now() + Duration::days(1)).naive_utc();
        let dead = (Utc::now() - Duration::days(1)).naive_utc();

        RefreshTokenStore::create(&db, user_id, "tok-live", live)
            .await
            .unwrap();
        RefreshTokenStore::create(&db, user_id, "tok-dead-1", dead)
            .await
            .unwrap();
        RefreshTokenStore::create(&db, user_id, "tok-dead-2", dead)
            .await
            .unwrap();

        assert_eq!(RefreshTokenStore::sweep_expired(&db).await.unwrap(), 2);
        assert!(
            RefreshTokenStore::find_valid(&db, "tok-live")
                .await
                .unwrap()
                .is_some()
        );
    }
}
