use crate::domain::auth::{RefreshToken, RefreshTokenRepository, hash_token};
use crate::infrastructure::db::DbPool;
use crate::infrastructure::db::models::auth::RefreshTokenDbModel;
use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgExecutor;
use time::OffsetDateTime;

pub struct PostgresRefreshTokenRepository {
    pool: DbPool,
}

impl PostgresRefreshTokenRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

async fn insert<'e, E>(executor: E, token: &RefreshToken) -> Result<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (id, user_id, token_hash, issued_at, expires_at, revoked, revoked_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(token.id)
    .bind(token.user_id)
    .bind(&token.token_hash)
    .bind(token.issued_at)
    .bind(token.expires_at)
    .bind(token.revoked)
    .bind(token.revoked_at)
    .execute(executor)
    .await?;

    Ok(())
}

#[async_trait]
impl RefreshTokenRepository for PostgresRefreshTokenRepository {
    async fn create(&self, token: &RefreshToken) -> Result<()> {
        insert(&self.pool, token).await
    }

    async fn find_by_value(&self, token_value: &str) -> Result<Option<RefreshToken>> {
        let token_db = sqlx::query_as::<_, RefreshTokenDbModel>(
            r#"
            SELECT id, user_id, token_hash, issued_at, expires_at, revoked, revoked_at
            FROM refresh_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(hash_token(token_value))
        .fetch_optional(&self.pool)
        .await?;

        Ok(token_db.map(|t| t.into()))
    }

    async fn rotate(&self, current: &RefreshToken, replacement: &RefreshToken) -> Result<bool> {
        // Dropping the transaction without commit rolls it back, so a
        // cancelled caller leaves neither half of the pair behind.
        let mut tx = self.pool.begin().await?;

        // Row lock serialises concurrent rotations; the loser re-reads
        // revoked = TRUE and matches nothing.
        let revoked = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE, revoked_at = $2
            WHERE id = $1 AND revoked = FALSE AND expires_at > $2
            "#,
        )
        .bind(current.id)
        .bind(replacement.issued_at)
        .execute(&mut *tx)
        .await?;

        if revoked.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        insert(&mut *tx, replacement).await?;
        tx.commit().await?;

        Ok(true)
    }

    async fn revoke(&self, token: &RefreshToken) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE, revoked_at = $2
            WHERE id = $1 AND revoked = FALSE
            "#,
        )
        .bind(token.id)
        .bind(OffsetDateTime::now_utc())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
