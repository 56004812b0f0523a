use chrono::Utc;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use subtle::ConstantTimeEq;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::User;

const PBKDF2_ROUNDS: u32 = if cfg!(test) { 1_000 } else { 210_000 };
const HASH_LEN: usize = 32;

/// `salt$hex(pbkdf2_sha256(password, salt))`
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    let digest = derive_key(&salt, password);
    format!("{salt}${}", hex::encode(digest))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, digest)) = stored.split_once('$') else {
        return false;
    };
    let Ok(expected) = hex::decode(digest) else {
        return false;
    };
    let derived = derive_key(salt, password);
    derived.as_slice().ct_eq(expected.as_slice()).into()
}

fn derive_key(salt: &str, password: &str) -> [u8; HASH_LEN] {
    let mut key = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), PBKDF2_ROUNDS, &mut key);
    key
}

pub async fn create_user(pool: &SqlitePool, username: &str, password: &str) -> Result<i64, AppError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "username and password are required".to_string(),
        ));
    }

    let result = sqlx::query(
        "INSERT INTO users (username, password_hash, created_at) VALUES ($1, $2, $3)",
    )
    .bind(username)
    .bind(hash_password(password))
    .bind(Utc::now())
    .execute(pool)
    .await;

    match result {
        Ok(done) => {
            let id = done.last_insert_rowid();
            info!("Registered user {id}");
            Ok(id)
        }
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Conflict(
            format!("username '{username}' is already taken"),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Checks the password and stamps `last_login` on success. Unknown users and
/// wrong passwords are indistinguishable to the caller.
pub async fn authenticate_user(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<User, AppError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE username = $1")
        .bind(username.trim())
        .fetch_optional(pool)
        .await?;

    let mut user = match user {
        Some(user) if verify_password(password, &user.password_hash) => user,
        _ => return Err(AppError::Unauthorized),
    };

    let now = Utc::now();
    sqlx::query("UPDATE users SET last_login = $1 WHERE id = $2")
        .bind(now)
        .bind(user.id)
        .execute(pool)
        .await?;
    user.last_login = Some(now);
    Ok(user)
}

pub async fn find_user(pool: &SqlitePool, id: i64) -> Result<Option<User>, AppError> {
    Ok(sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>, AppError> {
    Ok(sqlx::query_as("SELECT * FROM users ORDER BY id")
        .fetch_all(pool)
        .await?)
}

/// Deletes the given users; their chat history goes with them. Returns the
/// number of accounts removed.
pub async fn delete_users(pool: &SqlitePool, ids: &[i64]) -> Result<u64, AppError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("DELETE FROM users WHERE id IN (");
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let deleted = query.build().execute(pool).await?.rows_affected();
    info!("Deleted {deleted} user(s)");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[test]
    fn test_password_hash_is_salted() {
        let a = hash_password("hunter2");
        let b = hash_password("hunter2");
        assert_ne!(a, b);
        assert!(!a.contains("hunter2"));
        assert!(verify_password("hunter2", &a));
        assert!(verify_password("hunter2", &b));
        assert!(!verify_password("hunter3", &a));
        assert!(!verify_password("hunter2", "no-separator"));
        assert!(!verify_password("hunter2", "salt$not-hex"));
        assert!(!verify_password("hunter2", "salt$abcd"));
    }

    #[tokio::test]
    async fn test_create_and_authenticate() {
        let pool = test_pool().await;
        let id = create_user(&pool, "alice", "pw").await.unwrap();

        let user = authenticate_user(&pool, "alice", "pw").await.unwrap();
        assert_eq!(user.id, id);
        assert!(user.last_login.is_some());

        let stored = find_user(&pool, id).await.unwrap().unwrap();
        assert!(stored.last_login.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let pool = test_pool().await;
        create_user(&pool, "alice", "pw").await.unwrap();
        assert!(matches!(
            create_user(&pool, "alice", "other").await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_bad_credentials_are_unauthorized() {
        let pool = test_pool().await;
        create_user(&pool, "alice", "pw").await.unwrap();
        assert!(matches!(
            authenticate_user(&pool, "alice", "wrong").await,
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            authenticate_user(&pool, "bob", "pw").await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_blank_username_rejected() {
        let pool = test_pool().await;
        assert!(matches!(
            create_user(&pool, "   ", "pw").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_users() {
        let pool = test_pool().await;
        let a = create_user(&pool, "a", "pw").await.unwrap();
        let b = create_user(&pool, "b", "pw").await.unwrap();
        let c = create_user(&pool, "c", "pw").await.unwrap();

        assert_eq!(delete_users(&pool, &[a, c, 999]).await.unwrap(), 2);
        assert_eq!(delete_users(&pool, &[]).await.unwrap(), 0);

        let remaining: Vec<i64> = list_users(&pool).await.unwrap().iter().map(|u| u.id).collect();
        assert_eq!(remaining, vec![b]);
    }
}
