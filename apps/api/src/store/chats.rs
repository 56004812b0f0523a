use chrono::Utc;
use sqlx::SqlitePool;

use crate::errors::AppError;
use crate::models::chat::ChatRecord;

pub async fn save_chat(
    pool: &SqlitePool,
    user_id: i64,
    message: &str,
    response: &str,
    capability: &str,
) -> Result<i64, AppError> {
    let done = sqlx::query(
        r#"
        INSERT INTO chat_history (user_id, message, response, capability, timestamp)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(user_id)
    .bind(message)
    .bind(response)
    .bind(capability)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(done.last_insert_rowid())
}

/// Newest first.
pub async fn fetch_history(
    pool: &SqlitePool,
    user_id: i64,
    limit: i64,
) -> Result<Vec<ChatRecord>, AppError> {
    Ok(sqlx::query_as(
        r#"
        SELECT * FROM chat_history
        WHERE user_id = $1
        ORDER BY timestamp DESC, id DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?)
}

pub async fn delete_chat_by_user(pool: &SqlitePool, user_id: i64) -> Result<u64, AppError> {
    Ok(sqlx::query("DELETE FROM chat_history WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?
        .rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::store::users::{create_user, delete_users};

    #[tokio::test]
    async fn test_history_is_newest_first_and_limited() {
        let pool = test_pool().await;
        let user = create_user(&pool, "alice", "pw").await.unwrap();
        for i in 0..5 {
            save_chat(&pool, user, &format!("q{i}"), &format!("a{i}"), "chat")
                .await
                .unwrap();
        }

        let history = fetch_history(&pool, user, 3).await.unwrap();
        let messages: Vec<&str> = history.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, vec!["q4", "q3", "q2"]);
    }

    #[tokio::test]
    async fn test_history_is_per_user() {
        let pool = test_pool().await;
        let alice = create_user(&pool, "alice", "pw").await.unwrap();
        let bob = create_user(&pool, "bob", "pw").await.unwrap();
        save_chat(&pool, alice, "hi", "hello", "chat").await.unwrap();

        assert_eq!(fetch_history(&pool, bob, 10).await.unwrap().len(), 0);
        assert_eq!(delete_chat_by_user(&pool, bob).await.unwrap(), 0);
        assert_eq!(delete_chat_by_user(&pool, alice).await.unwrap(), 1);
        assert!(fetch_history(&pool, alice, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleting_user_cascades() {
        let pool = test_pool().await;
        let alice = create_user(&pool, "alice", "pw").await.unwrap();
        save_chat(&pool, alice, "hi", "hello", "chat").await.unwrap();

        delete_users(&pool, &[alice]).await.unwrap();

        let left: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chat_history")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(left, 0);
    }

    #[tokio::test]
    async fn test_chat_for_missing_user_is_rejected() {
        let pool = test_pool().await;
        assert!(matches!(
            save_chat(&pool, 42, "hi", "hello", "chat").await,
            Err(AppError::Database(_))
        ));
    }
}
