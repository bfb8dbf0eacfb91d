use sqlx::PgPool;

use crate::dto::{MessageResponse, UploadResponse};
use crate::error::ApiError;

use super::repo_types::{NewUser, PublicUser, User, UserChanges};

/// All users under the public projection.
pub async fn list_users(db: &PgPool) -> Result<Vec<PublicUser>, ApiError> {
    let users = sqlx::query_as::<_, PublicUser>(
        r#"
        SELECT user_id, user_name, email, role
        FROM users
        ORDER BY user_id
        "#,
    )
    .fetch_all(db)
    .await?;
    if users.is_empty() {
        return Err(ApiError::NotFound("No users found".into()));
    }
    Ok(users)
}

/// Single user by id, public projection.
pub async fn get_user(db: &PgPool, user_id: i32) -> Result<PublicUser, ApiError> {
    sqlx::query_as::<_, PublicUser>(
        r#"
        SELECT user_id, user_name, email, role
        FROM users
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| ApiError::NotFound("No user found".into()))
}

pub async fn create_user(db: &PgPool, user: &NewUser) -> Result<UploadResponse, ApiError> {
    let row: Option<(i32,)> = sqlx::query_as(
        r#"
        INSERT INTO users (user_name, email, role, password)
        VALUES ($1, $2, $3, $4)
        RETURNING user_id
        "#,
    )
    .bind(&user.user_name)
    .bind(&user.email)
    .bind(user.role)
    .bind(&user.password)
    .fetch_optional(db)
    .await?;

    let Some((user_id,)) = row else {
        return Err(ApiError::NoRowsAffected("No users added".into()));
    };
    Ok(UploadResponse {
        message: "User added".into(),
        id: user_id,
    })
}

/// Update only the supplied fields for the given id; absent fields keep
/// their stored values.
pub async fn update_user(
    db: &PgPool,
    changes: &UserChanges,
    user_id: i32,
) -> Result<MessageResponse, ApiError> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET user_name = COALESCE($1, user_name),
            email     = COALESCE($2, email),
            role      = COALESCE($3, role),
            password  = COALESCE($4, password)
        WHERE user_id = $5
        "#,
    )
    .bind(&changes.user_name)
    .bind(&changes.email)
    .bind(changes.role)
    .bind(&changes.password)
    .bind(user_id)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NoRowsAffected("No users updated".into()));
    }
    Ok(MessageResponse {
        message: "User updated".into(),
    })
}

pub async fn delete_user(db: &PgPool, user_id: i32) -> Result<MessageResponse, ApiError> {
    let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
        .bind(user_id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NoRowsAffected("No users deleted".into()));
    }
    Ok(MessageResponse {
        message: "User deleted".into(),
    })
}

/// Full row lookup for the login path only. A missing email reads as
/// invalid credentials, not as not-found, so the response never reveals
/// which emails are registered.
pub async fn find_user_by_email(db: &PgPool, email: &str) -> Result<User, ApiError> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT user_id, user_name, email, role, password
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(db)
    .await?
    .ok_or(ApiError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use super::*;
    use crate::users::repo_types::Role;

    fn new_user(user_name: &str, email: &str) -> NewUser {
        NewUser {
            user_name: user_name.into(),
            email: email.into(),
            role: Role::User,
            // not a real argon2 hash; nothing below the login path checks it
            password: "hash".into(),
        }
    }

    #[sqlx::test]
    #[ignore = "needs a running Postgres (set DATABASE_URL)"]
    async fn empty_table_reads_as_not_found(pool: PgPool) -> anyhow::Result<()> {
        let err = list_users(&pool).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "needs a running Postgres (set DATABASE_URL)"]
    async fn create_read_update_delete(pool: PgPool) -> anyhow::Result<()> {
        let created = create_user(&pool, &new_user("alice", "a@x.com")).await?;
        assert_eq!(created.message, "User added");

        let fetched = get_user(&pool, created.id).await?;
        assert_eq!(fetched.user_name, "alice");
        assert_eq!(fetched.role, Role::User);

        let all = list_users(&pool).await?;
        assert_eq!(all.len(), 1);

        // only supplied fields change
        let changes = UserChanges {
            email: Some("alice@x.com".into()),
            ..Default::default()
        };
        let updated = update_user(&pool, &changes, created.id).await?;
        assert_eq!(updated.message, "User updated");
        let fetched = get_user(&pool, created.id).await?;
        assert_eq!(fetched.email, "alice@x.com");
        assert_eq!(fetched.user_name, "alice");

        let deleted = delete_user(&pool, created.id).await?;
        assert_eq!(deleted.message, "User deleted");
        let err = get_user(&pool, created.id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "needs a running Postgres (set DATABASE_URL)"]
    async fn mutations_on_missing_ids_report_no_rows(pool: PgPool) -> anyhow::Result<()> {
        let changes = UserChanges {
            user_name: Some("ghost".into()),
            ..Default::default()
        };
        let err = update_user(&pool, &changes, 4040).await.unwrap_err();
        assert!(matches!(err, ApiError::NoRowsAffected(_)));

        let err = delete_user(&pool, 4040).await.unwrap_err();
        assert!(matches!(err, ApiError::NoRowsAffected(_)));
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "needs a running Postgres (set DATABASE_URL)"]
    async fn unknown_email_reads_as_invalid_credentials(pool: PgPool) -> anyhow::Result<()> {
        let err = find_user_by_email(&pool, "ghost@x.com").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials));
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "needs a running Postgres (set DATABASE_URL)"]
    async fn login_lookup_returns_the_stored_hash(pool: PgPool) -> anyhow::Result<()> {
        create_user(&pool, &new_user("alice", "a@x.com")).await?;
        let user = find_user_by_email(&pool, "a@x.com").await?;
        assert_eq!(user.password, "hash");
        Ok(())
    }
}
