use sqlx::PgPool;

use crate::auth::extractors::AuthUser;
use crate::dto::{MessageResponse, UploadResponse};
use crate::error::ApiError;

use super::repo_types::{Cat, CatChanges, CatRow, NewCat, UpdateScope};

/// Every cat with its owner summary. The join is strict: a cat whose owner
/// row is gone is left out of the result, not returned with a null owner.
pub async fn list_cats(db: &PgPool) -> Result<Vec<Cat>, ApiError> {
    let rows = sqlx::query_as::<_, CatRow>(
        r#"
        SELECT c.cat_id, c.cat_name, c.weight, c.filename, c.birthdate,
               (c.coords)[0] AS lat, (c.coords)[1] AS lng,
               u.user_id AS owner_id, u.user_name AS owner_name
        FROM cats c
        JOIN users u ON c.owner = u.user_id
        ORDER BY c.cat_id
        "#,
    )
    .fetch_all(db)
    .await?;
    if rows.is_empty() {
        return Err(ApiError::NotFound("No cats found".into()));
    }
    Ok(rows.into_iter().map(Cat::from).collect())
}

/// Single cat by id, same join and read model as the list path.
pub async fn get_cat(db: &PgPool, cat_id: i32) -> Result<Cat, ApiError> {
    sqlx::query_as::<_, CatRow>(
        r#"
        SELECT c.cat_id, c.cat_name, c.weight, c.filename, c.birthdate,
               (c.coords)[0] AS lat, (c.coords)[1] AS lng,
               u.user_id AS owner_id, u.user_name AS owner_name
        FROM cats c
        JOIN users u ON c.owner = u.user_id
        WHERE c.cat_id = $1
        "#,
    )
    .bind(cat_id)
    .fetch_optional(db)
    .await?
    .map(Cat::from)
    .ok_or_else(|| ApiError::NotFound("No cat found".into()))
}

/// Insert a cat, encoding the two coordinate scalars into a single point.
pub async fn create_cat(db: &PgPool, cat: &NewCat) -> Result<UploadResponse, ApiError> {
    let row: Option<(i32,)> = sqlx::query_as(
        r#"
        INSERT INTO cats (cat_name, weight, owner, filename, birthdate, coords)
        VALUES ($1, $2, $3, $4, $5, point($6, $7))
        RETURNING cat_id
        "#,
    )
    .bind(&cat.cat_name)
    .bind(cat.weight)
    .bind(cat.owner)
    .bind(&cat.filename)
    .bind(cat.birthdate)
    .bind(cat.lat)
    .bind(cat.lng)
    .fetch_optional(db)
    .await?;

    let Some((cat_id,)) = row else {
        return Err(ApiError::NoRowsAffected("No cats added".into()));
    };
    Ok(UploadResponse {
        message: "Cat added".into(),
        id: cat_id,
    })
}

/// Role-conditioned update. Ownership lives in the WHERE clause rather
/// than a separate pre-check, so a non-owner's update matches zero rows and
/// reads exactly like updating a cat that does not exist.
pub async fn update_cat(
    db: &PgPool,
    changes: &CatChanges,
    cat_id: i32,
    caller: &AuthUser,
) -> Result<MessageResponse, ApiError> {
    let result = match UpdateScope::for_caller(caller, cat_id) {
        UpdateScope::OwnerScoped { cat_id, owner_id } => {
            sqlx::query(
                r#"
                UPDATE cats
                SET cat_name  = COALESCE($1, cat_name),
                    weight    = COALESCE($2, weight),
                    birthdate = COALESCE($3, birthdate)
                WHERE cat_id = $4 AND owner = $5
                "#,
            )
            .bind(&changes.cat_name)
            .bind(changes.weight)
            .bind(changes.birthdate)
            .bind(cat_id)
            .bind(owner_id)
            .execute(db)
            .await?
        }
        UpdateScope::Unscoped { cat_id } => {
            sqlx::query(
                r#"
                UPDATE cats
                SET cat_name  = COALESCE($1, cat_name),
                    weight    = COALESCE($2, weight),
                    birthdate = COALESCE($3, birthdate)
                WHERE cat_id = $4
                "#,
            )
            .bind(&changes.cat_name)
            .bind(changes.weight)
            .bind(changes.birthdate)
            .bind(cat_id)
            .execute(db)
            .await?
        }
    };

    if result.rows_affected() == 0 {
        return Err(ApiError::NoRowsAffected("No cats updated".into()));
    }
    Ok(MessageResponse {
        message: "Cat updated".into(),
    })
}

/// Delete by id alone; any ownership enforcement is the calling layer's
/// business. Returns the stored filename so the caller can clean up the
/// picture.
pub async fn delete_cat(db: &PgPool, cat_id: i32) -> Result<(MessageResponse, String), ApiError> {
    let row: Option<(String,)> =
        sqlx::query_as("DELETE FROM cats WHERE cat_id = $1 RETURNING filename")
            .bind(cat_id)
            .fetch_optional(db)
            .await?;

    let Some((filename,)) = row else {
        return Err(ApiError::NoRowsAffected("No cats deleted".into()));
    };
    Ok((
        MessageResponse {
            message: "Cat deleted".into(),
        },
        filename,
    ))
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;
    use time::macros::date;

    use super::*;
    use crate::users::repo_types::{NewUser, Role};
    use crate::users::repo::{create_user, delete_user};

    async fn seed_user(pool: &PgPool, name: &str, email: &str, role: Role) -> anyhow::Result<i32> {
        let created = create_user(
            pool,
            &NewUser {
                user_name: name.into(),
                email: email.into(),
                role,
                password: "hash".into(),
            },
        )
        .await?;
        Ok(created.id)
    }

    fn new_cat(name: &str, owner: i32) -> NewCat {
        NewCat {
            cat_name: name.into(),
            weight: 4.2,
            owner,
            filename: "abc.jpg".into(),
            birthdate: date!(2020 - 01 - 01),
            lat: 60.17,
            lng: 24.94,
        }
    }

    fn as_user(user_id: i32) -> AuthUser {
        AuthUser {
            user_id,
            role: Role::User,
        }
    }

    fn as_admin(user_id: i32) -> AuthUser {
        AuthUser {
            user_id,
            role: Role::Admin,
        }
    }

    #[sqlx::test]
    #[ignore = "needs a running Postgres (set DATABASE_URL)"]
    async fn empty_table_reads_as_not_found(pool: PgPool) -> anyhow::Result<()> {
        let err = list_cats(&pool).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "needs a running Postgres (set DATABASE_URL)"]
    async fn coordinates_round_trip_through_the_point_column(pool: PgPool) -> anyhow::Result<()> {
        let owner = seed_user(&pool, "alice", "a@x.com", Role::User).await?;
        let created = create_cat(&pool, &new_cat("Siiri", owner)).await?;
        assert_eq!(created.message, "Cat added");

        let cat = get_cat(&pool, created.id).await?;
        assert!((cat.lat - 60.17).abs() < 1e-9);
        assert!((cat.lng - 24.94).abs() < 1e-9);
        assert_eq!(cat.birthdate, date!(2020 - 01 - 01));
        assert_eq!(cat.owner.user_id, owner);
        assert_eq!(cat.owner.user_name, "alice");
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "needs a running Postgres (set DATABASE_URL)"]
    async fn update_is_scoped_to_the_owner_unless_admin(pool: PgPool) -> anyhow::Result<()> {
        let alice = seed_user(&pool, "alice", "a@x.com", Role::User).await?;
        let bob = seed_user(&pool, "bob", "b@x.com", Role::User).await?;
        let admin = seed_user(&pool, "root", "r@x.com", Role::Admin).await?;
        let cat = create_cat(&pool, &new_cat("Siiri", bob)).await?;

        let changes = CatChanges {
            cat_name: Some("Mauri".into()),
            ..Default::default()
        };

        // a non-owner matches zero rows even though the cat exists
        let err = update_cat(&pool, &changes, cat.id, &as_user(alice))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NoRowsAffected(_)));
        assert_eq!(get_cat(&pool, cat.id).await?.cat_name, "Siiri");

        // the owner succeeds
        update_cat(&pool, &changes, cat.id, &as_user(bob)).await?;
        assert_eq!(get_cat(&pool, cat.id).await?.cat_name, "Mauri");

        // an admin succeeds regardless of the owner column
        let changes = CatChanges {
            cat_name: Some("Rölli".into()),
            ..Default::default()
        };
        update_cat(&pool, &changes, cat.id, &as_admin(admin)).await?;
        assert_eq!(get_cat(&pool, cat.id).await?.cat_name, "Rölli");
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "needs a running Postgres (set DATABASE_URL)"]
    async fn update_touches_only_the_supplied_fields(pool: PgPool) -> anyhow::Result<()> {
        let owner = seed_user(&pool, "alice", "a@x.com", Role::User).await?;
        let cat = create_cat(&pool, &new_cat("Siiri", owner)).await?;

        let changes = CatChanges {
            weight: Some(5.5),
            ..Default::default()
        };
        update_cat(&pool, &changes, cat.id, &as_user(owner)).await?;

        let fetched = get_cat(&pool, cat.id).await?;
        assert_eq!(fetched.cat_name, "Siiri");
        assert!((fetched.weight - 5.5).abs() < 1e-9);
        assert_eq!(fetched.birthdate, date!(2020 - 01 - 01));
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "needs a running Postgres (set DATABASE_URL)"]
    async fn cats_without_an_owner_row_are_left_out_of_reads(pool: PgPool) -> anyhow::Result<()> {
        let alice = seed_user(&pool, "alice", "a@x.com", Role::User).await?;
        let bob = seed_user(&pool, "bob", "b@x.com", Role::User).await?;
        let kept = create_cat(&pool, &new_cat("Siiri", alice)).await?;
        let orphaned = create_cat(&pool, &new_cat("Mauri", bob)).await?;

        delete_user(&pool, bob).await?;

        let cats = list_cats(&pool).await?;
        assert_eq!(cats.len(), 1);
        assert_eq!(cats[0].cat_id, kept.id);

        let err = get_cat(&pool, orphaned.id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "needs a running Postgres (set DATABASE_URL)"]
    async fn mutations_on_missing_ids_report_no_rows(pool: PgPool) -> anyhow::Result<()> {
        let changes = CatChanges {
            cat_name: Some("ghost".into()),
            ..Default::default()
        };
        let err = update_cat(&pool, &changes, 4040, &as_admin(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NoRowsAffected(_)));

        let err = delete_cat(&pool, 4040).await.unwrap_err();
        assert!(matches!(err, ApiError::NoRowsAffected(_)));
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "needs a running Postgres (set DATABASE_URL)"]
    async fn delete_returns_the_filename_for_cleanup(pool: PgPool) -> anyhow::Result<()> {
        let owner = seed_user(&pool, "alice", "a@x.com", Role::User).await?;
        let cat = create_cat(&pool, &new_cat("Siiri", owner)).await?;

        let (resp, filename) = delete_cat(&pool, cat.id).await?;
        assert_eq!(resp.message, "Cat deleted");
        assert_eq!(filename, "abc.jpg");
        Ok(())
    }
}
