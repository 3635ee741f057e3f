use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{NewRecipe, Recipe, RecipeChanges, RecipeWithOwner};

/// All live recipes, newest first, with owner names.
pub async fn list_with_owner(db: &SqlitePool) -> Result<Vec<RecipeWithOwner>, sqlx::Error> {
    sqlx::query_as::<_, RecipeWithOwner>(
        r#"
        SELECT r.id, r.user_id, r.title, r.description, r.ingredients, r.instructions,
               r.image, r.created_at, u.name AS owner_name
        FROM recipes r
        JOIN users u ON u.id = r.user_id
        WHERE r.deleted_at IS NULL
        ORDER BY julianday(r.created_at) DESC, r.rowid DESC
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn get_with_owner(
    db: &SqlitePool,
    recipe_id: Uuid,
) -> Result<Option<RecipeWithOwner>, sqlx::Error> {
    sqlx::query_as::<_, RecipeWithOwner>(
        r#"
        SELECT r.id, r.user_id, r.title, r.description, r.ingredients, r.instructions,
               r.image, r.created_at, u.name AS owner_name
        FROM recipes r
        JOIN users u ON u.id = r.user_id
        WHERE r.id = $1 AND r.deleted_at IS NULL
        "#,
    )
    .bind(recipe_id)
    .fetch_optional(db)
    .await
}

pub async fn get(db: &SqlitePool, recipe_id: Uuid) -> Result<Option<Recipe>, sqlx::Error> {
    sqlx::query_as::<_, Recipe>(
        r#"
        SELECT id, user_id, title, description, ingredients, instructions, image,
               created_at, updated_at
        FROM recipes
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(recipe_id)
    .fetch_optional(db)
    .await
}

pub async fn insert(db: &SqlitePool, user_id: Uuid, new: NewRecipe) -> Result<Recipe, sqlx::Error> {
    let now = OffsetDateTime::now_utc();
    sqlx::query_as::<_, Recipe>(
        r#"
        INSERT INTO recipes (id, user_id, title, description, ingredients, instructions,
                             image, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
        RETURNING id, user_id, title, description, ingredients, instructions, image,
                  created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(new.title)
    .bind(new.description)
    .bind(new.ingredients)
    .bind(new.instructions)
    .bind(new.image)
    .bind(now)
    .fetch_one(db)
    .await
}

/// Apply `changes` to a live recipe owned by `user_id`. Returns `false` when
/// no such row exists (missing, deleted, or owned by someone else).
pub async fn update_owned(
    db: &SqlitePool,
    recipe_id: Uuid,
    user_id: Uuid,
    changes: RecipeChanges,
) -> Result<bool, sqlx::Error> {
    let res = sqlx::query(
        r#"
        UPDATE recipes
        SET title        = COALESCE($3, title),
            description  = COALESCE($4, description),
            ingredients  = COALESCE($5, ingredients),
            instructions = COALESCE($6, instructions),
            image        = COALESCE($7, image),
            updated_at   = $8
        WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
        "#,
    )
    .bind(recipe_id)
    .bind(user_id)
    .bind(changes.title)
    .bind(changes.description)
    .bind(changes.ingredients)
    .bind(changes.instructions)
    .bind(changes.image)
    .bind(OffsetDateTime::now_utc())
    .execute(db)
    .await?;
    Ok(res.rows_affected() == 1)
}

/// Tombstone a live recipe owned by `user_id`. Deleted rows never come back.
pub async fn soft_delete_owned(
    db: &SqlitePool,
    recipe_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let res = sqlx::query(
        r#"
        UPDATE recipes
        SET deleted_at = $3
        WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
        "#,
    )
    .bind(recipe_id)
    .bind(user_id)
    .bind(OffsetDateTime::now_utc())
    .execute(db)
    .await?;
    Ok(res.rows_affected() == 1)
}
