use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::services::Nutrients;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "meal_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

/// A dated grouping of food consumption entries. `user_id` is optional so
/// ownerless meals from anonymous deployments keep working.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Meal {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub meal_type: MealType,
    pub date: Date,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// One food-at-a-quantity entry. The four nutrient values are snapshots
/// computed at write time; a later edit of the food does not change them.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MealItem {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub food_id: Option<Uuid>,
    pub quantity: Decimal,
    pub calories: Decimal,
    pub proteins: Decimal,
    pub carbs: Decimal,
    pub fats: Decimal,
    pub created_at: OffsetDateTime,
}

const MEAL_COLUMNS: &str = "id, user_id, meal_type, date, notes, created_at, updated_at";
const ITEM_COLUMNS: &str =
    "id, meal_id, food_id, quantity, calories, proteins, carbs, fats, created_at";

impl Meal {
    pub async fn insert_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Option<Uuid>,
        meal_type: MealType,
        date: Date,
        notes: Option<&str>,
    ) -> anyhow::Result<Meal> {
        let meal = sqlx::query_as::<_, Meal>(&format!(
            "INSERT INTO meals (user_id, meal_type, date, notes) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {MEAL_COLUMNS}"
        ))
        .bind(user_id)
        .bind(meal_type)
        .bind(date)
        .bind(notes)
        .fetch_one(&mut **tx)
        .await?;
        Ok(meal)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Meal>> {
        let meal = sqlx::query_as::<_, Meal>(&format!(
            "SELECT {MEAL_COLUMNS} FROM meals WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(meal)
    }

    /// Collection listing is pre-scoped to the caller; ownerless legacy meals
    /// stay visible, matching the access policy.
    pub async fn list_scoped(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Meal>> {
        let meals = sqlx::query_as::<_, Meal>(&format!(
            "SELECT {MEAL_COLUMNS} FROM meals \
             WHERE user_id = $1 OR user_id IS NULL \
             ORDER BY date DESC, created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(meals)
    }

    pub async fn find_by_date(db: &PgPool, user_id: Uuid, date: Date) -> anyhow::Result<Vec<Meal>> {
        let meals = sqlx::query_as::<_, Meal>(&format!(
            "SELECT {MEAL_COLUMNS} FROM meals \
             WHERE (user_id = $1 OR user_id IS NULL) AND date = $2 \
             ORDER BY created_at ASC"
        ))
        .bind(user_id)
        .bind(date)
        .fetch_all(db)
        .await?;
        Ok(meals)
    }

    pub async fn find_by_range(
        db: &PgPool,
        user_id: Uuid,
        start: Date,
        end: Date,
    ) -> anyhow::Result<Vec<Meal>> {
        let meals = sqlx::query_as::<_, Meal>(&format!(
            "SELECT {MEAL_COLUMNS} FROM meals \
             WHERE (user_id = $1 OR user_id IS NULL) AND date BETWEEN $2 AND $3 \
             ORDER BY date ASC, created_at ASC"
        ))
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(db)
        .await?;
        Ok(meals)
    }

    /// Persist an already-merged meal record.
    pub async fn save(&self, db: &PgPool) -> anyhow::Result<Meal> {
        let meal = sqlx::query_as::<_, Meal>(&format!(
            "UPDATE meals SET meal_type = $2, date = $3, notes = $4, updated_at = now() \
             WHERE id = $1 \
             RETURNING {MEAL_COLUMNS}"
        ))
        .bind(self.id)
        .bind(self.meal_type)
        .bind(self.date)
        .bind(&self.notes)
        .fetch_one(db)
        .await?;
        Ok(meal)
    }

    /// Items go with the meal (ON DELETE CASCADE).
    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM meals WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<bool> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM meals WHERE user_id = $1)")
                .bind(user_id)
                .fetch_one(db)
                .await?;
        Ok(exists.0)
    }
}

impl MealItem {
    pub async fn insert(
        db: &PgPool,
        meal_id: Uuid,
        food_id: Uuid,
        quantity: Decimal,
        nutrients: &Nutrients,
    ) -> anyhow::Result<MealItem> {
        let item = sqlx::query_as::<_, MealItem>(&format!(
            "INSERT INTO meal_items (meal_id, food_id, quantity, calories, proteins, carbs, fats) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(meal_id)
        .bind(food_id)
        .bind(quantity)
        .bind(nutrients.calories)
        .bind(nutrients.proteins)
        .bind(nutrients.carbs)
        .bind(nutrients.fats)
        .fetch_one(db)
        .await?;
        Ok(item)
    }

    pub async fn insert_tx(
        tx: &mut Transaction<'_, Postgres>,
        meal_id: Uuid,
        food_id: Uuid,
        quantity: Decimal,
        nutrients: &Nutrients,
    ) -> anyhow::Result<MealItem> {
        let item = sqlx::query_as::<_, MealItem>(&format!(
            "INSERT INTO meal_items (meal_id, food_id, quantity, calories, proteins, carbs, fats) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(meal_id)
        .bind(food_id)
        .bind(quantity)
        .bind(nutrients.calories)
        .bind(nutrients.proteins)
        .bind(nutrients.carbs)
        .bind(nutrients.fats)
        .fetch_one(&mut **tx)
        .await?;
        Ok(item)
    }

    /// Items in insertion order for one meal.
    pub async fn for_meal(db: &PgPool, meal_id: Uuid) -> anyhow::Result<Vec<MealItem>> {
        let items = sqlx::query_as::<_, MealItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM meal_items \
             WHERE meal_id = $1 \
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(meal_id)
        .fetch_all(db)
        .await?;
        Ok(items)
    }

    /// Batched item fetch for listings and summaries.
    pub async fn for_meals(db: &PgPool, meal_ids: &[Uuid]) -> anyhow::Result<Vec<MealItem>> {
        let items = sqlx::query_as::<_, MealItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM meal_items \
             WHERE meal_id = ANY($1) \
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(meal_ids)
        .fetch_all(db)
        .await?;
        Ok(items)
    }

    /// Scoped lookup: an item id belonging to a different meal is a miss.
    pub async fn find_scoped(
        db: &PgPool,
        meal_id: Uuid,
        item_id: Uuid,
    ) -> anyhow::Result<Option<MealItem>> {
        let item = sqlx::query_as::<_, MealItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM meal_items WHERE id = $1 AND meal_id = $2"
        ))
        .bind(item_id)
        .bind(meal_id)
        .fetch_optional(db)
        .await?;
        Ok(item)
    }

    pub async fn update_quantity(
        db: &PgPool,
        item_id: Uuid,
        quantity: Decimal,
        nutrients: &Nutrients,
    ) -> anyhow::Result<MealItem> {
        let item = sqlx::query_as::<_, MealItem>(&format!(
            "UPDATE meal_items SET quantity = $2, calories = $3, proteins = $4, \
                 carbs = $5, fats = $6 \
             WHERE id = $1 \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(item_id)
        .bind(quantity)
        .bind(nutrients.calories)
        .bind(nutrients.proteins)
        .bind(nutrients.carbs)
        .bind(nutrients.fats)
        .fetch_one(db)
        .await?;
        Ok(item)
    }

    pub async fn delete_scoped(db: &PgPool, meal_id: Uuid, item_id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM meal_items WHERE id = $1 AND meal_id = $2")
            .bind(item_id)
            .bind(meal_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
