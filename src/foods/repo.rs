use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Canonical nutrition record. Nutrient values are per `serving_size` units
/// of `serving_unit`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Food {
    pub id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    pub calories: Decimal,
    pub proteins: Decimal,
    pub carbs: Decimal,
    pub fats: Decimal,
    pub serving_size: Decimal,
    pub serving_unit: String,
    pub barcode: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

pub struct NewFood<'a> {
    pub name: &'a str,
    pub brand: Option<&'a str>,
    pub calories: Decimal,
    pub proteins: Decimal,
    pub carbs: Decimal,
    pub fats: Decimal,
    pub serving_size: Decimal,
    pub serving_unit: &'a str,
    pub barcode: Option<&'a str>,
}

const FOOD_COLUMNS: &str = "id, name, brand, calories, proteins, carbs, fats, \
     serving_size, serving_unit, barcode, created_at, updated_at";

impl Food {
    pub async fn insert(db: &PgPool, new: NewFood<'_>) -> anyhow::Result<Food> {
        let food = sqlx::query_as::<_, Food>(&format!(
            "INSERT INTO foods (name, brand, calories, proteins, carbs, fats, \
                 serving_size, serving_unit, barcode) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {FOOD_COLUMNS}"
        ))
        .bind(new.name)
        .bind(new.brand)
        .bind(new.calories)
        .bind(new.proteins)
        .bind(new.carbs)
        .bind(new.fats)
        .bind(new.serving_size)
        .bind(new.serving_unit)
        .bind(new.barcode)
        .fetch_one(db)
        .await?;
        Ok(food)
    }

    /// Identity lookup for the (name, brand) pair. A missing brand is its own
    /// identity bucket, so NULL must compare equal to NULL here.
    pub async fn find_by_name_and_brand(
        db: &PgPool,
        name: &str,
        brand: Option<&str>,
    ) -> anyhow::Result<Option<Food>> {
        let food = sqlx::query_as::<_, Food>(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods \
             WHERE name = $1 AND brand IS NOT DISTINCT FROM $2"
        ))
        .bind(name)
        .bind(brand)
        .fetch_optional(db)
        .await?;
        Ok(food)
    }

    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Food>> {
        let foods = sqlx::query_as::<_, Food>(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods ORDER BY name ASC"
        ))
        .fetch_all(db)
        .await?;
        Ok(foods)
    }

    /// Case-insensitive substring match over name and brand. Ranking is done
    /// in process, see `services::rank_search_results`.
    pub async fn search(db: &PgPool, term: &str) -> anyhow::Result<Vec<Food>> {
        let pattern = format!("%{term}%");
        let foods = sqlx::query_as::<_, Food>(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods \
             WHERE name ILIKE $1 OR brand ILIKE $1"
        ))
        .bind(&pattern)
        .fetch_all(db)
        .await?;
        Ok(foods)
    }

    pub async fn find_by_barcode(db: &PgPool, barcode: &str) -> anyhow::Result<Option<Food>> {
        let food = sqlx::query_as::<_, Food>(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods WHERE barcode = $1"
        ))
        .bind(barcode)
        .fetch_optional(db)
        .await?;
        Ok(food)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Food>> {
        let food = sqlx::query_as::<_, Food>(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(food)
    }

    /// Persist an already-merged food record.
    pub async fn save(&self, db: &PgPool) -> anyhow::Result<Food> {
        let food = sqlx::query_as::<_, Food>(&format!(
            "UPDATE foods SET name = $2, brand = $3, calories = $4, proteins = $5, \
                 carbs = $6, fats = $7, serving_size = $8, serving_unit = $9, \
                 barcode = $10, updated_at = now() \
             WHERE id = $1 \
             RETURNING {FOOD_COLUMNS}"
        ))
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.brand)
        .bind(self.calories)
        .bind(self.proteins)
        .bind(self.carbs)
        .bind(self.fats)
        .bind(self.serving_size)
        .bind(&self.serving_unit)
        .bind(&self.barcode)
        .fetch_one(db)
        .await?;
        Ok(food)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM foods WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
