use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::repo::Food;

#[derive(Debug, Deserialize)]
pub struct CreateFoodRequest {
    pub name: String,
    pub brand: Option<String>,
    pub calories: Decimal,
    pub proteins: Decimal,
    pub carbs: Decimal,
    pub fats: Decimal,
    pub serving_size: Option<Decimal>,
    pub serving_unit: Option<String>,
    pub barcode: Option<String>,
}

/// Patch body for `PATCH /foods/:id`. Present fields overwrite, absent fields
/// are retained.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateFoodRequest {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub calories: Option<Decimal>,
    pub proteins: Option<Decimal>,
    pub carbs: Option<Decimal>,
    pub fats: Option<Decimal>,
    pub serving_size: Option<Decimal>,
    pub serving_unit: Option<String>,
    pub barcode: Option<String>,
}

impl UpdateFoodRequest {
    pub fn apply(self, food: &mut Food) {
        if let Some(name) = self.name {
            food.name = name;
        }
        if let Some(brand) = self.brand {
            food.brand = Some(brand);
        }
        if let Some(v) = self.calories {
            food.calories = v;
        }
        if let Some(v) = self.proteins {
            food.proteins = v;
        }
        if let Some(v) = self.carbs {
            food.carbs = v;
        }
        if let Some(v) = self.fats {
            food.fats = v;
        }
        if let Some(v) = self.serving_size {
            food.serving_size = v;
        }
        if let Some(unit) = self.serving_unit {
            food.serving_unit = unit;
        }
        if let Some(barcode) = self.barcode {
            food.barcode = Some(barcode);
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

/// Result of the idempotent upsert-by-identity flow.
#[derive(Debug, Serialize)]
pub struct FindOrCreateResponse {
    pub food: Food,
    pub created: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    #[test]
    fn patch_merge_precedence() {
        let mut food = Food {
            id: Uuid::new_v4(),
            name: "Oats".into(),
            brand: None,
            calories: Decimal::from(389),
            proteins: Decimal::from(17),
            carbs: Decimal::from(66),
            fats: Decimal::from(7),
            serving_size: Decimal::from(100),
            serving_unit: "g".into(),
            barcode: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        };

        let patch = UpdateFoodRequest {
            calories: Some(Decimal::from(380)),
            brand: Some("Acme".into()),
            ..Default::default()
        };
        patch.apply(&mut food);

        assert_eq!(food.calories, Decimal::from(380));
        assert_eq!(food.brand.as_deref(), Some("Acme"));
        // Untouched fields retain their values.
        assert_eq!(food.name, "Oats");
        assert_eq!(food.proteins, Decimal::from(17));
        assert_eq!(food.serving_size, Decimal::from(100));
    }
}
