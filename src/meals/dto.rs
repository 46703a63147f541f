use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use super::repo::{Meal, MealItem, MealType};
use super::services::{meal_totals, Nutrients};

#[derive(Debug, Deserialize)]
pub struct CreateMealItemRequest {
    pub food_id: Uuid,
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct CreateMealRequest {
    pub meal_type: MealType,
    pub date: Date,
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<CreateMealItemRequest>,
}

/// Patch body for `PATCH /meals/:id`. Present fields overwrite, absent fields
/// are retained.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMealRequest {
    pub meal_type: Option<MealType>,
    pub date: Option<Date>,
    pub notes: Option<String>,
}

impl UpdateMealRequest {
    pub fn apply(self, meal: &mut Meal) {
        if let Some(meal_type) = self.meal_type {
            meal.meal_type = meal_type;
        }
        if let Some(date) = self.date {
            meal.date = date;
        }
        if let Some(notes) = self.notes {
            meal.notes = Some(notes);
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub food_id: Uuid,
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: String,
    pub end: String,
}

/// A meal with its items attached and the four derived totals. Totals are
/// computed here on the way out; they are never stored.
#[derive(Debug, Serialize)]
pub struct MealResponse {
    #[serde(flatten)]
    pub meal: Meal,
    pub items: Vec<MealItem>,
    pub total_calories: Decimal,
    pub total_proteins: Decimal,
    pub total_carbs: Decimal,
    pub total_fats: Decimal,
}

impl MealResponse {
    pub fn new(meal: Meal, items: Vec<MealItem>) -> Self {
        let totals = meal_totals(&items);
        Self {
            meal,
            items,
            total_calories: totals.calories,
            total_proteins: totals.proteins,
            total_carbs: totals.carbs,
            total_fats: totals.fats,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DailySummaryResponse {
    pub date: Date,
    pub meals: Vec<MealResponse>,
    pub totals: Nutrients,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn meal() -> Meal {
        Meal {
            id: Uuid::new_v4(),
            user_id: None,
            meal_type: MealType::Breakfast,
            date: Date::from_ordinal_date(2024, 70).unwrap(),
            notes: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn item(calories: i64) -> MealItem {
        MealItem {
            id: Uuid::new_v4(),
            meal_id: Uuid::new_v4(),
            food_id: Some(Uuid::new_v4()),
            quantity: Decimal::from(100),
            calories: Decimal::from(calories),
            proteins: Decimal::ZERO,
            carbs: Decimal::ZERO,
            fats: Decimal::ZERO,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn response_totals_are_derived_from_items() {
        let response = MealResponse::new(meal(), vec![item(100), item(50)]);
        assert_eq!(response.total_calories, Decimal::from(150));
    }

    #[test]
    fn response_totals_default_to_zero_without_items() {
        let response = MealResponse::new(meal(), vec![]);
        assert_eq!(response.total_calories, Decimal::ZERO);
        assert_eq!(response.total_fats, Decimal::ZERO);
    }

    #[test]
    fn meal_patch_keeps_absent_fields() {
        let mut m = meal();
        let original_date = m.date;
        let patch = UpdateMealRequest {
            notes: Some("post-run".into()),
            ..Default::default()
        };
        patch.apply(&mut m);

        assert_eq!(m.notes.as_deref(), Some("post-run"));
        assert_eq!(m.meal_type, MealType::Breakfast);
        assert_eq!(m.date, original_date);
    }
}
