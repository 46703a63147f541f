use rust_decimal::Decimal;
use serde::Serialize;
use time::{macros::format_description, Date};
use uuid::Uuid;

use crate::error::ApiError;
use crate::foods::repo::Food;
use crate::meals::repo::{Meal, MealItem};

/// One calories/proteins/carbs/fats quadruple. Used both for per-item
/// snapshots and for derived totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Nutrients {
    pub calories: Decimal,
    pub proteins: Decimal,
    pub carbs: Decimal,
    pub fats: Decimal,
}

impl Nutrients {
    pub const ZERO: Nutrients = Nutrients {
        calories: Decimal::ZERO,
        proteins: Decimal::ZERO,
        carbs: Decimal::ZERO,
        fats: Decimal::ZERO,
    };

    pub fn add(&self, other: &Nutrients) -> Nutrients {
        Nutrients {
            calories: self.calories + other.calories,
            proteins: self.proteins + other.proteins,
            carbs: self.carbs + other.carbs,
            fats: self.fats + other.fats,
        }
    }
}

/// Scale a food's per-serving nutrient values to the given quantity.
///
/// The ratio is `quantity / serving_size`; proportionality is exact, any
/// rounding happens in the NUMERIC(10,2) columns on write. Foods are
/// validated to have a strictly positive serving size on creation; a
/// non-positive one reaching this point is rejected rather than divided by.
pub fn scale_nutrients(food: &Food, quantity: Decimal) -> Result<Nutrients, ApiError> {
    if food.serving_size <= Decimal::ZERO {
        return Err(ApiError::BadRequest(format!(
            "Food \"{}\" has a non-positive serving size",
            food.name
        )));
    }
    let ratio = quantity / food.serving_size;
    Ok(Nutrients {
        calories: food.calories * ratio,
        proteins: food.proteins * ratio,
        carbs: food.carbs * ratio,
        fats: food.fats * ratio,
    })
}

/// Derived, never persisted: the sum of a meal's item snapshots, zero for an
/// empty meal.
pub fn meal_totals(items: &[MealItem]) -> Nutrients {
    items.iter().fold(Nutrients::ZERO, |acc, item| {
        acc.add(&Nutrients {
            calories: item.calories,
            proteins: item.proteins,
            carbs: item.carbs,
            fats: item.fats,
        })
    })
}

/// Day-level aggregate across several meals' item lists.
pub fn sum_totals<'a, I>(meals: I) -> Nutrients
where
    I: IntoIterator<Item = &'a [MealItem]>,
{
    meals
        .into_iter()
        .fold(Nutrients::ZERO, |acc, items| acc.add(&meal_totals(items)))
}

/// Ownership check gating meal reads and writes. Ownerless meals (anonymous
/// deployments) are readable and writable by any authenticated caller.
pub fn authorize(meal: &Meal, caller: Uuid) -> Result<(), ApiError> {
    match meal.user_id {
        Some(owner) if owner != caller => Err(ApiError::Forbidden(
            "You do not have access to this meal".into(),
        )),
        _ => Ok(()),
    }
}

/// Parse a `YYYY-MM-DD` path or query parameter into a calendar day.
pub fn parse_day(value: &str) -> Result<Date, ApiError> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(value, &format).map_err(|_| {
        ApiError::BadRequest(format!("Invalid date \"{value}\", expected YYYY-MM-DD"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meals::repo::MealType;
    use time::OffsetDateTime;

    fn food_per_100(calories: i64, proteins: i64, carbs: i64, fats: i64) -> Food {
        Food {
            id: Uuid::new_v4(),
            name: "Test Food".into(),
            brand: None,
            calories: Decimal::from(calories),
            proteins: Decimal::from(proteins),
            carbs: Decimal::from(carbs),
            fats: Decimal::from(fats),
            serving_size: Decimal::from(100),
            serving_unit: "g".into(),
            barcode: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn item_with_calories(calories: i64) -> MealItem {
        MealItem {
            id: Uuid::new_v4(),
            meal_id: Uuid::new_v4(),
            food_id: Some(Uuid::new_v4()),
            quantity: Decimal::from(100),
            calories: Decimal::from(calories),
            proteins: Decimal::from(1),
            carbs: Decimal::from(2),
            fats: Decimal::from(3),
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn meal_owned_by(user_id: Option<Uuid>) -> Meal {
        Meal {
            id: Uuid::new_v4(),
            user_id,
            meal_type: MealType::Lunch,
            date: Date::from_ordinal_date(2024, 100).unwrap(),
            notes: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn half_a_serving_halves_every_nutrient() {
        let food = food_per_100(200, 10, 30, 8);
        let n = scale_nutrients(&food, Decimal::from(50)).unwrap();
        assert_eq!(n.calories, Decimal::from(100));
        assert_eq!(n.proteins, Decimal::from(5));
        assert_eq!(n.carbs, Decimal::from(15));
        assert_eq!(n.fats, Decimal::from(4));
    }

    #[test]
    fn scaling_handles_non_default_serving_size() {
        let mut food = food_per_100(80, 4, 12, 2);
        food.serving_size = Decimal::from(40);
        // 60 / 40 = 1.5 servings
        let n = scale_nutrients(&food, Decimal::from(60)).unwrap();
        assert_eq!(n.calories, Decimal::from(120));
        assert_eq!(n.proteins, Decimal::from(6));
        assert_eq!(n.carbs, Decimal::from(18));
        assert_eq!(n.fats, Decimal::from(3));
    }

    #[test]
    fn zero_quantity_scales_to_zero() {
        let food = food_per_100(200, 10, 30, 8);
        let n = scale_nutrients(&food, Decimal::ZERO).unwrap();
        assert_eq!(n, Nutrients::ZERO);
    }

    #[test]
    fn zero_serving_size_is_rejected() {
        let mut food = food_per_100(200, 10, 30, 8);
        food.serving_size = Decimal::ZERO;
        let err = scale_nutrients(&food, Decimal::from(50)).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn meal_totals_sum_item_snapshots() {
        let items = vec![item_with_calories(100), item_with_calories(50)];
        let totals = meal_totals(&items);
        assert_eq!(totals.calories, Decimal::from(150));
        assert_eq!(totals.proteins, Decimal::from(2));
        assert_eq!(totals.carbs, Decimal::from(4));
        assert_eq!(totals.fats, Decimal::from(6));
    }

    #[test]
    fn empty_meal_has_zero_totals() {
        assert_eq!(meal_totals(&[]), Nutrients::ZERO);
    }

    #[test]
    fn day_with_no_meals_sums_to_zero() {
        assert_eq!(sum_totals(std::iter::empty()), Nutrients::ZERO);
    }

    #[test]
    fn day_totals_span_meals() {
        let breakfast = vec![item_with_calories(100)];
        let dinner = vec![item_with_calories(50), item_with_calories(25)];
        let totals = sum_totals([breakfast.as_slice(), dinner.as_slice()]);
        assert_eq!(totals.calories, Decimal::from(175));
    }

    #[test]
    fn owner_mismatch_is_forbidden() {
        let meal = meal_owned_by(Some(Uuid::new_v4()));
        let err = authorize(&meal, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn owner_match_is_granted() {
        let owner = Uuid::new_v4();
        let meal = meal_owned_by(Some(owner));
        assert!(authorize(&meal, owner).is_ok());
    }

    #[test]
    fn ownerless_meal_is_granted() {
        let meal = meal_owned_by(None);
        assert!(authorize(&meal, Uuid::new_v4()).is_ok());
    }

    #[test]
    fn parse_day_accepts_iso_dates() {
        let day = parse_day("2024-03-09").unwrap();
        assert_eq!(day.to_string(), "2024-03-09");
    }

    #[test]
    fn parse_day_rejects_garbage() {
        assert!(parse_day("not-a-date").is_err());
        assert!(parse_day("2024-13-40").is_err());
        assert!(parse_day("09/03/2024").is_err());
    }
}
