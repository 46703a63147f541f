use rust_decimal::Decimal;

use crate::error::ApiError;
use crate::foods::repo::Food;

/// Nutrient values are declared per serving, so a zero or negative serving
/// size would make every scale computation meaningless.
pub fn validate_serving_size(serving_size: Decimal) -> Result<(), ApiError> {
    if serving_size <= Decimal::ZERO {
        return Err(ApiError::BadRequest(
            "servingSize must be strictly positive".into(),
        ));
    }
    Ok(())
}

/// Order search results so names starting with the term come before names
/// that merely contain it, alphabetically within each rank.
pub fn rank_search_results(mut foods: Vec<Food>, term: &str) -> Vec<Food> {
    let term = term.to_lowercase();
    foods.sort_by(|a, b| {
        let a_prefix = a.name.to_lowercase().starts_with(&term);
        let b_prefix = b.name.to_lowercase().starts_with(&term);
        b_prefix
            .cmp(&a_prefix)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    foods
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn food(name: &str, brand: Option<&str>) -> Food {
        Food {
            id: Uuid::new_v4(),
            name: name.into(),
            brand: brand.map(Into::into),
            calories: Decimal::from(100),
            proteins: Decimal::from(10),
            carbs: Decimal::from(10),
            fats: Decimal::from(10),
            serving_size: Decimal::from(100),
            serving_unit: "g".into(),
            barcode: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn prefix_match_ranks_before_substring_match() {
        let foods = vec![
            food("Hot Chocolate", None),
            food("Chocolate Bar", Some("Acme")),
        ];
        let ranked = rank_search_results(foods, "choc");
        assert_eq!(ranked[0].name, "Chocolate Bar");
        assert_eq!(ranked[1].name, "Hot Chocolate");
    }

    #[test]
    fn equal_rank_sorts_alphabetically() {
        let foods = vec![
            food("Chocolate Spread", None),
            food("Chocolate Bar", None),
            food("Hot Chocolate", None),
            food("Dark Hot Chocolate", None),
        ];
        let ranked = rank_search_results(foods, "choc");
        let names: Vec<&str> = ranked.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Chocolate Bar",
                "Chocolate Spread",
                "Dark Hot Chocolate",
                "Hot Chocolate"
            ]
        );
    }

    #[test]
    fn ranking_is_case_insensitive() {
        let foods = vec![food("hot chocolate", None), food("CHOCOLATE BAR", None)];
        let ranked = rank_search_results(foods, "Choc");
        assert_eq!(ranked[0].name, "CHOCOLATE BAR");
    }

    #[test]
    fn serving_size_must_be_positive() {
        assert!(validate_serving_size(Decimal::from(100)).is_ok());
        assert!(validate_serving_size(Decimal::new(1, 2)).is_ok());
        assert!(validate_serving_size(Decimal::ZERO).is_err());
        assert!(validate_serving_size(Decimal::from(-5)).is_err());
    }
}
