use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::ApiError,
    foods::repo::Food,
    meals::{
        dto::{
            AddItemRequest, CreateMealRequest, DailySummaryResponse, MealResponse, RangeQuery,
            UpdateItemRequest, UpdateMealRequest,
        },
        repo::{Meal, MealItem},
        services::{authorize, parse_day, scale_nutrients, sum_totals},
    },
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals))
        .route("/meals/date/:date", get(meals_by_date))
        .route("/meals/range", get(meals_by_range))
        .route("/meals/summary/:date", get(daily_summary))
        .route("/meals/:id", get(get_meal))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", post(create_meal))
        .route(
            "/meals/:id",
            axum::routing::patch(update_meal).delete(delete_meal),
        )
        .route("/meals/:id/items", post(add_item))
        .route(
            "/meals/:id/items/:item_id",
            axum::routing::patch(update_item).delete(remove_item),
        )
}

/// Resolve a meal and run the ownership check before anything else touches it.
async fn load_authorized(db: &PgPool, meal_id: Uuid, caller: Uuid) -> Result<Meal, ApiError> {
    let meal = Meal::find_by_id(db, meal_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Meal with ID {meal_id} not found")))?;
    authorize(&meal, caller)?;
    Ok(meal)
}

async fn refreshed(db: &PgPool, meal: Meal) -> Result<MealResponse, ApiError> {
    let items = MealItem::for_meal(db, meal.id).await?;
    Ok(MealResponse::new(meal, items))
}

/// Attach items to a batch of meals with a single query.
async fn with_items(db: &PgPool, meals: Vec<Meal>) -> Result<Vec<MealResponse>, ApiError> {
    if meals.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = meals.iter().map(|m| m.id).collect();
    let items = MealItem::for_meals(db, &ids).await?;

    let mut by_meal: HashMap<Uuid, Vec<MealItem>> = HashMap::new();
    for item in items {
        by_meal.entry(item.meal_id).or_default().push(item);
    }

    Ok(meals
        .into_iter()
        .map(|meal| {
            let items = by_meal.remove(&meal.id).unwrap_or_default();
            MealResponse::new(meal, items)
        })
        .collect())
}

#[instrument(skip(state, payload))]
pub async fn create_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateMealRequest>,
) -> Result<(StatusCode, Json<MealResponse>), ApiError> {
    let mut tx = state.db.begin().await?;
    let meal = Meal::insert_tx(
        &mut tx,
        Some(user_id),
        payload.meal_type,
        payload.date,
        payload.notes.as_deref(),
    )
    .await?;

    for item in &payload.items {
        let food = Food::find_by_id(&state.db, item.food_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Food with ID {} not found", item.food_id)))?;
        let nutrients = scale_nutrients(&food, item.quantity)?;
        MealItem::insert_tx(&mut tx, meal.id, food.id, item.quantity, &nutrients).await?;
    }
    tx.commit().await?;

    info!(meal_id = %meal.id, user_id = %user_id, "meal created");
    let response = refreshed(&state.db, meal).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<MealResponse>>, ApiError> {
    let meals = Meal::list_scoped(&state.db, user_id).await?;
    Ok(Json(with_items(&state.db, meals).await?))
}

#[instrument(skip(state))]
pub async fn meals_by_date(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
) -> Result<Json<Vec<MealResponse>>, ApiError> {
    let date = parse_day(&date)?;
    let meals = Meal::find_by_date(&state.db, user_id, date).await?;
    Ok(Json(with_items(&state.db, meals).await?))
}

#[instrument(skip(state))]
pub async fn meals_by_range(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<MealResponse>>, ApiError> {
    let start = parse_day(&range.start)?;
    let end = parse_day(&range.end)?;
    let meals = Meal::find_by_range(&state.db, user_id, start, end).await?;
    Ok(Json(with_items(&state.db, meals).await?))
}

/// Aggregated nutrient totals across the caller's meals for one calendar day.
/// A day without meals is an empty list with zero totals, not an error.
#[instrument(skip(state))]
pub async fn daily_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
) -> Result<Json<DailySummaryResponse>, ApiError> {
    let date = parse_day(&date)?;
    let meals = Meal::find_by_date(&state.db, user_id, date).await?;
    let meals = with_items(&state.db, meals).await?;
    let totals = sum_totals(meals.iter().map(|m| m.items.as_slice()));
    Ok(Json(DailySummaryResponse {
        date,
        meals,
        totals,
    }))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MealResponse>, ApiError> {
    let meal = load_authorized(&state.db, id, user_id).await?;
    Ok(Json(refreshed(&state.db, meal).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMealRequest>,
) -> Result<Json<MealResponse>, ApiError> {
    let mut meal = load_authorized(&state.db, id, user_id).await?;
    payload.apply(&mut meal);
    let meal = meal.save(&state.db).await?;

    info!(meal_id = %meal.id, "meal updated");
    Ok(Json(refreshed(&state.db, meal).await?))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let meal = load_authorized(&state.db, id, user_id).await?;
    Meal::delete(&state.db, meal.id).await?;
    info!(meal_id = %meal.id, "meal deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Add a food at a quantity. The item's nutrient values are computed from the
/// food's current per-serving values and frozen from then on.
#[instrument(skip(state, payload))]
pub async fn add_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddItemRequest>,
) -> Result<Json<MealResponse>, ApiError> {
    let meal = load_authorized(&state.db, id, user_id).await?;
    let food = Food::find_by_id(&state.db, payload.food_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Food with ID {} not found", payload.food_id))
        })?;

    let nutrients = scale_nutrients(&food, payload.quantity)?;
    MealItem::insert(&state.db, meal.id, food.id, payload.quantity, &nutrients).await?;

    info!(meal_id = %meal.id, food_id = %food.id, "item added");
    Ok(Json(refreshed(&state.db, meal).await?))
}

/// Re-quantify an item. This is the one path where a later food edit reaches
/// an existing item: the snapshot is recomputed from the food's current
/// values and the new quantity.
#[instrument(skip(state, payload))]
pub async fn update_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateItemRequest>,
) -> Result<Json<MealResponse>, ApiError> {
    let meal = load_authorized(&state.db, id, user_id).await?;
    let item = MealItem::find_scoped(&state.db, meal.id, item_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Item with ID {item_id} not found in meal {id}"))
        })?;

    let food_id = item
        .food_id
        .ok_or_else(|| ApiError::NotFound("The food for this item no longer exists".into()))?;
    let food = Food::find_by_id(&state.db, food_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Food with ID {food_id} not found")))?;

    let nutrients = scale_nutrients(&food, payload.quantity)?;
    MealItem::update_quantity(&state.db, item.id, payload.quantity, &nutrients).await?;

    info!(meal_id = %meal.id, item_id = %item.id, "item re-quantified");
    Ok(Json(refreshed(&state.db, meal).await?))
}

#[instrument(skip(state))]
pub async fn remove_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MealResponse>, ApiError> {
    let meal = load_authorized(&state.db, id, user_id).await?;

    if !MealItem::delete_scoped(&state.db, meal.id, item_id).await? {
        return Err(ApiError::NotFound(format!(
            "Item with ID {item_id} not found in meal {id}"
        )));
    }

    info!(meal_id = %meal.id, item_id = %item_id, "item removed");
    Ok(Json(refreshed(&state.db, meal).await?))
}
