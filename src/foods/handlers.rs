use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    error::ApiError,
    foods::{
        dto::{CreateFoodRequest, FindOrCreateResponse, SearchQuery, UpdateFoodRequest},
        repo::{Food, NewFood},
        services::{rank_search_results, validate_serving_size},
    },
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/foods", get(list_foods))
        .route("/foods/barcode/:barcode", get(find_by_barcode))
        .route("/foods/:id", get(get_food))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/foods", post(create_food))
        .route("/foods/find-or-create", post(find_or_create_food))
        .route("/foods/:id", axum::routing::patch(update_food).delete(delete_food))
}

fn duplicate_message(name: &str, brand: Option<&str>) -> String {
    format!(
        "Food \"{}\" ({}) already exists",
        name,
        brand.unwrap_or("no brand")
    )
}

async fn insert_from_request(
    state: &AppState,
    payload: CreateFoodRequest,
) -> Result<Food, ApiError> {
    let serving_size = payload.serving_size.unwrap_or_else(|| Decimal::from(100));
    validate_serving_size(serving_size)?;

    let food = Food::insert(
        &state.db,
        NewFood {
            name: &payload.name,
            brand: payload.brand.as_deref(),
            calories: payload.calories,
            proteins: payload.proteins,
            carbs: payload.carbs,
            fats: payload.fats,
            serving_size,
            serving_unit: payload.serving_unit.as_deref().unwrap_or("g"),
            barcode: payload.barcode.as_deref(),
        },
    )
    .await?;
    Ok(food)
}

#[instrument(skip(state, payload))]
pub async fn create_food(
    State(state): State<AppState>,
    Json(payload): Json<CreateFoodRequest>,
) -> Result<(StatusCode, Json<Food>), ApiError> {
    if Food::find_by_name_and_brand(&state.db, &payload.name, payload.brand.as_deref())
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(duplicate_message(
            &payload.name,
            payload.brand.as_deref(),
        )));
    }

    let food = insert_from_request(&state, payload).await?;
    info!(food_id = %food.id, name = %food.name, "food created");
    Ok((StatusCode::CREATED, Json(food)))
}

#[instrument(skip(state, payload))]
pub async fn find_or_create_food(
    State(state): State<AppState>,
    Json(payload): Json<CreateFoodRequest>,
) -> Result<Json<FindOrCreateResponse>, ApiError> {
    if let Some(existing) =
        Food::find_by_name_and_brand(&state.db, &payload.name, payload.brand.as_deref()).await?
    {
        return Ok(Json(FindOrCreateResponse {
            food: existing,
            created: false,
        }));
    }

    let food = insert_from_request(&state, payload).await?;
    info!(food_id = %food.id, name = %food.name, "food created via find-or-create");
    Ok(Json(FindOrCreateResponse {
        food,
        created: true,
    }))
}

#[instrument(skip(state))]
pub async fn list_foods(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Food>>, ApiError> {
    let foods = match query.search.as_deref().filter(|s| !s.is_empty()) {
        Some(term) => {
            let matches = Food::search(&state.db, term).await?;
            rank_search_results(matches, term)
        }
        None => Food::list_all(&state.db).await?,
    };
    Ok(Json(foods))
}

#[instrument(skip(state))]
pub async fn find_by_barcode(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> Result<Json<Option<Food>>, ApiError> {
    let food = Food::find_by_barcode(&state.db, &barcode).await?;
    Ok(Json(food))
}

#[instrument(skip(state))]
pub async fn get_food(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Food>, ApiError> {
    let food = Food::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Food with ID {id} not found")))?;
    Ok(Json(food))
}

#[instrument(skip(state, payload))]
pub async fn update_food(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFoodRequest>,
) -> Result<Json<Food>, ApiError> {
    let mut food = Food::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Food with ID {id} not found")))?;

    payload.apply(&mut food);
    validate_serving_size(food.serving_size)?;

    let food = food.save(&state.db).await?;
    info!(food_id = %food.id, "food updated");
    Ok(Json(food))
}

#[instrument(skip(state))]
pub async fn delete_food(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !Food::delete(&state.db, id).await? {
        return Err(ApiError::NotFound(format!("Food with ID {id} not found")));
    }
    info!(food_id = %id, "food deleted");
    Ok(StatusCode::NO_CONTENT)
}
