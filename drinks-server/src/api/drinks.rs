use crate::api::guard::require_permission;
use crate::errors::{ApiError, ErrorBody};
use crate::models::{
    CreateDrinkRequest, DeleteResponse, DrinkResponse, DrinksLongList, DrinksShortList,
    UpdateDrinkRequest,
};
use crate::openapi::DRINKS_TAG;
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Json, Path, State};
use axum::routing::{delete, get, patch, post, MethodRouter};
use axum::{Extension, Router};
use drinks_auth::Claims;
use log::{debug, info};

pub(crate) const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
pub(crate) const POST_DRINKS: &str = "post:drinks";
pub(crate) const PATCH_DRINKS: &str = "patch:drinks";
pub(crate) const DELETE_DRINKS: &str = "delete:drinks";

/// Unparseable bodies are a bad request, well-formed JSON of the wrong shape
/// is unprocessable
fn body_error(rejection: JsonRejection) -> ApiError {
    debug!("Rejected request body: {}", rejection.body_text());
    match rejection {
        JsonRejection::JsonDataError(_) => ApiError::unprocessable(),
        _ => ApiError::bad_request(),
    }
}

fn path_error(rejection: PathRejection) -> ApiError {
    debug!("Rejected drink id: {}", rejection.body_text());
    ApiError::not_found()
}

#[utoipa::path(
    get,
    path = "/drinks",
    tag = DRINKS_TAG,
    responses(
        (status = 200, description = "All drinks without ingredient quantities", body = DrinksShortList),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub(crate) async fn list_drinks(
    State(state): State<AppState>,
) -> Result<Json<DrinksShortList>, ApiError> {
    let drinks = state.drinks.list_all().await?;
    Ok(Json(DrinksShortList {
        success: true,
        drinks: drinks.iter().map(|drink| drink.short()).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/drinks-detail",
    tag = DRINKS_TAG,
    params(
        ("Authorization" = String, Header, description = "Bearer token granting get:drinks-detail"),
    ),
    responses(
        (status = 200, description = "All drinks with full recipes", body = DrinksLongList),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Permission not granted", body = ErrorBody)
    )
)]
pub(crate) async fn list_drinks_detail(
    State(state): State<AppState>,
) -> Result<Json<DrinksLongList>, ApiError> {
    let drinks = state.drinks.list_all().await?;
    Ok(Json(DrinksLongList {
        success: true,
        drinks: drinks.iter().map(|drink| drink.long()).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/drinks",
    tag = DRINKS_TAG,
    request_body = CreateDrinkRequest,
    params(
        ("Authorization" = String, Header, description = "Bearer token granting post:drinks"),
    ),
    responses(
        (status = 200, description = "Drink created", body = DrinkResponse),
        (status = 400, description = "Request body is not JSON", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Permission not granted", body = ErrorBody),
        (status = 422, description = "Invalid drink or duplicate id", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub(crate) async fn create_drink(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<CreateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinkResponse>, ApiError> {
    let Json(request) = payload.map_err(body_error)?;
    let drink = state.drinks.create(request.validate()?).await?;
    info!(
        "Drink {} '{}' created by {}",
        drink.id,
        drink.title,
        claims.subject()
    );
    Ok(Json(DrinkResponse {
        success: true,
        drinks: drink.long(),
    }))
}

#[utoipa::path(
    patch,
    path = "/drinks/{id}",
    tag = DRINKS_TAG,
    request_body = UpdateDrinkRequest,
    params(
        ("id" = i64, Path, description = "Drink id"),
        ("Authorization" = String, Header, description = "Bearer token granting patch:drinks"),
    ),
    responses(
        (status = 200, description = "Drink updated", body = DrinkResponse),
        (status = 400, description = "Request body is not JSON", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Permission not granted", body = ErrorBody),
        (status = 404, description = "No drink with this id", body = ErrorBody),
        (status = 422, description = "Invalid update", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub(crate) async fn update_drink(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<UpdateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinkResponse>, ApiError> {
    let Path(id) = id.map_err(path_error)?;
    let Json(request) = payload.map_err(body_error)?;
    let drink = state.drinks.update(id, request.validate()?).await?;
    info!("Drink {} updated by {}", drink.id, claims.subject());
    Ok(Json(DrinkResponse {
        success: true,
        drinks: drink.long(),
    }))
}

#[utoipa::path(
    delete,
    path = "/drinks/{id}",
    tag = DRINKS_TAG,
    params(
        ("id" = i64, Path, description = "Drink id"),
        ("Authorization" = String, Header, description = "Bearer token granting delete:drinks"),
    ),
    responses(
        (status = 200, description = "Drink deleted", body = DeleteResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Permission not granted", body = ErrorBody),
        (status = 404, description = "No drink with this id", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub(crate) async fn delete_drink(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let Path(id) = id.map_err(path_error)?;
    state.drinks.delete(id).await?;
    info!("Drink {} deleted by {}", id, claims.subject());
    Ok(Json(DeleteResponse {
        success: true,
        delete: id,
    }))
}

/// Wraps `handler` in a guard requiring `permission`
fn guarded(
    state: &AppState,
    permission: &str,
    handler: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    handler.route_layer(axum::middleware::from_fn_with_state(
        state.guard(permission),
        require_permission,
    ))
}

/// Combines all drink routes into a single router
pub(super) fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/drinks",
            get(list_drinks).merge(guarded(state, POST_DRINKS, post(create_drink))),
        )
        .route(
            "/drinks-detail",
            guarded(state, GET_DRINKS_DETAIL, get(list_drinks_detail)),
        )
        .route(
            "/drinks/{id}",
            guarded(state, PATCH_DRINKS, patch(update_drink))
                .merge(guarded(state, DELETE_DRINKS, delete(delete_drink))),
        )
}
