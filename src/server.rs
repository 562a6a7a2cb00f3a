use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::construct::{Colour, ColourId, PartId, Quantity, Set, SetId, ShapeId, User, UserId};
use crate::engine::{Engine, PartUsage, SharingCandidate};
use crate::error::{BrickError, Result};
use crate::repository::{BricksRepository, SetSelector};

pub const SERVICE_NAME: &str = "brickstore";
const DEFAULT_LIMIT: usize = 100;

#[derive(Clone)]
pub struct AppState {
    repository: Arc<dyn BricksRepository>,
}

// ------------- Wire bodies -------------
#[derive(Debug, Serialize, Deserialize)]
pub struct PartQuantity {
    pub part_id: PartId,
    pub quantity: Quantity,
}

fn sorted_quantities<I: Iterator<Item = (PartId, Quantity)>>(parts: I) -> Vec<PartQuantity> {
    let mut parts: Vec<PartQuantity> = parts
        .map(|(part_id, quantity)| PartQuantity { part_id, quantity })
        .collect();
    parts.sort_by_key(|part| part.part_id);
    parts
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetSummary {
    pub id: SetId,
    pub name: String,
    pub total_pieces: u64,
}

impl From<&Set> for SetSummary {
    fn from(set: &Set) -> Self {
        Self {
            id: set.id(),
            name: set.name().to_owned(),
            total_pieces: set.total_pieces(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetDetail {
    pub id: SetId,
    pub name: String,
    pub total_pieces: u64,
    pub parts: Vec<PartQuantity>,
}

impl From<&Set> for SetDetail {
    fn from(set: &Set) -> Self {
        Self {
            id: set.id(),
            name: set.name().to_owned(),
            total_pieces: set.total_pieces(),
            parts: sorted_quantities(set.required_parts()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub brick_count: u64,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            name: user.name().to_owned(),
            brick_count: user.brick_count(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserDetail {
    pub id: UserId,
    pub name: String,
    pub brick_count: u64,
    pub inventory: Vec<PartQuantity>,
}

impl From<&User> for UserDetail {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            name: user.name().to_owned(),
            brick_count: user.brick_count(),
            inventory: sorted_quantities(user.inventory().parts()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CandidateBody {
    pub id: UserId,
    pub name: String,
    pub shared_parts: u64,
}

impl From<&SharingCandidate> for CandidateBody {
    fn from(candidate: &SharingCandidate) -> Self {
        Self {
            id: candidate.user.id(),
            name: candidate.user.name().to_owned(),
            shared_parts: candidate.shared_parts,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PartUsageBody {
    pub part_id: PartId,
    pub name: String,
    pub colour_id: ColourId,
    pub shape_id: ShapeId,
    pub minimum_quantity: Quantity,
    pub adopters: usize,
}

impl From<&PartUsage> for PartUsageBody {
    fn from(usage: &PartUsage) -> Self {
        Self {
            part_id: usage.part.id(),
            name: usage.part.name().to_owned(),
            colour_id: usage.part.colour(),
            shape_id: usage.part.shape(),
            minimum_quantity: usage.minimum_quantity,
            adopters: usage.adopters,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Page {
    fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().skip(self.offset).take(self.limit).collect()
    }
}

// ------------- Errors -------------
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(message: String) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message,
        }
    }
    fn bad_request(message: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message,
        }
    }
    fn internal(message: String) -> Self {
        warn!(%message, "request failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
        }
    }
}

impl From<BrickError> for ApiError {
    fn from(e: BrickError) -> Self {
        Self::internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self
                .status
                .canonical_reason()
                .unwrap_or("Error")
                .to_owned(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Runs repository work on the blocking pool, since both backends and the
/// engine are synchronous.
async fn blocking<T, F>(state: &AppState, work: F) -> std::result::Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&dyn BricksRepository) -> Result<T> + Send + 'static,
{
    let repository = Arc::clone(&state.repository);
    tokio::task::spawn_blocking(move || work(repository.as_ref()))
        .await
        .map_err(|e| ApiError::internal(format!("join error: {e}")))?
        .map_err(ApiError::from)
}

// ------------- Handlers -------------
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy", "service": SERVICE_NAME }))
}

async fn ready(State(state): State<AppState>) -> Response {
    match blocking(&state, |repository| repository.user_count()).await {
        Ok(_) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "ready", "service": SERVICE_NAME })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "not ready", "error": e.message })),
        )
            .into_response(),
    }
}

async fn colours(State(state): State<AppState>) -> ApiResult<Vec<Colour>> {
    let colours = blocking(&state, |repository| repository.all_colours()).await?;
    Ok(Json(colours))
}

async fn sets(State(state): State<AppState>, Query(page): Query<Page>) -> ApiResult<Vec<SetSummary>> {
    let sets = blocking(&state, |repository| repository.all_sets()).await?;
    Ok(Json(page.slice(sets).iter().map(SetSummary::from).collect()))
}

async fn set_by_id(State(state): State<AppState>, Path(id): Path<SetId>) -> ApiResult<SetDetail> {
    let set = blocking(&state, move |repository| repository.set_by_id(id)).await?;
    set.map(|set| Json(SetDetail::from(&set)))
        .ok_or_else(|| ApiError::not_found(format!("set {id} not found")))
}

async fn set_by_name(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<SetDetail> {
    let lookup = name.clone();
    let set = blocking(&state, move |repository| repository.set_by_name(&lookup)).await?;
    set.map(|set| Json(SetDetail::from(&set)))
        .ok_or_else(|| ApiError::not_found(format!("set '{name}' not found")))
}

async fn users(State(state): State<AppState>, Query(page): Query<Page>) -> ApiResult<Vec<UserSummary>> {
    let users = blocking(&state, |repository| repository.all_users()).await?;
    Ok(Json(page.slice(users).iter().map(UserSummary::from).collect()))
}

async fn user_by_id(State(state): State<AppState>, Path(id): Path<UserId>) -> ApiResult<UserDetail> {
    let user = blocking(&state, move |repository| repository.user_by_id(id)).await?;
    user.map(|user| Json(UserDetail::from(&user)))
        .ok_or_else(|| ApiError::not_found(format!("user {id} not found")))
}

async fn user_by_name(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<UserDetail> {
    let lookup = name.clone();
    let user = blocking(&state, move |repository| repository.user_by_name(&lookup)).await?;
    user.map(|user| Json(UserDetail::from(&user)))
        .ok_or_else(|| ApiError::not_found(format!("user '{name}' not found")))
}

async fn possible_sets(State(state): State<AppState>, Path(id): Path<UserId>) -> ApiResult<Vec<SetSummary>> {
    let possible = blocking(&state, move |repository| {
        let Some(user) = repository.user_by_id(id)? else {
            return Ok(None);
        };
        Engine::new(repository)
            .possible_sets_from_inventory(user.inventory())
            .map(Some)
    })
    .await?;
    possible
        .map(|sets| Json(sets.iter().map(SetSummary::from).collect()))
        .ok_or_else(|| ApiError::not_found(format!("user {id} not found")))
}

async fn suggest(state: &AppState, user: UserId, set: SetSelector) -> ApiResult<Vec<CandidateBody>> {
    let ranked = blocking(state, move |repository| {
        Engine::new(repository).suggest_users_for_part_sharing(user, &set)
    })
    .await?;
    Ok(Json(ranked.iter().map(CandidateBody::from).collect()))
}

async fn suggest_by_set_id(
    State(state): State<AppState>,
    Path((user, set)): Path<(UserId, SetId)>,
) -> ApiResult<Vec<CandidateBody>> {
    suggest(&state, user, SetSelector::Id(set)).await
}

async fn suggest_by_set_name(
    State(state): State<AppState>,
    Path((user, set)): Path<(UserId, String)>,
) -> ApiResult<Vec<CandidateBody>> {
    suggest(&state, user, SetSelector::Name(set)).await
}

async fn part_usage(
    State(state): State<AppState>,
    Path(percentage): Path<f64>,
) -> ApiResult<Vec<PartUsageBody>> {
    if !(0.0..=1.0).contains(&percentage) {
        return Err(ApiError::bad_request(format!(
            "percentage must lie between 0 and 1, got {percentage}"
        )));
    }
    let usage = blocking(&state, move |repository| {
        Engine::new(repository).parts_with_usage_at_least(percentage)
    })
    .await?;
    Ok(Json(usage.iter().map(PartUsageBody::from).collect()))
}

pub fn router(repository: Arc<dyn BricksRepository>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .route("/api/colours/", get(colours))
        .route("/api/sets/", get(sets))
        .route("/api/set/by-id/:id", get(set_by_id))
        .route("/api/set/by-name/:name", get(set_by_name))
        .route("/api/users/", get(users))
        .route("/api/users/part-usage/:percentage", get(part_usage))
        .route("/api/user/by-id/:id", get(user_by_id))
        .route("/api/user/by-name/:name", get(user_by_name))
        .route("/api/user/by-id/:id/possible-sets", get(possible_sets))
        .route("/api/user/by-id/:id/set/:set_id/suggest-users", get(suggest_by_set_id))
        .route(
            "/api/user/by-id/:id/set/by-name/:name/suggest-users",
            get(suggest_by_set_name),
        )
        .layer(cors)
        .with_state(AppState { repository })
}

pub async fn serve(listener: TcpListener, repository: Arc<dyn BricksRepository>) -> Result<()> {
    if let Ok(address) = listener.local_addr() {
        info!(%address, "serving brickstore api");
    }
    axum::serve(listener, router(repository))
        .await
        .map_err(|e| BrickError::Server(e.to_string()))
}
