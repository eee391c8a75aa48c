//! REST surface. Handlers stay thin: authenticate, decode the request,
//! call the api crate, wrap the result in the response envelope.

use api::auth::{decode_token, login, AuthConfig, CurrentUser};
use api::error::ApiError;
use api::followups::{
    create_followup, dashboard, list_followups, update_followup, FollowupUpdate, NewFollowup,
};
use api::leads::{archive_lead, create_lead, get_lead, list_archived, list_leads, NewLead};
use api::offers::{decision_message, list_offers, record_offer};
use api::progression::{
    invoice, record_transition, stage_catalog, stage_history, StagePayload, StageUpdateRequest,
};
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use entity::offer::Decision;
use entity::user;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub auth: Arc<AuthConfig>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(auth_login))
        .route("/leads", post(leads_create).get(leads_list))
        .route("/leads/archive", get(leads_archived))
        .route("/leads/{id}", get(leads_get).delete(leads_delete))
        .route("/followups", post(followups_create).get(followups_list))
        .route("/followups/dashboard", get(followups_dashboard))
        .route("/followups/{id}", put(followups_update))
        .route("/progression/status", get(progression_status))
        .route("/progression/updatestatus", put(progression_update_status))
        .route("/progression/status_ledger/{lead_id}", get(progression_ledger))
        .route("/progression/invoice/{lead_id}", get(progression_invoice))
        .route("/progression/offers", get(offers_list).post(offers_create))
        .route("/progression/offers/{lead_id}", get(offers_for_lead))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Success envelope the clients expect on every 2xx.
fn envelope(data: Value, message: &str) -> Json<Value> {
    Json(json!({ "data": data, "message": message, "status": true }))
}

fn to_value<T: serde::Serialize>(data: &T) -> Result<Value, HttpError> {
    serde_json::to_value(data).map_err(|err| HttpError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: format!("encode error: {err}"),
    })
}

pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let (status, message) = match err {
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Db(err) => {
                tracing::error!(error = %err, "database failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };
        HttpError { status, message }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "message": self.message, "status": "error" }));
        (self.status, body).into_response()
    }
}

fn unauthorized(message: &str) -> HttpError {
    HttpError {
        status: StatusCode::UNAUTHORIZED,
        message: message.to_string(),
    }
}

/// Resolve the acting user from the bearer token. Every route except
/// `/health` and `/auth/login` goes through here.
async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<CurrentUser, HttpError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|text| text.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| unauthorized("Authorization token required"))?;
    let claims =
        decode_token(token, &state.auth).map_err(|_| unauthorized("Invalid or expired token"))?;
    let record = user::Entity::find_by_id(claims.sub)
        .one(state.db.as_ref())
        .await
        .map_err(|err| HttpError::from(ApiError::Db(err)))?
        .filter(|record| record.is_active)
        .ok_or_else(|| unauthorized("Invalid or expired token"))?;
    Ok(CurrentUser {
        user_id: record.id,
    })
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn auth_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, HttpError> {
    let session = login(
        state.db.as_ref(),
        &state.auth,
        &request.email,
        &request.password,
    )
    .await?;
    Ok(envelope(
        json!({
            "token": session.token,
            "user": to_value(&session.user)?,
        }),
        "Login successful",
    ))
}

async fn leads_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<NewLead>,
) -> Result<(StatusCode, Json<Value>), HttpError> {
    let current = authenticate(&state, &headers).await?;
    let lead = create_lead(state.db.as_ref(), request, current.user_id).await?;
    Ok((
        StatusCode::CREATED,
        envelope(to_value(&lead)?, "Lead created successfully"),
    ))
}

async fn leads_list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, HttpError> {
    authenticate(&state, &headers).await?;
    let leads = list_leads(state.db.as_ref()).await?;
    Ok(envelope(to_value(&leads)?, "Leads fetched successfully"))
}

async fn leads_archived(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, HttpError> {
    authenticate(&state, &headers).await?;
    let leads = list_archived(state.db.as_ref()).await?;
    Ok(envelope(to_value(&leads)?, "Leads fetched successfully"))
}

async fn leads_get(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, HttpError> {
    authenticate(&state, &headers).await?;
    let lead = get_lead(state.db.as_ref(), id).await?;
    Ok(envelope(to_value(&lead)?, "Lead fetched successfully"))
}

async fn leads_delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, HttpError> {
    authenticate(&state, &headers).await?;
    archive_lead(state.db.as_ref(), id).await?;
    Ok(envelope(Value::Null, "Lead deleted successfully"))
}

async fn followups_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<NewFollowup>,
) -> Result<(StatusCode, Json<Value>), HttpError> {
    let current = authenticate(&state, &headers).await?;
    let followup = create_followup(state.db.as_ref(), request, current.user_id).await?;
    Ok((
        StatusCode::CREATED,
        envelope(to_value(&followup)?, "Follow-up created successfully"),
    ))
}

#[derive(Debug, Deserialize)]
struct FollowupFilter {
    lead_id: Option<Uuid>,
}

async fn followups_list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(filter): Query<FollowupFilter>,
) -> Result<Json<Value>, HttpError> {
    authenticate(&state, &headers).await?;
    let followups = list_followups(state.db.as_ref(), filter.lead_id).await?;
    Ok(envelope(
        to_value(&followups)?,
        "Follow-ups fetched successfully",
    ))
}

async fn followups_dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, HttpError> {
    authenticate(&state, &headers).await?;
    let upcoming = dashboard(state.db.as_ref(), Utc::now().date_naive()).await?;
    Ok(envelope(
        to_value(&upcoming)?,
        "Follow-ups fetched successfully",
    ))
}

async fn followups_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<FollowupUpdate>,
) -> Result<Json<Value>, HttpError> {
    authenticate(&state, &headers).await?;
    let followup = update_followup(state.db.as_ref(), id, request).await?;
    Ok(envelope(
        to_value(&followup)?,
        "Follow-up updated successfully",
    ))
}

async fn progression_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, HttpError> {
    authenticate(&state, &headers).await?;
    let catalog = stage_catalog(state.db.as_ref()).await?;
    Ok(envelope(to_value(&catalog)?, "Status fetched successfully"))
}

async fn progression_update_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<StageUpdateRequest>,
) -> Result<(StatusCode, Json<Value>), HttpError> {
    let current = authenticate(&state, &headers).await?;
    let code = entity::lead::StageCode::from_i16(request.lead_status)
        .ok_or_else(|| HttpError::from(ApiError::Validation("Invalid lead status".into())))?;
    let payload = StagePayload::from_request(code, &request)?;
    record_transition(state.db.as_ref(), request.lead_id, current.user_id, payload).await?;
    Ok((
        StatusCode::CREATED,
        envelope(Value::Null, "Status updated successfully"),
    ))
}

async fn progression_ledger(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(lead_id): Path<Uuid>,
) -> Result<Json<Value>, HttpError> {
    authenticate(&state, &headers).await?;
    let history = stage_history(state.db.as_ref(), lead_id).await?;
    Ok(envelope(to_value(&history)?, "Status fetched successfully"))
}

async fn progression_invoice(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(lead_id): Path<Uuid>,
) -> Result<Json<Value>, HttpError> {
    authenticate(&state, &headers).await?;
    let view = invoice(state.db.as_ref(), lead_id).await?;
    Ok(envelope(to_value(&view)?, "Invoice fetched successfully"))
}

async fn offers_list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, HttpError> {
    authenticate(&state, &headers).await?;
    let offers = list_offers(state.db.as_ref(), None).await?;
    Ok(envelope(to_value(&offers)?, "Offers fetched successfully"))
}

async fn offers_for_lead(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(lead_id): Path<Uuid>,
) -> Result<Json<Value>, HttpError> {
    authenticate(&state, &headers).await?;
    let offers = list_offers(state.db.as_ref(), Some(lead_id)).await?;
    Ok(envelope(to_value(&offers)?, "Offers fetched successfully"))
}

#[derive(Debug, Deserialize)]
struct OfferRequest {
    lead_id: Uuid,
    amount: i64,
    offer_status: i16,
}

async fn offers_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<OfferRequest>,
) -> Result<(StatusCode, Json<Value>), HttpError> {
    let current = authenticate(&state, &headers).await?;
    let decision = Decision::from_i16(request.offer_status)
        .ok_or_else(|| HttpError::from(ApiError::Validation("Invalid offer status".into())))?;
    let offer = record_offer(
        state.db.as_ref(),
        request.lead_id,
        current.user_id,
        request.amount,
        decision,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        envelope(to_value(&offer)?, decision_message(decision)),
    ))
}
