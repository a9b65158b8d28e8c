use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use serde::Serialize;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

/// Renders a JSON body followed by a newline, the framing clients of the
/// service already expect.
pub fn json_reply<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(mut body) => {
            body.push(b'\n');
            (status, Body::from(body)).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to encode reply: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn insert_currency(
    State(state): State<Arc<AppState>>,
    Path((currency, price)): Path<(String, String)>,
) -> ApiResult<Response> {
    let reply = state.price_service.insert_price(&currency, &price).await?;
    Ok(json_reply(StatusCode::OK, &reply.message()))
}

async fn select_currency(
    State(state): State<Arc<AppState>>,
    Path(currency): Path<String>,
) -> ApiResult<Response> {
    let record = state.price_service.select_price(&currency)?;
    Ok(json_reply(StatusCode::OK, &record))
}

async fn update_currency(
    State(state): State<Arc<AppState>>,
    Path((currency, price)): Path<(String, String)>,
) -> ApiResult<Response> {
    let reply = state.price_service.update_price(&currency, &price).await?;
    Ok(json_reply(StatusCode::OK, &reply.message()))
}

async fn delete_currency(
    State(state): State<Arc<AppState>>,
    Path(currency): Path<String>,
) -> ApiResult<Response> {
    let reply = state.price_service.delete_price(&currency).await?;
    Ok(json_reply(StatusCode::OK, &reply.message()))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

pub fn app_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/API/Insert/{currency}/{price}", any(insert_currency))
        .route("/API/Select/{currency}", any(select_currency))
        .route("/API/Update/{currency}/{price}", any(update_currency))
        .route("/API/Delete/{currency}", any(delete_currency))
        .fallback(not_found);

    api.with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=UTF-8"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
