use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{
        EmotionRecommendRequest, EmotionRecommendResponse, RecommendRequest, RecommendResponse,
    },
};

use super::AppState;

/// Liveness probe
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Success!" }))
}

/// Liveness probe
pub async fn status() -> Json<Value> {
    Json(json!({ "message": "ok" }))
}

/// General and per-favorite recommendations
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> AppResult<Json<RecommendResponse>> {
    let Json(request) = payload.inspect_err(|rejection| {
        tracing::info!(
            request_id = %request_id,
            error = %rejection.body_text(),
            "Rejected recommend body"
        );
    })?;

    tracing::info!(
        request_id = %request_id,
        favorites = request.favorites.len(),
        discover = request.discover.len(),
        "Processing recommend request"
    );

    let response = state.recommender.recommend(&request).await?;
    Ok(Json(response))
}

/// Recommendations for a free-text mood
pub async fn emotion_recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<EmotionRecommendRequest>, JsonRejection>,
) -> AppResult<Json<EmotionRecommendResponse>> {
    let Json(request) = payload.inspect_err(|rejection| {
        tracing::info!(
            request_id = %request_id,
            error = %rejection.body_text(),
            "Rejected emotion-recommend body"
        );
    })?;

    tracing::info!(
        request_id = %request_id,
        text_len = request.text.len(),
        discover = request.discover.len(),
        "Processing emotion-recommend request"
    );

    let response = state.recommender.recommend_for_mood(&request).await?;
    Ok(Json(response))
}
