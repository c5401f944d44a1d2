use std::{collections::HashMap, sync::Arc};

use axum::{
    Json,
    extract::{Query, State},
};
use serde_json::Value;

use crate::api::{ApiError, ApiResult, RelayState};

/// `GET /callback?code=` - exchanges an authorization code for tokens.
pub async fn callback(
    State(state): State<Arc<RelayState>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Value>> {
    let Some(code) = params.get("code").filter(|c| !c.is_empty()) else {
        return Err(ApiError::bad_request("Missing authorization code"));
    };

    let tokens = state.token_endpoint.exchange_code(code).await?;
    Ok(Json(tokens))
}

/// `GET /refresh?refresh_token=` - trades a refresh token for a new access token.
pub async fn refresh(
    State(state): State<Arc<RelayState>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Value>> {
    let Some(refresh_token) = params.get("refresh_token").filter(|t| !t.is_empty()) else {
        return Err(ApiError::bad_request("Missing refresh token"));
    };

    let tokens = state.token_endpoint.refresh(refresh_token).await?;
    Ok(Json(tokens))
}
