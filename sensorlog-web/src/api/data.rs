//! Reading storage and retrieval endpoints
//!
//! All of these are GET, including `/save`, to stay compatible with existing
//! clients that log readings with a plain URL fetch.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use sensorlog_common::db::Series;
use sensorlog_common::time::parse_date;
use sensorlog_common::Error;
use serde::Serialize;
use std::collections::BTreeSet;

use super::error::ApiResult;
use crate::store::QueryFilter;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// GET /save/:key/:value
///
/// Stores one reading stamped with the server's current time.
pub async fn save(
    State(state): State<AppState>,
    Path((key, value)): Path<(String, String)>,
) -> ApiResult<Json<MessageResponse>> {
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidInput(format!("value '{}' is not a number", value)))?;

    state.store.save(&key, value).await?;

    Ok(Json(MessageResponse {
        message: "Data saved".to_string(),
    }))
}

/// GET /get/?key=..&date=..
///
/// Series for every key matching the filters. Only `key` and `date` are
/// accepted; any other parameter is a 400.
pub async fn get_series(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Json<Vec<Series>>> {
    let filter = QueryFilter::from_params(params)?;
    let series = state.store.query(&filter).await?;
    Ok(Json(series))
}

/// GET /get/:date
///
/// Sorted distinct keys recorded on a `YYYY-MM-DD` date.
pub async fn get_keys(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> ApiResult<Json<BTreeSet<String>>> {
    let date = parse_date(&date)?;
    let keys = state.store.get_keys(date).await?;
    Ok(Json(keys))
}
