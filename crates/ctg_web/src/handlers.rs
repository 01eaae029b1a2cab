use axum::{
    extract::{Path, Query, State},
    Json,
};
use ctg_core::types::parse_date;
use ctg_core::{points, DateRange, Error, Point, SearchFilter, Summary};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::ApiError;
use crate::state::{AppState, DEFAULT_LIMIT};

#[derive(Debug, Default, Deserialize)]
pub struct StudiesParams {
    pub limit: Option<usize>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl StudiesParams {
    fn limit(&self, max_limit: usize) -> Result<usize, Error> {
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        if limit > max_limit {
            return Err(Error::InvalidArgument(format!(
                "limit {} exceeds the maximum of {}",
                limit, max_limit
            )));
        }
        Ok(limit)
    }

    fn filter(&self) -> Result<SearchFilter, Error> {
        match (self.start.as_deref(), self.end.as_deref()) {
            (None, None) => Ok(SearchFilter::unfiltered()),
            (Some(start), Some(end)) => Ok(SearchFilter::date_range(DateRange {
                start: parse_date(start)?,
                end: parse_date(end)?,
            })),
            _ => Err(Error::InvalidArgument(
                "start and end must be given together".to_string(),
            )),
        }
    }
}

async fn collect(state: &AppState, params: &StudiesParams) -> Result<Vec<Summary>, ApiError> {
    let limit = params.limit(state.max_limit)?;
    let filter = params.filter()?;
    Ok(state.aggregator.collect(&filter, limit).await?)
}

pub async fn list_studies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StudiesParams>,
) -> Result<Json<Vec<Summary>>, ApiError> {
    collect(&state, &params).await.map(Json)
}

pub async fn list_points(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StudiesParams>,
) -> Result<Json<Vec<Point>>, ApiError> {
    let summaries = collect(&state, &params).await?;
    Ok(Json(points(&summaries)))
}

pub async fn get_study(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Summary>, ApiError> {
    Ok(Json(state.aggregator.summary(&id).await?))
}
