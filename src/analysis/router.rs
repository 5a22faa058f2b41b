use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use super::directory::ClientDirectory;
use super::domain::AnalysisResult;
use super::service::AnalysisService;
use crate::error::AppError;

/// Router builder exposing the analysis endpoint over any directory
/// implementation.
pub fn analysis_router<D>(service: Arc<AnalysisService<D>>) -> Router
where
    D: ClientDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/clients/:id/analysis",
            get(analyze_handler::<D>),
        )
        .with_state(service)
}

async fn analyze_handler<D>(
    State(service): State<Arc<AnalysisService<D>>>,
    Path(id): Path<String>,
) -> Result<Json<AnalysisResult>, AppError>
where
    D: ClientDirectory + 'static,
{
    let result = service.analyze(&id).await?;
    Ok(Json(result))
}
