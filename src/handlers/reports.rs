use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    response::Json,
};
use common::{FinanceReport, ReportRange};
use compute::report::{self, ReportParams};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::auth::Claims;
use crate::schemas::{compute_error_response, ApiResponse, AppState, ErrorResponse};

/// Query parameters for a finance report
#[derive(Debug, Deserialize, Serialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    /// Window: daily, weekly or monthly
    pub range: ReportRange,
    /// Months back the window starts (monthly only, 0 = current month)
    pub month_start: Option<u32>,
    /// Months back the window ends (monthly only, 0 = current month)
    pub month_end: Option<u32>,
}

/// Build a finance report over the requested window
#[utoipa::path(
    get,
    path = "/reportes",
    tag = "reportes",
    params(ReportQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Report computed", body = ApiResponse<FinanceReport>),
        (status = 400, description = "Invalid window", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, claims), fields(user_id = claims.user_id))]
pub async fn get_report(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ApiResponse<FinanceReport>>, (StatusCode, Json<ErrorResponse>)> {
    debug!(?query.range, "Computing finance report");

    let params = ReportParams {
        range: query.range,
        month_start: query.month_start,
        month_end: query.month_end,
    };

    let finance_report = report::report(&state.db, claims.user_id, params)
        .await
        .map_err(compute_error_response)?;

    Ok(Json(ApiResponse::new(
        finance_report,
        "Report computed successfully",
    )))
}
