use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::error::{ApiError, AppError};
use crate::models::estimate::{
    EstimateForm, ExportReceipt, ExportRequest, FormDefaults, ShellPhase, ShellView, DATE_FORMAT,
};
use crate::services::estimator::run_estimate;
use crate::services::exporter::{export_csv, render_csv, resolve_destination};
use crate::shared_state::AppState;

/// GET /api/form/defaults
/// Initial field values
///
/// Today's date plus the configured panel area and efficiency.
#[utoipa::path(
    get,
    path = "/api/form/defaults",
    responses(
        (status = 200, description = "Pre-filled form values", body = FormDefaults)
    )
)]
pub async fn get_form_defaults(State(state): State<AppState>) -> Json<FormDefaults> {
    Json(FormDefaults {
        date: chrono::Local::now().date_naive().format(DATE_FORMAT).to_string(),
        panel_area: state.panel_defaults.panel_area_m2.to_string(),
        efficiency: state.panel_defaults.efficiency.to_string(),
    })
}

/// POST /api/estimate
/// Run one estimate
///
/// Validates the five form fields, fetches the day's irradiance from NASA POWER and
/// applies `irradiance × area × efficiency × 0.75`. On success the result becomes the
/// exportable last result; any failure disables export.
#[utoipa::path(
    post,
    path = "/api/estimate",
    request_body = EstimateForm,
    responses(
        (status = 200, description = "Estimate displayed", body = ShellView),
        (status = 400, description = "Missing or invalid input", body = ApiError),
        (status = 502, description = "NASA POWER request failed", body = ApiError)
    )
)]
pub async fn post_estimate(
    State(state): State<AppState>,
    Json(form): Json<EstimateForm>,
) -> Result<Json<ShellView>, AppError> {
    let result = run_estimate(&state.shell, &state.power_client, &form).await?;
    Ok(Json(ShellView {
        phase: ShellPhase::DisplayingResult,
        exportable: true,
        message: result.summary(),
        result: Some(result),
    }))
}

/// GET /api/state
/// Current form state
#[utoipa::path(
    get,
    path = "/api/state",
    responses(
        (status = 200, description = "Phase, message and export flag", body = ShellView)
    )
)]
pub async fn get_state(State(state): State<AppState>) -> Json<ShellView> {
    Json(state.shell().view())
}

/// GET /api/export/csv
/// Download the last result
///
/// The browser's save dialog acts as the destination prompt.
#[utoipa::path(
    get,
    path = "/api/export/csv",
    responses(
        (status = 200, description = "Single-row CSV", content_type = "text/csv", body = String),
        (status = 409, description = "No exportable result", body = ApiError)
    )
)]
pub async fn download_csv(State(state): State<AppState>) -> Result<Response, AppError> {
    let (csv, date) = {
        let shell = state.shell();
        let record = shell.exportable_result()?;
        (render_csv(record), record.date.clone())
    };
    let disposition = format!("attachment; filename=\"solar_estimate_{}.csv\"", date);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

/// POST /api/export/csv
/// Write the last result to a server-side file
///
/// `path` is a file name relative to the configured export directory. A missing or
/// blank `path` is a cancelled prompt and does nothing.
#[utoipa::path(
    post,
    path = "/api/export/csv",
    request_body = ExportRequest,
    responses(
        (status = 200, description = "File written", body = ExportReceipt),
        (status = 204, description = "Prompt cancelled, nothing written"),
        (status = 400, description = "Path is absolute or leaves the export directory", body = ApiError),
        (status = 409, description = "No exportable result", body = ApiError),
        (status = 500, description = "File could not be written", body = ApiError)
    )
)]
pub async fn export_csv_to_path(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, AppError> {
    let record = state.shell().exportable_result()?.clone();

    let Some(path) = request.path.filter(|p| !p.trim().is_empty()) else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let path = resolve_destination(&state.export_dir, &path)?;
    let bytes_written = export_csv(&record, &path)?;
    info!(path = %path.display(), bytes_written, "estimate exported");

    Ok(Json(ExportReceipt {
        path: path.display().to_string(),
        bytes_written,
    })
    .into_response())
}
