use utoipa::OpenApi;
use crate::controllers::estimate_controller;
use crate::models::estimate;
use crate::config;
use crate::error;

#[derive(OpenApi)]
#[openapi(
    paths(
        estimate_controller::get_form_defaults,
        estimate_controller::post_estimate,
        estimate_controller::get_state,
        estimate_controller::download_csv,
        estimate_controller::export_csv_to_path
    ),
    components(
        schemas(
            estimate::EstimateForm,
            estimate::EstimationResult,
            estimate::ShellPhase,
            estimate::ShellView,
            estimate::FormDefaults,
            estimate::ExportRequest,
            estimate::ExportReceipt,
            config::PanelDefaults,
            error::ApiError
        )
    ),
    tags(
        (name = "solar-yield-estimator", description = "Daily solar yield from NASA POWER irradiance")
    )
)]
pub struct ApiDoc;
