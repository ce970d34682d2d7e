use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// POWER parameter: All-Sky Surface Shortwave Downward Irradiance (kWh/m²/day).
pub const IRRADIANCE_PARAMETER: &str = "ALLSKY_SFC_SW_DWN";
pub const SOURCE_LABEL: &str = "NASA POWER API";
pub const RESULT_NOTE: &str = "Values are approximations";

/// Column order of the exported record.
pub const CSV_HEADERS: [&str; 7] = [
    "Latitude",
    "Longitude",
    "Date",
    "Irradiance (kWh/m²/day)",
    "Estimated Energy (kWh/day)",
    "Source",
    "Note",
];

/// Format used by the remote API and the form for calendar dates.
pub const DATE_FORMAT: &str = "%Y%m%d";

// ─── Domain records ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryParameters {
    pub latitude: f64,
    pub longitude: f64,
    pub date: NaiveDate,
}

impl QueryParameters {
    /// Date as sent to the remote API (`YYYYMMDD`).
    pub fn date_param(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelSpec {
    /// Surface area in m²
    pub area_m2: f64,
    /// Conversion efficiency as a fraction
    pub efficiency: f64,
}

/// One completed estimate. Held by the shell as its last result until the next
/// estimate replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EstimationResult {
    pub latitude: f64,
    pub longitude: f64,
    /// `YYYYMMDD`
    pub date: String,
    /// Rounded to 2 decimals
    pub irradiance_kwh_m2_day: f64,
    /// Rounded to 2 decimals
    pub energy_kwh_day: f64,
    pub source: String,
    pub note: String,
}

impl EstimationResult {
    pub fn new(query: &QueryParameters, irradiance: f64, energy: f64) -> Self {
        Self {
            latitude: query.latitude,
            longitude: query.longitude,
            date: query.date_param(),
            irradiance_kwh_m2_day: round2(irradiance),
            energy_kwh_day: round2(energy),
            source: SOURCE_LABEL.to_string(),
            note: RESULT_NOTE.to_string(),
        }
    }

    /// Field values in `CSV_HEADERS` order.
    pub fn values(&self) -> [String; 7] {
        [
            csv_number(self.latitude),
            csv_number(self.longitude),
            self.date.clone(),
            csv_number(self.irradiance_kwh_m2_day),
            csv_number(self.energy_kwh_day),
            self.source.clone(),
            self.note.clone(),
        ]
    }

    /// Text shown in the form's result card.
    pub fn summary(&self) -> String {
        format!(
            "Irradiance: {:.2} kWh/m²/day\nEstimated Energy: {:.2} kWh/day\n\nSource: {}\n{}",
            self.irradiance_kwh_m2_day, self.energy_kwh_day, self.source, self.note
        )
    }
}

/// Shortest round-trip text, but whole numbers keep one decimal ("28.0", not "28")
/// so every numeric column reads as a float.
fn csv_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ─── Form / shell view types ─────────────────────────────────────────────────

/// Raw text of the five form fields, exactly as the user typed them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct EstimateForm {
    pub latitude: String,
    pub longitude: String,
    /// `YYYYMMDD` (an ISO `YYYY-MM-DD` from a date input is accepted too)
    pub date: String,
    pub panel_area: String,
    pub efficiency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShellPhase {
    Idle,
    Validating,
    Fetching,
    Computing,
    DisplayingResult,
    DisplayingError,
}

/// Everything the form needs to redraw itself.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShellView {
    pub phase: ShellPhase,
    pub exportable: bool,
    pub message: String,
    pub result: Option<EstimationResult>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FormDefaults {
    pub date: String,
    pub panel_area: String,
    pub efficiency: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ExportRequest {
    /// Destination on the server; `None` means the prompt was cancelled.
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExportReceipt {
    pub path: String,
    pub bytes_written: usize,
}

// ─── NASA POWER wire types ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PowerResponse {
    pub properties: PowerProperties,
}

#[derive(Debug, Deserialize)]
pub struct PowerProperties {
    pub parameter: PowerParameters,
}

#[derive(Debug, Deserialize)]
pub struct PowerParameters {
    /// Date string (`YYYYMMDD`) → kWh/m²/day
    #[serde(rename = "ALLSKY_SFC_SW_DWN")]
    pub allsky_sfc_sw_dwn: BTreeMap<String, f64>,
}
