//! Estimate workflow behind the form.
//!
//! One estimate walks `Idle → Validating → Fetching → Computing` and ends in
//! either `DisplayingResult` or `DisplayingError`. The `exportable` flag is set
//! only by a displayed result and cleared by every error, so a failed estimate
//! always disables export even when an older result is still held.
//!
//! Estimates run one at a time: a run holds the shell's estimate gate from
//! validation to display, so a slow request cannot land after a newer one.

use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use chrono::NaiveDate;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::models::estimate::{
    EstimateForm, EstimationResult, PanelSpec, QueryParameters, ShellPhase, ShellView, DATE_FORMAT,
};
use crate::services::energy::calculate_energy;
use crate::services::exporter::ExportError;
use crate::services::nasa_power::IrradianceSource;

pub const IDLE_MESSAGE: &str = "Enter details and click Estimate";

/// User-facing failure categories. The display text is the message shown in the form.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ShellError {
    #[error("No value entered in one or more fields.")]
    MissingInput,
    #[error("Invalid numeric input.")]
    InvalidInput,
    #[error("Failed to fetch NASA data.")]
    FetchFailed,
}

#[derive(Debug, Clone)]
pub struct ShellState {
    phase: ShellPhase,
    exportable: bool,
    message: String,
    last_result: Option<EstimationResult>,
}

impl Default for ShellState {
    fn default() -> Self {
        Self {
            phase: ShellPhase::Idle,
            exportable: false,
            message: IDLE_MESSAGE.to_string(),
            last_result: None,
        }
    }
}

impl ShellState {
    pub fn phase(&self) -> ShellPhase {
        self.phase
    }

    pub fn is_exportable(&self) -> bool {
        self.exportable
    }

    pub fn last_result(&self) -> Option<&EstimationResult> {
        self.last_result.as_ref()
    }

    pub fn view(&self) -> ShellView {
        ShellView {
            phase: self.phase(),
            exportable: self.is_exportable(),
            message: self.message.clone(),
            result: self.exportable_result().ok().cloned(),
        }
    }

    fn enter(&mut self, phase: ShellPhase) {
        debug!(from = ?self.phase, to = ?phase, "shell transition");
        self.phase = phase;
    }

    fn show_result(&mut self, result: EstimationResult) {
        self.enter(ShellPhase::DisplayingResult);
        self.message = result.summary();
        self.last_result = Some(result);
        self.exportable = true;
    }

    fn show_error(&mut self, err: ShellError) {
        self.enter(ShellPhase::DisplayingError);
        self.message = err.to_string();
        self.exportable = false;
    }

    /// The record export may write, if export is currently enabled.
    pub fn exportable_result(&self) -> Result<&EstimationResult, ExportError> {
        match (self.last_result(), self.exportable) {
            (Some(result), true) => Ok(result),
            _ => Err(ExportError::NotExportable),
        }
    }
}

/// Checks and parses the five form fields.
///
/// Only a truly empty field counts as missing; anything else that does not
/// parse (whitespace included) is invalid input.
pub fn validate(form: &EstimateForm) -> Result<(QueryParameters, PanelSpec), ShellError> {
    let fields = [&form.latitude, &form.longitude, &form.date, &form.panel_area, &form.efficiency];
    if fields.iter().any(|f| f.is_empty()) {
        return Err(ShellError::MissingInput);
    }

    let number = |raw: &str| raw.trim().parse::<f64>().map_err(|_| ShellError::InvalidInput);
    let query = QueryParameters {
        latitude: number(form.latitude.as_str())?,
        longitude: number(form.longitude.as_str())?,
        date: parse_date(&form.date)?,
    };
    let panel = PanelSpec {
        area_m2: number(form.panel_area.as_str())?,
        efficiency: number(form.efficiency.as_str())?,
    };
    Ok((query, panel))
}

/// `YYYYMMDD`, or the ISO `YYYY-MM-DD` a browser date input sends.
fn parse_date(raw: &str) -> Result<NaiveDate, ShellError> {
    let raw = raw.trim();
    // chrono's %m/%d also take a single digit, so pin the width
    let format = match raw.len() {
        8 if raw.bytes().all(|b| b.is_ascii_digit()) => DATE_FORMAT,
        10 => "%Y-%m-%d",
        _ => return Err(ShellError::InvalidInput),
    };
    NaiveDate::parse_from_str(raw, format).map_err(|_| ShellError::InvalidInput)
}

/// Form state plus the gate that keeps estimates from interleaving.
#[derive(Debug, Default)]
pub struct Shell {
    state: RwLock<ShellState>,
    /// Held for the whole of one estimate; `/api/state` reads never wait on it.
    estimate_gate: Mutex<()>,
}

impl Shell {
    /// Read access; a poisoned lock still yields the last state.
    pub fn read(&self) -> RwLockReadGuard<'_, ShellState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition<R>(&self, f: impl FnOnce(&mut ShellState) -> R) -> R {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

/// Runs one estimate against `source`, recording every phase in `shell`.
///
/// Waits for any estimate already in flight. The state lock is only taken
/// between steps, never across the network call. An energy that comes out
/// non-finite (an "inf" area, say) is reported as a failure, since the result
/// record travels as JSON and JSON has no infinity or NaN.
pub async fn run_estimate<S: IrradianceSource>(
    shell: &Shell,
    source: &S,
    form: &EstimateForm,
) -> Result<EstimationResult, ShellError> {
    let _turn = shell.estimate_gate.lock().await;

    let fail = |err: ShellError| {
        shell.transition(|s| s.show_error(err));
        Err(err)
    };

    shell.transition(|s| s.enter(ShellPhase::Validating));
    let (query, panel) = match validate(form) {
        Ok(parsed) => parsed,
        Err(err) => {
            debug!(?form, error = %err, "form rejected");
            return fail(err);
        }
    };

    shell.transition(|s| s.enter(ShellPhase::Fetching));
    let date = query.date_param();
    let irradiance = match source.fetch_irradiance(query.latitude, query.longitude, &date).await {
        Ok(value) => value,
        Err(err) => {
            warn!(latitude = query.latitude, longitude = query.longitude, %date, error = %err, "irradiance fetch failed");
            return fail(ShellError::FetchFailed);
        }
    };

    shell.transition(|s| s.enter(ShellPhase::Computing));
    let energy = calculate_energy(irradiance, panel.area_m2, panel.efficiency);
    if !energy.is_finite() {
        warn!(irradiance, area = panel.area_m2, efficiency = panel.efficiency, "energy is not finite");
        return fail(ShellError::FetchFailed);
    }

    let result = EstimationResult::new(&query, irradiance, energy);
    info!(
        latitude = result.latitude,
        longitude = result.longitude,
        date = %result.date,
        irradiance = result.irradiance_kwh_m2_day,
        energy = result.energy_kwh_day,
        "estimate ready"
    );
    shell.transition(|s| s.show_result(result.clone()));
    Ok(result)
}
