use std::path::PathBuf;
use std::sync::{Arc, RwLockReadGuard};

use crate::config::PanelDefaults;
use crate::services::estimator::{Shell, ShellState};
use crate::services::nasa_power::NasaPowerClient;

#[derive(Clone, Debug)]
pub struct AppState {
    /// Form state: phase, export flag and the last result
    pub shell: Arc<Shell>,
    /// Irradiance source used by every estimate
    pub power_client: NasaPowerClient,
    pub panel_defaults: PanelDefaults,
    /// Server-side CSV writes stay inside this directory
    pub export_dir: PathBuf,
}

impl AppState {
    pub fn new(power_client: NasaPowerClient, panel_defaults: PanelDefaults, export_dir: PathBuf) -> Self {
        Self {
            shell: Arc::new(Shell::default()),
            power_client,
            panel_defaults,
            export_dir,
        }
    }

    pub fn shell(&self) -> RwLockReadGuard<'_, ShellState> {
        self.shell.read()
    }
}
