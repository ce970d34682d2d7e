/// Fixed derate for inverter, wiring and soiling losses.
pub const LOSS_FACTOR: f64 = 0.75;

/// Daily energy yield (kWh/day) of a panel.
///
/// * `irradiance` – kWh/m²/day on the horizontal plane
/// * `area_m2`    – panel surface
/// * `efficiency` – module efficiency as a fraction
///
/// Inputs are not checked: zero or negative values flow straight through.
pub fn calculate_energy(irradiance: f64, area_m2: f64, efficiency: f64) -> f64 {
    irradiance * area_m2 * efficiency * LOSS_FACTOR
}
