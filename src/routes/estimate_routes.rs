use axum::{routing::{get, post}, Router};
use crate::controllers::estimate_controller::{
    // Form
    get_form_defaults, post_estimate, get_state,
    // Export
    download_csv, export_csv_to_path,
};
use crate::shared_state::AppState;

/// Build the `/api/*` sub-router.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/form/defaults", get(get_form_defaults))
        .route("/estimate",      post(post_estimate))
        .route("/state",         get(get_state))
        .route("/export/csv",    get(download_csv).post(export_csv_to_path))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use axum::{extract::Query, http::StatusCode};
    use serde_json::{json, Value};

    use crate::config::{NasaPowerConfig, PanelDefaults};
    use crate::services::nasa_power::NasaPowerClient;

    const SAMPLE: &str = r#"{"properties":{"parameter":{"ALLSKY_SFC_SW_DWN":{"20240101": 5.43}}}}"#;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// POWER stand-in: latitude 0 answers with a server error, everything else with SAMPLE.
    async fn spawn_power_mock() -> String {
        let app = Router::new().route(
            "/point",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                if q.get("latitude").map(String::as_str) == Some("0") {
                    (StatusCode::SERVICE_UNAVAILABLE, String::new())
                } else {
                    (StatusCode::OK, SAMPLE.to_string())
                }
            }),
        );
        format!("{}/point", serve(app).await)
    }

    /// App wired to the POWER mock, exporting into a fresh temp directory.
    async fn spawn_app() -> (String, tempfile::TempDir) {
        let client = NasaPowerClient::new(&NasaPowerConfig {
            base_url: spawn_power_mock().await,
            ..NasaPowerConfig::default()
        })
        .unwrap();
        let export_dir = tempfile::tempdir().unwrap();
        let state = AppState::new(client, PanelDefaults::default(), export_dir.path().to_path_buf());
        (serve(Router::new().nest("/api", api_routes(state))).await, export_dir)
    }

    fn form(latitude: &str, panel_area: &str) -> Value {
        json!({
            "latitude": latitude,
            "longitude": "77.20",
            "date": "20240101",
            "panel_area": panel_area,
            "efficiency": "0.18",
        })
    }

    #[tokio::test]
    async fn defaults_are_prefilled() {
        let (base, _exports) = spawn_app().await;
        let body: Value = reqwest::get(format!("{}/api/form/defaults", base))
            .await.unwrap().json().await.unwrap();
        assert_eq!(body["panel_area"], "2.5");
        assert_eq!(body["efficiency"], "0.18");
        assert_eq!(body["date"].as_str().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn estimate_then_download_and_write() {
        let (base, exports) = spawn_app().await;
        let http = reqwest::Client::new();

        let resp = http.post(format!("{}/api/estimate", base)).json(&form("28.61", "2.5")).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let view: Value = resp.json().await.unwrap();
        assert_eq!(view["phase"], "DISPLAYING_RESULT");
        assert_eq!(view["exportable"], true);
        assert_eq!(view["result"]["energy_kwh_day"], 1.83);

        let resp = http.get(format!("{}/api/export/csv", base)).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        assert!(resp.headers()[reqwest::header::CONTENT_DISPOSITION]
            .to_str().unwrap().contains("solar_estimate_20240101.csv"));
        let csv = resp.text().await.unwrap();
        assert_eq!(csv.lines().nth(1).unwrap(), "28.61,77.2,20240101,5.43,1.83,NASA POWER API,Values are approximations");

        let resp = http.post(format!("{}/api/export/csv", base))
            .json(&json!({ "path": "jan/estimate.csv" })).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let receipt: Value = resp.json().await.unwrap();
        assert_eq!(receipt["bytes_written"], csv.len());
        let path = exports.path().join("jan").join("estimate.csv");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), csv);

        // cancelled prompt
        let resp = http.post(format!("{}/api/export/csv", base)).json(&json!({})).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn input_errors_map_to_bad_request() {
        let (base, _exports) = spawn_app().await;
        let http = reqwest::Client::new();

        let resp = http.post(format!("{}/api/estimate", base)).json(&form("", "2.5")).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["message"], "No value entered in one or more fields.");
        assert_eq!(body["exportable"], false);

        let resp = http.post(format!("{}/api/estimate", base)).json(&form("28.61", "abc")).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["message"], "Invalid numeric input.");

        let resp = http.get(format!("{}/api/export/csv", base)).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn fetch_failure_disables_export() {
        let (base, _exports) = spawn_app().await;
        let http = reqwest::Client::new();

        let resp = http.post(format!("{}/api/estimate", base)).json(&form("28.61", "2.5")).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        let resp = http.post(format!("{}/api/estimate", base)).json(&form("0", "2.5")).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::BAD_GATEWAY);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["message"], "Failed to fetch NASA data.");

        let state: Value = reqwest::get(format!("{}/api/state", base)).await.unwrap().json().await.unwrap();
        assert_eq!(state["phase"], "DISPLAYING_ERROR");
        assert_eq!(state["exportable"], false);
        assert!(state["result"].is_null());

        let resp = http.post(format!("{}/api/export/csv", base))
            .json(&json!({ "path": "/tmp/never-written.csv" })).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn export_outside_export_dir_is_rejected() {
        let (base, exports) = spawn_app().await;
        let http = reqwest::Client::new();
        let resp = http.post(format!("{}/api/estimate", base)).json(&form("28.61", "2.5")).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        let outside = tempfile::tempdir().unwrap();
        let absolute = outside.path().join("stolen.csv");
        let escaping = format!("../{}", outside.path().file_name().unwrap().to_str().unwrap());
        for path in [absolute.to_str().unwrap(), "../estimate.csv", escaping.as_str()] {
            let resp = http.post(format!("{}/api/export/csv", base))
                .json(&json!({ "path": path })).send().await.unwrap();
            assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST, "{}", path);
            let body: Value = resp.json().await.unwrap();
            assert_eq!(body["code"], "INVALID_DESTINATION");
            assert_eq!(body["exportable"], true);
        }

        assert!(!absolute.exists());
        assert_eq!(std::fs::read_dir(outside.path()).unwrap().count(), 0);
        assert_eq!(std::fs::read_dir(exports.path()).unwrap().count(), 0);
    }
}
