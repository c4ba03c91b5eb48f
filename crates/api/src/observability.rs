use std::sync::OnceLock;
use std::time::Duration;

use anyhow::Result;
use axum::http::StatusCode;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use hubs_domain::likes::LikeKind;

const HTTP_REQUESTS_TOTAL: &str = "hubs_api_http_requests_total";
const HTTP_REQUEST_DURATION_SECONDS: &str = "hubs_api_http_request_duration_seconds";
const HTTP_REQUEST_ERRORS_TOTAL: &str = "hubs_api_http_errors_total";
const LIKE_TOGGLES_TOTAL: &str = "hubs_api_like_toggles_total";
const LIKE_RESTORE_ROWS_TOTAL: &str = "hubs_api_like_restore_rows_total";
const LIKE_BACKUP_ROWS_TOTAL: &str = "hubs_api_like_backup_rows_total";
const LIKE_BACKUP_DURATION_SECONDS: &str = "hubs_api_like_backup_duration_seconds";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub fn init_metrics() -> Result<()> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = METRICS_HANDLE.set(handle);
    Ok(())
}

pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

pub fn register_http_request(method: &str, route: &str, status: StatusCode, elapsed: Duration) {
    let status_code = status.as_u16().to_string();
    let duration_seconds = elapsed.as_secs_f64();
    let result = if status.is_server_error() {
        "error"
    } else {
        "success"
    };

    counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status_code.clone(),
        "result" => result
    )
    .increment(1);

    histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status_code
    )
    .record(duration_seconds);

    if status.is_server_error() {
        counter!(
            HTTP_REQUEST_ERRORS_TOTAL,
            "method" => method.to_string(),
            "route" => route.to_string(),
            "status" => status.as_u16().to_string()
        )
        .increment(1);
    }
}

pub fn register_like_toggle(kind: LikeKind, action: &'static str) {
    counter!(
        LIKE_TOGGLES_TOTAL,
        "kind" => kind.as_str(),
        "action" => action
    )
    .increment(1);
}

pub fn register_like_restore(kind: LikeKind, rows: u64) {
    counter!(
        LIKE_RESTORE_ROWS_TOTAL,
        "kind" => kind.as_str()
    )
    .increment(rows);
}

pub fn register_like_backup(items: usize, failed: usize, elapsed: Duration) {
    counter!(
        LIKE_BACKUP_ROWS_TOTAL,
        "result" => "ok"
    )
    .increment(items as u64);
    if failed > 0 {
        counter!(
            LIKE_BACKUP_ROWS_TOTAL,
            "result" => "rejected"
        )
        .increment(failed as u64);
    }
    histogram!(LIKE_BACKUP_DURATION_SECONDS).record(elapsed.as_secs_f64());
}
