use std::time::Duration;

pub const REQUESTS_TOTAL: &str = "bovicare_client_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "bovicare_client_request_duration_seconds";
pub const SESSION_RESETS_TOTAL: &str = "bovicare_client_session_resets_total";

/// Record one finished request. `status` is `"error"` for transport failures.
pub fn record_request(method: &reqwest::Method, status: &str, elapsed: Duration) {
    let method = method.as_str().to_string();
    metrics::counter!(REQUESTS_TOTAL, "method" => method.clone(), "status" => status.to_string())
        .increment(1);
    metrics::histogram!(REQUEST_DURATION_SECONDS, "method" => method).record(elapsed.as_secs_f64());
}

pub fn record_session_reset() {
    metrics::counter!(SESSION_RESETS_TOTAL).increment(1);
}
