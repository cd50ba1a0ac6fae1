//! Metric names and recording helpers
//!
//! Counters go through the `metrics` facade; without an installed recorder
//! (tests) they are no-ops. `main` installs the Prometheus recorder and the
//! router renders it at `/metrics`.

use auth_service_shared::TokenError;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::debug;

pub const TOKEN_REJECTIONS: &str = "auth_token_rejections_total";
pub const LOGINS: &str = "auth_logins_total";
pub const REGISTRATIONS: &str = "auth_registrations_total";

/// Install the global Prometheus recorder
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics recorder: {}", e))
}

/// Count and log a rejected token, keyed by the failure kind
pub fn record_token_rejection(err: &TokenError) {
    debug!(reason = err.code(), error = %err, "Token rejected");
    metrics::counter!(TOKEN_REJECTIONS, "reason" => err.code()).increment(1);
}

pub fn record_login(outcome: &'static str) {
    metrics::counter!(LOGINS, "outcome" => outcome).increment(1);
}

pub fn record_registration(outcome: &'static str) {
    metrics::counter!(REGISTRATIONS, "outcome" => outcome).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenAuthority;
    use crate::error::ApiError;
    use auth_service_shared::TokenKind;

    const SECRET: &str = "test-secret-key-for-testing-only-32chars";

    #[test]
    fn test_rejections_counted_by_reason() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        let tokens = TokenAuthority::new(SECRET, 3600, 86400).unwrap();
        let foreign = TokenAuthority::new("another-secret-entirely-32-characters", 3600, 86400)
            .unwrap()
            .issue_access_token("user-42", None)
            .unwrap();
        let stale = TokenAuthority::new(SECRET, -1, -1)
            .unwrap()
            .issue_access_token("user-42", None)
            .unwrap();
        let refresh = tokens.issue_refresh_token("user-42").unwrap();

        metrics::with_local_recorder(&recorder, || {
            for (token, kind) in [
                (foreign.as_str(), TokenKind::Access),
                (stale.as_str(), TokenKind::Access),
                (refresh.as_str(), TokenKind::Access),
                (refresh.as_str(), TokenKind::Access),
            ] {
                let err = tokens.decode(token, kind).unwrap_err();
                let _ = ApiError::from(err);
            }
            // Issuance failures are not rejections
            let err = tokens.issue_access_token("", None).unwrap_err();
            let _ = ApiError::from(err);
        });

        let rendered = handle.render();
        assert!(rendered.contains(TOKEN_REJECTIONS), "{}", rendered);
        assert!(rendered.contains(r#"reason="invalid_signature"} 1"#), "{}", rendered);
        assert!(rendered.contains(r#"reason="expired"} 1"#), "{}", rendered);
        assert!(rendered.contains(r#"reason="wrong_kind"} 2"#), "{}", rendered);
        assert!(!rendered.contains("empty_subject"), "{}", rendered);
    }
}
