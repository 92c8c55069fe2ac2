//! Health check endpoints
//!
//! - /health, /healthz - Liveness probe (is the process serving requests?)
//! - /ready, /readyz - Readiness probe (can a mint be committed right now?)
//! - /version - Build information
//!
//! Liveness never touches the ledger. Readiness pings it and answers 503
//! when the store is unreachable.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;

use super::json_response;
use crate::server::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub healthy: bool,
    /// 'online' or 'degraded'
    pub status: &'static str,
    pub version: &'static str,
    /// Uptime in seconds
    pub uptime: u64,
    pub timestamp: String,
    /// Operating mode
    pub mode: &'static str,
    pub node_id: String,
    pub ledger: LedgerHealth,
    /// Whether callbacks must carry a processor signature
    pub signatures_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct LedgerHealth {
    /// Backend name ("mongodb" or "memory")
    pub backend: &'static str,
    /// Result of a ping, absent on liveness probes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reachable: Option<bool>,
}

fn build_health_response(state: &AppState, reachable: Option<bool>) -> HealthResponse {
    let args = &state.args;

    let status = match reachable {
        Some(false) => "degraded",
        _ => "online",
    };

    HealthResponse {
        healthy: true,
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        mode: if args.dev_mode {
            "development"
        } else {
            "production"
        },
        node_id: args.node_id.to_string(),
        ledger: LedgerHealth {
            backend: state.mint.ledger().backend(),
            reachable,
        },
        signatures_required: args.processor_public_key.is_some(),
        error: None,
    }
}

/// Handle liveness probe (/health, /healthz)
pub fn health_check(state: &AppState) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &build_health_response(state, None))
}

/// Handle readiness probe (/ready, /readyz)
///
/// Returns 503 when the ledger does not answer a ping. Load balancers
/// should route callbacks only to ready instances.
pub async fn readiness_check(state: &AppState) -> Response<Full<Bytes>> {
    let ping = state.mint.ledger().ping().await;
    let mut response = build_health_response(state, Some(ping.is_ok()));

    let status = match ping {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            response.healthy = false;
            response.error = Some(e.to_string());
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    json_response(status, &response)
}

/// Version information for deployment verification
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    /// Git commit hash (short)
    pub commit: &'static str,
    pub commit_full: &'static str,
    pub build_time: &'static str,
    pub service: &'static str,
}

/// Handle version endpoint (/version)
pub fn version_info() -> Response<Full<Bytes>> {
    let response = VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        commit_full: option_env!("GIT_COMMIT_FULL").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        service: "emblem-gateway",
    };

    json_response(StatusCode::OK, &response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_state;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_liveness_reports_backend() {
        let (state, _ledger) = memory_state(&[]);
        let response = health_check(&state);
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["healthy"], true);
        assert_eq!(json["ledger"]["backend"], "memory");
        assert!(json["ledger"].get("reachable").is_none());
        assert_eq!(json["signaturesRequired"], false);
    }

    #[tokio::test]
    async fn test_readiness_pings_ledger() {
        let (state, _ledger) = memory_state(&[]);
        let response = readiness_check(&state).await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["ledger"]["reachable"], true);
        assert_eq!(json["status"], "online");
    }

    #[tokio::test]
    async fn test_version_reports_build_stamp() {
        let response = version_info();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["service"], "emblem-gateway");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));

        let full = json["commit_full"].as_str().unwrap();
        let short = json["commit"].as_str().unwrap();
        if full == "unknown" {
            assert_eq!(short, "unknown");
        } else {
            assert!(full.starts_with(short));
            assert!(short.len() <= 7);
        }
        assert!(!json["build_time"].as_str().unwrap().is_empty());
    }
}
