//! Route handlers.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use serde::Deserialize;
use std::sync::Arc;

use crate::server::AppState;

/// Used in the instructions when no profile is configured; matches nothing.
const FALLBACK_CRON: &str = "* * * * *";

#[derive(Debug, Deserialize)]
pub struct ScheduledParams {
    #[serde(default)]
    pub cron: Option<String>,
}

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "ordersync",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "profiles": state.dispatcher.profiles().len(),
    }))
}

/// Plain-text hint on how to fire a test run.
pub async fn instructions(State(state): State<Arc<AppState>>, headers: HeaderMap) -> String {
    let host = headers
        .get("host")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let cron = state
        .dispatcher
        .profiles()
        .first()
        .map(|p| p.cron.as_str())
        .unwrap_or(FALLBACK_CRON);
    format!(
        "To test the scheduled handler, try running \"curl http://{host}/__scheduled?cron={}\".",
        cron.split_whitespace().collect::<Vec<_>>().join("+")
    )
}

/// Manual trigger: run whatever profile `?cron=` selects.
pub async fn run_scheduled(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ScheduledParams>,
) -> (StatusCode, Json<serde_json::Value>) {
    let Some(cron) = params.cron.filter(|c| !c.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"ok": false, "error": "Missing 'cron' query parameter"})),
        );
    };

    match state.dispatcher.dispatch(&cron, chrono::Utc::now()).await {
        Ok(Some(report)) => (
            StatusCode::OK,
            Json(serde_json::json!({"ok": true, "ran": true, "cron": cron, "report": report})),
        ),
        Ok(None) => (
            StatusCode::OK,
            Json(serde_json::json!({"ok": true, "ran": false, "cron": cron})),
        ),
        Err(e) => {
            tracing::error!("❌ Manual run for '{}' failed: {e}", cron);
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({"ok": false, "cron": cron, "error": e.to_string()})),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::server::{AppState, build_router};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use ordersync_core::types::QueryProfile;
    use ordersync_scheduler::mock::{MockNotifier, MockOrderSource};
    use ordersync_scheduler::{Dispatcher, Pipeline};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app(notifier: Arc<MockNotifier>) -> axum::Router {
        let source = Arc::new(MockOrderSource::with_pages(vec![MockOrderSource::orders("G", 2)]));
        let pipeline = Pipeline::new(source, notifier, Duration::ZERO);
        let dispatcher = Dispatcher::new(QueryProfile::defaults(), pipeline);
        build_router(AppState::new(Arc::new(dispatcher)))
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, String) {
        let resp = app
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .header("host", "sync.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_instructions_name_trigger_url() {
        let (status, body) = get(app(Arc::new(MockNotifier::new())), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("curl http://sync.example.com/__scheduled?cron=0+4+*+*+*"));
    }

    #[tokio::test]
    async fn test_health_check() {
        let (status, body) = get(app(Arc::new(MockNotifier::new())), "/health").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["profiles"], 2);
    }

    #[tokio::test]
    async fn test_unknown_cron_does_not_run() {
        let notifier = Arc::new(MockNotifier::new());
        let (status, body) = get(app(notifier.clone()), "/__scheduled?cron=*+*+*+*+*").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ran"], false);
        assert_eq!(notifier.attempts(), 0);
    }

    #[tokio::test]
    async fn test_known_cron_returns_report() {
        let notifier = Arc::new(MockNotifier::new());
        let (status, body) = get(app(notifier.clone()), "/__scheduled?cron=0+5+*+*+*").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ran"], true);
        assert_eq!(json["report"]["profile"], "holded_recent");
        assert_eq!(json["report"]["matched"], serde_json::json!(["G1", "G2"]));
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_webhook_failure_is_bad_gateway() {
        let (status, body) = get(app(Arc::new(MockNotifier::failing_on(1))), "/__scheduled?cron=0+5+*+*+*").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(json["error"].as_str().unwrap().contains("Internal Server Error"));
    }

    #[tokio::test]
    async fn test_missing_cron_is_bad_request() {
        let (status, _) = get(app(Arc::new(MockNotifier::new())), "/__scheduled").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
