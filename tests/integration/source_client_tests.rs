//! HTTP client tests against a local axum server
//!
//! Each test binds an ephemeral port and serves canned responses, so the
//! real request path, headers, status handling and timeouts are exercised.

use crate::common::addr;
use axum::{
    extract::Path,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use pair_sentinel::config::SourceConfig;
use pair_sentinel::sources::{DexScreenerClient, RugcheckClient};
use pair_sentinel::{FetchError, MarketSource, RiskSource};
use serde_json::{json, Value};
use std::time::Duration;

/// Serve `app` on an ephemeral port and return its base URL
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let local = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", local)
}

fn source(base_url: &str, timeout_ms: u64) -> SourceConfig {
    SourceConfig {
        base_url: base_url.to_string(),
        timeout_ms,
        chain: "solana".to_string(),
    }
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "application/json")
}

async fn risk_score(Path(address): Path<String>, headers: HeaderMap) -> impl IntoResponse {
    if !wants_json(&headers) {
        return (StatusCode::NOT_ACCEPTABLE, Json(json!({})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "mint": address,
            "riskScore": 12.5,
            "isMintable": false,
            "isFreezable": false,
            "liquidityLockScore": 90,
            "holdersDistributionScore": 70,
            "isProxy": false,
            "ownerBurn": true,
            "verified": true
        })),
    )
}

async fn market_pair(
    Path((chain, address)): Path<(String, String)>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !wants_json(&headers) || chain != "solana" {
        return (StatusCode::BAD_REQUEST, Json(Value::Null));
    }
    let body = match address.as_str() {
        "Missing" => json!({"schemaVersion": "1.0.0", "pairs": null}),
        _ => json!({
            "schemaVersion": "1.0.0",
            "pairs": [{
                "pairAddress": address,
                "liquidity": {"usd": 50000.0},
                "volume": {"h24": 10000.0},
                "txns": {"h24": {"buys": 120, "sells": 80}}
            }]
        }),
    };
    (StatusCode::OK, Json(body))
}

#[tokio::test]
async fn test_rugcheck_fetches_score_path() {
    let app = Router::new().route("/address/:address/score", get(risk_score));
    let base = serve(app).await;
    let client = RugcheckClient::new(reqwest::Client::new(), &source(&base, 2_000));

    let report = client.risk_report(&addr("TokenA")).await.unwrap();

    assert_eq!(report.risk_score, Some(12.5));
    assert_eq!(report.liquidity_lock_score, Some(90.0));
    assert!(report.is_known_non_proxy());
    assert!(report.owner_burn());
}

#[tokio::test]
async fn test_rugcheck_server_error_is_status() {
    let app = Router::new().route(
        "/address/:address/score",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let base = serve(app).await;
    let client = RugcheckClient::new(reqwest::Client::new(), &source(&base, 2_000));

    let err = client.risk_report(&addr("TokenA")).await.unwrap_err();
    assert_eq!(err, FetchError::Status(500));
}

#[tokio::test]
async fn test_rugcheck_invalid_json_is_malformed() {
    let app = Router::new().route(
        "/address/:address/score",
        get(|| async { "definitely not json" }),
    );
    let base = serve(app).await;
    let client = RugcheckClient::new(reqwest::Client::new(), &source(&base, 2_000));

    let err = client.risk_report(&addr("TokenA")).await.unwrap_err();
    assert!(matches!(err, FetchError::Malformed(_)));
}

#[tokio::test]
async fn test_rugcheck_array_body_is_malformed() {
    let app = Router::new().route(
        "/address/:address/score",
        get(|| async { Json(json!([1, 2, 3])) }),
    );
    let base = serve(app).await;
    let client = RugcheckClient::new(reqwest::Client::new(), &source(&base, 2_000));

    let err = client.risk_report(&addr("TokenA")).await.unwrap_err();
    assert!(matches!(err, FetchError::Malformed(_)));
}

#[tokio::test]
async fn test_rugcheck_score_out_of_range_is_malformed() {
    let app = Router::new().route(
        "/address/:address/score",
        get(|| async { Json(json!({"riskScore": 101, "verified": true})) }),
    );
    let base = serve(app).await;
    let client = RugcheckClient::new(reqwest::Client::new(), &source(&base, 2_000));

    let err = client.risk_report(&addr("TokenA")).await.unwrap_err();
    assert!(matches!(err, FetchError::Malformed(_)), "{:?}", err);
}

#[tokio::test]
async fn test_rugcheck_slow_server_times_out() {
    let app = Router::new().route(
        "/address/:address/score",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({"riskScore": 1}))
        }),
    );
    let base = serve(app).await;
    let client = RugcheckClient::new(reqwest::Client::new(), &source(&base, 200));

    let err = client.risk_report(&addr("TokenA")).await.unwrap_err();
    assert_eq!(err, FetchError::Timeout);
}

#[tokio::test]
async fn test_dexscreener_reads_first_pair() {
    let app = Router::new().route("/pairs/:chain/:address", get(market_pair));
    let base = serve(app).await;
    let client = DexScreenerClient::new(reqwest::Client::new(), &source(&base, 2_000));

    let report = client.market_report(&addr("TokenA")).await.unwrap();

    assert_eq!(report.liquidity_usd, 50_000.0);
    assert_eq!(report.volume_24h_usd, 10_000.0);
    assert_eq!(report.buys_24h, 120);
    assert_eq!(report.sells_24h, 80);
}

#[tokio::test]
async fn test_dexscreener_null_pairs_is_not_found() {
    let app = Router::new().route("/pairs/:chain/:address", get(market_pair));
    let base = serve(app).await;
    let client = DexScreenerClient::new(reqwest::Client::new(), &source(&base, 2_000));

    let err = client.market_report(&addr("Missing")).await.unwrap_err();
    assert_eq!(err, FetchError::NotFound);
}

#[tokio::test]
async fn test_dexscreener_unknown_path_is_status() {
    let app = Router::new().route("/pairs/:chain/:address", get(market_pair));
    let base = serve(app).await;
    let config = SourceConfig {
        chain: "ethereum".to_string(),
        ..source(&base, 2_000)
    };
    let client = DexScreenerClient::new(reqwest::Client::new(), &config);

    let err = client.market_report(&addr("TokenA")).await.unwrap_err();
    assert_eq!(err, FetchError::Status(400));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Bind then drop to get a port with nothing listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = DexScreenerClient::new(reqwest::Client::new(), &source(&base, 2_000));
    let err = client.market_report(&addr("TokenA")).await.unwrap_err();
    assert_eq!(err.kind(), "transport");
}
