//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling. Routing is split from
//! the connection loop so it can be driven with any request body type.

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::config::Args;
use crate::ledger::EmblemLedger;
use crate::routes::{self, emblems::EMBLEMS_PREFIX};
use crate::services::{CallbackVerifier, MintNotifier, MintService};
use crate::types::{GatewayError, Result};

pub const CALLBACK_PATH: &str = "/api/payments/emblem-callback";
/// Path the payment processor was originally configured with
pub const LEGACY_CALLBACK_PATH: &str = "/.netlify/functions/emblem-payment-callback";

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub mint: MintService,
    pub started_at: Instant,
}

impl AppState {
    /// Wire the mint service from configuration. A configured processor key
    /// makes signatures mandatory.
    pub fn new(
        args: Args,
        ledger: Arc<dyn EmblemLedger>,
        notifier: Arc<dyn MintNotifier>,
    ) -> Result<Self> {
        let mut mint = MintService::new(ledger, notifier);
        if let Some(ref key) = args.processor_public_key {
            mint = mint.with_verifier(CallbackVerifier::from_hex(key)?);
        }

        Ok(Self {
            args,
            mint,
            started_at: Instant::now(),
        })
    }
}

pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Emblem gateway listening on {} as node {}",
        state.args.listen, state.args.node_id
    );
    info!(
        "Payment callbacks accepted at {} and {}",
        CALLBACK_PATH, LEGACY_CALLBACK_PATH
    );

    if state.args.dev_mode {
        warn!("Development mode enabled");
    }
    if state.args.processor_public_key.is_none() {
        warn!("PROCESSOR_PUBLIC_KEY not set - callback signatures are not verified");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .preserve_header_case(true)
                        .title_case_headers(true)
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    info!("[{}] {} {}", addr, req.method(), req.uri().path());
    Ok(route(&state, req).await)
}

/// Route a request to its handler
pub async fn route<B>(state: &AppState, req: Request<B>) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match (method, path.as_str()) {
        (Method::OPTIONS, _) => routes::preflight_response(),

        (Method::POST, CALLBACK_PATH) | (Method::POST, LEGACY_CALLBACK_PATH) => {
            let limit = state.args.max_body_bytes;
            match read_body(req.into_body(), limit, state.args.request_timeout()).await {
                Ok(body) => routes::handle_payment_callback(state, &body).await,
                Err(BodyError::TooLarge) => {
                    warn!("Callback body over {} bytes rejected", limit);
                    routes::payload_too_large_response(limit)
                }
                Err(BodyError::Read(reason)) => routes::error_response(
                    &GatewayError::InvalidPayload(reason),
                    state.args.strict_status_codes,
                ),
            }
        }

        (_, CALLBACK_PATH) | (_, LEGACY_CALLBACK_PATH) => routes::json_response(
            StatusCode::METHOD_NOT_ALLOWED,
            &serde_json::json!({ "error": "Method Not Allowed" }),
        ),

        (Method::GET, "/health") | (Method::GET, "/healthz") => routes::health_check(state),

        (Method::GET, "/ready") | (Method::GET, "/readyz") => {
            routes::readiness_check(state).await
        }

        (Method::GET, "/version") => routes::version_info(),

        (Method::GET, p) if p.starts_with(EMBLEMS_PREFIX) => {
            routes::handle_emblem_read(state, p).await
        }

        _ => {
            debug!("No route for {}", path);
            routes::not_found_response(&path)
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum BodyError {
    TooLarge,
    Read(String),
}

/// Collect a request body, capped at `limit` bytes and `timeout`
async fn read_body<B>(body: B, limit: usize, timeout: Duration) -> std::result::Result<Bytes, BodyError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match tokio::time::timeout(timeout, Limited::new(body, limit).collect()).await {
        Ok(Ok(collected)) => Ok(collected.to_bytes()),
        Ok(Err(e)) if e.downcast_ref::<LengthLimitError>().is_some() => Err(BodyError::TooLarge),
        Ok(Err(e)) => Err(BodyError::Read(format!("Failed to read request body: {}", e))),
        Err(_) => Err(BodyError::Read(format!(
            "Request body not received within {}ms",
            timeout.as_millis()
        ))),
    }
}
