//! Payment callback endpoint
//!
//! `POST /api/payments/emblem-callback` (also served at the legacy
//! `/.netlify/functions/emblem-payment-callback` path).
//!
//! Response envelopes:
//! - 200 `{ message }` while the payment is not confirmed
//! - 200 `{ success: true, message, emblemId, emblemType }` once minted
//! - 500 `{ success: false, error, details }` on any failure

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use tracing::error;

use super::json_response;
use crate::emblem::EmblemType;
use crate::server::AppState;
use crate::services::CallbackOutcome;
use crate::types::GatewayError;

#[derive(Serialize)]
struct NotConfirmedBody {
    message: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MintedBody {
    success: bool,
    message: &'static str,
    emblem_id: String,
    emblem_type: EmblemType,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    duplicate: bool,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: &'static str,
    details: String,
}

/// Handle a callback body that has already been read off the wire
pub async fn handle_payment_callback(state: &AppState, body: &[u8]) -> Response<Full<Bytes>> {
    match state.mint.handle_callback(body).await {
        Ok(outcome) => outcome_response(outcome),
        Err(e) => error_response(&e, state.args.strict_status_codes),
    }
}

pub fn outcome_response(outcome: CallbackOutcome) -> Response<Full<Bytes>> {
    match outcome {
        CallbackOutcome::NotConfirmed { .. } => json_response(
            StatusCode::OK,
            &NotConfirmedBody {
                message: "Payment not confirmed yet",
            },
        ),
        CallbackOutcome::Minted {
            emblem_id,
            emblem_type,
        } => json_response(
            StatusCode::OK,
            &MintedBody {
                success: true,
                message: "Emblem NFT minted successfully",
                emblem_id,
                emblem_type,
                duplicate: false,
            },
        ),
        CallbackOutcome::Duplicate {
            emblem_id,
            emblem_type,
        } => json_response(
            StatusCode::OK,
            &MintedBody {
                success: true,
                message: "Emblem NFT already minted",
                emblem_id,
                emblem_type,
                duplicate: true,
            },
        ),
    }
}

pub fn error_response(err: &GatewayError, strict: bool) -> Response<Full<Bytes>> {
    let status = err.status_code(strict);
    error!(status = status.as_u16(), error = %err, "Emblem mint failed");

    json_response(
        status,
        &ErrorBody {
            success: false,
            error: "Failed to mint emblem NFT",
            details: err.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_minted_envelope() {
        let response = outcome_response(CallbackOutcome::Minted {
            emblem_id: "emblem_u1_1".into(),
            emblem_type: EmblemType::CorbulMistic,
        });
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Emblem NFT minted successfully");
        assert_eq!(json["emblemId"], "emblem_u1_1");
        assert_eq!(json["emblemType"], "corbul_mistic");
        assert!(json.get("duplicate").is_none());
    }

    #[tokio::test]
    async fn test_error_envelope() {
        let err = GatewayError::Database("write conflict".into());
        let response = error_response(&err, false);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Failed to mint emblem NFT");
        assert_eq!(json["details"], "Database error: write conflict");
    }
}
