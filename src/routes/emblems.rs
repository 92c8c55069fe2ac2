//! Read-only emblem lookups
//!
//! - GET /api/emblems/{emblemId}
//! - GET /api/emblems/status/{userId}
//! - GET /api/emblems/collections/{emblemType}
//! - GET /api/emblems/transactions/{orderId}
//! - GET /api/emblems/catalog/{emblemType} (unknown types get the generic entry)
//!
//! Documents are returned as relaxed extended JSON, so dates come back as
//! `{"$date": "..."}`.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use tracing::error;

use super::{json_response, not_found_response};
use crate::emblem::{catalog, EmblemType};
use crate::server::AppState;
use crate::types::Result;

pub const EMBLEMS_PREFIX: &str = "/api/emblems/";

/// Dispatch a GET under `/api/emblems/`
pub async fn handle_emblem_read(state: &AppState, path: &str) -> Response<Full<Bytes>> {
    let Some(rest) = path.strip_prefix(EMBLEMS_PREFIX) else {
        return not_found_response(path);
    };
    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
    let ledger = state.mint.ledger();

    match segments.as_slice() {
        ["status", user_id] => document_response(ledger.user_status(user_id).await, "User status"),
        ["collections", slug] => match EmblemType::from_slug(slug) {
            Some(emblem_type) => document_response(
                ledger.collection_stock(emblem_type).await,
                "Emblem collection",
            ),
            None => json_response(
                StatusCode::NOT_FOUND,
                &serde_json::json!({
                    "error": "Not Found",
                    "message": format!("Unknown emblem type '{}'", slug),
                }),
            ),
        },
        ["transactions", order_id] => {
            document_response(ledger.transaction(order_id).await, "Transaction")
        }
        ["catalog", slug] => catalog_response(slug),
        [emblem_id] => document_response(ledger.emblem(emblem_id).await, "Emblem"),
        _ => not_found_response(path),
    }
}

fn catalog_response(slug: &str) -> Response<Full<Bytes>> {
    let known = EmblemType::from_slug(slug);
    let entry = catalog::entry(slug);

    json_response(
        StatusCode::OK,
        &serde_json::json!({
            "emblemType": slug,
            "known": known.is_some(),
            "baseTraits": entry.base_traits,
            "benefits": entry.benefits,
            "description": entry.description,
            "image": known.map(|t| catalog::image_path(t.slug())),
        }),
    )
}

fn document_response<T: Serialize>(lookup: Result<Option<T>>, what: &str) -> Response<Full<Bytes>> {
    let doc = match lookup {
        Ok(Some(doc)) => doc,
        Ok(None) => {
            return json_response(
                StatusCode::NOT_FOUND,
                &serde_json::json!({
                    "error": "Not Found",
                    "message": format!("{} not found", what),
                }),
            )
        }
        Err(e) => {
            error!(error = %e, "{} lookup failed", what);
            return json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &serde_json::json!({ "error": e.to_string() }),
            );
        }
    };

    match bson::to_bson(&doc) {
        Ok(value) => json_response(StatusCode::OK, &value.into_relaxed_extjson()),
        Err(e) => json_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &serde_json::json!({ "error": format!("Failed to encode {}: {}", what, e) }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_state;
    use http_body_util::BodyExt;

    async fn get(state: &AppState, path: &str) -> (StatusCode, serde_json::Value) {
        let response = handle_emblem_read(state, path).await;
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_collection_lookup() {
        let (state, _ledger) = memory_state(&[]);
        let (status, json) = get(&state, "/api/emblems/collections/lupul_intelepta").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["_id"], "lupul_intelepta");
        assert_eq!(json["sold"], 0);
    }

    #[tokio::test]
    async fn test_unknown_type_and_missing_docs() {
        let (state, _ledger) = memory_state(&[]);

        let (status, _) = get(&state, "/api/emblems/collections/vulpea").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, json) = get(&state, "/api/emblems/status/nobody").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "User status not found");

        let (status, _) = get(&state, "/api/emblems/a/b/c").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_catalog_lookup_falls_back_for_unknown_types() {
        let (state, _ledger) = memory_state(&[]);

        let (status, json) = get(&state, "/api/emblems/catalog/corbul_mistic").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["known"], true);
        assert_eq!(json["image"], "/images/emblems/corbul_mistic.png");
        assert_eq!(json["baseTraits"].as_array().unwrap().len(), 3);

        let (status, json) = get(&state, "/api/emblems/catalog/dragonul_vechi").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["known"], false);
        assert!(json["image"].is_null());
        assert_eq!(json["description"], "Un emblem unic din colecția Lupul și Corbul.");
        assert!(!json["benefits"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_minted_documents_are_readable() {
        let (state, _ledger) = memory_state(&[]);
        let body = br#"{"orderId":"emblem_corbul_mistic_u7_1700000000000","status":"paid","amount":15000}"#;
        state.mint.handle_callback(body).await.unwrap();

        let (status, json) = get(&state, "/api/emblems/emblem_u7_1700000000000").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ownerId"], "u7");
        assert_eq!(json["purchasePrice"].as_f64(), Some(150.0));
        assert_eq!(json["currentValue"].as_f64(), Some(150.0));

        let (status, json) = get(&state, "/api/emblems/status/u7").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["hasEmblem"], true);
        assert_eq!(json["emblemValue"].as_f64(), Some(150.0));

        let (status, json) = get(
            &state,
            "/api/emblems/transactions/emblem_corbul_mistic_u7_1700000000000",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["type"], "mint");
        assert_eq!(json["amount"].as_f64(), Some(150.0));
        assert_eq!(json["currency"], "RON");
    }
}
