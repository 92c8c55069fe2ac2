//! Payment processor signature verification
//!
//! The processor signs `{orderId}|{status}|{amount}` with its Ed25519 key and
//! sends the signature as hex or standard base64 in the `signature` field.

use base64::Engine;
use ed25519_dalek::{Signature, VerifyingKey, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use tracing::debug;

use super::mint::PaymentCallback;
use crate::types::{GatewayError, Result};

/// Verifies callback signatures against the processor's public key
#[derive(Debug, Clone)]
pub struct CallbackVerifier {
    key: VerifyingKey,
}

impl CallbackVerifier {
    pub fn new(key: VerifyingKey) -> Self {
        Self { key }
    }

    /// Parse a hex encoded Ed25519 public key
    pub fn from_hex(hex_key: &str) -> Result<Self> {
        let bytes = hex::decode(hex_key.trim())
            .map_err(|e| GatewayError::Config(format!("public key is not hex: {}", e)))?;
        let bytes: [u8; PUBLIC_KEY_LENGTH] = bytes.try_into().map_err(|_| {
            GatewayError::Config(format!("public key must be {} bytes", PUBLIC_KEY_LENGTH))
        })?;
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| GatewayError::Config(format!("public key rejected: {}", e)))?;
        Ok(Self { key })
    }

    /// Bytes the processor signs for a callback
    pub fn signed_message(callback: &PaymentCallback) -> String {
        format!("{}|{}|{}", callback.order_id, callback.status, callback.amount)
    }

    pub fn verify(&self, callback: &PaymentCallback) -> Result<()> {
        let encoded = callback
            .signature
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| GatewayError::InvalidSignature("signature missing".into()))?;

        let signature = decode_signature(encoded)?;
        let message = Self::signed_message(callback);

        self.key
            .verify_strict(message.as_bytes(), &signature)
            .map_err(|_| GatewayError::InvalidSignature("signature does not match".into()))?;

        debug!(order_id = %callback.order_id, "Callback signature verified");
        Ok(())
    }
}

fn decode_signature(encoded: &str) -> Result<Signature> {
    let encoded = encoded.trim();
    let bytes = if encoded.len() == SIGNATURE_LENGTH * 2 {
        hex::decode(encoded).ok()
    } else {
        base64::engine::general_purpose::STANDARD.decode(encoded).ok()
    }
    .ok_or_else(|| GatewayError::InvalidSignature("signature is neither hex nor base64".into()))?;

    let bytes: [u8; SIGNATURE_LENGTH] = bytes.try_into().map_err(|_| {
        GatewayError::InvalidSignature(format!("signature must be {} bytes", SIGNATURE_LENGTH))
    })?;
    Ok(Signature::from_bytes(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};

    fn signing_key() -> SigningKey {
        SigningKey::from_bytes(&[7u8; 32])
    }

    fn callback(signature: Option<String>) -> PaymentCallback {
        PaymentCallback {
            order_id: "emblem_corbul_mistic_u1_1700000000000".to_string(),
            status: "paid".to_string(),
            amount: serde_json::Number::from(15000),
            signature,
        }
    }

    fn sign(cb: &PaymentCallback) -> Signature {
        signing_key().sign(CallbackVerifier::signed_message(cb).as_bytes())
    }

    #[test]
    fn test_signed_message_format() {
        assert_eq!(
            CallbackVerifier::signed_message(&callback(None)),
            "emblem_corbul_mistic_u1_1700000000000|paid|15000"
        );
    }

    #[test]
    fn test_accepts_hex_and_base64() {
        let verifier = CallbackVerifier::new(signing_key().verifying_key());
        let sig = sign(&callback(None));

        let hex_cb = callback(Some(hex::encode(sig.to_bytes())));
        assert!(verifier.verify(&hex_cb).is_ok());

        let b64 = base64::engine::general_purpose::STANDARD.encode(sig.to_bytes());
        assert!(verifier.verify(&callback(Some(b64))).is_ok());
    }

    #[test]
    fn test_rejects_missing_or_tampered() {
        let verifier = CallbackVerifier::new(signing_key().verifying_key());
        assert!(matches!(
            verifier.verify(&callback(None)),
            Err(GatewayError::InvalidSignature(_))
        ));

        let sig = hex::encode(sign(&callback(None)).to_bytes());
        let mut tampered = callback(Some(sig));
        tampered.amount = serde_json::Number::from(1);
        assert!(verifier.verify(&tampered).is_err());

        assert!(verifier.verify(&callback(Some("zz".into()))).is_err());
    }

    #[test]
    fn test_from_hex() {
        let hex_key = hex::encode(signing_key().verifying_key().to_bytes());
        assert!(CallbackVerifier::from_hex(&hex_key).is_ok());
        assert!(CallbackVerifier::from_hex("abcd").is_err());
        assert!(CallbackVerifier::from_hex("not-hex").is_err());
    }
}
