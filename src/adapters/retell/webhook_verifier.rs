//! Retell webhook signature verification.
//!
//! Retell signs each webhook with HMAC-SHA256 keyed by the account API key.
//! The `x-retell-signature` header has the form `v=<unix_ms>,d=<hex digest>`
//! and the digest covers the raw body followed by the timestamp.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Header carrying the signature.
pub const SIGNATURE_HEADER: &str = "x-retell-signature";

/// Maximum allowed age for webhook events (5 minutes).
const MAX_EVENT_AGE_MS: i64 = 5 * 60 * 1000;

/// Maximum allowed clock skew for future events (1 minute).
const MAX_CLOCK_SKEW_MS: i64 = 60 * 1000;

type HmacSha256 = Hmac<Sha256>;

/// Errors from webhook verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    #[error("Missing x-retell-signature header")]
    MissingSignature,

    #[error("Invalid webhook signature")]
    InvalidSignature,

    #[error("Webhook timestamp outside the allowed window")]
    TimestampOutOfRange,

    #[error("Webhook timestamp is in the future")]
    InvalidTimestamp,

    #[error("Failed to parse signature header: {0}")]
    ParseError(String),
}

/// Parsed components of the signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix milliseconds when the signature was generated.
    pub timestamp_ms: i64,
    pub digest: Vec<u8>,
}

impl SignatureHeader {
    /// Parses `v=<timestamp>,d=<hex>`. Unknown keys are ignored.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp_ms: Option<i64> = None;
        let mut digest: Option<Vec<u8>> = None;

        for part in header.split(',') {
            let (key, value) = part
                .trim()
                .split_once('=')
                .ok_or_else(|| WebhookError::ParseError("invalid header format".to_string()))?;

            match key {
                "v" => {
                    timestamp_ms = Some(value.parse().map_err(|_| {
                        WebhookError::ParseError("invalid timestamp".to_string())
                    })?);
                }
                "d" => {
                    digest = Some(hex::decode(value).map_err(|_| {
                        WebhookError::ParseError("invalid digest hex".to_string())
                    })?);
                }
                _ => {}
            }
        }

        Ok(Self {
            timestamp_ms: timestamp_ms
                .ok_or_else(|| WebhookError::ParseError("missing timestamp".to_string()))?,
            digest: digest.ok_or_else(|| WebhookError::ParseError("missing digest".to_string()))?,
        })
    }
}

/// Verifier for Retell webhook signatures.
#[derive(Clone)]
pub struct RetellWebhookVerifier {
    api_key: SecretString,
}

impl RetellWebhookVerifier {
    pub fn new(api_key: SecretString) -> Self {
        Self { api_key }
    }

    /// Verifies `signature_header` against the raw request body.
    pub fn verify(&self, payload: &[u8], signature_header: &str) -> Result<(), WebhookError> {
        self.verify_at(payload, signature_header, chrono::Utc::now().timestamp_millis())
    }

    fn verify_at(
        &self,
        payload: &[u8],
        signature_header: &str,
        now_ms: i64,
    ) -> Result<(), WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        let age = now_ms - header.timestamp_ms;
        if age > MAX_EVENT_AGE_MS {
            tracing::warn!(age_ms = age, "Retell webhook too old");
            return Err(WebhookError::TimestampOutOfRange);
        }
        if age < -MAX_CLOCK_SKEW_MS {
            return Err(WebhookError::InvalidTimestamp);
        }

        let expected = sign(self.api_key.expose_secret(), payload, header.timestamp_ms)?;
        if !constant_time_compare(&expected, &header.digest) {
            return Err(WebhookError::InvalidSignature);
        }

        Ok(())
    }
}

fn sign(key: &str, payload: &[u8], timestamp_ms: i64) -> Result<Vec<u8>, WebhookError> {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .map_err(|e| WebhookError::ParseError(e.to_string()))?;
    mac.update(payload);
    mac.update(timestamp_ms.to_string().as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Builds a valid header value for test fixtures.
#[cfg(test)]
pub fn compute_test_signature(api_key: &str, timestamp_ms: i64, payload: &str) -> String {
    let digest = sign(api_key, payload.as_bytes(), timestamp_ms).unwrap();
    format!("v={},d={}", timestamp_ms, hex::encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "key_test_retell_12345";
    const BODY: &str = r#"{"event":"call_started","call_id":"call_1"}"#;

    fn verifier() -> RetellWebhookVerifier {
        RetellWebhookVerifier::new(SecretString::new(TEST_KEY.to_string()))
    }

    fn now_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    mod header_parsing {
        use super::*;

        #[test]
        fn parses_valid_header() {
            let header = SignatureHeader::parse("v=1700000000000,d=abcd").unwrap();
            assert_eq!(header.timestamp_ms, 1_700_000_000_000);
            assert_eq!(header.digest, vec![0xab, 0xcd]);
        }

        #[test]
        fn ignores_unknown_keys() {
            let header = SignatureHeader::parse("v=1,x=zzz,d=00").unwrap();
            assert_eq!(header.digest, vec![0]);
        }

        #[test]
        fn rejects_missing_parts() {
            assert!(matches!(
                SignatureHeader::parse("d=abcd"),
                Err(WebhookError::ParseError(_))
            ));
            assert!(matches!(
                SignatureHeader::parse("v=123"),
                Err(WebhookError::ParseError(_))
            ));
            assert!(matches!(
                SignatureHeader::parse("garbage"),
                Err(WebhookError::ParseError(_))
            ));
        }

        #[test]
        fn rejects_bad_hex() {
            assert!(SignatureHeader::parse("v=1,d=xyz").is_err());
        }
    }

    mod verification {
        use super::*;

        #[test]
        fn accepts_valid_signature() {
            let header = compute_test_signature(TEST_KEY, now_ms(), BODY);
            assert_eq!(verifier().verify(BODY.as_bytes(), &header), Ok(()));
        }

        #[test]
        fn rejects_wrong_key() {
            let header = compute_test_signature("other_key", now_ms(), BODY);
            assert_eq!(
                verifier().verify(BODY.as_bytes(), &header),
                Err(WebhookError::InvalidSignature)
            );
        }

        #[test]
        fn rejects_tampered_body() {
            let header = compute_test_signature(TEST_KEY, now_ms(), BODY);
            let tampered = BODY.replace("call_1", "call_2");
            assert_eq!(
                verifier().verify(tampered.as_bytes(), &header),
                Err(WebhookError::InvalidSignature)
            );
        }

        #[test]
        fn rejects_stale_timestamp() {
            let now = 1_700_000_000_000;
            let header = compute_test_signature(TEST_KEY, now - MAX_EVENT_AGE_MS - 1, BODY);
            assert_eq!(
                verifier().verify_at(BODY.as_bytes(), &header, now),
                Err(WebhookError::TimestampOutOfRange)
            );
        }

        #[test]
        fn rejects_future_timestamp() {
            let now = 1_700_000_000_000;
            let header = compute_test_signature(TEST_KEY, now + MAX_CLOCK_SKEW_MS + 1, BODY);
            assert_eq!(
                verifier().verify_at(BODY.as_bytes(), &header, now),
                Err(WebhookError::InvalidTimestamp)
            );
        }

        #[test]
        fn tolerates_small_skew() {
            let now = 1_700_000_000_000;
            let header = compute_test_signature(TEST_KEY, now + 5_000, BODY);
            assert_eq!(verifier().verify_at(BODY.as_bytes(), &header, now), Ok(()));
        }
    }
}
