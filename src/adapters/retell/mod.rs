//! Retell voice-AI integration: REST client, webhook payloads and
//! signature verification.

mod client;
mod webhook_types;
mod webhook_verifier;

pub use client::{RetellClient, RetellConfig, DEFAULT_BASE_URL};
pub use webhook_types::{RetellCallPayload, RetellWebhook};
pub use webhook_verifier::{RetellWebhookVerifier, SignatureHeader, WebhookError, SIGNATURE_HEADER};

#[cfg(test)]
pub(crate) use webhook_verifier::compute_test_signature;
