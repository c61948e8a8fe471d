//! Webhook signature helpers
//!
//! The platform's HTTP push transport signs every callback with ed25519.
//! The key pair is derived from the application secret: the seed is the
//! secret repeated until it reaches 32 bytes. The signed message is the
//! timestamp header concatenated with the raw request body.
//!
//! These are pure functions; the surrounding HTTP server wiring is left to
//! the embedding application.

use ed25519_dalek::{Signature, Signer, SigningKey, SECRET_KEY_LENGTH, SIGNATURE_LENGTH};
use thiserror::Error;

/// Signature handling errors
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("app secret is empty")]
    EmptySecret,

    #[error("signature is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("signature has wrong length: expected {SIGNATURE_LENGTH} bytes, got {0}")]
    InvalidLength(usize),
}

/// Derive the signing key from the application secret
///
/// The seed is the secret repeated until it fills 32 bytes.
fn derive_key(secret: &str) -> Result<SigningKey, SignatureError> {
    if secret.is_empty() {
        return Err(SignatureError::EmptySecret);
    }
    let mut seed = secret.as_bytes().to_vec();
    while seed.len() < SECRET_KEY_LENGTH {
        seed.extend_from_slice(secret.as_bytes());
    }
    seed.truncate(SECRET_KEY_LENGTH);

    let mut bytes = [0u8; SECRET_KEY_LENGTH];
    bytes.copy_from_slice(&seed);
    Ok(SigningKey::from_bytes(&bytes))
}

/// Sign `timestamp + body` with the key derived from `secret`
///
/// Returns the hex-encoded signature. Used to answer the platform's webhook
/// validation challenge.
pub fn sign(secret: &str, timestamp: &str, body: &[u8]) -> Result<String, SignatureError> {
    let key = derive_key(secret)?;
    let mut message = Vec::with_capacity(timestamp.len() + body.len());
    message.extend_from_slice(timestamp.as_bytes());
    message.extend_from_slice(body);
    Ok(hex::encode(key.sign(&message).to_bytes()))
}

/// Verify a hex-encoded signature over `timestamp + body`
///
/// Returns `Ok(false)` for a well-formed but wrong signature; `Err` only for
/// malformed inputs.
pub fn verify(
    secret: &str,
    timestamp: &str,
    body: &[u8],
    signature_hex: &str,
) -> Result<bool, SignatureError> {
    let raw = hex::decode(signature_hex)?;
    let sig_bytes: [u8; SIGNATURE_LENGTH] = raw
        .as_slice()
        .try_into()
        .map_err(|_| SignatureError::InvalidLength(raw.len()))?;
    let sig = Signature::from_bytes(&sig_bytes);

    let key = derive_key(secret)?;
    let mut message = Vec::with_capacity(timestamp.len() + body.len());
    message.extend_from_slice(timestamp.as_bytes());
    message.extend_from_slice(body);

    Ok(key.verifying_key().verify_strict(&message, &sig).is_ok())
}
