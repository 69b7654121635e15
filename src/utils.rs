use base64::{
    Engine,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

/// Generates a cryptographically secure code verifier for PKCE authentication.
///
/// Creates a random string of 128 alphanumeric characters, the maximum length
/// allowed by RFC 7636.
///
/// # Example
///
/// ```
/// let verifier = generate_code_verifier();
/// assert_eq!(verifier.len(), 128);
/// ```
pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

/// Generates a PKCE code challenge from a code verifier.
///
/// SHA256 of the verifier, encoded as URL-safe base64 without padding
/// (`S256` challenge method).
pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Builds the `Authorization` header value for the accounts service.
///
/// Standard base64 of `client_id:client_secret`, prefixed with `Basic `.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{client_id}:{client_secret}"))
    )
}

/// Joins a base URL and a path with exactly one slash between them.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
