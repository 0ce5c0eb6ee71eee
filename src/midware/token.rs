use crate::constants::{AUTH_TOKEN_HEADER, TOKEN_BYTES};
use rand::{rngs::OsRng, RngCore};
use std::collections::HashMap;

/// Fresh opaque session token: `TOKEN_BYTES` from the OS RNG, hex-encoded.
pub fn generate_token() -> String {
	let mut bytes = [0u8; TOKEN_BYTES];
	OsRng.fill_bytes(&mut bytes);
	hex::encode(bytes)
}

/// Looks up the session token header regardless of how the client cased it.
/// An empty value is the same as no header.
pub fn extract_token(headers: &HashMap<String, String>) -> Option<&str> {
	headers
		.iter()
		.find(|(name, _)| name.eq_ignore_ascii_case(AUTH_TOKEN_HEADER))
		.map(|(_, value)| value.as_str())
		.filter(|value| !value.is_empty())
}
