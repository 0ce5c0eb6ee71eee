use crate::errors::AuthError;
use argon2::{
	password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
	Argon2,
};
use clap::ValueEnum;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

const ARGON2_PREFIX: &str = "$argon2";

/// How new password hashes are produced. Verification accepts either format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum PasswordScheme {
	/// Unsalted hex SHA-256, the format existing rows are stored in.
	#[default]
	Sha256,
	Argon2,
}

impl PasswordScheme {
	pub fn hash(&self, password: &str) -> Result<String, AuthError> {
		match self {
			PasswordScheme::Sha256 => Ok(sha256_hex(password)),
			PasswordScheme::Argon2 => {
				let salt = SaltString::generate(&mut OsRng);
				Argon2::default()
					.hash_password(password.as_bytes(), &salt)
					.map(|hash| hash.to_string())
					.map_err(|e| AuthError::Hashing(e.to_string()))
			},
		}
	}
}

pub fn verify(password: &str, stored: &str) -> bool {
	if stored.starts_with(ARGON2_PREFIX) {
		return match PasswordHash::new(stored) {
			Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
			Err(e) => {
				log::error!("Stored argon2 hash is unreadable: {}", e);
				false
			},
		};
	}
	sha256_hex(password) == stored
}

fn sha256_hex(password: &str) -> String {
	hex::encode(Sha256::digest(password.as_bytes()))
}
