use clap::ValueEnum;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
	#[error("email or username already exists")]
	Conflict,
	#[error("connection pool error: {0}")]
	Pool(#[from] diesel::r2d2::PoolError),
	#[error("query failed: {0}")]
	Query(DieselError),
}

impl From<DieselError> for StoreError {
	fn from(err: DieselError) -> Self {
		match err {
			DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => Self::Conflict,
			other => Self::Query(other),
		}
	}
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Everything a request can fail with. The `Display` text is for logs; what
/// the caller sees comes from [`AuthError::message`].
#[derive(Debug, Error)]
pub enum AuthError {
	#[error("missing required fields")]
	MissingFields,
	#[error("password too short")]
	PasswordTooShort,
	#[error("email or username already taken")]
	AlreadyTaken,
	#[error("invalid credentials")]
	InvalidCredentials,
	#[error("missing or expired session token")]
	NotAuthorized,
	#[error("unknown action {0:?}")]
	UnknownAction(String),
	#[error("malformed request body: {0}")]
	InvalidBody(#[source] serde_json::Error),
	#[error("request body is not a JSON object")]
	NotAnObject,
	#[error("password hashing failed: {0}")]
	Hashing(String),
	#[error("storage failure: {0}")]
	Storage(#[source] StoreError),
}

impl From<StoreError> for AuthError {
	fn from(err: StoreError) -> Self {
		match err {
			StoreError::Conflict => Self::AlreadyTaken,
			other => Self::Storage(other),
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Locale {
	#[default]
	En,
	Ru,
}

impl AuthError {
	pub fn status_code(&self) -> u16 {
		match self {
			Self::MissingFields |
			Self::PasswordTooShort |
			Self::UnknownAction(_) |
			Self::InvalidBody(_) |
			Self::NotAnObject => 400,
			Self::InvalidCredentials | Self::NotAuthorized => 401,
			Self::AlreadyTaken => 409,
			Self::Hashing(_) | Self::Storage(_) => 500,
		}
	}

	pub fn message(&self, locale: Locale) -> &'static str {
		match (self, locale) {
			(Self::MissingFields, Locale::En) => "fill all fields",
			(Self::MissingFields, Locale::Ru) => "Заполните все поля",
			(Self::PasswordTooShort, Locale::En) => "password minimum 6 characters",
			(Self::PasswordTooShort, Locale::Ru) => "Пароль минимум 6 символов",
			(Self::AlreadyTaken, Locale::En) => "email or username already taken",
			(Self::AlreadyTaken, Locale::Ru) => "Email или username уже занят",
			(Self::InvalidCredentials, Locale::En) => "invalid email or password",
			(Self::InvalidCredentials, Locale::Ru) => "Неверный email или пароль",
			(Self::NotAuthorized, Locale::En) => "not authorized",
			(Self::NotAuthorized, Locale::Ru) => "Не авторизован",
			(Self::UnknownAction(_), Locale::En) => "unknown action",
			(Self::UnknownAction(_), Locale::Ru) => "Неизвестное действие",
			(Self::InvalidBody(_) | Self::NotAnObject, Locale::En) => "invalid request body",
			(Self::InvalidBody(_) | Self::NotAnObject, Locale::Ru) => "Некорректный запрос",
			(Self::Hashing(_) | Self::Storage(_), Locale::En) => "internal server error",
			(Self::Hashing(_) | Self::Storage(_), Locale::Ru) => "Внутренняя ошибка сервера",
		}
	}
}
