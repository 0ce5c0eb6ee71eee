use crate::{
	constants::{DEFAULT_SESSION_TTL_DAYS, RECENT_TRANSACTIONS},
	envelope::{Envelope, Reply},
	errors::{AuthError, Locale},
	midware::token::generate_token,
	models::{
		avatar_initials, AccountResponse, AckResponse, Action, ActionRequest, ActionResponse,
		NewAccount, SessionResponse, UserProfile,
	},
	password::{self, PasswordScheme},
	repo::AccountStore,
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use validator::{Validate, ValidationError, ValidationErrors};

#[derive(Debug, Clone)]
pub struct HandlerSettings {
	pub session_ttl: Duration,
	pub password_scheme: PasswordScheme,
	pub locale: Locale,
}

impl Default for HandlerSettings {
	fn default() -> Self {
		Self {
			session_ttl: Duration::days(DEFAULT_SESSION_TTL_DAYS),
			password_scheme: PasswordScheme::default(),
			locale: Locale::default(),
		}
	}
}

/// Turns one [`Envelope`] into one [`Reply`]. Holds no per-request state, so a
/// single instance is shared by every worker.
pub struct UserHandler {
	store: Arc<dyn AccountStore>,
	settings: HandlerSettings,
}

impl UserHandler {
	pub fn new(store: Arc<dyn AccountStore>, settings: HandlerSettings) -> Self {
		Self { store, settings }
	}

	pub fn handle(&self, envelope: Envelope) -> Reply {
		if envelope.is_preflight() {
			return Reply::preflight();
		}

		let result = envelope
			.action_request()
			.and_then(|request| self.dispatch(request, envelope.auth_token()));

		match result {
			Ok(response) => Reply::json(200, &response),
			Err(err) => {
				match err.status_code() {
					500 => log::error!("Request failed: {:?}", err),
					_ => log::warn!("Request rejected: {}", err),
				}
				Reply::error(err.status_code(), err.message(self.settings.locale))
			},
		}
	}

	fn dispatch(
		&self,
		request: ActionRequest,
		token: Option<&str>,
	) -> Result<ActionResponse, AuthError> {
		let action = request
			.action
			.parse::<Action>()
			.map_err(|_| AuthError::UnknownAction(request.action.clone()))?;

		match action {
			Action::Register => self.register(request).map(ActionResponse::Session),
			Action::Login => self.login(request).map(ActionResponse::Session),
			Action::Me => self.me(token).map(ActionResponse::Account),
			Action::Logout => self.logout(token).map(ActionResponse::Ack),
		}
	}

	fn register(&self, request: ActionRequest) -> Result<SessionResponse, AuthError> {
		let form = RegistrationForm::from_request(&request)?;

		if self.store.email_or_username_taken(&form.email, &form.username)? {
			return Err(AuthError::AlreadyTaken);
		}

		let account = NewAccount {
			avatar: avatar_initials(&form.name),
			password_hash: self.settings.password_scheme.hash(&form.password)?,
			name: form.name,
			username: form.username,
			email: form.email,
		};
		let token = generate_token();
		let expires_at = Utc::now() + self.settings.session_ttl;
		let user_id = self.store.create_account(account.clone(), &token, expires_at)?;

		log::info!("Registered user {} as @{}", user_id, account.username);
		Ok(SessionResponse {
			token,
			user: UserProfile {
				id: user_id,
				name: account.name,
				username: account.username,
				email: account.email,
				avatar: account.avatar,
				verified: false,
			},
		})
	}

	fn login(&self, request: ActionRequest) -> Result<SessionResponse, AuthError> {
		let email = request.text("email").trim().to_lowercase();
		let password = request.text("password");

		let credentials = self
			.store
			.find_credentials(&email)?
			.filter(|c| password::verify(password, &c.password_hash))
			.ok_or(AuthError::InvalidCredentials)?;

		let user = credentials.profile;
		let token = generate_token();
		self.store.open_session(user.id, &token, Utc::now() + self.settings.session_ttl)?;

		log::info!("User {} logged in", user.id);
		Ok(SessionResponse { token, user })
	}

	fn me(&self, token: Option<&str>) -> Result<AccountResponse, AuthError> {
		let token = token.ok_or(AuthError::NotAuthorized)?;
		let snapshot = self
			.store
			.account_for_token(token, Utc::now(), RECENT_TRANSACTIONS)?
			.ok_or(AuthError::NotAuthorized)?;
		Ok(AccountResponse::new(snapshot))
	}

	fn logout(&self, token: Option<&str>) -> Result<AckResponse, AuthError> {
		if let Some(token) = token {
			let touched = self.store.expire_session(token, Utc::now())?;
			log::info!("Logout expired {} session(s)", touched);
		}
		Ok(AckResponse { ok: true })
	}
}

/// Register input after normalisation. A blank field reports before a short
/// password does.
#[derive(Debug, PartialEq, Validate)]
struct RegistrationForm {
	#[validate(length(min = 1))]
	name: String,
	#[validate(length(min = 1))]
	username: String,
	#[validate(length(min = 1))]
	email: String,
	#[validate(custom(function = "not_blank"), length(min = 6))]
	password: String,
}

impl RegistrationForm {
	fn from_request(request: &ActionRequest) -> Result<Self, AuthError> {
		let form = Self {
			name: request.text("name").trim().to_string(),
			username: request.text("username").trim().to_lowercase().trim_start_matches('@').to_string(),
			email: request.text("email").trim().to_lowercase(),
			password: request.text("password").to_string(),
		};
		form.validate().map_err(registration_error)?;
		Ok(form)
	}
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
	match value.trim().is_empty() {
		true => Err(ValidationError::new("blank")),
		false => Ok(()),
	}
}

fn registration_error(errors: ValidationErrors) -> AuthError {
	let missing = errors.field_errors().iter().any(|(field, errs)| {
		*field != "password" || errs.iter().any(|e| e.code == "blank")
	});
	match missing {
		true => AuthError::MissingFields,
		false => AuthError::PasswordTooShort,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn request(name: &str, username: &str, email: &str, password: &str) -> ActionRequest {
		ActionRequest::from_value(json!({
			"action": "register",
			"name": name,
			"username": username,
			"email": email,
			"password": password,
		}))
		.unwrap()
	}

	#[test]
	fn registration_normalises_fields() {
		let form = RegistrationForm::from_request(&request(
			"  Ivan Petrov ",
			" @@IvanP ",
			" Ivan@Mail.RU ",
			"secret",
		))
		.unwrap();
		assert_eq!(form.name, "Ivan Petrov");
		assert_eq!(form.username, "ivanp");
		assert_eq!(form.email, "ivan@mail.ru");
		assert_eq!(form.password, "secret");
	}

	#[test]
	fn missing_fields_win_over_short_password() {
		let err = RegistrationForm::from_request(&request("", "u", "e@x.io", "123")).unwrap_err();
		assert!(matches!(err, AuthError::MissingFields));
	}

	#[test]
	fn bare_at_sign_username_is_missing() {
		let err = RegistrationForm::from_request(&request("A", "@", "e@x.io", "123456")).unwrap_err();
		assert!(matches!(err, AuthError::MissingFields));
	}

	#[test]
	fn whitespace_password_is_missing_not_short() {
		let err = RegistrationForm::from_request(&request("A", "a", "e@x.io", "   ")).unwrap_err();
		assert!(matches!(err, AuthError::MissingFields));
		let err = RegistrationForm::from_request(&request("A", "a", "e@x.io", "")).unwrap_err();
		assert!(matches!(err, AuthError::MissingFields));
	}

	#[test]
	fn five_char_password_is_too_short() {
		let err = RegistrationForm::from_request(&request("A", "a", "e@x.io", "12345")).unwrap_err();
		assert!(matches!(err, AuthError::PasswordTooShort));
		assert!(RegistrationForm::from_request(&request("A", "a", "e@x.io", "123456")).is_ok());
	}

	#[test]
	fn password_length_counts_characters() {
		let err = RegistrationForm::from_request(&request("A", "a", "e@x.io", "парол")).unwrap_err();
		assert!(matches!(err, AuthError::PasswordTooShort));
		assert!(RegistrationForm::from_request(&request("A", "a", "e@x.io", "пароль")).is_ok());
	}

	#[test]
	fn non_string_fields_count_as_missing() {
		let req = ActionRequest::from_value(json!({
			"action": "register",
			"name": "A",
			"username": 5,
			"email": "e@x.io",
			"password": "123456",
		}))
		.unwrap();
		let err = RegistrationForm::from_request(&req).unwrap_err();
		assert!(matches!(err, AuthError::MissingFields));
	}
}
