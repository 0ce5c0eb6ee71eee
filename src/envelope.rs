use crate::{
	constants::{CORS_HEADERS, JSON_CONTENT_TYPE},
	errors::AuthError,
	midware::token::extract_token,
	models::{ActionRequest, ErrorResponse},
};
use actix_web::{
	http::{
		header::{HeaderName, HeaderValue},
		StatusCode,
	},
	HttpRequest, HttpResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// One inbound call: method, headers and raw JSON body.
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
	#[serde(default)]
	pub http_method: String,
	#[serde(default)]
	pub headers: Option<HashMap<String, String>>,
	#[serde(default)]
	pub body: Option<String>,
}

impl Envelope {
	pub fn from_http(req: &HttpRequest, body: &[u8]) -> Self {
		let headers = req
			.headers()
			.iter()
			.filter_map(|(name, value)| {
				value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
			})
			.collect();
		Self {
			http_method: req.method().as_str().to_string(),
			headers: Some(headers),
			body: Some(String::from_utf8_lossy(body).into_owned()),
		}
	}

	pub fn is_preflight(&self) -> bool {
		self.http_method.eq_ignore_ascii_case("OPTIONS")
	}

	pub fn auth_token(&self) -> Option<&str> {
		self.headers.as_ref().and_then(extract_token)
	}

	/// Missing and blank bodies read as `{}`. Anything that is not a JSON
	/// object is rejected.
	pub fn action_request(&self) -> Result<ActionRequest, AuthError> {
		let raw = self.body.as_deref().map(str::trim).filter(|b| !b.is_empty()).unwrap_or("{}");
		let value: Value = serde_json::from_str(raw).map_err(AuthError::InvalidBody)?;
		ActionRequest::from_value(value).ok_or(AuthError::NotAnObject)
	}
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
	pub status_code: u16,
	pub headers: BTreeMap<String, String>,
	pub body: String,
}

impl Reply {
	pub fn preflight() -> Self {
		Self { status_code: 200, headers: cors_headers(), body: String::new() }
	}

	pub fn json<T: Serialize>(status_code: u16, payload: &T) -> Self {
		match serde_json::to_string(payload) {
			Ok(body) => {
				let mut headers = cors_headers();
				headers.insert("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string());
				Self { status_code, headers, body }
			},
			Err(e) => {
				log::error!("Failed to encode response body: {:?}", e);
				Self {
					status_code: 500,
					headers: cors_headers(),
					body: r#"{"error":"internal server error"}"#.to_string(),
				}
			},
		}
	}

	pub fn error(status_code: u16, message: &str) -> Self {
		Self::json(status_code, &ErrorResponse { error: message.to_string() })
	}

	pub fn into_http_response(self) -> HttpResponse {
		let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		let mut response = HttpResponse::build(status);
		for (name, value) in &self.headers {
			match (HeaderName::try_from(name.as_str()), HeaderValue::from_str(value)) {
				(Ok(name), Ok(value)) => {
					response.insert_header((name, value));
				},
				_ => log::warn!("Dropping unrepresentable response header {}", name),
			}
		}
		response.body(self.body)
	}
}

fn cors_headers() -> BTreeMap<String, String> {
	CORS_HEADERS.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}
