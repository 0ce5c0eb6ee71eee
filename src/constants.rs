/// Postgres schema every table lives in. Also baked into `schema.rs`.
pub const SCHEMA: &str = "t_p36388408_peer_exchange_wallet";

pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

pub const CORS_HEADERS: [(&str, &str); 3] = [
	("Access-Control-Allow-Origin", "*"),
	("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
	("Access-Control-Allow-Headers", "Content-Type, X-Auth-Token"),
];

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Random bytes per session token; hex-encoded this is 128 characters.
pub const TOKEN_BYTES: usize = 64;

pub const RECENT_TRANSACTIONS: i64 = 20;

pub const DEFAULT_SESSION_TTL_DAYS: i64 = 30;

/// `created_at` rendering for the account feed, e.g. "05 Jan, 14:30".
pub const TRANSACTION_DATE_FORMAT: &str = "%d %b, %H:%M";
