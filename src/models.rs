use crate::{
	constants::TRANSACTION_DATE_FORMAT,
	schema::{sessions, transactions, users, wallets},
};
use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
	Rub,
	Usdt,
	Btc,
	Eth,
}

impl Currency {
	pub const ALL: [Currency; 4] = [Currency::Rub, Currency::Usdt, Currency::Btc, Currency::Eth];

	pub fn as_str(&self) -> &'static str {
		match self {
			Currency::Rub => "RUB",
			Currency::Usdt => "USDT",
			Currency::Btc => "BTC",
			Currency::Eth => "ETH",
		}
	}
}

/// The public view of a user, as returned by register, login and me.
#[derive(Queryable, Selectable, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(Pg))]
pub struct UserProfile {
	pub id: i32,
	pub name: String,
	pub username: String,
	pub email: String,
	pub avatar: String,
	pub verified: bool,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(Pg))]
pub struct Credentials {
	#[diesel(embed)]
	pub profile: UserProfile,
	pub password_hash: String,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
	pub name: &'a str,
	pub username: &'a str,
	pub email: &'a str,
	pub password_hash: &'a str,
	pub avatar: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = wallets)]
pub struct NewWallet<'a> {
	pub user_id: i32,
	pub currency: &'a str,
	pub balance: BigDecimal,
}

#[derive(Insertable)]
#[diesel(table_name = sessions)]
pub struct NewSession<'a> {
	pub user_id: i32,
	pub token: &'a str,
	pub expires_at: DateTime<Utc>,
}

/// A fully validated registration, ready to be written in one transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
	pub name: String,
	pub username: String,
	pub email: String,
	pub password_hash: String,
	pub avatar: String,
}

#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = wallets)]
#[diesel(check_for_backend(Pg))]
pub struct WalletBalance {
	pub currency: String,
	pub balance: BigDecimal,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = transactions)]
#[diesel(check_for_backend(Pg))]
pub struct TransactionRow {
	pub id: i32,
	pub kind: String,
	pub currency: String,
	pub amount: BigDecimal,
	pub status: String,
	pub created_at: DateTime<Utc>,
	pub from_user_id: Option<i32>,
	pub to_user_id: Option<i32>,
}

/// A transaction with the display names of both parties resolved.
#[derive(Debug, Clone)]
pub struct TransactionRecord {
	pub row: TransactionRow,
	pub from_name: Option<String>,
	pub to_name: Option<String>,
}

/// What `me` reads for a live session, taken in one read-only transaction.
#[derive(Debug, Clone)]
pub struct AccountSnapshot {
	pub user: UserProfile,
	pub wallets: Vec<WalletBalance>,
	pub transactions: Vec<TransactionRecord>,
}

/// Body of every request. Only `action` is read up front; each action pulls
/// the fields it needs, so stray or oddly typed extras never fail a request.
#[derive(Debug, Default)]
pub struct ActionRequest {
	pub action: String,
	fields: Map<String, Value>,
}

impl ActionRequest {
	/// `None` when the body is not a JSON object. A non-string `action`
	/// reads as empty.
	pub fn from_value(value: Value) -> Option<Self> {
		match value {
			Value::Object(fields) => {
				let action = fields.get("action").and_then(Value::as_str).unwrap_or_default().to_string();
				Some(Self { action, fields })
			},
			_ => None,
		}
	}

	/// A string field, or `""` when it is absent, null or not a string.
	pub fn text(&self, field: &str) -> &str {
		self.fields.get(field).and_then(Value::as_str).unwrap_or_default()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
	Register,
	Login,
	Me,
	Logout,
}

impl std::str::FromStr for Action {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"register" => Ok(Action::Register),
			"login" => Ok(Action::Login),
			"me" => Ok(Action::Me),
			"logout" => Ok(Action::Logout),
			_ => Err(()),
		}
	}
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SessionResponse {
	pub token: String,
	pub user: UserProfile,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct TransactionView {
	pub id: i32,
	#[serde(rename = "type")]
	pub kind: String,
	pub currency: String,
	pub amount: f64,
	pub status: String,
	pub date: String,
	pub from_name: Option<String>,
	pub to_name: Option<String>,
}

impl From<TransactionRecord> for TransactionView {
	fn from(record: TransactionRecord) -> Self {
		let TransactionRecord { row, from_name, to_name } = record;
		Self {
			id: row.id,
			kind: row.kind,
			currency: row.currency,
			amount: row.amount.to_f64().unwrap_or_default(),
			status: row.status,
			date: format_transaction_date(&row.created_at),
			from_name,
			to_name,
		}
	}
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AccountResponse {
	pub user: UserProfile,
	pub wallets: BTreeMap<String, f64>,
	pub transactions: Vec<TransactionView>,
}

impl AccountResponse {
	pub fn new(snapshot: AccountSnapshot) -> Self {
		let mut wallets: BTreeMap<String, f64> =
			Currency::ALL.iter().map(|c| (c.as_str().to_string(), 0.0)).collect();
		for wallet in snapshot.wallets {
			wallets.insert(wallet.currency, wallet.balance.to_f64().unwrap_or_default());
		}
		let transactions = snapshot.transactions.into_iter().map(TransactionView::from).collect();
		Self { user: snapshot.user, wallets, transactions }
	}
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AckResponse {
	pub ok: bool,
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum ActionResponse {
	Session(SessionResponse),
	Account(AccountResponse),
	Ack(AckResponse),
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
	pub error: String,
}

/// Initials shown in place of a profile picture: the first letter of each of
/// the first two words, or the first two characters of a one-word name.
/// Never longer than two characters, even when uppercasing expands a letter.
pub fn avatar_initials(name: &str) -> String {
	let mut words = name.split_whitespace();
	let letters: Vec<char> = match (words.next(), words.next()) {
		(Some(first), Some(second)) => first.chars().take(1).chain(second.chars().take(1)).collect(),
		_ => name.trim().chars().take(2).collect(),
	};
	letters.into_iter().flat_map(char::to_uppercase).take(2).collect()
}

pub fn format_transaction_date(created_at: &DateTime<Utc>) -> String {
	created_at.format(TRANSACTION_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	#[test]
	fn avatar_uses_first_two_words() {
		assert_eq!(avatar_initials("ivan petrov"), "IP");
		assert_eq!(avatar_initials("  Anna   Maria Smith "), "AM");
	}

	#[test]
	fn avatar_falls_back_to_first_two_chars() {
		assert_eq!(avatar_initials("satoshi"), "SA");
		assert_eq!(avatar_initials("x"), "X");
	}

	#[test]
	fn avatar_handles_non_ascii() {
		assert_eq!(avatar_initials("иван петров"), "ИП");
	}

	#[test]
	fn avatar_stays_two_chars_when_uppercase_expands() {
		assert_eq!(avatar_initials("\u{FB03} \u{FB03}"), "FF");
		assert_eq!(avatar_initials("\u{FB03}x"), "FF");
		assert_eq!(avatar_initials("straße"), "ST");
	}

	#[test]
	fn action_request_reads_only_strings() {
		let req = ActionRequest::from_value(serde_json::json!({
			"action": "logout",
			"password": 123,
			"email": "a@b.c",
			"name": null,
		}))
		.unwrap();
		assert_eq!(req.action, "logout");
		assert_eq!(req.text("email"), "a@b.c");
		assert_eq!(req.text("password"), "");
		assert_eq!(req.text("name"), "");
		assert_eq!(req.text("username"), "");
	}

	#[test]
	fn action_request_needs_an_object() {
		assert!(ActionRequest::from_value(serde_json::json!([1, 2])).is_none());
		assert!(ActionRequest::from_value(Value::Null).is_none());
		let numeric = ActionRequest::from_value(serde_json::json!({ "action": 7 })).unwrap();
		assert_eq!(numeric.action, "");
	}

	#[test]
	fn transaction_date_is_day_month_time() {
		let at = Utc.with_ymd_and_hms(2024, 1, 5, 14, 30, 59).unwrap();
		assert_eq!(format_transaction_date(&at), "05 Jan, 14:30");
	}

	#[test]
	fn account_response_fills_missing_currencies() {
		let user = UserProfile {
			id: 1,
			name: "A B".into(),
			username: "ab".into(),
			email: "a@b.c".into(),
			avatar: "AB".into(),
			verified: false,
		};
		let snapshot = AccountSnapshot {
			user,
			wallets: vec![WalletBalance {
				currency: "BTC".into(),
				balance: "0.5".parse().unwrap(),
			}],
			transactions: vec![],
		};
		let resp = AccountResponse::new(snapshot);
		assert_eq!(resp.wallets.len(), 4);
		assert_eq!(resp.wallets["BTC"], 0.5);
		assert_eq!(resp.wallets["RUB"], 0.0);
	}

	#[test]
	fn unknown_action_does_not_parse() {
		assert_eq!("me".parse::<Action>(), Ok(Action::Me));
		assert!("delete".parse::<Action>().is_err());
		assert!("".parse::<Action>().is_err());
	}
}
