use crate::{
	db::DbPool,
	errors::StoreResult,
	models::{
		AccountSnapshot, Credentials, Currency, NewAccount, NewSession, NewUser, NewWallet,
		TransactionRecord, TransactionRow, UserProfile, WalletBalance,
	},
	schema::{sessions, transactions, users, wallets},
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::collections::HashMap;

/// Everything the request handler needs from persistent storage. Each call is
/// its own unit of work; multi-statement calls are transactional.
#[cfg_attr(test, mockall::automock)]
pub trait AccountStore: Send + Sync {
	fn email_or_username_taken(&self, email: &str, username: &str) -> StoreResult<bool>;

	/// Inserts the user, a zero wallet per currency and the first session.
	/// Returns the new user id. Nothing is written if any insert fails.
	fn create_account(
		&self,
		account: NewAccount,
		token: &str,
		expires_at: DateTime<Utc>,
	) -> StoreResult<i32>;

	fn find_credentials(&self, email: &str) -> StoreResult<Option<Credentials>>;

	fn open_session(&self, user_id: i32, token: &str, expires_at: DateTime<Utc>) -> StoreResult<()>;

	/// The owner of `token` with wallets and the `limit` most recent
	/// transactions, all read in one read-only transaction. `None` when the
	/// session is unknown or no longer live at `now`.
	fn account_for_token(
		&self,
		token: &str,
		now: DateTime<Utc>,
		limit: i64,
	) -> StoreResult<Option<AccountSnapshot>>;

	/// Returns how many sessions were touched (0 or 1).
	fn expire_session(&self, token: &str, now: DateTime<Utc>) -> StoreResult<usize>;
}

pub struct UserRepo {
	pool: DbPool,
}

impl UserRepo {
	pub fn new(pool: DbPool) -> Self {
		Self { pool }
	}
}

impl AccountStore for UserRepo {
	fn email_or_username_taken(&self, email: &str, username: &str) -> StoreResult<bool> {
		let mut conn = self.pool.get()?;
		let existing = users::table
			.filter(users::email.eq(email).or(users::username.eq(username)))
			.select(users::id)
			.first::<i32>(&mut conn)
			.optional()?;
		Ok(existing.is_some())
	}

	fn create_account(
		&self,
		account: NewAccount,
		token: &str,
		expires_at: DateTime<Utc>,
	) -> StoreResult<i32> {
		let mut conn = self.pool.get()?;
		let user_id = conn.transaction::<i32, diesel::result::Error, _>(|conn| {
			let user_id = diesel::insert_into(users::table)
				.values(&NewUser {
					name: &account.name,
					username: &account.username,
					email: &account.email,
					password_hash: &account.password_hash,
					avatar: &account.avatar,
				})
				.returning(users::id)
				.get_result::<i32>(conn)?;

			let new_wallets: Vec<NewWallet> = Currency::ALL
				.iter()
				.map(|c| NewWallet { user_id, currency: c.as_str(), balance: BigDecimal::from(0) })
				.collect();
			diesel::insert_into(wallets::table).values(&new_wallets).execute(conn)?;

			diesel::insert_into(sessions::table)
				.values(&NewSession { user_id, token, expires_at })
				.execute(conn)?;
			Ok(user_id)
		})?;
		Ok(user_id)
	}

	fn find_credentials(&self, email: &str) -> StoreResult<Option<Credentials>> {
		let mut conn = self.pool.get()?;
		let credentials = users::table
			.filter(users::email.eq(email))
			.select(Credentials::as_select())
			.first::<Credentials>(&mut conn)
			.optional()?;
		Ok(credentials)
	}

	fn open_session(&self, user_id: i32, token: &str, expires_at: DateTime<Utc>) -> StoreResult<()> {
		let mut conn = self.pool.get()?;
		diesel::insert_into(sessions::table)
			.values(&NewSession { user_id, token, expires_at })
			.execute(&mut conn)?;
		Ok(())
	}

	fn account_for_token(
		&self,
		token: &str,
		now: DateTime<Utc>,
		limit: i64,
	) -> StoreResult<Option<AccountSnapshot>> {
		let mut conn = self.pool.get()?;
		let snapshot = conn.build_transaction().read_only().run::<_, diesel::result::Error, _>(
			|conn| {
				let Some(user) = sessions::table
					.inner_join(users::table)
					.filter(sessions::token.eq(token))
					.filter(sessions::expires_at.gt(now))
					.select(UserProfile::as_select())
					.first::<UserProfile>(conn)
					.optional()?
				else {
					return Ok(None);
				};

				let balances = wallets::table
					.filter(wallets::user_id.eq(user.id))
					.select(WalletBalance::as_select())
					.load::<WalletBalance>(conn)?;

				let rows = transactions::table
					.filter(
						transactions::from_user_id
							.eq(user.id)
							.or(transactions::to_user_id.eq(user.id)),
					)
					.order(transactions::created_at.desc())
					.limit(limit)
					.select(TransactionRow::as_select())
					.load::<TransactionRow>(conn)?;

				let mut party_ids: Vec<i32> =
					rows.iter().flat_map(|r| [r.from_user_id, r.to_user_id]).flatten().collect();
				party_ids.sort_unstable();
				party_ids.dedup();
				let names: HashMap<i32, String> = users::table
					.filter(users::id.eq_any(party_ids))
					.select((users::id, users::name))
					.load::<(i32, String)>(conn)?
					.into_iter()
					.collect();

				Ok(Some(AccountSnapshot {
					user,
					wallets: balances,
					transactions: resolve_names(rows, &names),
				}))
			},
		)?;
		Ok(snapshot)
	}

	fn expire_session(&self, token: &str, now: DateTime<Utc>) -> StoreResult<usize> {
		let mut conn = self.pool.get()?;
		let touched = diesel::update(
			sessions::table.filter(sessions::token.eq(token)).filter(sessions::expires_at.gt(now)),
		)
		.set(sessions::expires_at.eq(now))
		.execute(&mut conn)?;
		Ok(touched)
	}
}

pub fn resolve_names(rows: Vec<TransactionRow>, names: &HashMap<i32, String>) -> Vec<TransactionRecord> {
	rows.into_iter()
		.map(|row| {
			let lookup = |id: Option<i32>| id.and_then(|id| names.get(&id).cloned());
			let from_name = lookup(row.from_user_id);
			let to_name = lookup(row.to_user_id);
			TransactionRecord { row, from_name, to_name }
		})
		.collect()
}
