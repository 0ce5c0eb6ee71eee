use crate::{constants::SCHEMA, errors::StoreError};
use diesel::{
	prelude::*,
	r2d2::{self, ConnectionManager, PoolError},
};

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

pub fn get_db_pool(database_url: &str, max_size: u32) -> Result<DbPool, PoolError> {
	let manager = ConnectionManager::<PgConnection>::new(database_url);
	r2d2::Pool::builder().max_size(max_size).build(manager)
}

/// Creates the schema and tables when they are missing. Existing data and
/// definitions are left untouched; this is a bootstrap, not a migrator.
pub fn init(pool: &DbPool) -> Result<(), StoreError> {
	let mut conn = pool.get()?;
	conn.transaction::<_, diesel::result::Error, _>(|conn| {
		for statement in bootstrap_statements() {
			diesel::sql_query(statement).execute(conn)?;
		}
		Ok(())
	})?;
	log::info!("Schema {} is ready", SCHEMA);
	Ok(())
}

fn bootstrap_statements() -> Vec<String> {
	vec![
		format!("CREATE SCHEMA IF NOT EXISTS {SCHEMA}"),
		format!(
			"CREATE TABLE IF NOT EXISTS {SCHEMA}.users (
				id SERIAL PRIMARY KEY,
				name TEXT NOT NULL,
				username TEXT NOT NULL UNIQUE,
				email TEXT NOT NULL UNIQUE,
				password_hash TEXT NOT NULL,
				avatar TEXT NOT NULL,
				verified BOOLEAN NOT NULL DEFAULT FALSE,
				created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
			)"
		),
		format!(
			"CREATE TABLE IF NOT EXISTS {SCHEMA}.wallets (
				user_id INTEGER NOT NULL REFERENCES {SCHEMA}.users(id),
				currency VARCHAR(10) NOT NULL,
				balance NUMERIC(36, 18) NOT NULL DEFAULT 0,
				PRIMARY KEY (user_id, currency)
			)"
		),
		format!(
			"CREATE TABLE IF NOT EXISTS {SCHEMA}.sessions (
				id SERIAL PRIMARY KEY,
				user_id INTEGER NOT NULL REFERENCES {SCHEMA}.users(id),
				token VARCHAR(128) NOT NULL UNIQUE,
				expires_at TIMESTAMPTZ NOT NULL DEFAULT NOW() + INTERVAL '30 days',
				created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
			)"
		),
		format!(
			"CREATE TABLE IF NOT EXISTS {SCHEMA}.transactions (
				id SERIAL PRIMARY KEY,
				type VARCHAR(32) NOT NULL,
				currency VARCHAR(10) NOT NULL,
				amount NUMERIC(36, 18) NOT NULL,
				status VARCHAR(32) NOT NULL,
				created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
				from_user_id INTEGER REFERENCES {SCHEMA}.users(id),
				to_user_id INTEGER REFERENCES {SCHEMA}.users(id)
			)"
		),
		format!(
			"CREATE INDEX IF NOT EXISTS transactions_from_user_idx
				ON {SCHEMA}.transactions (from_user_id, created_at DESC)"
		),
		format!(
			"CREATE INDEX IF NOT EXISTS transactions_to_user_idx
				ON {SCHEMA}.transactions (to_user_id, created_at DESC)"
		),
	]
}
