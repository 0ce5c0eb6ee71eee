use crate::{
	constants::DEFAULT_SESSION_TTL_DAYS,
	errors::Locale,
	handler::HandlerSettings,
	password::PasswordScheme,
};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "peer-wallet-auth", version, about = "Wallet account and session service")]
pub struct Cli {
	#[command(flatten)]
	pub config: Config,

	#[command(subcommand)]
	pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
	/// Run the HTTP server (default)
	Serve,
	/// Read one request envelope from stdin and print the reply
	Invoke,
	/// Create the schema and tables if they do not exist
	InitSchema,
}

#[derive(Args, Debug, Clone)]
pub struct Config {
	#[arg(long, env = "DATABASE_URL", hide_env_values = true)]
	pub database_url: String,

	#[arg(long, env = "SOCKET_URL", default_value = "127.0.0.1:8080")]
	pub socket_url: String,

	#[arg(long, env = "DB_POOL_SIZE", default_value_t = 10)]
	pub pool_size: u32,

	#[arg(
		long,
		env = "SESSION_TTL_DAYS",
		default_value_t = DEFAULT_SESSION_TTL_DAYS,
		value_parser = clap::value_parser!(i64).range(1..)
	)]
	pub session_ttl_days: i64,

	#[arg(long, env = "PASSWORD_SCHEME", value_enum, default_value_t = PasswordScheme::Sha256)]
	pub password_scheme: PasswordScheme,

	#[arg(long, env = "MESSAGE_LOCALE", value_enum, default_value_t = Locale::En)]
	pub locale: Locale,
}

impl Config {
	pub fn handler_settings(&self) -> HandlerSettings {
		HandlerSettings {
			session_ttl: chrono::Duration::days(self.session_ttl_days),
			password_scheme: self.password_scheme,
			locale: self.locale,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_apply_with_only_database_url() {
		let cli = Cli::try_parse_from(["peer-wallet-auth", "--database-url", "postgres://x/y"]).unwrap();
		assert_eq!(cli.command, None);
		assert_eq!(cli.config.pool_size, 10);
		assert_eq!(cli.config.session_ttl_days, 30);
		assert_eq!(cli.config.password_scheme, PasswordScheme::Sha256);
		let settings = cli.config.handler_settings();
		assert_eq!(settings.session_ttl, chrono::Duration::days(30));
		assert_eq!(settings.locale, Locale::En);
	}

	#[test]
	fn flags_and_subcommand_parse() {
		let cli = Cli::try_parse_from([
			"peer-wallet-auth",
			"--database-url",
			"postgres://x/y",
			"--password-scheme",
			"argon2",
			"--locale",
			"ru",
			"--session-ttl-days",
			"7",
			"invoke",
		])
		.unwrap();
		assert_eq!(cli.command, Some(Command::Invoke));
		assert_eq!(cli.config.password_scheme, PasswordScheme::Argon2);
		assert_eq!(cli.config.locale, Locale::Ru);
		assert_eq!(cli.config.session_ttl_days, 7);
	}

	#[test]
	fn zero_day_sessions_are_rejected() {
		let parsed = Cli::try_parse_from([
			"peer-wallet-auth",
			"--database-url",
			"postgres://x/y",
			"--session-ttl-days",
			"0",
		]);
		assert!(parsed.is_err());
	}
}
