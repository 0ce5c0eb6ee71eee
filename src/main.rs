mod config;
mod constants;
mod db;
mod envelope;
mod errors;
mod handler;
mod midware;
mod models;
mod password;
mod repo;
mod schema;
#[cfg(test)]
mod tests;
mod user_routes;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use config::{Cli, Command, Config};
use env_logger::Env;
use envelope::Envelope;
use handler::UserHandler;
use repo::UserRepo;
use std::{io::Read, sync::Arc};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
	dotenvy::dotenv().ok();
	env_logger::init_from_env(Env::default().default_filter_or("info"));
	let cli = Cli::parse();

	let pool = db::get_db_pool(&cli.config.database_url, cli.config.pool_size)
		.context("unable to build the database pool")?;

	match cli.command.unwrap_or(Command::Serve) {
		Command::InitSchema => {
			db::init(&pool).context("unable to initialize the schema")?;
			Ok(())
		},
		Command::Invoke => invoke(build_handler(pool, &cli.config)),
		Command::Serve => serve(build_handler(pool, &cli.config), &cli.config.socket_url).await,
	}
}

fn build_handler(pool: db::DbPool, config: &Config) -> UserHandler {
	UserHandler::new(Arc::new(UserRepo::new(pool)), config.handler_settings())
}

fn invoke(handler: UserHandler) -> anyhow::Result<()> {
	let mut input = String::new();
	std::io::stdin().read_to_string(&mut input).context("unable to read stdin")?;
	let envelope: Envelope = serde_json::from_str(&input).context("stdin is not a request envelope")?;
	let reply = handler.handle(envelope);
	println!("{}", serde_json::to_string(&reply)?);
	Ok(())
}

async fn serve(handler: UserHandler, socket_url: &str) -> anyhow::Result<()> {
	let handler = web::Data::new(handler);
	log::info!("Listening on: {}..", socket_url);

	HttpServer::new(move || {
		App::new()
			.app_data(handler.clone())
			.wrap(actix_web::middleware::Logger::default())
			.configure(user_routes::init)
	})
	.bind(socket_url)
	.with_context(|| format!("unable to bind {socket_url}"))?
	.run()
	.await?;
	Ok(())
}
