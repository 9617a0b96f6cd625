mod catalog;
mod config;
mod credentials;
mod database;
mod error;
mod model;
mod query;
mod routes;
mod watched;

use actix_identity::{CookieIdentityPolicy, IdentityService};
use actix_web::{middleware::Logger, web, App, HttpServer};
use config::Config;
use log::info;
use routes::AppState;
use std::io;

#[actix_rt::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("cinematch=debug,actix_web=info"),
    )
    .init();

    let config =
        Config::from_env().map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    let tera = routes::templates().map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    let tera = web::Data::new(tera);
    let state = web::Data::new(AppState::open(&config));
    let session_key = config.cookie_key();

    info!("Listening on {}", config.bind_address);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(IdentityService::new(
                CookieIdentityPolicy::new(&session_key)
                    .name("auth-cookie")
                    .secure(false),
            ))
            .app_data(tera.clone())
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind(config.bind_address.as_str())?
    .run()
    .await
}
