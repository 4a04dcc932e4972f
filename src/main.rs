use crate::{
    conf::Conf,
    db::DbPool,
    model::ApiError,
    repository::{AnnotationRepository, TextRepository, UserRepository},
    serializer::LoginData,
};
use anyhow::{anyhow, Result};
use rocket::{catch, catchers, http::Status, routes, Build, Request, Rocket};
use std::{env, process::exit};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod conf;
mod controller;
mod db;
mod model;
mod repository;
mod serializer;
mod service;
mod token;

#[rocket::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|it| it.as_str()).unwrap_or("serve");

    let conf = Conf::new().unwrap_or_else(|e| {
        error!(%e, "Failed to load configuration");
        exit(1);
    });

    let res = match command {
        "serve" => serve(conf).await,
        "db" => db::cli(&args[2..], &conf),
        "user" => user_cli(&args[2..], &conf),
        _ => Err(anyhow!("Unknown command: {}", command)),
    };

    if let Err(e) = res {
        error!(%e, ?args, "Command failed");
        exit(1);
    }
}

async fn serve(conf: Conf) -> Result<()> {
    let pool = db::pool(&conf.db_url)?;
    db::migrate_to_latest(&mut *pool.get()?, &conf.migrations)?;
    if conf.uses_embedded_secret()? {
        warn!("Signing tokens with the default secret, set ANNOTATOR_TOKEN__SECRET");
    }
    info!(db_url = %conf.db_url, "Starting server");
    prepare(rocket::build(), &conf, pool)
        .launch()
        .await
        .map_err(|e| anyhow!("Server failed: {}", e))?;
    Ok(())
}

fn user_cli(args: &[String], conf: &Conf) -> Result<()> {
    match args {
        [command, username, password] if command == "add" => {
            let pool = db::pool(&conf.db_url)?;
            db::migrate_to_latest(&mut *pool.get()?, &conf.migrations)?;
            let data = LoginData {
                username: username.clone(),
                password: password.clone(),
            };
            service::user::register(&data, &UserRepository::new(pool))?;
            Ok(())
        }
        _ => Err(anyhow!("Usage: user add <username> <password>")),
    }
}

pub fn prepare(rocket: Rocket<Build>, conf: &Conf, pool: DbPool) -> Rocket<Build> {
    rocket
        .mount(
            "/api",
            routes![
                controller::text::list,
                controller::text::post,
                controller::text::get,
                controller::text::put,
                controller::text::patch,
                controller::text::delete,
                controller::annotation::list,
                controller::annotation::post,
                controller::annotation::get,
                controller::annotation::put,
                controller::annotation::patch,
                controller::annotation::delete,
                controller::login::login,
                controller::login::register,
                controller::token::post,
                controller::token::refresh,
            ],
        )
        .register("/", catchers![error])
        .manage(TextRepository::new(pool.clone()))
        .manage(AnnotationRepository::new(pool.clone()))
        .manage(UserRepository::new(pool))
        .manage(conf.token.clone())
}

#[catch(default)]
fn error(status: Status, req: &Request) -> ApiError {
    ApiError::custom(status.code, &format!("Failed to handle URI {}", req.uri()))
}
