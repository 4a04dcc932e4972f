use anyhow::{anyhow, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::{
    env,
    path::{Path, PathBuf},
};

static DEFAULT_CONF: &str = include_str!("../annotator.conf");

#[derive(Clone, Deserialize)]
pub struct Conf {
    pub db_url: String,
    pub token: TokenConf,
    pub migrations: Vec<Migration>,
}

#[derive(Clone, Deserialize)]
pub struct TokenConf {
    pub secret: String,
    pub access_lifetime_secs: i64,
    pub refresh_lifetime_secs: i64,
}

#[derive(Clone, Deserialize)]
pub struct Migration {
    pub version: i16,
    pub up: String,
    pub down: String,
}

impl Conf {
    pub fn new() -> Result<Conf> {
        let custom_conf_path = data_dir()?.join("annotator.conf");
        let figment = Figment::new()
            .merge(Toml::string(DEFAULT_CONF))
            .merge(Toml::file(custom_conf_path));
        Conf::extract(figment)
    }

    /// Built-in defaults only, ignoring the data dir and the environment.
    pub fn embedded() -> Result<Conf> {
        Ok(Figment::new().merge(Toml::string(DEFAULT_CONF)).extract()?)
    }

    /// True when tokens would be signed with the secret shipped in the
    /// embedded config.
    pub fn uses_embedded_secret(&self) -> Result<bool> {
        Ok(self.token.secret == Conf::embedded()?.token.secret)
    }

    fn extract(figment: Figment) -> Result<Conf> {
        let conf: Conf = figment
            .merge(Env::prefixed("ANNOTATOR_").split("__"))
            .extract()?;
        Ok(conf)
    }
}

fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = env::var("DATA_DIR") {
        return Ok(Path::new(&dir).to_path_buf());
    }

    dirs::data_dir()
        .map(|dir| dir.join("annotator"))
        .ok_or_else(|| anyhow!("Can't locate data dir, set DATA_DIR explicitly"))
}
