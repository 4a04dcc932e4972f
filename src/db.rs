use crate::conf::{Conf, Migration};
use anyhow::{anyhow, bail, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::fs::remove_file;
use tracing::{info, warn};

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Debug)]
pub enum DbVersion {
    Specific(i16),
    Latest,
}

pub fn cli(args: &[String], conf: &Conf) -> Result<()> {
    let first_arg = args.first().ok_or_else(|| anyhow!("No args provided"))?;

    match first_arg.as_str() {
        "drop" => drop(conf),
        "migrate" => {
            let version = match args.get(1) {
                Some(version) => DbVersion::Specific(version.parse::<i16>()?),
                None => DbVersion::Latest,
            };
            let pool = pool(&conf.db_url)?;
            migrate(&mut *pool.get()?, &conf.migrations, version)
        }
        _ => bail!("Unknown argument: {}", first_arg),
    }
}

fn drop(conf: &Conf) -> Result<()> {
    warn!("Dropping database...");
    info!(db_url = %conf.db_url);
    remove_file(&conf.db_url)?;
    warn!("Database has been dropped");
    Ok(())
}

pub fn migrate_to_latest(conn: &mut Connection, migrations: &[Migration]) -> Result<()> {
    migrate(conn, migrations, DbVersion::Latest)
}

pub fn migrate(
    conn: &mut Connection,
    migrations: &[Migration],
    target_version: DbVersion,
) -> Result<()> {
    let current_version = schema_version(conn)?;
    info!(?current_version, ?target_version, "Migrating db schema");
    info!(count = migrations.len(), "Loaded migrations");

    let target_version = match target_version {
        DbVersion::Latest => migrations
            .iter()
            .map(|it| it.version)
            .max()
            .ok_or_else(|| anyhow!("No migrations configured"))?,
        DbVersion::Specific(v) => v,
    };

    if current_version == target_version {
        info!("Schema is up to date");
    } else if current_version < target_version {
        info!("Schema is outdated, updating...");
        let pending: Vec<&Migration> = migrations
            .iter()
            .filter(|it| it.version > current_version && it.version <= target_version)
            .collect();
        warn!(count = pending.len(), "Found pending migrations");
        for migr in pending {
            info!(%migr.version, sql = migr.up.trim(), "Updating schema");
            let tx = conn.transaction()?;
            tx.execute_batch(&migr.up)?;
            tx.execute_batch(&format!("PRAGMA user_version={}", migr.version))?;
            tx.commit()?;
        }
    } else {
        info!("Downgrading the schema...");
        let pending: Vec<&Migration> = migrations
            .iter()
            .filter(|it| it.version > target_version && it.version <= current_version)
            .collect();
        warn!(count = pending.len(), "Found pending migrations");
        for migr in pending.iter().rev() {
            info!(
                from = migr.version,
                to = migr.version - 1,
                sql = migr.down.trim(),
                "Downgrading schema"
            );
            let tx = conn.transaction()?;
            tx.execute_batch(&migr.down)?;
            tx.execute_batch(&format!("PRAGMA user_version={}", migr.version - 1))?;
            tx.commit()?;
        }
    }

    Ok(())
}

pub fn pool(db_url: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(db_url)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
    Ok(Pool::new(manager)?)
}

pub fn schema_version(conn: &Connection) -> rusqlite::Result<i16> {
    conn.query_row("SELECT user_version FROM pragma_user_version", [], |row| {
        row.get(0)
    })
}
