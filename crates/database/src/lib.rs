use std::{error::Error, str::FromStr};

use async_trait::async_trait;
use model::Region;
use regions::database::{
    Database, DatabaseAutocommit, RegionRecord, RegionRepo, Result,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use utility::id::Id;

pub mod data_model;
pub mod queries;

/// A file in the working directory, created on first start.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://regions.db";

pub struct DatabaseConnectionInfo {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConnectionInfo {
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            max_connections: 4,
        }
    }

    /// A private database that lives as long as the pool. Every connection to
    /// `sqlite::memory:` opens a new empty database, so the pool is limited to
    /// one connection that is never recycled.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_owned(),
            max_connections: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqliteDatabase {
    connection: SqlitePool,
}

pub struct SqliteDatabaseAutocommit {
    pool: SqlitePool,
}

impl DatabaseAutocommit for SqliteDatabaseAutocommit {}

impl SqliteDatabase {
    pub async fn connect(
        database_connection_info: DatabaseConnectionInfo,
    ) -> std::result::Result<Self, Box<dyn Error>> {
        let options = SqliteConnectOptions::from_str(&database_connection_info.url)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(database_connection_info.max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        log::info!("connected to {}", database_connection_info.url);

        Ok(Self { connection: pool })
    }
}

impl Database for SqliteDatabase {
    type Autocommit = SqliteDatabaseAutocommit;

    fn auto(&self) -> Self::Autocommit {
        SqliteDatabaseAutocommit {
            pool: self.connection.clone(),
        }
    }
}

#[async_trait]
impl RegionRepo for SqliteDatabaseAutocommit {
    async fn list_regions(&mut self) -> Result<Vec<RegionRecord>> {
        queries::region::get_all(&self.pool).await
    }

    async fn save_region(&mut self, record: RegionRecord) -> Result<()> {
        queries::region::put(&self.pool, record).await
    }

    async fn delete_region(&mut self, id: Id<Region>) -> Result<()> {
        queries::region::delete(&self.pool, id).await
    }

    async fn delete_all(&mut self) -> Result<()> {
        queries::region::delete_all(&self.pool).await
    }
}
