//! Table extractor backed by tokio-postgres

use super::column::{decode_row, select_list};
use crate::config::DatabaseConfig;
use crate::etl::Extractor;
use crate::record::Record;
use eyre::{Result, WrapErr, eyre};
use tokio_postgres::{Client, NoTls, Statement};

/// Extractor that reads every row of one table
///
/// Each extraction opens its own connection and closes it before returning,
/// whether the query succeeded or not. Rows come back in whatever order the
/// database yields them.
pub struct PostgresExtractor {
    config: DatabaseConfig,
}

impl PostgresExtractor {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    /// The `SELECT` issued against the configured table
    pub fn query(&self) -> Result<String> {
        Ok(format!("SELECT * FROM {}", quote_table(&self.config.table)?))
    }

    fn connect_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.config.host)
            .port(self.config.port)
            .dbname(&self.config.dbname)
            .user(&self.config.user)
            .application_name(env!("CARGO_PKG_NAME"));
        if !self.config.password.is_empty() {
            config.password(&self.config.password);
        }
        config
    }
}

impl Extractor for PostgresExtractor {
    type Item = Record;

    async fn extract(&self) -> Result<Vec<Self::Item>> {
        let query = self.query()?;

        log::debug!(
            "Connecting to database {} at {}:{}...",
            self.config.dbname,
            self.config.host,
            self.config.port
        );
        let (client, connection) = self
            .connect_config()
            .connect(NoTls)
            .await
            .wrap_err_with(|| {
                format!(
                    "Failed to connect to database {} at {}:{}",
                    self.config.dbname, self.config.host, self.config.port
                )
            })?;

        let connection = tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::warn!("Database connection closed with error: {}", e);
            }
        });

        let result = fetch_records(&client, &query, &self.config.table).await;

        // Dropping the client ends the connection task
        drop(client);
        if let Err(e) = connection.await {
            log::warn!("Database connection task failed: {}", e);
        }

        let records = result?;
        log::debug!("Retrieved {} rows from {}", records.len(), self.config.table);
        Ok(records)
    }
}

async fn fetch_records(client: &Client, query: &str, table: &str) -> Result<Vec<Record>> {
    let mut statement = prepare(client, query).await?;

    // Columns without a binary decoder are read through their text output
    if let Some(list) = select_list(statement.columns()) {
        let query = format!("SELECT {} FROM {}", list, quote_table(table)?);
        statement = prepare(client, &query).await?;
    }

    let rows = client
        .query(&statement, &[])
        .await
        .wrap_err_with(|| format!("Failed to execute query: {}", query))?;

    rows.iter().map(decode_row).collect()
}

async fn prepare(client: &Client, query: &str) -> Result<Statement> {
    log::debug!("Preparing query: {}", query);
    client
        .prepare(query)
        .await
        .wrap_err_with(|| format!("Failed to prepare query: {}", query))
}

/// Quote a table name, optionally schema-qualified, as Postgres identifiers
///
/// ```
/// use pg_ftp_export::postgres::quote_table;
///
/// assert_eq!(quote_table("users").unwrap(), r#""users""#);
/// assert_eq!(quote_table("audit.users").unwrap(), r#""audit"."users""#);
/// ```
pub fn quote_table(table: &str) -> Result<String> {
    let parts: Vec<&str> = table.split('.').collect();
    if parts.len() > 2 || parts.iter().any(|part| part.is_empty()) {
        return Err(eyre!("Invalid table name: {:?}", table));
    }
    Ok(parts
        .iter()
        .map(|part| quote_identifier(part))
        .collect::<Vec<_>>()
        .join("."))
}

/// Quote a single identifier, doubling embedded quotes
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
