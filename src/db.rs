// src/db.rs
use crate::error::AppResult;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration; // Usar std::time::Duration aqui

// A base de dados local guarda apenas as sessões; os dados de negócio
// vivem no backend remoto.
pub async fn create_db_pool() -> AppResult<SqlitePool> {
    let database_url = std::env::var("BANCO_SESSOES")
        .unwrap_or_else(|_| "sqlite://sessoes.db".to_string());

    tracing::info!("Ligando à base de dados de sessões: {}", database_url);

    // Opções de conexão (criar se não existir, timeout)
    let options = SqliteConnectOptions::from_str(&database_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5));

    // Cria o pool (conjunto de conexões reutilizáveis)
    let pool = SqlitePoolOptions::new()
        .max_connections(5) // Número máximo de conexões simultâneas
        .connect_with(options)
        .await?; // Conecta e retorna erro se falhar

    Ok(pool)
}
