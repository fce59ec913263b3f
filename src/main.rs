// src/main.rs

// --- Declaração dos Módulos ---
mod db;
mod error;
mod gateway;
mod models;
mod services;
mod state;
mod templates;
mod web;

// --- Imports ---
use crate::gateway::portal::{LocalizadorHttp, PortalHttp};
use crate::services::transferencia::TransferenciaSistema;
use crate::state::{AppState, TravaEnvios};
use axum::serve;
use std::sync::Arc;
use std::{env, net::SocketAddr};
use time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tower_sessions::{ExpiredDeletion, Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Configuração do Logging (Tracing) ---
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                env::var("RUST_LOG")
                    .unwrap_or_else(|_| {
                        "painel_renapeti=debug,tower_http=info,sqlx=warn,tower_sessions=info"
                            .into()
                    })
                    .into()
            }),
        )
        .with(fmt::layer())
        .init();

    tracing::info!("🚀 Iniciando servidor do Painel RENAPETI...");

    // --- Base de Dados Local (guarda apenas as sessões) ---
    let db_pool = match db::create_db_pool().await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("❌ Falha crítica ao inicializar a base de dados: {}", e);
            return Err(anyhow::anyhow!("Falha ao abrir a base de sessões: {}", e));
        }
    };

    // --- Configuração das Sessões ---
    let session_store = SqliteStore::new(db_pool.clone())
        .with_table_name("sessions")
        .map_err(|e| anyhow::anyhow!("Falha ao criar session store: {}", e))?;
    session_store
        .migrate()
        .await
        .map_err(|e| anyhow::anyhow!("Falha ao migrar a tabela de sessões: {}", e))?;

    // Clone o store para a task de limpeza
    let session_store_clone = session_store.clone();
    tokio::spawn(async move {
        if let Err(e) = session_store_clone
            .continuously_delete_expired(tokio::time::Duration::from_secs(60 * 60))
            .await
        {
            tracing::error!("Erro na task de limpeza de sessões: {:?}", e);
        }
    });
    tracing::info!("🧹 Tarefa de limpeza de sessões iniciada.");

    // Cria a camada de sessão
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::days(1)));

    tracing::info!("🔑 Camada de sessão configurada.");

    // --- Gateways para o Backend e a Localização ---
    let api_url = env::var("API_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let portal = PortalHttp::novo(&api_url)
        .map_err(|e| anyhow::anyhow!("Falha ao criar o cliente HTTP do backend: {}", e))?;
    tracing::info!("Backend configurado em {}", api_url);

    let url_localizacao =
        env::var("URL_LOCALIZACAO").unwrap_or_else(|_| "https://ipapi.co".to_string());
    let localizador = LocalizadorHttp::novo(&url_localizacao)
        .map_err(|e| anyhow::anyhow!("Falha ao criar o cliente de localização: {}", e))?;

    // --- Criação do Estado da Aplicação ---
    let app_state = AppState {
        portal: Arc::new(portal),
        localizador: Arc::new(localizador),
        transferencia: Arc::new(TransferenciaSistema),
        travas: TravaEnvios::default(),
    };

    // --- Configuração do Endereço e Listener ---
    let porta = match env::var("PORTA") {
        Ok(bruto) => match bruto.parse::<u16>() {
            Ok(porta) => porta,
            Err(_) => {
                tracing::warn!("⚠️ PORTA inválida ({bruto}), usando 3000.");
                3000
            }
        },
        Err(_) => 3000,
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], porta));
    tracing::info!("📡 Servidor escutando em http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("❌ Falha ao iniciar listener na porta {}: {}", porta, e);
            return Err(e.into());
        }
    };

    // --- Criação do Router e Aplicação das Camadas (Middlewares) ---
    tracing::info!("🛠️ Construindo router e aplicando middlewares...");
    let app = web::routes::create_router(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(session_layer),
    );
    tracing::info!("✅ Router e middlewares configurados.");

    // --- Início do Servidor ---
    // O connect info expõe o endereço do cliente para os handlers que
    // montam a chave de trava e a proveniência do envio
    tracing::info!("👂 Servidor pronto para aceitar conexões...");
    if let Err(e) = serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        tracing::error!("❌ Erro fatal no servidor: {}", e);
        return Err(e.into());
    }

    Ok(())
}
