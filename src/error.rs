// src/error.rs
use axum::{http::StatusCode, response::Html, response::IntoResponse};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Erro na base de dados de sessões: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Erro de variável de ambiente: {0}")]
    EnvVarError(#[from] std::env::VarError),

    #[error("Erro na sessão: {0}")]
    SessionError(String),

    #[error("Erro ao renderizar página: {0}")]
    RenderError(#[from] askama::Error),

    #[error("Erro ao gerar planilha: {0}")]
    PlanilhaError(#[from] rust_xlsxwriter::XlsxError),

    #[error("Erro interno inesperado")]
    InternalServerError,
}

// Como converter AppError numa resposta HTTP
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        // Loga o erro detalhado no servidor
        tracing::error!("Erro processado: {:?}", self);

        let (status, user_message) = match self {
            AppError::SqlxError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Erro ao aceder aos dados da sessão.")
            }
            AppError::EnvVarError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Erro de configuração.")
            }
            AppError::SessionError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Erro na gestão da sua sessão.")
            }
            AppError::RenderError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Erro ao carregar a página.")
            }
            AppError::PlanilhaError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Erro ao gerar a planilha de exportação.",
            ),
            AppError::InternalServerError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Retorna uma página HTML simples (ou poderia usar um template Askama de erro)
        (status, Html(format!(r#"
            <!DOCTYPE html><html><head><title>Erro</title><style>body{{font-family:sans-serif;}}</style></head>
            <body><h1>Erro {status_code}</h1><p>{message}</p><a href="javascript:history.back()">Voltar</a></body></html>
         "#, status_code=status.as_u16(), message=user_message))).into_response()
    }
}

// Tipo Result padrão para a aplicação
pub type AppResult<T = ()> = Result<T, AppError>;
