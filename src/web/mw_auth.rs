// src/web/mw_auth.rs
use crate::error::AppError; // Nosso tipo de erro
use crate::models::utilizador::Identidade;
use crate::services::sessao;
use axum::{
    extract::Request, // Usar Request em vez de Parts para ter extensões
    middleware::Next, // Para chamar o próximo handler/middleware
    response::{IntoResponse, Redirect, Response}, // Tipos de resposta
};
use tower_sessions::Session; // Para aceder à sessão

// Middleware que verifica se o utilizador está logado
pub async fn require_auth(
    session: Session,     // Extrai a sessão atual
    mut request: Request, // A requisição original (mutável para adicionar extensões)
    next: Next,           // O próximo passo
) -> Result<Response, AppError> {
    // Tenta recuperar a identidade persistida; valor corrompido conta
    // como sessão anónima e já foi descartado pelo serviço
    match sessao::restaurar(&session).await? {
        Some(identidade) => {
            tracing::debug!(
                "Autenticação MW: '{}' autenticado. Prosseguindo...",
                identidade.nome
            );

            // Adiciona a identidade às extensões da requisição para que os
            // handlers protegidos (e o mw_admin) possam aceder sem reler a sessão
            request.extensions_mut().insert(SessaoAtual(identidade));

            // Chama o próximo middleware ou o handler final e retorna a sua resposta
            Ok(next.run(request).await)
        }
        None => {
            tracing::debug!("Autenticação MW: não autenticado. Redirecionando para /login");
            Ok(Redirect::to("/login").into_response())
        }
    }
}

// Identidade do utilizador logado, posta nas extensões da requisição
#[derive(Clone, Debug)]
pub struct SessaoAtual(pub Identidade);
