// src/web/mw_admin.rs
use crate::{
    error::AppError,           // Nosso tipo de erro
    services::sessao,          // Para a rota padrão de cada papel
    web::mw_auth::SessaoAtual, // Identidade posta nas extensões pelo require_auth
};
use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

/// Middleware que verifica se o utilizador logado tem papel de administrador.
/// Deve ser executado *depois* do middleware `require_auth`.
pub async fn require_admin(
    Extension(SessaoAtual(identidade)): Extension<SessaoAtual>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if identidade.admin() {
        tracing::debug!("Admin MW: acesso concedido para '{}'", identidade.nome);
        Ok(next.run(request).await)
    } else {
        // Quem não é admin volta para a sua página padrão, sem página de erro
        tracing::warn!(
            "Admin MW: acesso negado para '{}' (papel {}).",
            identidade.nome,
            identidade.papel.rotulo()
        );
        Ok(Redirect::to(sessao::rota_padrao(identidade.papel)).into_response())
    }
}
