// src/web/auth_handlers.rs
use crate::{
    error::AppResult,
    services::sessao::{self, DesfechoLogin},
    state::AppState,
    templates::{renderizar, PaginaLogin},
};
use axum::{
    extract::{ConnectInfo, Form, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::net::SocketAddr;
use tower_sessions::Session; // Importar Session para gestão de login

#[derive(Deserialize, Debug)]
pub struct LoginForm {
    pub email: String,
    pub senha: String,
}

#[derive(Deserialize, Debug)]
pub struct FeedbackLogin {
    erro: Option<String>,
}

// GET /login (se já está logado, vai direto para a página do papel)
pub async fn show_login(
    session: Session,
    Query(params): Query<FeedbackLogin>,
) -> AppResult<Response> {
    if let Some(identidade) = sessao::restaurar(&session).await? {
        tracing::debug!("GET /login: já logado, redirecionando para a página padrão");
        return Ok(Redirect::to(sessao::rota_padrao(identidade.papel)).into_response());
    }

    let template = PaginaLogin { erro: params.erro };
    Ok(renderizar(&template)?.into_response())
}

// POST /login (valida as credenciais no backend e abre a sessão)
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    ConnectInfo(origem): ConnectInfo<SocketAddr>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    tracing::info!("Tentativa de login para: {}", form.email);

    // Um login em voo por cliente de cada vez
    let chave = sessao::chave_envio("login", &session, origem);
    let Some(_guarda) = state.travas.adquirir(&chave) else {
        tracing::debug!("Login ignorado: já existe um em andamento ({chave}).");
        return Ok(Redirect::to("/login").into_response());
    };

    match sessao::autenticar(state.portal.as_ref(), &session, &form.email, &form.senha).await? {
        DesfechoLogin::Autenticado(identidade) => {
            Ok(Redirect::to(sessao::rota_padrao(identidade.papel)).into_response())
        }
        DesfechoLogin::Recusado(mensagem) => {
            // Renderiza novamente a página de login com a mensagem de erro
            let template = PaginaLogin {
                erro: Some(mensagem),
            };
            Ok(renderizar(&template)?.into_response())
        }
    }
}

// GET /logout
pub async fn handle_logout(session: Session) -> AppResult<Redirect> {
    let identidade = sessao::restaurar(&session).await.ok().flatten();

    // Apaga todos os dados da sessão atual (token e identidade juntos)
    sessao::encerrar(&session).await?;

    if let Some(identidade) = identidade {
        tracing::info!("🚪 Utilizador '{}' desligado.", identidade.nome);
    } else {
        tracing::info!("🚪 Sessão anónima desligada.");
    }

    // Redireciona para a página de login
    Ok(Redirect::to("/login"))
}

// GET / e qualquer rota desconhecida: cada um cai na sua página padrão
pub async fn rota_desconhecida(session: Session) -> AppResult<Redirect> {
    match sessao::restaurar(&session).await? {
        Some(identidade) => Ok(Redirect::to(sessao::rota_padrao(identidade.papel))),
        None => Ok(Redirect::to("/login")),
    }
}
