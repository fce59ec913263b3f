// src/web/usuarios_handlers.rs
use crate::{
    error::AppResult,
    services::painel_usuarios::{PainelUsuarios, RotacaoSenha},
    state::AppState,
    templates::{renderizar, PaginaConfirmarExclusao, PaginaTabelaUtilizadores},
    web::mw_auth::SessaoAtual,
};
use axum::{
    extract::{Extension, Form, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct FeedbackUsuarios {
    sucesso: Option<String>,
    erro: Option<String>,
    aviso: Option<String>,
}

// GET /visualizar-usuarios
pub async fn show_usuarios(
    State(state): State<AppState>,
    Extension(SessaoAtual(identidade)): Extension<SessaoAtual>,
    Query(params): Query<FeedbackUsuarios>,
) -> AppResult<Response> {
    tracing::debug!("GET /visualizar-usuarios: carregando utilizadores do backend...");

    let mut painel = PainelUsuarios::novo();
    painel.carregar(state.portal.as_ref()).await;

    let template = PaginaTabelaUtilizadores {
        sessao: identidade,
        erro_carga: painel.erro().map(|mensagem| mensagem.to_string()),
        utilizadores: painel.utilizadores().to_vec(),
        sucesso: params.sucesso,
        erro: params.erro,
        aviso: params.aviso,
    };
    Ok(renderizar(&template)?.into_response())
}

// POST /visualizar-usuarios/{id}/alterar-senha
pub async fn handle_alterar_senha(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Redirect> {
    let painel = PainelUsuarios::novo();
    let rotacao = painel
        .rotacionar_senha(state.portal.as_ref(), state.transferencia.as_ref(), id)
        .await;

    let destino = match rotacao {
        Ok(RotacaoSenha::Copiada) => {
            let mensagem = urlencoding::encode(
                "Senha alterada com sucesso! Copiada para a área de transferência (Ctrl+V).",
            );
            format!("/visualizar-usuarios?sucesso={mensagem}")
        }
        Ok(RotacaoSenha::CopiaIndisponivel) => {
            let mensagem = urlencoding::encode(
                "Senha alterada com sucesso, mas não foi possível copiar para o clipboard.",
            );
            format!("/visualizar-usuarios?aviso={mensagem}")
        }
        Err(mensagem) => {
            format!("/visualizar-usuarios?erro={}", urlencoding::encode(&mensagem))
        }
    };
    Ok(Redirect::to(&destino))
}

// GET /visualizar-usuarios/{id}/deletar (tela de confirmação)
pub async fn show_confirmar_exclusao(
    Extension(SessaoAtual(identidade)): Extension<SessaoAtual>,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let template = PaginaConfirmarExclusao {
        sessao: identidade,
        id,
    };
    Ok(renderizar(&template)?.into_response())
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct ConfirmacaoForm {
    confirmado: String,
}

// POST /visualizar-usuarios/{id}/deletar
pub async fn handle_deletar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<ConfirmacaoForm>,
) -> AppResult<Redirect> {
    let confirmado = form.confirmado == "sim";
    let mut painel = PainelUsuarios::novo();

    let destino = match painel.deletar(state.portal.as_ref(), id, confirmado).await {
        Ok(true) => {
            let mensagem = urlencoding::encode("Usuário deletado com sucesso!");
            format!("/visualizar-usuarios?sucesso={mensagem}")
        }
        // POST sem confirmação não apaga nada, só volta para a tabela
        Ok(false) => "/visualizar-usuarios".to_string(),
        Err(mensagem) => {
            format!("/visualizar-usuarios?erro={}", urlencoding::encode(&mensagem))
        }
    };
    Ok(Redirect::to(&destino))
}
