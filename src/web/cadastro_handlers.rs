// src/web/cadastro_handlers.rs
use crate::{
    error::AppResult,
    gateway::portal::PortalUtilizadores,
    models::utilizador::Papel,
    services::{
        cadastro_utilizador::{
            mensagem_cadastro, CadastroUtilizador, MudancaCadastro, PreparoCadastro,
        },
        sessao,
    },
    state::AppState,
    templates::{renderizar, PaginaCadastroUtilizador},
    web::mw_auth::SessaoAtual,
};
use axum::{
    extract::{ConnectInfo, Extension, Form, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::net::SocketAddr;
use tower_sessions::Session;

#[derive(Deserialize, Debug)]
pub struct FeedbackCadastro {
    erro: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct CadastroForm {
    nome: String,
    sobrenome: String,
    email: String,
    data_nascimento: String,
    papel: String,
}

// GET /cadastrar-usuario
pub async fn show_cadastro(
    Extension(SessaoAtual(identidade)): Extension<SessaoAtual>,
    Query(params): Query<FeedbackCadastro>,
) -> AppResult<Response> {
    let maquina = CadastroUtilizador::novo();
    let template = PaginaCadastroUtilizador {
        sessao: identidade,
        rascunho: maquina.rascunho().clone(),
        erros: maquina.erros().clone(),
        erro: params.erro,
    };
    Ok(renderizar(&template)?.into_response())
}

// POST /cadastrar-usuario
pub async fn handle_cadastro(
    State(state): State<AppState>,
    Extension(SessaoAtual(identidade)): Extension<SessaoAtual>,
    session: Session,
    ConnectInfo(origem): ConnectInfo<SocketAddr>,
    Form(form): Form<CadastroForm>,
) -> AppResult<Response> {
    let chave = sessao::chave_envio("cadastro", &session, origem);
    let Some(_guarda) = state.travas.adquirir(&chave) else {
        tracing::debug!("Cadastro ignorado: já existe um em andamento ({chave}).");
        return Ok(Redirect::to("/cadastrar-usuario").into_response());
    };

    let mut maquina = CadastroUtilizador::novo();
    let mudancas = [
        MudancaCadastro::Nome(form.nome),
        MudancaCadastro::Sobrenome(form.sobrenome),
        MudancaCadastro::Email(form.email),
        MudancaCadastro::DataNascimento(form.data_nascimento),
        MudancaCadastro::Papel(Papel::from(form.papel)),
    ];
    for mudanca in mudancas {
        maquina.aplicar(mudanca);
    }

    match maquina.preparar_envio() {
        PreparoCadastro::Pronto => {
            let payload = maquina.montar_payload();
            match state.portal.registrar(&payload).await {
                Ok(()) => {
                    maquina.concluir_envio(Ok(()));
                    tracing::info!("✅ Utilizador '{}' cadastrado.", payload.nome);
                    // Depois do cadastro o fluxo volta para o formulário de processos
                    let mensagem = urlencoding::encode("Usuário cadastrado com sucesso!");
                    Ok(Redirect::to(&format!("/processos?sucesso={mensagem}")).into_response())
                }
                Err(erro) => {
                    let mensagem = mensagem_cadastro(&erro);
                    maquina.concluir_envio(Err(erro));
                    let template = PaginaCadastroUtilizador {
                        sessao: identidade,
                        rascunho: maquina.rascunho().clone(),
                        erros: maquina.erros().clone(),
                        erro: Some(mensagem),
                    };
                    Ok(renderizar(&template)?.into_response())
                }
            }
        }
        PreparoCadastro::Invalido => {
            let template = PaginaCadastroUtilizador {
                sessao: identidade,
                rascunho: maquina.rascunho().clone(),
                erros: maquina.erros().clone(),
                erro: None,
            };
            Ok(renderizar(&template)?.into_response())
        }
        PreparoCadastro::JaPendente => Ok(Redirect::to("/cadastrar-usuario").into_response()),
    }
}
