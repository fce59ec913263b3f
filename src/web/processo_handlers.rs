// src/web/processo_handlers.rs
use crate::{
    error::AppResult,
    gateway::portal::PortalProcessos,
    models::processo::{EtapaAtual, Impacto, NivelRisco, Objeto, Probabilidade, TipoContrato},
    services::{
        formulario_processo::{mensagem_envio, FormularioProcesso, MudancaCampo, PreparoEnvio},
        planilha, proveniencia,
        sessao,
        tabela::TabelaRegistros,
    },
    state::AppState,
    templates::{renderizar, PaginaFormularioProcesso, PaginaTabelaProcessos},
    web::mw_auth::SessaoAtual,
};
use axum::{
    extract::{ConnectInfo, Extension, Form, Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use std::net::SocketAddr;
use tower_sessions::Session;

// Mensagens de feedback vindas do redirect pós-envio (padrão PRG)
#[derive(Deserialize, Debug)]
pub struct FeedbackProcesso {
    sucesso: Option<String>,
    erro: Option<String>,
}

// Campos do formulário como chegam no POST. Tudo chega como texto;
// a conversão para os tipos do rascunho acontece em mudancas_do_form.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct ProcessoForm {
    nome_processo: String,
    objeto: String,
    tipo_contrato: String,
    etapa_atual: String,
    escolas_impactadas: String,
    estudantes_impactados: String,
    valor_total: String,
    valor_executado: String,
    data_ordem_servico: String,
    data_prazo_final: String,
    data_empenho: String,
    numero_empenho: String,
    nivel_risco: String,
    probabilidade: String,
    impacto: String,
    justificativa_risco: String,
}

/// Converte o POST na sequência de mudanças do redutor. Contagens que não
/// parseiam viram zero, igual ao que o formulário mostra num campo vazio.
fn mudancas_do_form(form: ProcessoForm) -> Vec<MudancaCampo> {
    vec![
        MudancaCampo::NomeProcesso(form.nome_processo),
        MudancaCampo::Objeto(Objeto::do_formulario(&form.objeto)),
        MudancaCampo::TipoContrato(TipoContrato::do_formulario(&form.tipo_contrato)),
        MudancaCampo::EtapaAtual(EtapaAtual::do_formulario(&form.etapa_atual)),
        MudancaCampo::EscolasImpactadas(form.escolas_impactadas.trim().parse().unwrap_or(0)),
        MudancaCampo::EstudantesImpactados(
            form.estudantes_impactados.trim().parse().unwrap_or(0),
        ),
        MudancaCampo::ValorTotal(form.valor_total),
        MudancaCampo::ValorExecutado(form.valor_executado),
        MudancaCampo::DataOrdemServico(form.data_ordem_servico),
        MudancaCampo::DataPrazoFinal(form.data_prazo_final),
        MudancaCampo::DataEmpenho(form.data_empenho),
        MudancaCampo::NumeroEmpenho(form.numero_empenho),
        MudancaCampo::NivelRisco(NivelRisco::do_formulario(&form.nivel_risco)),
        MudancaCampo::Probabilidade(Probabilidade::do_formulario(&form.probabilidade)),
        MudancaCampo::Impacto(Impacto::do_formulario(&form.impacto)),
        MudancaCampo::JustificativaRisco(form.justificativa_risco),
    ]
}

// GET /processos (formulário em branco, com feedback do redirect se houver)
pub async fn show_formulario(
    Extension(SessaoAtual(identidade)): Extension<SessaoAtual>,
    Query(params): Query<FeedbackProcesso>,
) -> AppResult<Response> {
    let maquina = FormularioProcesso::novo();
    let template = PaginaFormularioProcesso {
        sessao: identidade,
        rascunho: maquina.rascunho().clone(),
        erros: maquina.erros().clone(),
        sucesso: params.sucesso,
        erro: params.erro,
    };
    Ok(renderizar(&template)?.into_response())
}

// POST /processos
pub async fn handle_formulario(
    State(state): State<AppState>,
    Extension(SessaoAtual(identidade)): Extension<SessaoAtual>,
    session: Session,
    ConnectInfo(origem): ConnectInfo<SocketAddr>,
    cabecalhos: HeaderMap,
    Form(form): Form<ProcessoForm>,
) -> AppResult<Response> {
    // Um envio em voo por cliente; cliques repetidos são ignorados
    let chave = sessao::chave_envio("processo", &session, origem);
    let Some(_guarda) = state.travas.adquirir(&chave) else {
        tracing::debug!("Envio de processo ignorado: já existe um em andamento ({chave}).");
        return Ok(Redirect::to("/processos").into_response());
    };

    let agora = Utc::now();
    let mut maquina = FormularioProcesso::novo();
    for mudanca in mudancas_do_form(form) {
        maquina.aplicar(mudanca, agora);
    }

    match maquina.preparar_envio() {
        PreparoEnvio::Pronto => {
            let origem_pedido =
                proveniencia::coletar(&cabecalhos, origem, state.localizador.as_ref()).await;
            let payload = maquina.montar_payload(&origem_pedido);
            match state.portal.criar_processo(&payload).await {
                Ok(()) => {
                    maquina.concluir_envio(Ok(()));
                    tracing::info!("✅ Processo '{}' cadastrado.", payload.nome_processo);
                    let mensagem = urlencoding::encode("Processo cadastrado com sucesso!");
                    Ok(Redirect::to(&format!("/processos?sucesso={mensagem}")).into_response())
                }
                Err(erro) => {
                    let mensagem = mensagem_envio(&erro);
                    maquina.concluir_envio(Err(erro));
                    // Sem redirect: o rascunho preenchido volta para a tela
                    let template = PaginaFormularioProcesso {
                        sessao: identidade,
                        rascunho: maquina.rascunho().clone(),
                        erros: maquina.erros().clone(),
                        sucesso: None,
                        erro: Some(mensagem),
                    };
                    Ok(renderizar(&template)?.into_response())
                }
            }
        }
        PreparoEnvio::Invalido => {
            let template = PaginaFormularioProcesso {
                sessao: identidade,
                rascunho: maquina.rascunho().clone(),
                erros: maquina.erros().clone(),
                sucesso: None,
                erro: None,
            };
            Ok(renderizar(&template)?.into_response())
        }
        // Máquina recém-criada nunca tem envio em voo; quem barra repetição
        // entre requisições é a trava lá de cima
        PreparoEnvio::JaPendente => Ok(Redirect::to("/processos").into_response()),
    }
}

// GET /visualizar-processos (tabela com as mesmas colunas da planilha)
pub async fn show_tabela_processos(
    State(state): State<AppState>,
    Extension(SessaoAtual(identidade)): Extension<SessaoAtual>,
    Query(params): Query<FeedbackProcesso>,
) -> AppResult<Response> {
    tracing::debug!("GET /visualizar-processos: carregando registros do backend...");

    let mut tabela = TabelaRegistros::nova();
    tabela.concluir(state.portal.listar_processos().await);

    let mut template = PaginaTabelaProcessos::nova(identidade);
    template.erro_carga = tabela.erro().map(|mensagem| mensagem.to_string());
    template.linhas = tabela.registros().iter().map(planilha::linha_processo).collect();
    template.erro = params.erro;
    Ok(renderizar(&template)?.into_response())
}

// GET /visualizar-processos/exportar (gera o .xlsx e devolve como download)
pub async fn exportar_processos(State(state): State<AppState>) -> AppResult<Response> {
    match state.portal.listar_processos().await {
        Ok(processos) => {
            let tabela = planilha::montar_tabela(&processos);
            let bytes = planilha::gerar_xlsx(&tabela)?;
            tracing::info!("✅ Planilha exportada com {} processo(s).", processos.len());
            Ok((
                [
                    (
                        header::CONTENT_TYPE,
                        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                    ),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"processos.xlsx\"",
                    ),
                ],
                bytes,
            )
                .into_response())
        }
        Err(erro) => {
            tracing::warn!("Falha ao exportar processos: {erro}");
            let mensagem = urlencoding::encode(&erro.mensagem_usuario()).into_owned();
            Ok(Redirect::to(&format!("/visualizar-processos?erro={mensagem}")).into_response())
        }
    }
}
