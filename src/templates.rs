// src/templates.rs
use askama::Template; // Trait necessário para Askama
use axum::response::Html;
use std::collections::BTreeMap;

use crate::error::{AppError, AppResult};
use crate::models::processo::{
    EtapaAtual, Impacto, NivelRisco, Objeto, Probabilidade, RascunhoProcesso, TipoContrato,
};
use crate::models::utilizador::{Identidade, Utilizador};
use crate::services::cadastro_utilizador::RascunhoCadastro;
use crate::services::planilha::CABECALHOS_PROCESSOS;

/// Renderiza o template e converte a falha no erro da aplicação, com log.
pub fn renderizar<T: Template>(template: &T) -> AppResult<Html<String>> {
    match template.render() {
        Ok(html) => Ok(Html(html)),
        Err(e) => {
            tracing::error!("Falha ao renderizar template: {}", e);
            Err(AppError::RenderError(e))
        }
    }
}

// Struct para o template `login.html` (página sem cabeçalho)
#[derive(Template)]
#[template(path = "login.html")]
pub struct PaginaLogin {
    // Campo opcional para passar uma mensagem de erro para o template
    pub erro: Option<String>,
}

#[derive(Template)]
#[template(path = "formulario_processo.html")]
pub struct PaginaFormularioProcesso {
    pub sessao: Identidade,
    pub rascunho: RascunhoProcesso,
    // Erros de validação por campo, na ordem estável do mapa
    pub erros: BTreeMap<&'static str, String>,
    pub sucesso: Option<String>,
    pub erro: Option<String>,
}

impl PaginaFormularioProcesso {
    pub fn erro_campo(&self, campo: &str) -> Option<&String> {
        self.erros.get(campo)
    }

    // Listas de opções dos selects, na ordem em que aparecem na tela
    pub fn objetos(&self) -> &'static [Objeto] {
        &Objeto::TODOS
    }

    pub fn tipos_contrato(&self) -> &'static [TipoContrato] {
        &TipoContrato::TODOS
    }

    pub fn etapas(&self) -> &'static [EtapaAtual] {
        &EtapaAtual::TODAS
    }

    pub fn niveis_risco(&self) -> &'static [NivelRisco] {
        &NivelRisco::TODOS
    }

    pub fn probabilidades(&self) -> &'static [Probabilidade] {
        &Probabilidade::TODAS
    }

    pub fn impactos(&self) -> &'static [Impacto] {
        &Impacto::TODOS
    }

    // Rótulo da opção marcada no rascunho, vazio quando nenhuma
    pub fn objeto_atual(&self) -> &'static str {
        self.rascunho.objeto.map(|o| o.rotulo()).unwrap_or("")
    }

    pub fn contrato_atual(&self) -> &'static str {
        self.rascunho.tipo_contrato.map(|t| t.rotulo()).unwrap_or("")
    }

    pub fn etapa_selecionada(&self) -> &'static str {
        self.rascunho.etapa_atual.map(|e| e.rotulo()).unwrap_or("")
    }

    pub fn risco_atual(&self) -> &'static str {
        self.rascunho.nivel_risco.map(|n| n.rotulo()).unwrap_or("")
    }

    pub fn probabilidade_atual(&self) -> &'static str {
        self.rascunho.probabilidade.map(|p| p.rotulo()).unwrap_or("")
    }

    pub fn impacto_atual(&self) -> &'static str {
        self.rascunho.impacto.map(|i| i.rotulo()).unwrap_or("")
    }

    pub fn percentual_formatado(&self) -> String {
        format!("{:.2}", self.rascunho.percentual_execucao)
    }
}

#[derive(Template)]
#[template(path = "tabela_processos.html")]
pub struct PaginaTabelaProcessos {
    pub sessao: Identidade,
    // Mensagem quando a carga falhou; a tabela sai vazia nesse caso
    pub erro_carga: Option<String>,
    pub cabecalhos: &'static [&'static str],
    pub linhas: Vec<Vec<String>>,
    pub erro: Option<String>,
}

impl PaginaTabelaProcessos {
    pub fn nova(sessao: Identidade) -> Self {
        Self {
            sessao,
            erro_carga: None,
            cabecalhos: &CABECALHOS_PROCESSOS,
            linhas: Vec::new(),
            erro: None,
        }
    }
}

#[derive(Template)]
#[template(path = "tabela_usuarios.html")]
pub struct PaginaTabelaUtilizadores {
    pub sessao: Identidade,
    pub erro_carga: Option<String>,
    pub utilizadores: Vec<Utilizador>,
    // Feedback das ações de alterar senha / deletar (query string)
    pub sucesso: Option<String>,
    pub erro: Option<String>,
    pub aviso: Option<String>,
}

#[derive(Template)]
#[template(path = "cadastrar_usuario.html")]
pub struct PaginaCadastroUtilizador {
    pub sessao: Identidade,
    pub rascunho: RascunhoCadastro,
    pub erros: BTreeMap<&'static str, String>,
    pub erro: Option<String>,
}

impl PaginaCadastroUtilizador {
    pub fn erro_campo(&self, campo: &str) -> Option<&String> {
        self.erros.get(campo)
    }
}

#[derive(Template)]
#[template(path = "confirmar_exclusao.html")]
pub struct PaginaConfirmarExclusao {
    pub sessao: Identidade,
    pub id: i64,
}
