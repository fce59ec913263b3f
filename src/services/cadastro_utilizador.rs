// src/services/cadastro_utilizador.rs
//
// Máquina de estados do cadastro de utilizador (tela de administrador).
// Segue o mesmo desenho do formulário de processo: redutor puro para as
// mudanças de campo e envio em duas fases.
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

use crate::gateway::erro::ErroGateway;
use crate::models::utilizador::{Papel, RegistroPayload};
use crate::services::acao::EstadoAcao;

/// Rascunho da tela de cadastro. Nome e sobrenome já chegam aqui
/// normalizados pelo redutor.
#[derive(Debug, Clone, PartialEq)]
pub struct RascunhoCadastro {
    pub nome: String,
    pub sobrenome: String,
    pub email: String,
    pub data_nascimento: String,
    pub papel: Papel,
}

impl Default for RascunhoCadastro {
    fn default() -> Self {
        Self {
            nome: String::new(),
            sobrenome: String::new(),
            email: String::new(),
            data_nascimento: String::new(),
            papel: Papel::Usuario,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MudancaCadastro {
    Nome(String),
    Sobrenome(String),
    Email(String),
    DataNascimento(String),
    Papel(Papel),
}

/// Põe cada palavra em maiúscula inicial e o resto em minúsculas.
///
/// A divisão é por espaço simples, de propósito: "joão  da silva" tem um
/// token vazio entre os dois espaços e o resultado preserva o espaçamento
/// original ("João  Da Silva").
pub fn capitalizar_palavras(texto: &str) -> String {
    texto
        .split(' ')
        .map(|palavra| {
            let mut letras = palavra.chars();
            match letras.next() {
                Some(primeira) => {
                    let resto: String = letras.as_str().to_lowercase();
                    primeira.to_uppercase().chain(resto.chars()).collect()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn reduzir(mut rascunho: RascunhoCadastro, mudanca: MudancaCadastro) -> RascunhoCadastro {
    match mudanca {
        MudancaCadastro::Nome(valor) => rascunho.nome = capitalizar_palavras(&valor),
        MudancaCadastro::Sobrenome(valor) => rascunho.sobrenome = capitalizar_palavras(&valor),
        MudancaCadastro::Email(valor) => rascunho.email = valor,
        MudancaCadastro::DataNascimento(valor) => rascunho.data_nascimento = valor,
        MudancaCadastro::Papel(valor) => rascunho.papel = valor,
    }
    rascunho
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreparoCadastro {
    /// Validado; o payload está pronto para o POST.
    Pronto,
    Invalido,
    JaPendente,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CadastroUtilizador {
    rascunho: RascunhoCadastro,
    erros: BTreeMap<&'static str, String>,
    envio: EstadoAcao<(), String>,
}

impl Default for CadastroUtilizador {
    fn default() -> Self {
        Self::novo()
    }
}

impl CadastroUtilizador {
    pub fn novo() -> Self {
        Self {
            rascunho: RascunhoCadastro::default(),
            erros: BTreeMap::new(),
            envio: EstadoAcao::Ocioso,
        }
    }

    pub fn aplicar(&mut self, mudanca: MudancaCadastro) {
        self.rascunho = reduzir(self.rascunho.clone(), mudanca);
    }

    pub fn rascunho(&self) -> &RascunhoCadastro {
        &self.rascunho
    }

    pub fn erros(&self) -> &BTreeMap<&'static str, String> {
        &self.erros
    }

    pub fn envio(&self) -> &EstadoAcao<(), String> {
        &self.envio
    }

    /// A data de nascimento precisa ser legível porque o ano entra na senha
    /// derivada; aceitar qualquer texto geraria senhas como "SilvaNaN".
    pub fn validar(rascunho: &RascunhoCadastro) -> BTreeMap<&'static str, String> {
        let mut erros = BTreeMap::new();
        if rascunho.nome.trim().is_empty() {
            erros.insert("nome", "O nome é obrigatório.".to_string());
        }
        if rascunho.sobrenome.trim().is_empty() {
            erros.insert("sobrenome", "O sobrenome é obrigatório.".to_string());
        }
        if rascunho.email.trim().is_empty() {
            erros.insert("email", "O email é obrigatório.".to_string());
        }
        if rascunho.data_nascimento.trim().is_empty() {
            erros.insert("data_nascimento", "A data de nascimento é obrigatória.".to_string());
        } else if ano_de_nascimento(&rascunho.data_nascimento).is_none() {
            erros.insert("data_nascimento", "Data de nascimento inválida.".to_string());
        }
        erros
    }

    pub fn preparar_envio(&mut self) -> PreparoCadastro {
        if self.envio.em_curso() {
            tracing::debug!("Cadastro de utilizador ignorado: já existe um em andamento.");
            return PreparoCadastro::JaPendente;
        }
        self.erros = Self::validar(&self.rascunho);
        if !self.erros.is_empty() {
            return PreparoCadastro::Invalido;
        }
        self.envio = EstadoAcao::Pendente;
        PreparoCadastro::Pronto
    }

    /// Deriva o nome completo e a senha inicial (sobrenome + ano de
    /// nascimento) que o utilizador novo recebe.
    pub fn montar_payload(&self) -> RegistroPayload {
        let rascunho = &self.rascunho;
        let ano = ano_de_nascimento(&rascunho.data_nascimento).unwrap_or_default();
        RegistroPayload {
            nome: format!("{} {}", rascunho.nome, rascunho.sobrenome),
            email: rascunho.email.trim().to_string(),
            senha: format!("{}{}", rascunho.sobrenome, ano),
            papel: rascunho.papel,
        }
    }

    pub fn concluir_envio(&mut self, resultado: Result<(), ErroGateway>) {
        match resultado {
            Ok(()) => {
                self.rascunho = RascunhoCadastro::default();
                self.erros.clear();
                self.envio = EstadoAcao::Concluido(());
            }
            Err(erro) => {
                tracing::warn!("Falha no cadastro de utilizador: {erro}");
                self.envio = EstadoAcao::Falhou(mensagem_cadastro(&erro));
            }
        }
    }
}

pub fn mensagem_cadastro(erro: &ErroGateway) -> String {
    match erro {
        ErroGateway::Conexao(_) => "Erro ao enviar os dados.".to_string(),
        ErroGateway::Indisponivel { .. } => {
            "Servidor indisponível. Verifique o servidor do backend.".to_string()
        }
        outro => format!(
            "Erro ao cadastrar usuário: {}",
            outro.mensagem_backend().unwrap_or("Erro desconhecido")
        ),
    }
}

fn ano_de_nascimento(data: &str) -> Option<i32> {
    NaiveDate::parse_from_str(data.trim(), "%Y-%m-%d")
        .ok()
        .map(|d| d.year())
}
