// src/gateway/portal.rs
//
// Cliente HTTP do backend de dados. Todo o tráfego do painel passa por aqui;
// os serviços só conhecem os traits, o que permite testá-los com stubs.
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::gateway::erro::{classificar_status, erro_transporte, ErroGateway};
use crate::models::processo::{ProcessoPayload, ProcessoRegistro};
use crate::models::utilizador::{RegistroPayload, SessaoAberta, Utilizador};

const TEMPO_LIMITE_BACKEND: Duration = Duration::from_secs(30);
const TEMPO_LIMITE_LOCALIZACAO: Duration = Duration::from_secs(5);

// --- Portas usadas pelos serviços ---

#[async_trait]
pub trait PortalUtilizadores: Send + Sync {
    async fn login(&self, email: &str, senha: &str) -> Result<SessaoAberta, ErroGateway>;
    async fn registrar(&self, pedido: &RegistroPayload) -> Result<(), ErroGateway>;
    async fn listar_utilizadores(&self) -> Result<Vec<Utilizador>, ErroGateway>;
    async fn alterar_senha(&self, id: i64, nova_senha: &str) -> Result<(), ErroGateway>;
    async fn deletar_utilizador(&self, id: i64) -> Result<(), ErroGateway>;
}

#[async_trait]
pub trait PortalProcessos: Send + Sync {
    async fn listar_processos(&self) -> Result<Vec<ProcessoRegistro>, ErroGateway>;
    async fn criar_processo(&self, payload: &ProcessoPayload) -> Result<(), ErroGateway>;
}

/// Resolve um endereço IP para um texto "Cidade, Região".
#[async_trait]
pub trait Localizador: Send + Sync {
    async fn localizar(&self, ip: &str) -> Result<String, ErroGateway>;
}

// --- Implementação HTTP ---

#[derive(Debug, Clone)]
pub struct PortalHttp {
    cliente: Client,
    base: String,
}

impl PortalHttp {
    pub fn novo(base: &str) -> Result<Self, reqwest::Error> {
        let cliente = Client::builder().timeout(TEMPO_LIMITE_BACKEND).build()?;
        Ok(Self {
            cliente,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, caminho: &str) -> String {
        format!("{}{}", self.base, caminho)
    }

    /// Dispara a requisição e devolve o corpo quando o status é de sucesso.
    /// Status de erro são classificados antes de voltar ao chamador.
    async fn corpo_ok(
        &self,
        pedido: reqwest::RequestBuilder,
    ) -> Result<(StatusCode, Vec<u8>), ErroGateway> {
        let resposta = pedido.send().await.map_err(|e| erro_transporte(&e))?;
        let status = resposta.status();
        let corpo = resposta
            .bytes()
            .await
            .map_err(|e| erro_transporte(&e))?
            .to_vec();
        if !status.is_success() {
            return Err(classificar_status(status, &corpo));
        }
        Ok((status, corpo))
    }
}

#[async_trait]
impl PortalUtilizadores for PortalHttp {
    async fn login(&self, email: &str, senha: &str) -> Result<SessaoAberta, ErroGateway> {
        let pedido = self
            .cliente
            .post(self.url("/users/login"))
            .json(&serde_json::json!({ "email": email, "password": senha }));
        let (_, corpo) = self.corpo_ok(pedido).await?;
        extrair_sessao(&corpo)
    }

    async fn registrar(&self, pedido: &RegistroPayload) -> Result<(), ErroGateway> {
        let pedido = self.cliente.post(self.url("/users/register")).json(pedido);
        self.corpo_ok(pedido).await?;
        Ok(())
    }

    async fn listar_utilizadores(&self) -> Result<Vec<Utilizador>, ErroGateway> {
        let pedido = self.cliente.get(self.url("/users"));
        let (_, corpo) = self.corpo_ok(pedido).await?;
        extrair_utilizadores(&corpo)
    }

    async fn alterar_senha(&self, id: i64, nova_senha: &str) -> Result<(), ErroGateway> {
        let pedido = self
            .cliente
            .put(self.url(&format!("/users/{id}")))
            .json(&serde_json::json!({ "password": nova_senha }));
        self.corpo_ok(pedido).await?;
        Ok(())
    }

    async fn deletar_utilizador(&self, id: i64) -> Result<(), ErroGateway> {
        let pedido = self.cliente.delete(self.url(&format!("/users/{id}")));
        self.corpo_ok(pedido).await?;
        Ok(())
    }
}

#[async_trait]
impl PortalProcessos for PortalHttp {
    async fn listar_processos(&self) -> Result<Vec<ProcessoRegistro>, ErroGateway> {
        let pedido = self.cliente.get(self.url("/processos"));
        let (_, corpo) = self.corpo_ok(pedido).await?;
        extrair_processos(&corpo)
    }

    async fn criar_processo(&self, payload: &ProcessoPayload) -> Result<(), ErroGateway> {
        let pedido = self.cliente.post(self.url("/processos")).json(payload);
        self.corpo_ok(pedido).await?;
        Ok(())
    }
}

// O backend embrulha cada processo num envelope `{ "props": { ... } }`.
// Este é o único lugar do painel que conhece esse detalhe; se o backend
// um dia deixar de embrulhar, só esta struct muda.
#[derive(Debug, Deserialize)]
struct ItemProcessos {
    props: ProcessoRegistro,
}

fn extrair_processos(corpo: &[u8]) -> Result<Vec<ProcessoRegistro>, ErroGateway> {
    let itens: Vec<ItemProcessos> = serde_json::from_slice(corpo)
        .map_err(|e| ErroGateway::RespostaInvalida(format!("lista de processos: {e}")))?;
    Ok(itens.into_iter().map(|item| item.props).collect())
}

fn extrair_utilizadores(corpo: &[u8]) -> Result<Vec<Utilizador>, ErroGateway> {
    serde_json::from_slice(corpo)
        .map_err(|e| ErroGateway::RespostaInvalida(format!("lista de usuários: {e}")))
}

fn extrair_sessao(corpo: &[u8]) -> Result<SessaoAberta, ErroGateway> {
    serde_json::from_slice(corpo)
        .map_err(|e| ErroGateway::RespostaInvalida(format!("resposta de login: {e}")))
}

// --- Geolocalização por IP ---

#[derive(Debug, Clone)]
pub struct LocalizadorHttp {
    cliente: Client,
    base: String,
}

impl LocalizadorHttp {
    pub fn novo(base: &str) -> Result<Self, reqwest::Error> {
        let cliente = Client::builder().timeout(TEMPO_LIMITE_LOCALIZACAO).build()?;
        Ok(Self {
            cliente,
            base: base.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RespostaLocalizacao {
    city: Option<String>,
    region: Option<String>,
}

#[async_trait]
impl Localizador for LocalizadorHttp {
    async fn localizar(&self, ip: &str) -> Result<String, ErroGateway> {
        let url = format!("{}/{}/json/", self.base, ip);
        let resposta = self
            .cliente
            .get(url)
            .send()
            .await
            .map_err(|e| erro_transporte(&e))?;
        let status = resposta.status();
        let corpo = resposta
            .bytes()
            .await
            .map_err(|e| erro_transporte(&e))?
            .to_vec();
        if !status.is_success() {
            return Err(classificar_status(status, &corpo));
        }
        let dados: RespostaLocalizacao = serde_json::from_slice(&corpo)
            .map_err(|e| ErroGateway::RespostaInvalida(format!("geolocalização: {e}")))?;
        formatar_localizacao(dados).ok_or_else(|| {
            ErroGateway::RespostaInvalida("geolocalização sem cidade/região".to_string())
        })
    }
}

fn formatar_localizacao(dados: RespostaLocalizacao) -> Option<String> {
    match (dados.city, dados.region) {
        (Some(cidade), Some(regiao)) if !cidade.is_empty() && !regiao.is_empty() => {
            Some(format!("{cidade}, {regiao}"))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lista_de_processos_sai_do_envelope_props() {
        let corpo = br#"[
            {"props": {"id": 1, "nomeProcesso": "Reforma", "valorTotal": 1000.0}},
            {"props": {"id": 2}}
        ]"#;
        let processos = extrair_processos(corpo).expect("lista válida");
        assert_eq!(processos.len(), 2);
        assert_eq!(processos[0].nome_processo.as_deref(), Some("Reforma"));
        assert_eq!(processos[0].valor_total, Some(1000.0));
        assert_eq!(processos[1].id, Some(2));
        assert_eq!(processos[1].nome_processo, None);
    }

    #[test]
    fn item_sem_envelope_e_resposta_invalida() {
        let corpo = br#"[{"id": 1, "nomeProcesso": "Sem envelope"}]"#;
        let erro = extrair_processos(corpo).expect_err("deveria falhar");
        assert!(matches!(erro, ErroGateway::RespostaInvalida(_)));
    }

    #[test]
    fn corpo_que_nao_e_json_e_resposta_invalida() {
        let erro = extrair_processos(b"<html>proxy</html>").expect_err("deveria falhar");
        assert!(matches!(erro, ErroGateway::RespostaInvalida(_)));
    }

    #[test]
    fn login_sem_token_e_resposta_invalida() {
        let corpo = br#"{"user": {"name": "Maria", "role": "admin"}}"#;
        let erro = extrair_sessao(corpo).expect_err("deveria faltar o token");
        assert!(matches!(erro, ErroGateway::RespostaInvalida(_)));
    }

    #[test]
    fn lista_de_utilizadores_mapeia_o_papel() {
        let corpo = br#"[
            {"id": 7, "name": "Ana", "email": "ana@escola.br", "role": "admin", "createdAt": "2024-01-02"},
            {"id": 8, "name": "Bruno", "email": "bruno@escola.br", "role": "user"}
        ]"#;
        let lista = extrair_utilizadores(corpo).expect("lista válida");
        assert_eq!(lista.len(), 2);
        assert_eq!(lista[0].papel, crate::models::utilizador::Papel::Administrador);
        assert_eq!(lista[1].papel, crate::models::utilizador::Papel::Usuario);
        assert_eq!(lista[1].criado_em, None);
    }

    #[test]
    fn localizacao_exige_cidade_e_regiao() {
        let completa = RespostaLocalizacao {
            city: Some("Natal".into()),
            region: Some("Rio Grande do Norte".into()),
        };
        assert_eq!(
            formatar_localizacao(completa).as_deref(),
            Some("Natal, Rio Grande do Norte")
        );

        let sem_regiao = RespostaLocalizacao {
            city: Some("Natal".into()),
            region: None,
        };
        assert_eq!(formatar_localizacao(sem_regiao), None);

        let vazia = RespostaLocalizacao {
            city: Some(String::new()),
            region: Some("RN".into()),
        };
        assert_eq!(formatar_localizacao(vazia), None);
    }
}
