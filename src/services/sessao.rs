// src/services/sessao.rs
//
// Sessão e roteamento por papel. Toda leitura e escrita da identidade
// persistida passa por aqui; handlers e middlewares não tocam nas chaves
// da sessão diretamente.
use tower_sessions::session::Error as ErroDeSessao;
use tower_sessions::Session;

use crate::error::{AppError, AppResult};
use crate::gateway::erro::ErroGateway;
use crate::gateway::portal::PortalUtilizadores;
use crate::models::utilizador::{Identidade, Papel, SessaoAberta};

pub const CHAVE_TOKEN: &str = "access_token";
pub const CHAVE_IDENTIDADE: &str = "identidade";

/// Para onde cada papel cai depois do login e em rota desconhecida.
pub fn rota_padrao(papel: Papel) -> &'static str {
    match papel {
        Papel::Administrador => "/visualizar-processos",
        Papel::Usuario => "/processos",
    }
}

/// Chave de trava de envio por cliente. Antes da sessão ser gravada
/// `Session::id()` ainda é `None`; nesse caso a chave cai para o IP.
pub fn chave_envio(escopo: &str, sessao: &Session, origem: std::net::SocketAddr) -> String {
    match sessao.id() {
        Some(id) => format!("{escopo}:{id}"),
        None => format!("{escopo}:ip:{}", origem.ip()),
    }
}

/// Desfecho de uma tentativa de login, já com a mensagem pronta para a tela.
#[derive(Debug, Clone, PartialEq)]
pub enum DesfechoLogin {
    Autenticado(Identidade),
    Recusado(String),
}

/// Recupera a identidade persistida na sessão, se houver.
///
/// Valor ilegível conta como sessão anónima: a entrada corrompida é
/// descartada (token junto) em vez de derrubar a requisição, senão o
/// utilizador ficaria preso num erro permanente.
pub async fn restaurar(sessao: &Session) -> AppResult<Option<Identidade>> {
    match sessao.get::<Identidade>(CHAVE_IDENTIDADE).await {
        Ok(identidade) => Ok(identidade),
        Err(ErroDeSessao::SerdeJson(e)) => {
            tracing::warn!("Identidade persistida corrompida, descartando: {e}");
            descartar_credenciais(sessao).await;
            Ok(None)
        }
        Err(e) => Err(AppError::SessionError(format!("Erro ao ler sessão: {e}"))),
    }
}

/// Valida as credenciais no backend e, se aceitas, abre a sessão local.
pub async fn autenticar(
    portal: &dyn PortalUtilizadores,
    sessao: &Session,
    email: &str,
    senha: &str,
) -> AppResult<DesfechoLogin> {
    match portal.login(email, senha).await {
        Ok(aberta) => {
            let identidade = iniciar(sessao, aberta).await?;
            tracing::info!(
                "✅ Login de '{}' como {}.",
                identidade.nome,
                identidade.papel.rotulo()
            );
            Ok(DesfechoLogin::Autenticado(identidade))
        }
        Err(erro) => {
            tracing::warn!("Login recusado para '{email}': {erro}");
            Ok(DesfechoLogin::Recusado(mensagem_login(&erro)))
        }
    }
}

/// Abre a sessão autenticada: roda o ID (fixation) e persiste token e
/// identidade juntos.
pub async fn iniciar(sessao: &Session, aberta: SessaoAberta) -> AppResult<Identidade> {
    sessao
        .cycle_id()
        .await
        .map_err(|e| AppError::SessionError(format!("Falha ao rodar ID: {e}")))?;
    sessao
        .insert(CHAVE_TOKEN, &aberta.access_token)
        .await
        .map_err(|e| AppError::SessionError(format!("Falha ao guardar token: {e}")))?;
    sessao
        .insert(CHAVE_IDENTIDADE, &aberta.identidade)
        .await
        .map_err(|e| AppError::SessionError(format!("Falha ao guardar identidade: {e}")))?;
    Ok(aberta.identidade)
}

/// Encerra a sessão, apagando token e identidade de uma vez.
pub async fn encerrar(sessao: &Session) -> AppResult<()> {
    sessao
        .delete()
        .await
        .map_err(|e| AppError::SessionError(format!("Falha ao apagar sessão: {e}")))?;
    Ok(())
}

/// Mensagem da tela de login para cada classe de falha.
pub fn mensagem_login(erro: &ErroGateway) -> String {
    match erro {
        ErroGateway::Conexao(_) => "Erro de conexão com o servidor.".to_string(),
        ErroGateway::Autenticacao { .. } => "Email ou senha inválidos.".to_string(),
        ErroGateway::Indisponivel { .. } => {
            "Servidor indisponível. Verifique o servidor do backend.".to_string()
        }
        ErroGateway::Negocio {
            mensagem: Some(mensagem),
            ..
        } => mensagem.clone(),
        _ => "Erro ao realizar login.".to_string(),
    }
}

async fn descartar_credenciais(sessao: &Session) {
    if let Err(e) = sessao.remove::<serde_json::Value>(CHAVE_IDENTIDADE).await {
        tracing::warn!("Falha ao descartar identidade corrompida: {e}");
    }
    if let Err(e) = sessao.remove::<serde_json::Value>(CHAVE_TOKEN).await {
        tracing::warn!("Falha ao descartar token da sessão corrompida: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rstest::rstest;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    struct PortalFalso {
        resposta: Result<SessaoAberta, ErroGateway>,
    }

    #[async_trait]
    impl PortalUtilizadores for PortalFalso {
        async fn login(&self, _email: &str, _senha: &str) -> Result<SessaoAberta, ErroGateway> {
            match &self.resposta {
                Ok(aberta) => Ok(SessaoAberta {
                    access_token: aberta.access_token.clone(),
                    identidade: aberta.identidade.clone(),
                }),
                Err(erro) => Err(erro.clone()),
            }
        }

        async fn registrar(
            &self,
            _pedido: &crate::models::utilizador::RegistroPayload,
        ) -> Result<(), ErroGateway> {
            unimplemented!("não usado nestes testes")
        }

        async fn listar_utilizadores(
            &self,
        ) -> Result<Vec<crate::models::utilizador::Utilizador>, ErroGateway> {
            unimplemented!("não usado nestes testes")
        }

        async fn alterar_senha(&self, _id: i64, _nova_senha: &str) -> Result<(), ErroGateway> {
            unimplemented!("não usado nestes testes")
        }

        async fn deletar_utilizador(&self, _id: i64) -> Result<(), ErroGateway> {
            unimplemented!("não usado nestes testes")
        }
    }

    fn sessao_de_teste() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn aberta_de_teste(papel: Papel) -> SessaoAberta {
        SessaoAberta {
            access_token: "token-abc".to_string(),
            identidade: Identidade {
                nome: "Maria".to_string(),
                papel,
            },
        }
    }

    #[rstest]
    #[case(Papel::Administrador, "/visualizar-processos")]
    #[case(Papel::Usuario, "/processos")]
    fn cada_papel_tem_a_sua_rota_padrao(#[case] papel: Papel, #[case] rota: &str) {
        assert_eq!(rota_padrao(papel), rota);
    }

    #[tokio::test]
    async fn chave_de_envio_usa_ip_antes_da_sessao_existir() {
        let sessao = sessao_de_teste();
        let origem: std::net::SocketAddr = "10.0.0.7:4242".parse().expect("endereço");
        assert_eq!(chave_envio("login", &sessao, origem), "login:ip:10.0.0.7");

        // Depois de gravada a sessão ganha ID e a chave passa a usá-lo.
        sessao.insert("k", 1).await.expect("inserção");
        sessao.save().await.expect("gravação");
        let chave = chave_envio("login", &sessao, origem);
        assert!(chave.starts_with("login:"));
        assert!(!chave.contains("ip:"));
    }

    #[tokio::test]
    async fn sessao_nova_restaura_como_anonima() {
        let sessao = sessao_de_teste();
        let identidade = restaurar(&sessao).await.expect("leitura da sessão");
        assert_eq!(identidade, None);
    }

    #[tokio::test]
    async fn iniciar_e_restaurar_fecham_o_ciclo() {
        let sessao = sessao_de_teste();
        let identidade = iniciar(&sessao, aberta_de_teste(Papel::Administrador))
            .await
            .expect("início de sessão");
        assert!(identidade.admin());

        let restaurada = restaurar(&sessao).await.expect("leitura da sessão");
        assert_eq!(restaurada, Some(identidade));

        let token: Option<String> = sessao.get(CHAVE_TOKEN).await.expect("token");
        assert_eq!(token.as_deref(), Some("token-abc"));
    }

    #[tokio::test]
    async fn identidade_corrompida_vira_anonima_e_e_descartada() {
        let sessao = sessao_de_teste();
        sessao
            .insert(CHAVE_IDENTIDADE, "not-json{")
            .await
            .expect("inserção de teste");
        sessao
            .insert(CHAVE_TOKEN, "token-velho")
            .await
            .expect("inserção de teste");

        let identidade = restaurar(&sessao).await.expect("leitura da sessão");
        assert_eq!(identidade, None);

        // O valor corrompido foi removido, não fica para a próxima leitura.
        let bruto: Option<serde_json::Value> =
            sessao.get(CHAVE_IDENTIDADE).await.expect("leitura crua");
        assert_eq!(bruto, None);
        let token: Option<serde_json::Value> = sessao.get(CHAVE_TOKEN).await.expect("token");
        assert_eq!(token, None);
    }

    #[tokio::test]
    async fn encerrar_limpa_token_e_identidade() {
        let sessao = sessao_de_teste();
        iniciar(&sessao, aberta_de_teste(Papel::Usuario))
            .await
            .expect("início de sessão");

        encerrar(&sessao).await.expect("encerramento");

        assert_eq!(restaurar(&sessao).await.expect("leitura"), None);
        let token: Option<String> = sessao.get(CHAVE_TOKEN).await.expect("token");
        assert_eq!(token, None);
    }

    #[tokio::test]
    async fn login_aceito_persiste_a_identidade() {
        let portal = PortalFalso {
            resposta: Ok(aberta_de_teste(Papel::Administrador)),
        };
        let sessao = sessao_de_teste();

        let desfecho = autenticar(&portal, &sessao, "maria@escola.br", "senha")
            .await
            .expect("autenticação");
        match desfecho {
            DesfechoLogin::Autenticado(identidade) => assert_eq!(identidade.nome, "Maria"),
            outro => panic!("esperava autenticado, veio {outro:?}"),
        }
        assert!(restaurar(&sessao).await.expect("leitura").is_some());
    }

    #[tokio::test]
    async fn login_recusado_nao_toca_na_sessao() {
        let portal = PortalFalso {
            resposta: Err(ErroGateway::Autenticacao {
                status: 401,
                mensagem: Some("Credenciais inválidas".to_string()),
            }),
        };
        let sessao = sessao_de_teste();

        let desfecho = autenticar(&portal, &sessao, "maria@escola.br", "errada")
            .await
            .expect("autenticação");
        assert_eq!(
            desfecho,
            DesfechoLogin::Recusado("Email ou senha inválidos.".to_string())
        );
        assert_eq!(restaurar(&sessao).await.expect("leitura"), None);
    }

    #[rstest]
    #[case(ErroGateway::Conexao("refused".to_string()), "Erro de conexão com o servidor.")]
    #[case(
        ErroGateway::Autenticacao { status: 401, mensagem: None },
        "Email ou senha inválidos."
    )]
    #[case(
        ErroGateway::Indisponivel { status: 503 },
        "Servidor indisponível. Verifique o servidor do backend."
    )]
    #[case(
        ErroGateway::Negocio { status: 429, mensagem: Some("Muitas tentativas".to_string()) },
        "Muitas tentativas"
    )]
    #[case(
        ErroGateway::RespostaInvalida("sem token".to_string()),
        "Erro ao realizar login."
    )]
    fn mensagem_de_login_cobre_as_classes(#[case] erro: ErroGateway, #[case] esperada: &str) {
        assert_eq!(mensagem_login(&erro), esperada);
    }
}
