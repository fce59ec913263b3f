// src/gateway/erro.rs
use axum::http::StatusCode;
use thiserror::Error;

/// Falhas ao falar com o backend de dados, já separadas por classe.
/// A separação importa porque cada tela traduz a classe numa mensagem
/// diferente para o operador.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ErroGateway {
    /// A requisição nem chegou a produzir resposta HTTP.
    #[error("falha de conexão com o backend: {0}")]
    Conexao(String),

    /// 401 ou 403: o backend recusou as credenciais ou o token.
    #[error("autenticação recusada pelo backend (status {status})")]
    Autenticacao { status: u16, mensagem: Option<String> },

    /// 502, 503 ou 504: o servidor na frente do backend respondeu por ele.
    #[error("backend indisponível (status {status})")]
    Indisponivel { status: u16 },

    /// O corpo veio, mas não no formato combinado.
    #[error("resposta inválida do backend: {0}")]
    RespostaInvalida(String),

    /// Qualquer outro status de erro; carrega o `message` do corpo quando
    /// o backend mandou um.
    #[error("erro reportado pelo backend (status {status})")]
    Negocio { status: u16, mensagem: Option<String> },
}

impl ErroGateway {
    /// Mensagem de erro que o backend colocou no corpo, se houver.
    pub fn mensagem_backend(&self) -> Option<&str> {
        match self {
            ErroGateway::Autenticacao { mensagem, .. } | ErroGateway::Negocio { mensagem, .. } => {
                mensagem.as_deref()
            }
            _ => None,
        }
    }

    /// Mensagem padrão para as telas de listagem.
    pub fn mensagem_usuario(&self) -> String {
        match self {
            ErroGateway::Conexao(_) => "Erro de conexão com o servidor.".to_string(),
            ErroGateway::Autenticacao { mensagem, .. } => mensagem
                .clone()
                .unwrap_or_else(|| "Erro de autenticação. Verifique as credenciais.".to_string()),
            ErroGateway::Indisponivel { .. } => {
                "Servidor indisponível. Verifique o servidor do backend.".to_string()
            }
            ErroGateway::Negocio {
                mensagem: Some(mensagem),
                ..
            } => mensagem.clone(),
            ErroGateway::RespostaInvalida(_) | ErroGateway::Negocio { mensagem: None, .. } => {
                "Erro ao carregar os dados. Tente novamente mais tarde.".to_string()
            }
        }
    }
}

/// Converte um status de erro HTTP + corpo na classe de falha certa.
/// O corpo só é inspecionado atrás de um campo `message`; qualquer outra
/// coisa é ignorada.
pub fn classificar_status(status: StatusCode, corpo: &[u8]) -> ErroGateway {
    let mensagem = extrair_mensagem(corpo);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErroGateway::Autenticacao {
            status: status.as_u16(),
            mensagem,
        },
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            ErroGateway::Indisponivel {
                status: status.as_u16(),
            }
        }
        outro => ErroGateway::Negocio {
            status: outro.as_u16(),
            mensagem,
        },
    }
}

pub fn erro_transporte(erro: &reqwest::Error) -> ErroGateway {
    ErroGateway::Conexao(erro.to_string())
}

fn extrair_mensagem(corpo: &[u8]) -> Option<String> {
    let valor: serde_json::Value = serde_json::from_slice(corpo).ok()?;
    valor
        .get("message")
        .and_then(|m| m.as_str())
        .map(|m| m.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StatusCode::UNAUTHORIZED)]
    #[case(StatusCode::FORBIDDEN)]
    fn recusa_de_credenciais_vira_erro_de_autenticacao(#[case] status: StatusCode) {
        let erro = classificar_status(status, r#"{"message":"Credenciais inválidas"}"#.as_bytes());
        assert_eq!(
            erro,
            ErroGateway::Autenticacao {
                status: status.as_u16(),
                mensagem: Some("Credenciais inválidas".to_string()),
            }
        );
        assert_eq!(erro.mensagem_usuario(), "Credenciais inválidas");
    }

    #[rstest]
    #[case(StatusCode::BAD_GATEWAY)]
    #[case(StatusCode::SERVICE_UNAVAILABLE)]
    #[case(StatusCode::GATEWAY_TIMEOUT)]
    fn gateway_fora_do_ar_pede_para_verificar_o_backend(#[case] status: StatusCode) {
        let erro = classificar_status(status, b"Bad Gateway");
        assert_eq!(
            erro,
            ErroGateway::Indisponivel {
                status: status.as_u16()
            }
        );
        assert_eq!(
            erro.mensagem_usuario(),
            "Servidor indisponível. Verifique o servidor do backend."
        );
    }

    #[test]
    fn erro_de_negocio_propaga_a_mensagem_do_corpo() {
        let erro = classificar_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message":"Email já cadastrado"}"#.as_bytes(),
        );
        assert_eq!(erro.mensagem_backend(), Some("Email já cadastrado"));
        assert_eq!(erro.mensagem_usuario(), "Email já cadastrado");
    }

    #[test]
    fn corpo_sem_json_cai_na_mensagem_generica() {
        let erro = classificar_status(StatusCode::INTERNAL_SERVER_ERROR, b"<html>oops</html>");
        assert_eq!(erro.mensagem_backend(), None);
        assert_eq!(
            erro.mensagem_usuario(),
            "Erro ao carregar os dados. Tente novamente mais tarde."
        );
    }

    #[test]
    fn autenticacao_sem_mensagem_sugere_verificar_credenciais() {
        let erro = classificar_status(StatusCode::UNAUTHORIZED, b"");
        assert_eq!(
            erro.mensagem_usuario(),
            "Erro de autenticação. Verifique as credenciais."
        );
    }
}
