// src/services/proveniencia.rs
//
// Dados de auditoria anexados a cada processo cadastrado: de onde veio o
// envio (IP e cidade) e com qual navegador. Nada aqui é crítico; qualquer
// lacuna degrada para "Unknown" sem travar o envio.
use axum::http::{header, HeaderMap};
use std::net::SocketAddr;

use crate::gateway::portal::Localizador;

pub const DESCONHECIDO: &str = "Unknown";

#[derive(Debug, Clone, PartialEq)]
pub struct Proveniencia {
    pub ip: String,
    pub localizacao: String,
    pub dispositivo: String,
}

/// IP de quem enviou o formulário. Atrás de proxy vale o primeiro endereço
/// do X-Forwarded-For; sem proxy, o endereço do socket.
pub fn ip_do_pedido(cabecalhos: &HeaderMap, origem: SocketAddr) -> String {
    cabecalhos
        .get("x-forwarded-for")
        .and_then(|valor| valor.to_str().ok())
        .and_then(|lista| lista.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| origem.ip().to_string())
}

pub fn dispositivo_do_pedido(cabecalhos: &HeaderMap) -> String {
    cabecalhos
        .get(header::USER_AGENT)
        .and_then(|valor| valor.to_str().ok())
        .filter(|ua| !ua.is_empty())
        .map(|ua| ua.to_string())
        .unwrap_or_else(|| DESCONHECIDO.to_string())
}

/// Reúne IP, localização e dispositivo do pedido atual. A geolocalização
/// consulta um serviço externo e pode falhar; nesse caso fica "Unknown".
pub async fn coletar(
    cabecalhos: &HeaderMap,
    origem: SocketAddr,
    localizador: &dyn Localizador,
) -> Proveniencia {
    let ip = ip_do_pedido(cabecalhos, origem);
    let localizacao = match localizador.localizar(&ip).await {
        Ok(texto) => texto,
        Err(erro) => {
            tracing::debug!("Geolocalização indisponível para {ip}: {erro}");
            DESCONHECIDO.to_string()
        }
    };
    Proveniencia {
        ip,
        localizacao,
        dispositivo: dispositivo_do_pedido(cabecalhos),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::erro::ErroGateway;
    use async_trait::async_trait;

    struct LocalizadorFalso {
        resposta: Result<String, ErroGateway>,
    }

    #[async_trait]
    impl Localizador for LocalizadorFalso {
        async fn localizar(&self, _ip: &str) -> Result<String, ErroGateway> {
            self.resposta.clone()
        }
    }

    fn origem() -> SocketAddr {
        "192.168.1.40:51234".parse().expect("endereço de teste")
    }

    #[test]
    fn primeiro_ip_do_x_forwarded_for_vence_o_socket() {
        let mut cabecalhos = HeaderMap::new();
        cabecalhos.insert(
            "x-forwarded-for",
            "203.0.113.7, 10.0.0.1".parse().expect("valor de teste"),
        );
        assert_eq!(ip_do_pedido(&cabecalhos, origem()), "203.0.113.7");
    }

    #[test]
    fn sem_proxy_vale_o_endereco_do_socket() {
        assert_eq!(ip_do_pedido(&HeaderMap::new(), origem()), "192.168.1.40");
    }

    #[test]
    fn user_agent_ausente_vira_unknown() {
        assert_eq!(dispositivo_do_pedido(&HeaderMap::new()), "Unknown");

        let mut cabecalhos = HeaderMap::new();
        cabecalhos.insert(
            header::USER_AGENT,
            "Mozilla/5.0 (X11; Linux x86_64)".parse().expect("valor de teste"),
        );
        assert_eq!(
            dispositivo_do_pedido(&cabecalhos),
            "Mozilla/5.0 (X11; Linux x86_64)"
        );
    }

    #[tokio::test]
    async fn falha_na_geolocalizacao_nao_impede_a_coleta() {
        let localizador = LocalizadorFalso {
            resposta: Err(ErroGateway::Conexao("timeout".to_string())),
        };
        let proveniencia = coletar(&HeaderMap::new(), origem(), &localizador).await;
        assert_eq!(proveniencia.ip, "192.168.1.40");
        assert_eq!(proveniencia.localizacao, "Unknown");
        assert_eq!(proveniencia.dispositivo, "Unknown");
    }

    #[tokio::test]
    async fn coleta_completa_usa_a_localizacao_resolvida() {
        let localizador = LocalizadorFalso {
            resposta: Ok("Natal, Rio Grande do Norte".to_string()),
        };
        let mut cabecalhos = HeaderMap::new();
        cabecalhos.insert(header::USER_AGENT, "painel-teste/1.0".parse().expect("valor"));
        let proveniencia = coletar(&cabecalhos, origem(), &localizador).await;
        assert_eq!(proveniencia.localizacao, "Natal, Rio Grande do Norte");
        assert_eq!(proveniencia.dispositivo, "painel-teste/1.0");
    }
}
