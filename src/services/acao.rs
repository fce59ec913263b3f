// src/services/acao.rs
use crate::gateway::erro::ErroGateway;

/// Ciclo de vida de uma ação disparada pelo operador (envio de formulário,
/// alteração de senha). Substitui o trio de flags soltas (carregando / deu
/// certo / mensagem de erro) por um estado único e impossível de combinar
/// errado.
#[derive(Debug, Clone, PartialEq)]
pub enum EstadoAcao<T, E> {
    Ocioso,
    Pendente,
    Concluido(T),
    Falhou(E),
}

impl<T, E> EstadoAcao<T, E> {
    pub fn em_curso(&self) -> bool {
        matches!(self, EstadoAcao::Pendente)
    }

    pub fn concluido(&self) -> bool {
        matches!(self, EstadoAcao::Concluido(_))
    }

    pub fn falha(&self) -> Option<&E> {
        match self {
            EstadoAcao::Falhou(erro) => Some(erro),
            _ => None,
        }
    }
}

/// Estado de uma listagem vinda do backend.
#[derive(Debug, Clone, PartialEq)]
pub enum EstadoCarga<T> {
    Carregando,
    Carregado(Vec<T>),
    Falhou(String),
}

impl<T> EstadoCarga<T> {
    /// Converte o resultado do gateway no estado final da listagem,
    /// já com a mensagem específica da classe de falha.
    pub fn de_resultado(resultado: Result<Vec<T>, ErroGateway>) -> Self {
        match resultado {
            Ok(registros) => EstadoCarga::Carregado(registros),
            Err(erro) => EstadoCarga::Falhou(erro.mensagem_usuario()),
        }
    }

    pub fn registros(&self) -> &[T] {
        match self {
            EstadoCarga::Carregado(registros) => registros,
            _ => &[],
        }
    }

    pub fn erro(&self) -> Option<&str> {
        match self {
            EstadoCarga::Falhou(mensagem) => Some(mensagem),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estados_da_acao_nao_se_misturam() {
        let mut estado: EstadoAcao<(), String> = EstadoAcao::Ocioso;
        assert!(!estado.em_curso());
        assert!(!estado.concluido());
        assert_eq!(estado.falha(), None);

        estado = EstadoAcao::Pendente;
        assert!(estado.em_curso());

        estado = EstadoAcao::Falhou("Erro ao enviar os dados.".to_string());
        assert!(!estado.em_curso());
        assert_eq!(estado.falha().map(String::as_str), Some("Erro ao enviar os dados."));
    }

    #[test]
    fn carga_com_sucesso_expoe_os_registros() {
        let estado = EstadoCarga::de_resultado(Ok(vec![1, 2, 3]));
        assert_eq!(estado.registros(), &[1, 2, 3]);
        assert_eq!(estado.erro(), None);
    }

    #[test]
    fn carga_com_falha_guarda_a_mensagem_da_classe() {
        let estado: EstadoCarga<i64> =
            EstadoCarga::de_resultado(Err(ErroGateway::Indisponivel { status: 502 }));
        assert!(estado.registros().is_empty());
        assert_eq!(
            estado.erro(),
            Some("Servidor indisponível. Verifique o servidor do backend.")
        );
    }
}
