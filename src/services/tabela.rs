// src/services/tabela.rs
use crate::gateway::erro::ErroGateway;
use crate::services::acao::EstadoCarga;

/// Controlador das telas de listagem, genérico sobre o tipo de registro
/// (processos ou utilizadores). Nasce em `Carregando` e termina carregado
/// ou com a mensagem da classe de falha; não há paginação nem recarga
/// automática.
#[derive(Debug, Clone, PartialEq)]
pub struct TabelaRegistros<T> {
    estado: EstadoCarga<T>,
}

impl<T> TabelaRegistros<T> {
    pub fn nova() -> Self {
        Self {
            estado: EstadoCarga::Carregando,
        }
    }

    pub fn concluir(&mut self, resultado: Result<Vec<T>, ErroGateway>) {
        if let Err(erro) = &resultado {
            tracing::warn!("Falha ao carregar listagem: {erro}");
        }
        self.estado = EstadoCarga::de_resultado(resultado);
    }

    pub fn estado(&self) -> &EstadoCarga<T> {
        &self.estado
    }

    /// Coleção somente leitura; vazia enquanto não houver carga com sucesso.
    pub fn registros(&self) -> &[T] {
        self.estado.registros()
    }

    pub fn erro(&self) -> Option<&str> {
        self.estado.erro()
    }
}

impl<T> Default for TabelaRegistros<T> {
    fn default() -> Self {
        Self::nova()
    }
}
