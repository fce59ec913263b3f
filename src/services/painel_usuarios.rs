// src/services/painel_usuarios.rs
//
// Controlador da tela de administração de utilizadores: listagem, rotação
// de senha e exclusão. A coleção local espelha a última carga com sucesso;
// só a exclusão confirmada pelo backend mexe nela.
use rand::Rng;

use crate::gateway::erro::ErroGateway;
use crate::gateway::portal::PortalUtilizadores;
use crate::models::utilizador::Utilizador;
use crate::services::acao::EstadoCarga;
use crate::services::transferencia::AreaDeTransferencia;

pub const TAMANHO_SENHA: usize = 12;
const ALFABETO_SENHA: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Senha nova de 12 caracteres, sorteio uniforme sobre o alfabeto
/// alfanumérico de 62 símbolos.
pub fn gerar_senha_aleatoria() -> String {
    let mut sorteio = rand::thread_rng();
    (0..TAMANHO_SENHA)
        .map(|_| ALFABETO_SENHA[sorteio.gen_range(0..ALFABETO_SENHA.len())] as char)
        .collect()
}

/// Desfecho de uma rotação de senha que o backend aceitou.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotacaoSenha {
    /// Senha trocada e copiada; o administrador pode colar com Ctrl+V.
    Copiada,
    /// Senha trocada, mas a cópia para o clipboard falhou.
    CopiaIndisponivel,
}

#[derive(Debug)]
pub struct PainelUsuarios {
    estado: EstadoCarga<Utilizador>,
}

impl PainelUsuarios {
    pub fn novo() -> Self {
        Self {
            estado: EstadoCarga::Carregando,
        }
    }

    pub async fn carregar(&mut self, portal: &dyn PortalUtilizadores) {
        let resultado = portal.listar_utilizadores().await;
        if let Err(erro) = &resultado {
            tracing::warn!("Falha ao carregar utilizadores: {erro}");
        }
        self.estado = EstadoCarga::de_resultado(resultado);
    }

    pub fn estado(&self) -> &EstadoCarga<Utilizador> {
        &self.estado
    }

    pub fn utilizadores(&self) -> &[Utilizador] {
        self.estado.registros()
    }

    pub fn erro(&self) -> Option<&str> {
        self.estado.erro()
    }

    /// Gera uma senha nova, envia ao backend e copia para o clipboard.
    ///
    /// A falha do clipboard não desfaz nada: a senha já foi trocada no
    /// backend, então o retorno distingue "copiada" de "troque à mão".
    /// A coleção local não muda em nenhum dos casos; a senha não aparece
    /// na tabela.
    pub async fn rotacionar_senha(
        &self,
        portal: &dyn PortalUtilizadores,
        transferencia: &dyn AreaDeTransferencia,
        id: i64,
    ) -> Result<RotacaoSenha, String> {
        let senha_nova = gerar_senha_aleatoria();
        tracing::info!("Alterando senha do utilizador {id}.");

        if let Err(erro) = portal.alterar_senha(id, &senha_nova).await {
            tracing::warn!("Falha ao alterar senha do utilizador {id}: {erro}");
            return Err(mensagem_rotacao(&erro));
        }

        match transferencia.copiar(&senha_nova) {
            Ok(()) => {
                tracing::info!("✅ Senha do utilizador {id} alterada e copiada.");
                Ok(RotacaoSenha::Copiada)
            }
            Err(motivo) => {
                tracing::warn!("Senha alterada, mas a cópia falhou: {motivo}");
                Ok(RotacaoSenha::CopiaIndisponivel)
            }
        }
    }

    /// Exclui um utilizador. Sem `confirmado` é um no-op deliberado: a tela
    /// de confirmação é quem liga essa flag, nunca o clique inicial.
    /// Só remove da coleção local depois do backend confirmar.
    pub async fn deletar(
        &mut self,
        portal: &dyn PortalUtilizadores,
        id: i64,
        confirmado: bool,
    ) -> Result<bool, String> {
        if !confirmado {
            tracing::debug!("Exclusão do utilizador {id} não confirmada; nada feito.");
            return Ok(false);
        }

        if let Err(erro) = portal.deletar_utilizador(id).await {
            tracing::warn!("Falha ao deletar utilizador {id}: {erro}");
            return Err("Erro ao deletar o usuário.".to_string());
        }

        if let EstadoCarga::Carregado(utilizadores) = &mut self.estado {
            utilizadores.retain(|u| u.id != id);
        }
        tracing::info!("✅ Utilizador {id} deletado.");
        Ok(true)
    }
}

fn mensagem_rotacao(erro: &ErroGateway) -> String {
    match erro {
        ErroGateway::Conexao(_) => "Erro ao alterar a senha do usuário.".to_string(),
        outro => format!(
            "Erro ao alterar a senha do usuário: {}",
            outro.mensagem_backend().unwrap_or("Erro desconhecido")
        ),
    }
}
