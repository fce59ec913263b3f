// src/state.rs
use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::gateway::portal::{LocalizadorHttp, PortalHttp};
use crate::services::transferencia::AreaDeTransferencia;

// Estrutura para gerir as travas de envio em curso
#[derive(Debug, Clone, Default)]
pub struct TravaEnvios {
    // Usamos Arc<Mutex<...>> para permitir acesso seguro de múltiplos threads/tasks
    // O HashSet guarda as chaves (escopo + sessão) com um envio em andamento
    chaves: Arc<Mutex<HashSet<String>>>,
}

impl TravaEnvios {
    /// Tenta reservar a chave para um envio. Devolve `None` se já houver
    /// um envio em andamento com a mesma chave; a trava é libertada quando
    /// o guarda devolvido sai de escopo.
    pub fn adquirir(&self, chave: &str) -> Option<GuardaEnvio> {
        let mut chaves = self.trancar();
        if !chaves.insert(chave.to_string()) {
            return None;
        }
        Some(GuardaEnvio {
            chaves: Arc::clone(&self.chaves),
            chave: chave.to_string(),
        })
    }

    /// Indica se a chave está reservada neste momento.
    pub fn ocupada(&self, chave: &str) -> bool {
        self.trancar().contains(chave)
    }

    fn trancar(&self) -> MutexGuard<'_, HashSet<String>> {
        // Se um thread entrou em pânico com a trava, o conjunto continua válido
        match self.chaves.lock() {
            Ok(guarda) => guarda,
            Err(envenenada) => envenenada.into_inner(),
        }
    }
}

/// Guarda RAII de uma chave reservada em [`TravaEnvios`].
#[derive(Debug)]
pub struct GuardaEnvio {
    chaves: Arc<Mutex<HashSet<String>>>,
    chave: String,
}

impl Drop for GuardaEnvio {
    fn drop(&mut self) {
        let mut chaves = match self.chaves.lock() {
            Ok(guarda) => guarda,
            Err(envenenada) => envenenada.into_inner(),
        };
        chaves.remove(&self.chave);
    }
}

// Estado partilhado por todos os handlers
#[derive(Clone)]
pub struct AppState {
    pub portal: Arc<PortalHttp>,
    pub localizador: Arc<LocalizadorHttp>,
    pub transferencia: Arc<dyn AreaDeTransferencia>,
    // Adiciona o registo de envios em andamento
    pub travas: TravaEnvios,
}

// (Opcional) Permite extrair TravaEnvios diretamente
impl axum::extract::FromRef<AppState> for TravaEnvios {
    fn from_ref(state: &AppState) -> TravaEnvios {
        state.travas.clone()
    }
}
