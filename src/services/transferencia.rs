// src/services/transferencia.rs

/// Porta para a área de transferência da máquina onde o painel roda.
/// Existe como trait porque a cópia pode falhar (sessão sem display, por
/// exemplo) e os serviços tratam essa falha sem depender do arboard.
pub trait AreaDeTransferencia: Send + Sync {
    /// Copia o texto; em caso de falha devolve o motivo, só para log.
    fn copiar(&self, texto: &str) -> Result<(), String>;
}

/// Implementação real, via clipboard do sistema operacional.
pub struct TransferenciaSistema;

impl AreaDeTransferencia for TransferenciaSistema {
    fn copiar(&self, texto: &str) -> Result<(), String> {
        let mut area =
            arboard::Clipboard::new().map_err(|e| format!("clipboard indisponível: {e}"))?;
        area.set_text(texto.to_string())
            .map_err(|e| format!("falha ao copiar: {e}"))
    }
}
