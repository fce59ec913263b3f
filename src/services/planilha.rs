// src/services/planilha.rs
//
// Montagem da tabela de processos e exportação para .xlsx. A mesma matriz
// de células alimenta a tabela HTML da tela de administração e o arquivo
// exportado, então as duas nunca divergem.
use rust_xlsxwriter::{Workbook, XlsxError};

use crate::models::processo::ProcessoRegistro;
use crate::models::utilizador::formatar_data_br;

/// Colunas da tabela de processos, na ordem em que aparecem na tela e na
/// planilha exportada.
pub const CABECALHOS_PROCESSOS: [&str; 20] = [
    "ID",
    "Nome do Processo",
    "Objeto",
    "Tipo de Contrato",
    "Etapa Atual",
    "Escolas Impactadas",
    "Estudantes Impactados",
    "Valor Total",
    "Valor Executado",
    "Percentual Execução",
    "Data Ordem de Serviço",
    "Data Registro",
    "Data Prazo Final",
    "Data Empenho",
    "Numero Empenho",
    "Tempo Restante",
    "Nivel de Risco",
    "Probabilidade",
    "Impacto",
    "Local do Usuário",
];

/// Uma linha de células já formatadas para exibição, na ordem dos
/// cabeçalhos. Cada campo ausente vira o placeholder da coluna.
pub fn linha_processo(processo: &ProcessoRegistro) -> Vec<String> {
    vec![
        processo
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "N/A".to_string()),
        texto_ou_na(processo.nome_processo.as_deref()),
        texto_ou_na(processo.objeto.as_deref()),
        texto_ou_na(processo.tipo_contrato.as_deref()),
        texto_ou_na(processo.etapa_atual.as_deref()),
        numero_ou_na(processo.escolas_impactadas),
        numero_ou_na(processo.estudantes_impactados),
        dinheiro_ou_na(processo.valor_total),
        dinheiro_ou_na(processo.valor_executado),
        percentual_ou_na(processo.percentual_execucao),
        data_ou_traco(processo.data_ordem_servico.as_deref()),
        data_ou_traco(processo.data_registro.as_deref()),
        data_ou_traco(processo.data_prazo_final.as_deref()),
        data_ou_traco(processo.data_empenho.as_deref()),
        presente_ou_na(processo.numero_empenho.as_deref()),
        presente_ou_na(processo.tempo_restante.as_deref()),
        presente_ou_na(processo.nivel_risco.as_deref()),
        presente_ou_na(processo.probabilidade.as_deref()),
        presente_ou_na(processo.impacto.as_deref()),
        presente_ou_na(processo.user_location.as_deref()),
    ]
}

/// Matriz completa: cabeçalho + uma linha por processo. É transformação
/// pura sobre a coleção já carregada; nenhuma chamada de rede acontece
/// aqui.
pub fn montar_tabela(processos: &[ProcessoRegistro]) -> Vec<Vec<String>> {
    let mut tabela = Vec::with_capacity(processos.len() + 1);
    tabela.push(CABECALHOS_PROCESSOS.iter().map(|c| c.to_string()).collect());
    tabela.extend(processos.iter().map(linha_processo));
    tabela
}

/// Serializa a matriz num arquivo .xlsx em memória, pronto para download.
pub fn gerar_xlsx(tabela: &[Vec<String>]) -> Result<Vec<u8>, XlsxError> {
    let mut pasta = Workbook::new();
    let folha = pasta.add_worksheet();
    folha.set_name("Processos")?;
    for (linha, celulas) in tabela.iter().enumerate() {
        for (coluna, celula) in celulas.iter().enumerate() {
            folha.write(linha as u32, coluna as u16, celula.as_str())?;
        }
    }
    pasta.save_to_buffer()
}

// Campos de texto "principais": ausente OU vazio vira "N/A".
fn texto_ou_na(valor: Option<&str>) -> String {
    match valor {
        Some(texto) if !texto.is_empty() => texto.to_string(),
        _ => "N/A".to_string(),
    }
}

// Campos de texto secundários: só a ausência vira "N/A"; vazio fica vazio.
fn presente_ou_na(valor: Option<&str>) -> String {
    match valor {
        Some(texto) => texto.to_string(),
        None => "N/A".to_string(),
    }
}

fn numero_ou_na(valor: Option<i64>) -> String {
    valor
        .map(|n| n.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn dinheiro_ou_na(valor: Option<f64>) -> String {
    valor
        .map(|v| format!("R$ {v:.2}"))
        .unwrap_or_else(|| "N/A".to_string())
}

fn percentual_ou_na(valor: Option<f64>) -> String {
    valor
        .map(|v| format!("{v:.2}%"))
        .unwrap_or_else(|| "N/A".to_string())
}

// Datas ausentes aparecem como travessão; texto que não parece data é
// mostrado como veio do backend.
fn data_ou_traco(valor: Option<&str>) -> String {
    match valor {
        Some(texto) if !texto.trim().is_empty() => {
            formatar_data_br(texto).unwrap_or_else(|| texto.to_string())
        }
        _ => "-".to_string(),
    }
}
