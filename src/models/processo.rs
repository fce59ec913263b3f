// src/models/processo.rs
use serde::{Deserialize, Serialize};

// --- Campos de escolha do formulário ---
//
// Cada enum conhece o rótulo mostrado no ecrã e o valor que o backend espera
// receber. Os dois nem sempre coincidem (ver `TipoContrato`).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objeto {
    Obra,
    Ti,
    Mobiliario,
    Servico,
    Outros,
}

impl Objeto {
    pub const TODOS: [Objeto; 5] = [
        Objeto::Obra,
        Objeto::Ti,
        Objeto::Mobiliario,
        Objeto::Servico,
        Objeto::Outros,
    ];

    pub fn rotulo(&self) -> &'static str {
        match self {
            Objeto::Obra => "Obra",
            Objeto::Ti => "TI",
            Objeto::Mobiliario => "Mobiliário",
            Objeto::Servico => "Serviço",
            Objeto::Outros => "Outros",
        }
    }

    pub fn valor_backend(&self) -> &'static str {
        self.rotulo()
    }

    pub fn do_formulario(valor: &str) -> Option<Objeto> {
        Objeto::TODOS.into_iter().find(|o| o.rotulo() == valor)
    }
}

/// Modalidades de contratação. Os três últimos rótulos partilham o mesmo
/// valor no backend ("Adesão a ATA"), herança do sistema antigo que a API
/// ainda espera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TipoContrato {
    Pregao,
    ContratacaoDireta,
    Inexigibilidade,
    AdesaoAta,
    TermoDeAjuste,
    Apostilamento,
    Convenio,
    Outros,
}

impl TipoContrato {
    pub const TODOS: [TipoContrato; 8] = [
        TipoContrato::Pregao,
        TipoContrato::ContratacaoDireta,
        TipoContrato::Inexigibilidade,
        TipoContrato::AdesaoAta,
        TipoContrato::TermoDeAjuste,
        TipoContrato::Apostilamento,
        TipoContrato::Convenio,
        TipoContrato::Outros,
    ];

    pub fn rotulo(&self) -> &'static str {
        match self {
            TipoContrato::Pregao => "Pregão",
            TipoContrato::ContratacaoDireta => "Contratação Direta",
            TipoContrato::Inexigibilidade => "Inexigibilidade",
            TipoContrato::AdesaoAta => "Adesão a ATA",
            TipoContrato::TermoDeAjuste => "Termo de Ajuste",
            TipoContrato::Apostilamento => "Apostilamento",
            TipoContrato::Convenio => "Convênio",
            TipoContrato::Outros => "Outros",
        }
    }

    pub fn valor_backend(&self) -> &'static str {
        match self {
            TipoContrato::TermoDeAjuste
            | TipoContrato::Apostilamento
            | TipoContrato::Convenio => "Adesão a ATA",
            outro => outro.rotulo(),
        }
    }

    pub fn do_formulario(valor: &str) -> Option<TipoContrato> {
        TipoContrato::TODOS.into_iter().find(|t| t.rotulo() == valor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EtapaAtual {
    Planejamento,
    Licitacao,
    Execucao,
    FormalizacaoDeDemanda,
    InstrumentosEtpTr,
    OrcamentoEContratos,
    SetorDeLicitacoes,
    ControleInterno,
    Procuradoria,
    Empenho,
    AssinaturaEPublicacao,
    FiscalizacaoDeContrato,
    Liquidacao,
    Concluido,
}

impl EtapaAtual {
    pub const TODAS: [EtapaAtual; 14] = [
        EtapaAtual::Planejamento,
        EtapaAtual::Licitacao,
        EtapaAtual::Execucao,
        EtapaAtual::FormalizacaoDeDemanda,
        EtapaAtual::InstrumentosEtpTr,
        EtapaAtual::OrcamentoEContratos,
        EtapaAtual::SetorDeLicitacoes,
        EtapaAtual::ControleInterno,
        EtapaAtual::Procuradoria,
        EtapaAtual::Empenho,
        EtapaAtual::AssinaturaEPublicacao,
        EtapaAtual::FiscalizacaoDeContrato,
        EtapaAtual::Liquidacao,
        EtapaAtual::Concluido,
    ];

    pub fn rotulo(&self) -> &'static str {
        match self {
            EtapaAtual::Planejamento => "Planejamento",
            EtapaAtual::Licitacao => "Licitação",
            EtapaAtual::Execucao => "Execução",
            EtapaAtual::FormalizacaoDeDemanda => "Formalização de Demanda",
            EtapaAtual::InstrumentosEtpTr => "Instrumentos ETP - TR",
            EtapaAtual::OrcamentoEContratos => "Orçamento e Contratos",
            EtapaAtual::SetorDeLicitacoes => "Setor de Licitações",
            EtapaAtual::ControleInterno => "Controle Interno",
            EtapaAtual::Procuradoria => "Procuradoria",
            EtapaAtual::Empenho => "Empenho",
            EtapaAtual::AssinaturaEPublicacao => "Assinatura e Publicação",
            EtapaAtual::FiscalizacaoDeContrato => "Fiscalização de Contrato",
            EtapaAtual::Liquidacao => "Liquidação",
            EtapaAtual::Concluido => "Concluído",
        }
    }

    pub fn valor_backend(&self) -> &'static str {
        self.rotulo()
    }

    pub fn do_formulario(valor: &str) -> Option<EtapaAtual> {
        EtapaAtual::TODAS.into_iter().find(|e| e.rotulo() == valor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NivelRisco {
    Baixo,
    Medio,
    Alto,
}

impl NivelRisco {
    pub const TODOS: [NivelRisco; 3] = [NivelRisco::Baixo, NivelRisco::Medio, NivelRisco::Alto];

    pub fn rotulo(&self) -> &'static str {
        match self {
            NivelRisco::Baixo => "Baixo",
            NivelRisco::Medio => "Médio",
            NivelRisco::Alto => "Alto",
        }
    }

    pub fn valor_backend(&self) -> &'static str {
        self.rotulo()
    }

    pub fn do_formulario(valor: &str) -> Option<NivelRisco> {
        NivelRisco::TODOS.into_iter().find(|n| n.rotulo() == valor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Probabilidade {
    Raro,
    PoucoProvavel,
    Provavel,
    MuitoProvavel,
    PraticamenteCerto,
}

impl Probabilidade {
    pub const TODAS: [Probabilidade; 5] = [
        Probabilidade::Raro,
        Probabilidade::PoucoProvavel,
        Probabilidade::Provavel,
        Probabilidade::MuitoProvavel,
        Probabilidade::PraticamenteCerto,
    ];

    pub fn rotulo(&self) -> &'static str {
        match self {
            Probabilidade::Raro => "Raro",
            Probabilidade::PoucoProvavel => "Pouco Provável",
            Probabilidade::Provavel => "Provável",
            Probabilidade::MuitoProvavel => "Muito Provável",
            Probabilidade::PraticamenteCerto => "Praticamente Certo",
        }
    }

    pub fn valor_backend(&self) -> &'static str {
        self.rotulo()
    }

    pub fn do_formulario(valor: &str) -> Option<Probabilidade> {
        Probabilidade::TODAS.into_iter().find(|p| p.rotulo() == valor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Impacto {
    MuitoBaixo,
    Baixo,
    Medio,
    Alto,
    MuitoAlto,
}

impl Impacto {
    pub const TODOS: [Impacto; 5] = [
        Impacto::MuitoBaixo,
        Impacto::Baixo,
        Impacto::Medio,
        Impacto::Alto,
        Impacto::MuitoAlto,
    ];

    pub fn rotulo(&self) -> &'static str {
        match self {
            Impacto::MuitoBaixo => "Muito Baixo",
            Impacto::Baixo => "Baixo",
            Impacto::Medio => "Médio",
            Impacto::Alto => "Alto",
            Impacto::MuitoAlto => "Muito Alto",
        }
    }

    pub fn valor_backend(&self) -> &'static str {
        self.rotulo()
    }

    pub fn do_formulario(valor: &str) -> Option<Impacto> {
        Impacto::TODOS.into_iter().find(|i| i.rotulo() == valor)
    }
}

// --- Rascunho do formulário ---

/// Estado editável do formulário de cadastro de processo. Os valores
/// monetários ficam como texto até o envio, porque o operador digita valores
/// parciais ("12.", "abc") e o formulário não pode rejeitá-los a cada tecla.
/// `percentual_execucao` e `tempo_restante` são derivados e recalculados a
/// cada mudança de campo; nunca são editados diretamente.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RascunhoProcesso {
    pub nome_processo: String,
    pub objeto: Option<Objeto>,
    pub tipo_contrato: Option<TipoContrato>,
    pub etapa_atual: Option<EtapaAtual>,
    pub escolas_impactadas: i64,
    pub estudantes_impactados: i64,
    pub valor_total: String,
    pub valor_executado: String,
    pub percentual_execucao: f64,
    pub data_ordem_servico: String,
    pub data_prazo_final: String,
    pub data_empenho: String,
    pub numero_empenho: String,
    pub tempo_restante: String,
    pub nivel_risco: Option<NivelRisco>,
    pub probabilidade: Option<Probabilidade>,
    pub impacto: Option<Impacto>,
    pub justificativa_risco: String,
}

// --- Estruturas de fronteira com o backend ---

/// Corpo enviado em `POST /processos`. Os nomes de campo são os que a API
/// espera; o percentual vai na escala 0..=1, não 0..=100.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessoPayload {
    pub nome_processo: String,
    pub objeto: String,
    pub tipo_contrato: String,
    pub etapa_atual: String,
    pub escolas_impactadas: i64,
    pub estudantes_impactados: i64,
    pub valor_total: String,
    pub valor_executado: String,
    pub percentual_execucao: f64,
    pub data_ordem_servico: String,
    pub data_prazo_final: String,
    pub data_empenho: String,
    pub numero_empenho: String,
    pub tempo_restante: String,
    pub probabilidade: String,
    pub impacto: String,
    pub nivel_risco: String,
    pub justificativa_risco: String,
    pub user_ip: String,
    pub user_location: String,
    pub user_device: String,
}

/// Registro devolvido em `GET /processos`, já sem o envelope `props`.
/// Todos os campos são opcionais: registros antigos vêm com lacunas e a
/// tabela preenche com "N/A" ou "-" em vez de falhar.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessoRegistro {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub nome_processo: Option<String>,
    #[serde(default)]
    pub objeto: Option<String>,
    #[serde(default)]
    pub tipo_contrato: Option<String>,
    #[serde(default)]
    pub etapa_atual: Option<String>,
    #[serde(default)]
    pub escolas_impactadas: Option<i64>,
    #[serde(default)]
    pub estudantes_impactados: Option<i64>,
    #[serde(default)]
    pub valor_total: Option<f64>,
    #[serde(default)]
    pub valor_executado: Option<f64>,
    #[serde(default)]
    pub percentual_execucao: Option<f64>,
    #[serde(default)]
    pub data_ordem_servico: Option<String>,
    #[serde(default)]
    pub data_registro: Option<String>,
    #[serde(default)]
    pub data_prazo_final: Option<String>,
    #[serde(default)]
    pub data_empenho: Option<String>,
    #[serde(default)]
    pub numero_empenho: Option<String>,
    #[serde(default)]
    pub tempo_restante: Option<String>,
    #[serde(default)]
    pub nivel_risco: Option<String>,
    #[serde(default)]
    pub probabilidade: Option<String>,
    #[serde(default)]
    pub impacto: Option<String>,
    #[serde(default)]
    pub user_location: Option<String>,
}
