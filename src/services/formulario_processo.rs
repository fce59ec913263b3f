// src/services/formulario_processo.rs
//
// Máquina de estados do formulário de cadastro de processo. Toda mudança de
// campo passa pelo redutor `reduzir`, que devolve o rascunho novo já com os
// campos derivados recalculados. O envio é dividido em duas fases
// (preparar / concluir) para a chamada de rede ficar fora da máquina.
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::collections::BTreeMap;

use crate::gateway::erro::ErroGateway;
use crate::models::processo::{
    EtapaAtual, Impacto, NivelRisco, Objeto, Probabilidade, ProcessoPayload, RascunhoProcesso,
    TipoContrato,
};
use crate::services::acao::EstadoAcao;
use crate::services::calculos;
use crate::services::proveniencia::Proveniencia;

pub const ANO_MAXIMO: i32 = 9999;

/// Uma edição de campo feita pelo operador.
#[derive(Debug, Clone, PartialEq)]
pub enum MudancaCampo {
    NomeProcesso(String),
    Objeto(Option<Objeto>),
    TipoContrato(Option<TipoContrato>),
    EtapaAtual(Option<EtapaAtual>),
    EscolasImpactadas(i64),
    EstudantesImpactados(i64),
    ValorTotal(String),
    ValorExecutado(String),
    DataOrdemServico(String),
    DataPrazoFinal(String),
    DataEmpenho(String),
    NumeroEmpenho(String),
    NivelRisco(Option<NivelRisco>),
    Probabilidade(Option<Probabilidade>),
    Impacto(Option<Impacto>),
    JustificativaRisco(String),
}

/// Aplica uma mudança de campo e recalcula os derivados na mesma transição.
/// Função pura: rascunho igual + mudança igual + instante igual dá sempre o
/// mesmo rascunho de saída.
pub fn reduzir(
    mut rascunho: RascunhoProcesso,
    mudanca: MudancaCampo,
    agora: DateTime<Utc>,
) -> RascunhoProcesso {
    match mudanca {
        MudancaCampo::NomeProcesso(valor) => rascunho.nome_processo = valor,
        MudancaCampo::Objeto(valor) => rascunho.objeto = valor,
        MudancaCampo::TipoContrato(valor) => rascunho.tipo_contrato = valor,
        MudancaCampo::EtapaAtual(valor) => rascunho.etapa_atual = valor,
        MudancaCampo::EscolasImpactadas(valor) => rascunho.escolas_impactadas = valor,
        MudancaCampo::EstudantesImpactados(valor) => rascunho.estudantes_impactados = valor,
        MudancaCampo::ValorTotal(valor) => rascunho.valor_total = valor,
        MudancaCampo::ValorExecutado(valor) => rascunho.valor_executado = valor,
        MudancaCampo::DataOrdemServico(valor) => rascunho.data_ordem_servico = valor,
        MudancaCampo::DataPrazoFinal(valor) => rascunho.data_prazo_final = valor,
        MudancaCampo::DataEmpenho(valor) => rascunho.data_empenho = valor,
        MudancaCampo::NumeroEmpenho(valor) => rascunho.numero_empenho = valor,
        MudancaCampo::NivelRisco(valor) => rascunho.nivel_risco = valor,
        MudancaCampo::Probabilidade(valor) => rascunho.probabilidade = valor,
        MudancaCampo::Impacto(valor) => rascunho.impacto = valor,
        MudancaCampo::JustificativaRisco(valor) => rascunho.justificativa_risco = valor,
    }

    // Derivados nunca ficam para depois: quem lê o rascunho depois de uma
    // transição já vê percentual e prazo coerentes com os campos base.
    rascunho.percentual_execucao =
        calculos::percentual_execucao(&rascunho.valor_total, &rascunho.valor_executado);
    rascunho.tempo_restante = if rascunho.data_ordem_servico.trim().is_empty() {
        String::new()
    } else {
        calculos::tempo_restante(&rascunho.data_ordem_servico, agora)
    };
    rascunho
}

/// Resultado da fase síncrona do envio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreparoEnvio {
    /// Validado e marcado como pendente; o chamador deve disparar o POST.
    Pronto,
    /// Há erros de validação; nada foi enviado.
    Invalido,
    /// Já existe um envio em voo; a repetição é ignorada.
    JaPendente,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormularioProcesso {
    rascunho: RascunhoProcesso,
    erros: BTreeMap<&'static str, String>,
    envio: EstadoAcao<(), String>,
}

impl Default for FormularioProcesso {
    fn default() -> Self {
        Self::novo()
    }
}

impl FormularioProcesso {
    pub fn novo() -> Self {
        Self {
            rascunho: RascunhoProcesso::default(),
            erros: BTreeMap::new(),
            envio: EstadoAcao::Ocioso,
        }
    }

    pub fn aplicar(&mut self, mudanca: MudancaCampo, agora: DateTime<Utc>) {
        self.rascunho = reduzir(self.rascunho.clone(), mudanca, agora);
    }

    pub fn rascunho(&self) -> &RascunhoProcesso {
        &self.rascunho
    }

    pub fn erros(&self) -> &BTreeMap<&'static str, String> {
        &self.erros
    }

    pub fn envio(&self) -> &EstadoAcao<(), String> {
        &self.envio
    }

    /// Valida o rascunho campo a campo. O mapa devolvido tem uma entrada por
    /// campo inválido, com a mensagem que a tela mostra junto ao campo.
    pub fn validar(rascunho: &RascunhoProcesso) -> BTreeMap<&'static str, String> {
        let mut erros = BTreeMap::new();

        if rascunho.nome_processo.trim().is_empty() {
            erros.insert("nome_processo", "O nome do processo é obrigatório.".to_string());
        }
        if rascunho.objeto.is_none() {
            erros.insert("objeto", "Selecione o objeto.".to_string());
        }
        if rascunho.tipo_contrato.is_none() {
            erros.insert("tipo_contrato", "Selecione o tipo de contrato.".to_string());
        }
        if rascunho.etapa_atual.is_none() {
            erros.insert("etapa_atual", "Selecione a etapa atual.".to_string());
        }
        if rascunho.escolas_impactadas < 0 {
            erros.insert(
                "escolas_impactadas",
                "A abrangência não pode ser negativa.".to_string(),
            );
        }
        if rascunho.estudantes_impactados < 0 {
            erros.insert(
                "estudantes_impactados",
                "O número de estudantes não pode ser negativo.".to_string(),
            );
        }

        if rascunho.valor_total.trim().is_empty() {
            erros.insert("valor_total", "O valor total previsto é obrigatório.".to_string());
        } else if rascunho.valor_total.trim().parse::<f64>().is_err() {
            erros.insert(
                "valor_total",
                "O valor total previsto deve ser um número.".to_string(),
            );
        }
        if rascunho.valor_executado.trim().is_empty() {
            erros.insert("valor_executado", "O valor já executado é obrigatório.".to_string());
        } else if rascunho.valor_executado.trim().parse::<f64>().is_err() {
            erros.insert(
                "valor_executado",
                "O valor já executado deve ser um número.".to_string(),
            );
        }

        if let Some(problema) = validar_data(
            &rascunho.data_empenho,
            "A data do empenho não pode ultrapassar o ano 9999.",
        ) {
            erros.insert("data_empenho", problema);
        }
        if let Some(problema) = validar_data(
            &rascunho.data_prazo_final,
            "O prazo final não pode ultrapassar o ano 9999.",
        ) {
            erros.insert("data_prazo_final", problema);
        }
        if let Some(problema) = validar_data(
            &rascunho.data_ordem_servico,
            "A data da ordem de serviço não pode ultrapassar o ano 9999.",
        ) {
            erros.insert("data_ordem_servico", problema);
        }

        if rascunho.nivel_risco.is_none() {
            erros.insert("nivel_risco", "Selecione o nível de risco.".to_string());
        }
        if rascunho.probabilidade.is_none() {
            erros.insert("probabilidade", "Selecione a probabilidade.".to_string());
        }
        if rascunho.impacto.is_none() {
            erros.insert("impacto", "Selecione o impacto.".to_string());
        }

        erros
    }

    /// Fase síncrona do envio: barra repetição em voo, valida e marca como
    /// pendente. Só devolve `Pronto` uma vez por envio.
    pub fn preparar_envio(&mut self) -> PreparoEnvio {
        if self.envio.em_curso() {
            tracing::debug!("Envio de processo ignorado: já existe um em andamento.");
            return PreparoEnvio::JaPendente;
        }
        self.erros = Self::validar(&self.rascunho);
        if !self.erros.is_empty() {
            tracing::debug!("Envio de processo barrado por {} erro(s) de validação.", self.erros.len());
            return PreparoEnvio::Invalido;
        }
        self.envio = EstadoAcao::Pendente;
        PreparoEnvio::Pronto
    }

    /// Monta o corpo de `POST /processos` a partir do rascunho validado.
    /// O percentual vai dividido por 100, como a API espera.
    pub fn montar_payload(&self, proveniencia: &Proveniencia) -> ProcessoPayload {
        let rascunho = &self.rascunho;
        ProcessoPayload {
            nome_processo: rascunho.nome_processo.clone(),
            objeto: valor_ou_vazio(rascunho.objeto.map(|o| o.valor_backend())),
            tipo_contrato: valor_ou_vazio(rascunho.tipo_contrato.map(|t| t.valor_backend())),
            etapa_atual: valor_ou_vazio(rascunho.etapa_atual.map(|e| e.valor_backend())),
            escolas_impactadas: rascunho.escolas_impactadas,
            estudantes_impactados: rascunho.estudantes_impactados,
            valor_total: rascunho.valor_total.trim().to_string(),
            valor_executado: rascunho.valor_executado.trim().to_string(),
            percentual_execucao: rascunho.percentual_execucao / 100.0,
            data_ordem_servico: rascunho.data_ordem_servico.clone(),
            data_prazo_final: rascunho.data_prazo_final.clone(),
            data_empenho: rascunho.data_empenho.clone(),
            numero_empenho: rascunho.numero_empenho.trim().to_string(),
            tempo_restante: rascunho.tempo_restante.clone(),
            probabilidade: valor_ou_vazio(rascunho.probabilidade.map(|p| p.valor_backend())),
            impacto: valor_ou_vazio(rascunho.impacto.map(|i| i.valor_backend())),
            nivel_risco: valor_ou_vazio(rascunho.nivel_risco.map(|n| n.valor_backend())),
            justificativa_risco: rascunho.justificativa_risco.trim().to_string(),
            user_ip: proveniencia.ip.clone(),
            user_location: proveniencia.localizacao.clone(),
            user_device: proveniencia.dispositivo.clone(),
        }
    }

    /// Fase final do envio. Sucesso limpa o rascunho para o próximo cadastro;
    /// falha preserva tudo que o operador digitou.
    pub fn concluir_envio(&mut self, resultado: Result<(), ErroGateway>) {
        match resultado {
            Ok(()) => {
                self.rascunho = RascunhoProcesso::default();
                self.erros.clear();
                self.envio = EstadoAcao::Concluido(());
            }
            Err(erro) => {
                tracing::warn!("Falha no envio do processo: {erro}");
                self.envio = EstadoAcao::Falhou(mensagem_envio(&erro));
            }
        }
    }
}

/// Mensagem mostrada quando o POST de processo falha.
pub fn mensagem_envio(erro: &ErroGateway) -> String {
    match erro {
        ErroGateway::Conexao(_) => "Erro ao enviar os dados.".to_string(),
        ErroGateway::Indisponivel { .. } => {
            "Servidor indisponível. Verifique o servidor do backend.".to_string()
        }
        outro => format!(
            "Erro ao cadastrar o processo: {}",
            outro.mensagem_backend().unwrap_or("Erro desconhecido")
        ),
    }
}

fn valor_ou_vazio(valor: Option<&'static str>) -> String {
    valor.unwrap_or_default().to_string()
}

/// Campo de data é opcional, mas quando preenchido precisa ser uma data real
/// dentro do intervalo que o backend aceita.
fn validar_data(valor: &str, mensagem_limite: &str) -> Option<String> {
    let valor = valor.trim();
    if valor.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(valor, "%Y-%m-%d") {
        Err(_) => Some("Data inválida.".to_string()),
        Ok(data) if data.year() > ANO_MAXIMO => Some(mensagem_limite.to_string()),
        Ok(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn agora() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-10T08:00:00Z")
            .expect("instante de teste válido")
            .with_timezone(&Utc)
    }

    fn proveniencia() -> Proveniencia {
        Proveniencia {
            ip: "10.0.0.9".to_string(),
            localizacao: "Natal, Rio Grande do Norte".to_string(),
            dispositivo: "Mozilla/5.0 (teste)".to_string(),
        }
    }

    fn rascunho_valido() -> RascunhoProcesso {
        let mut maquina = FormularioProcesso::novo();
        for mudanca in [
            MudancaCampo::NomeProcesso("Reforma da quadra".to_string()),
            MudancaCampo::Objeto(Some(Objeto::Obra)),
            MudancaCampo::TipoContrato(Some(TipoContrato::Pregao)),
            MudancaCampo::EtapaAtual(Some(EtapaAtual::Execucao)),
            MudancaCampo::EscolasImpactadas(3),
            MudancaCampo::EstudantesImpactados(480),
            MudancaCampo::ValorTotal("200000".to_string()),
            MudancaCampo::ValorExecutado("50000".to_string()),
            MudancaCampo::DataOrdemServico("2024-05-20".to_string()),
            MudancaCampo::NivelRisco(Some(NivelRisco::Baixo)),
            MudancaCampo::Probabilidade(Some(Probabilidade::Raro)),
            MudancaCampo::Impacto(Some(Impacto::Baixo)),
        ] {
            maquina.aplicar(mudanca, agora());
        }
        maquina.rascunho().clone()
    }

    fn maquina_valida() -> FormularioProcesso {
        let mut maquina = FormularioProcesso::novo();
        maquina.rascunho = rascunho_valido();
        maquina
    }

    #[test]
    fn mudar_valores_recalcula_o_percentual_na_mesma_transicao() {
        let rascunho = reduzir(
            RascunhoProcesso::default(),
            MudancaCampo::ValorTotal("200".to_string()),
            agora(),
        );
        assert_eq!(rascunho.percentual_execucao, 0.0);

        let rascunho = reduzir(rascunho, MudancaCampo::ValorExecutado("50".to_string()), agora());
        assert_eq!(rascunho.percentual_execucao, 25.0);

        let rascunho = reduzir(rascunho, MudancaCampo::ValorTotal("0".to_string()), agora());
        assert_eq!(rascunho.percentual_execucao, 0.0);
    }

    #[test]
    fn mudar_a_data_da_ordem_recalcula_o_tempo_restante() {
        let rascunho = reduzir(
            RascunhoProcesso::default(),
            MudancaCampo::DataOrdemServico("2024-05-20".to_string()),
            agora(),
        );
        assert_eq!(rascunho.tempo_restante, "10 dias restantes");

        // Limpar a data limpa o texto derivado junto.
        let rascunho = reduzir(rascunho, MudancaCampo::DataOrdemServico(String::new()), agora());
        assert_eq!(rascunho.tempo_restante, "");
    }

    #[test]
    fn data_ilegivel_vira_texto_de_data_invalida() {
        let rascunho = reduzir(
            RascunhoProcesso::default(),
            MudancaCampo::DataOrdemServico("20/05/2024".to_string()),
            agora(),
        );
        assert_eq!(rascunho.tempo_restante, "Data inválida");
    }

    #[test]
    fn redutor_e_deterministico_para_a_mesma_entrada() {
        let mudanca = MudancaCampo::ValorExecutado("75".to_string());
        let base = reduzir(
            RascunhoProcesso::default(),
            MudancaCampo::ValorTotal("300".to_string()),
            agora(),
        );
        let primeira = reduzir(base.clone(), mudanca.clone(), agora());
        let segunda = reduzir(base, mudanca, agora());
        assert_eq!(primeira, segunda);
    }

    #[test]
    fn rascunho_vazio_reprova_todos_os_campos_obrigatorios() {
        let erros = FormularioProcesso::validar(&RascunhoProcesso::default());
        for campo in [
            "nome_processo",
            "objeto",
            "tipo_contrato",
            "etapa_atual",
            "valor_total",
            "valor_executado",
            "nivel_risco",
            "probabilidade",
            "impacto",
        ] {
            assert!(erros.contains_key(campo), "faltou erro para {campo}");
        }
        // Zero escolas/estudantes é permitido; só negativo reprova.
        assert!(!erros.contains_key("escolas_impactadas"));
        assert!(!erros.contains_key("estudantes_impactados"));
    }

    #[test]
    fn erros_sao_exatamente_dos_campos_invalidos() {
        let mut rascunho = rascunho_valido();
        rascunho.nome_processo = "   ".to_string();
        rascunho.objeto = None;
        rascunho.nivel_risco = None;

        let erros = FormularioProcesso::validar(&rascunho);
        let campos: Vec<&str> = erros.keys().copied().collect();
        assert_eq!(campos, vec!["nivel_risco", "nome_processo", "objeto"]);
        assert_eq!(erros["nome_processo"], "O nome do processo é obrigatório.");
        assert_eq!(erros["objeto"], "Selecione o objeto.");
        assert_eq!(erros["nivel_risco"], "Selecione o nível de risco.");
    }

    #[rstest]
    #[case("-1", "escolas_impactadas", "A abrangência não pode ser negativa.")]
    #[case("-10", "estudantes_impactados", "O número de estudantes não pode ser negativo.")]
    fn quantidades_negativas_reprovam(
        #[case] valor: &str,
        #[case] campo: &str,
        #[case] mensagem: &str,
    ) {
        let mut rascunho = rascunho_valido();
        let quantidade: i64 = valor.parse().expect("número de teste");
        if campo == "escolas_impactadas" {
            rascunho.escolas_impactadas = quantidade;
        } else {
            rascunho.estudantes_impactados = quantidade;
        }
        let erros = FormularioProcesso::validar(&rascunho);
        assert_eq!(erros.get(campo).map(String::as_str), Some(mensagem));
    }

    #[rstest]
    #[case("", "O valor total previsto é obrigatório.")]
    #[case("12,5", "O valor total previsto deve ser um número.")]
    #[case("abc", "O valor total previsto deve ser um número.")]
    fn valor_total_precisa_ser_numerico(#[case] valor: &str, #[case] mensagem: &str) {
        let mut rascunho = rascunho_valido();
        rascunho.valor_total = valor.to_string();
        let erros = FormularioProcesso::validar(&rascunho);
        assert_eq!(erros.get("valor_total").map(String::as_str), Some(mensagem));
    }

    #[test]
    fn datas_respeitam_o_limite_do_backend() {
        let mut rascunho = rascunho_valido();
        rascunho.data_empenho = "na próxima semana".to_string();
        rascunho.data_prazo_final = "10000-01-01".to_string();
        let erros = FormularioProcesso::validar(&rascunho);
        assert_eq!(erros.get("data_empenho").map(String::as_str), Some("Data inválida."));
        assert_eq!(
            erros.get("data_prazo_final").map(String::as_str),
            Some("O prazo final não pode ultrapassar o ano 9999.")
        );
    }

    #[test]
    fn rascunho_completo_passa_sem_erros() {
        assert!(FormularioProcesso::validar(&rascunho_valido()).is_empty());
    }

    #[test]
    fn envio_valido_so_fica_pronto_uma_vez() {
        let mut maquina = maquina_valida();
        assert_eq!(maquina.preparar_envio(), PreparoEnvio::Pronto);
        assert!(maquina.envio().em_curso());
        // Segundo clique antes da conclusão: nada novo a enviar.
        assert_eq!(maquina.preparar_envio(), PreparoEnvio::JaPendente);
    }

    #[test]
    fn envio_invalido_nao_fica_pendente() {
        let mut maquina = FormularioProcesso::novo();
        assert_eq!(maquina.preparar_envio(), PreparoEnvio::Invalido);
        assert!(!maquina.envio().em_curso());
        assert!(!maquina.erros().is_empty());
    }

    #[test]
    fn sucesso_limpa_o_rascunho_e_libera_novo_envio() {
        let mut maquina = maquina_valida();
        assert_eq!(maquina.preparar_envio(), PreparoEnvio::Pronto);
        maquina.concluir_envio(Ok(()));

        assert!(maquina.envio().concluido());
        assert_eq!(maquina.rascunho(), &RascunhoProcesso::default());
        // Com o rascunho limpo, um novo envio volta a ser validado do zero.
        assert_eq!(maquina.preparar_envio(), PreparoEnvio::Invalido);
    }

    #[test]
    fn falha_preserva_o_rascunho_digitado() {
        let mut maquina = maquina_valida();
        let digitado = maquina.rascunho().clone();
        assert_eq!(maquina.preparar_envio(), PreparoEnvio::Pronto);
        maquina.concluir_envio(Err(ErroGateway::Negocio {
            status: 422,
            mensagem: Some("Nome duplicado".to_string()),
        }));

        assert_eq!(
            maquina.envio().falha().map(String::as_str),
            Some("Erro ao cadastrar o processo: Nome duplicado")
        );
        assert_eq!(maquina.rascunho(), &digitado);
    }

    #[rstest]
    #[case(ErroGateway::Conexao("refused".to_string()), "Erro ao enviar os dados.")]
    #[case(
        ErroGateway::Indisponivel { status: 502 },
        "Servidor indisponível. Verifique o servidor do backend."
    )]
    #[case(
        ErroGateway::Negocio { status: 500, mensagem: None },
        "Erro ao cadastrar o processo: Erro desconhecido"
    )]
    fn mensagem_de_envio_distingue_as_classes_de_falha(
        #[case] erro: ErroGateway,
        #[case] esperada: &str,
    ) {
        assert_eq!(mensagem_envio(&erro), esperada);
    }

    #[test]
    fn payload_traduz_rotulos_e_escala_do_percentual() {
        let mut maquina = maquina_valida();
        maquina.aplicar(
            MudancaCampo::TipoContrato(Some(TipoContrato::TermoDeAjuste)),
            agora(),
        );
        let payload = maquina.montar_payload(&proveniencia());

        assert_eq!(payload.tipo_contrato, "Adesão a ATA");
        assert_eq!(payload.etapa_atual, "Execução");
        assert_eq!(payload.percentual_execucao, 0.25);
        assert_eq!(payload.tempo_restante, "10 dias restantes");
        assert_eq!(payload.user_ip, "10.0.0.9");
        assert_eq!(payload.user_location, "Natal, Rio Grande do Norte");
        assert_eq!(payload.user_device, "Mozilla/5.0 (teste)");
    }
}
