// src/services/calculos.rs
//
// Cálculos derivados do formulário de processo. São funções puras de
// propósito único: o recálculo acontece no redutor do formulário, nunca
// espalhado pelos handlers.
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

const SEGUNDOS_POR_DIA: f64 = 86_400.0;

/// Percentual de execução financeira (0..=100, duas casas).
///
/// Os valores chegam como texto digitado pelo operador. Texto que não é
/// número conta como zero, e total não positivo zera o percentual em vez
/// de dividir por zero.
pub fn percentual_execucao(valor_total: &str, valor_executado: &str) -> f64 {
    let total = valor_total.trim().parse::<f64>().unwrap_or(0.0);
    let executado = valor_executado.trim().parse::<f64>().unwrap_or(0.0);
    if total > 0.0 {
        arredondar2(executado / total * 100.0)
    } else {
        0.0
    }
}

pub fn arredondar2(valor: f64) -> f64 {
    (valor * 100.0).round() / 100.0
}

/// Texto de prazo para a data da ordem de serviço (aaaa-mm-dd).
///
/// A conta é feita contra a meia-noite UTC da data alvo, com arredondamento
/// para cima: faltando qualquer fração de dia ainda conta como um dia
/// restante, e "Hoje" só aparece no próprio dia.
pub fn tempo_restante(data_alvo: &str, agora: DateTime<Utc>) -> String {
    let alvo = match NaiveDate::parse_from_str(data_alvo.trim(), "%Y-%m-%d") {
        Ok(data) => data,
        Err(_) => return "Data inválida".to_string(),
    };
    let meia_noite = alvo.and_time(NaiveTime::MIN).and_utc();
    let segundos = (meia_noite - agora).num_seconds();
    let dias = (segundos as f64 / SEGUNDOS_POR_DIA).ceil() as i64;

    match dias {
        d if d > 1 => format!("{d} dias restantes"),
        1 => "1 dia restante".to_string(),
        0 => "Hoje".to_string(),
        -1 => "Ontem".to_string(),
        d => format!("{} dias decorridos", d.abs()),
    }
}
