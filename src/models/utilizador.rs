// src/models/utilizador.rs
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Nível de acesso devolvido pelo backend no login. Qualquer valor que não
/// seja "admin" entra como utilizador comum: na dúvida, menos privilégio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Papel {
    Administrador,
    Usuario,
}

impl From<String> for Papel {
    fn from(valor: String) -> Self {
        if valor == "admin" {
            Papel::Administrador
        } else {
            Papel::Usuario
        }
    }
}

impl From<Papel> for String {
    fn from(papel: Papel) -> Self {
        papel.valor_backend().to_string()
    }
}

impl Papel {
    pub fn rotulo(&self) -> &'static str {
        match self {
            Papel::Administrador => "Administrador",
            Papel::Usuario => "Usuário",
        }
    }

    pub fn valor_backend(&self) -> &'static str {
        match self {
            Papel::Administrador => "admin",
            Papel::Usuario => "user",
        }
    }
}

/// Quem está autenticado nesta sessão. Guardado na sessão após o login e
/// injetado nos handlers pelo middleware de autenticação.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identidade {
    #[serde(rename = "name")]
    pub nome: String,
    #[serde(rename = "role")]
    pub papel: Papel,
}

impl Identidade {
    pub fn admin(&self) -> bool {
        self.papel == Papel::Administrador
    }
}

/// Resposta de `POST /users/login`. Só é considerada login válido quando o
/// token e a identidade vêm ambos presentes.
#[derive(Debug, Clone, Deserialize)]
pub struct SessaoAberta {
    pub access_token: String,
    #[serde(rename = "user")]
    pub identidade: Identidade,
}

/// Utilizador listado em `GET /users`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Utilizador {
    pub id: i64,
    #[serde(rename = "name")]
    pub nome: String,
    pub email: String,
    #[serde(rename = "role")]
    pub papel: Papel,
    #[serde(rename = "createdAt", default)]
    pub criado_em: Option<String>,
}

impl Utilizador {
    /// Data de criação em dd/mm/aaaa, ou "-" quando o backend não informou
    /// uma data reconhecível.
    pub fn criado_em_br(&self) -> String {
        let Some(bruto) = self.criado_em.as_deref() else {
            return "-".to_string();
        };
        formatar_data_br(bruto).unwrap_or_else(|| "-".to_string())
    }
}

/// Corpo de `POST /users/register`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistroPayload {
    #[serde(rename = "name")]
    pub nome: String,
    pub email: String,
    #[serde(rename = "password")]
    pub senha: String,
    #[serde(rename = "role")]
    pub papel: Papel,
}

/// Tenta os formatos de data que o backend costuma devolver e devolve
/// dd/mm/aaaa. `None` quando nenhum formato casa.
pub fn formatar_data_br(bruto: &str) -> Option<String> {
    let bruto = bruto.trim();
    if bruto.is_empty() {
        return None;
    }
    if let Ok(instante) = DateTime::parse_from_rfc3339(bruto) {
        return Some(instante.format("%d/%m/%Y").to_string());
    }
    if let Ok(instante) = NaiveDateTime::parse_from_str(bruto, "%Y-%m-%d %H:%M:%S") {
        return Some(instante.format("%d/%m/%Y").to_string());
    }
    if let Ok(dia) = NaiveDate::parse_from_str(bruto, "%Y-%m-%d") {
        return Some(dia.format("%d/%m/%Y").to_string());
    }
    None
}
