// src/services/mod.rs
pub mod acao;
pub mod cadastro_utilizador;
pub mod calculos;
pub mod formulario_processo;
pub mod painel_usuarios;
pub mod planilha;
pub mod proveniencia;
pub mod sessao;
pub mod tabela;
pub mod transferencia;
