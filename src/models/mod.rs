// src/models/mod.rs
pub mod processo;
pub mod utilizador;
