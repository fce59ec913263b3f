// src/gateway/mod.rs
pub mod erro;
pub mod portal;
