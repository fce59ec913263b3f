// src/web/mod.rs
pub mod auth_handlers;
pub mod cadastro_handlers;
pub mod mw_admin;
pub mod mw_auth;
pub mod processo_handlers;
pub mod routes;
pub mod usuarios_handlers;
