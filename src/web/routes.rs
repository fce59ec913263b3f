// src/web/routes.rs
use crate::{
    state::AppState,
    web::{
        auth_handlers, cadastro_handlers, mw_admin, mw_auth, processo_handlers,
        usuarios_handlers,
    },
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub fn create_router(app_state: AppState) -> Router {
    // --- Rotas Públicas ---
    let public_routes = Router::new()
        .route(
            "/login",
            get(auth_handlers::show_login).post(auth_handlers::handle_login),
        )
        .route("/logout", get(auth_handlers::handle_logout))
        // A raiz não tem página própria: cada papel cai na sua rota padrão
        .route("/", get(auth_handlers::rota_desconhecida));

    // --- Rotas de Admin ---
    // Exigem login E papel de administrador. Ficam no topo do caminho,
    // sem prefixo /admin: são os endereços que o navegador mostra
    let admin_routes = Router::new()
        .route(
            "/cadastrar-usuario",
            get(cadastro_handlers::show_cadastro).post(cadastro_handlers::handle_cadastro),
        )
        .route(
            "/visualizar-processos",
            get(processo_handlers::show_tabela_processos),
        )
        .route(
            "/visualizar-processos/exportar",
            get(processo_handlers::exportar_processos),
        )
        .route("/visualizar-usuarios", get(usuarios_handlers::show_usuarios))
        .route(
            "/visualizar-usuarios/{id}/alterar-senha",
            post(usuarios_handlers::handle_alterar_senha),
        )
        .route(
            "/visualizar-usuarios/{id}/deletar",
            get(usuarios_handlers::show_confirmar_exclusao)
                .post(usuarios_handlers::handle_deletar),
        )
        // Aplica APENAS mw_admin aqui (mw_auth vem do conjunto autenticado)
        .route_layer(middleware::from_fn(mw_admin::require_admin));

    // --- Rotas Autenticadas ---
    // Exigem *pelo menos* login
    let authenticated_routes = Router::new()
        .route(
            "/processos",
            get(processo_handlers::show_formulario).post(processo_handlers::handle_formulario),
        )
        .merge(admin_routes)
        // Aplica require_auth a TODAS as rotas definidas ACIMA neste router,
        // as de admin incluídas; ele roda antes do require_admin
        .route_layer(middleware::from_fn(mw_auth::require_auth));

    // --- Router Final ---
    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        // Endereço desconhecido não é erro: cai na página padrão do papel
        .fallback(auth_handlers::rota_desconhecida)
        .with_state(app_state)
}
