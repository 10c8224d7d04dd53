// src/lib.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod ledger;
pub mod middleware;
pub mod models;
pub mod services;

use crate::{config::AppState, docs::ApiDoc, middleware::auth::auth_guard};

/// Monta o router completo (rotas públicas, protegidas e Swagger).
pub fn build_router(app_state: AppState) -> Router {
    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let user_routes = Router::new().route(
        "/me",
        get(handlers::auth::get_me).put(handlers::auth::update_me),
    );

    let establishment_routes = Router::new()
        .route(
            "/",
            post(handlers::tenancy::create_establishment).get(handlers::tenancy::list_my_establishments),
        )
        .route("/{id}", put(handlers::tenancy::update_establishment))
        .route(
            "/{id}/members",
            get(handlers::tenancy::list_members).post(handlers::tenancy::invite_member),
        )
        .route("/{id}/members/{user_id}", put(handlers::tenancy::update_member));

    let payer_routes = Router::new()
        .route(
            "/",
            post(handlers::payers::create_payer).get(handlers::payers::list_payers),
        )
        .route(
            "/{id}",
            get(handlers::payers::get_payer)
                .put(handlers::payers::update_payer)
                .delete(handlers::payers::delete_payer),
        );

    let charge_routes = Router::new()
        .route(
            "/",
            post(handlers::charges::create_charge).get(handlers::charges::list_charges),
        )
        .route("/summary", get(handlers::charges::charges_summary))
        .route(
            "/{id}",
            get(handlers::charges::get_charge)
                .put(handlers::charges::update_charge)
                .delete(handlers::charges::delete_charge),
        )
        .route("/{id}/pay", post(handlers::charges::pay_charge))
        .route("/{id}/cancel", post(handlers::charges::cancel_charge));

    let purchase_routes = Router::new()
        .route(
            "/",
            post(handlers::purchases::create_purchase).get(handlers::purchases::list_purchases),
        )
        .route(
            "/{id}",
            get(handlers::purchases::get_purchase).delete(handlers::purchases::delete_purchase),
        )
        .route("/{id}/items", post(handlers::purchases::add_item))
        .route("/{id}/items/{item_id}", delete(handlers::purchases::remove_item));

    let dashboard_routes = Router::new().route("/summary", get(handlers::dashboard::get_summary));

    // Tudo abaixo exige Bearer válido
    let protected = Router::new()
        .nest("/api/users", user_routes)
        .nest("/api/establishments", establishment_routes)
        .nest("/api/payers", payer_routes)
        .nest("/api/charges", charge_routes)
        .nest("/api/purchases", purchase_routes)
        .nest("/api/dashboard", dashboard_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .merge(protected)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
