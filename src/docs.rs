// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::update_me,

        // --- Establishments ---
        handlers::tenancy::create_establishment,
        handlers::tenancy::list_my_establishments,
        handlers::tenancy::update_establishment,
        handlers::tenancy::list_members,
        handlers::tenancy::invite_member,
        handlers::tenancy::update_member,

        // --- Payers ---
        handlers::payers::create_payer,
        handlers::payers::list_payers,
        handlers::payers::get_payer,
        handlers::payers::update_payer,
        handlers::payers::delete_payer,

        // --- Charges ---
        handlers::charges::create_charge,
        handlers::charges::list_charges,
        handlers::charges::charges_summary,
        handlers::charges::get_charge,
        handlers::charges::update_charge,
        handlers::charges::pay_charge,
        handlers::charges::cancel_charge,
        handlers::charges::delete_charge,

        // --- Purchases ---
        handlers::purchases::create_purchase,
        handlers::purchases::list_purchases,
        handlers::purchases::get_purchase,
        handlers::purchases::add_item,
        handlers::purchases::remove_item,
        handlers::purchases::delete_purchase,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::UpdateProfilePayload,
            models::auth::AuthResponse,

            // --- Tenancy ---
            models::tenancy::Establishment,
            models::tenancy::EstablishmentRole,
            models::tenancy::UserEstablishmentLink,
            models::tenancy::UserEstablishment,
            models::tenancy::EstablishmentMember,
            models::tenancy::CreateEstablishmentPayload,
            models::tenancy::UpdateEstablishmentPayload,
            models::tenancy::InviteMemberPayload,
            models::tenancy::UpdateMemberPayload,

            // --- Payers ---
            models::payers::Payer,
            models::payers::CreatePayerPayload,
            models::payers::UpdatePayerPayload,

            // --- Finance ---
            models::finance::ChargeStatus,
            models::finance::ChargeDateField,
            models::finance::Charge,
            models::finance::ChargeView,
            models::finance::ChargeSummary,
            models::finance::ChargeListing,
            models::finance::CreateChargePayload,
            models::finance::UpdateChargePayload,
            models::finance::MarkChargePaidPayload,

            // --- Purchases ---
            models::purchases::Purchase,
            models::purchases::PurchaseLineItem,
            models::purchases::PurchaseDetail,
            models::purchases::PurchaseListing,
            models::purchases::LineItemPayload,
            models::purchases::CreatePurchasePayload,

            // --- Dashboard ---
            models::dashboard::PeriodOverview,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Establishments", description = "Escolas, equipe e acessos"),
        (name = "Payers", description = "Responsáveis financeiros"),
        (name = "Charges", description = "Mensalidades e cobranças"),
        (name = "Purchases", description = "Compras e gastos do estabelecimento"),
        (name = "Dashboard", description = "Resumo financeiro do mês")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
