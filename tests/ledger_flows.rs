// Fluxos de negócio de ponta a ponta nos serviços, com o store em memória.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use escola_financeiro::{
    common::error::AppError,
    db::Repositories,
    ledger::Period,
    models::{
        auth::{LoginUserPayload, NewUser, RegisterUserPayload, User},
        finance::{
            ChargeDateField, ChargeStatus, CreateChargePayload, MarkChargePaidPayload,
            UpdateChargePayload,
        },
        payers::{CreatePayerPayload, UpdatePayerPayload},
        purchases::{CreatePurchasePayload, LineItemPayload, NewLineItem, NewPurchase},
        tenancy::{
            CreateEstablishmentPayload, EstablishmentRole, EstablishmentScope, InviteMemberPayload,
            UpdateEstablishmentPayload,
        },
    },
    services::{
        auth::AuthService, charge_service::ChargeService, dashboard_service::DashboardService,
        payer_service::PayerService, purchase_service::PurchaseService,
        tenancy_service::TenantService,
    },
};

struct Ledger {
    repos: Repositories,
    tenants: TenantService,
    payers: PayerService,
    charges: ChargeService,
    purchases: PurchaseService,
    dashboard: DashboardService,
}

impl Ledger {
    fn new() -> Self {
        let repos = Repositories::in_memory();
        let tenants = TenantService::new(repos.establishments.clone(), repos.users.clone());
        let payers = PayerService::new(repos.payers.clone());
        let charges = ChargeService::new(repos.charges.clone(), repos.payers.clone());
        let purchases = PurchaseService::new(repos.purchases.clone(), repos.establishments.clone());
        let dashboard = DashboardService::new(charges.clone(), purchases.clone());
        Self { repos, tenants, payers, charges, purchases, dashboard }
    }

    async fn user(&self, email: &str) -> User {
        self.repos
            .users
            .create_user(NewUser {
                email: email.to_string(),
                password_hash: "hash".to_string(),
                name: email.to_string(),
                phone: None,
            })
            .await
            .unwrap()
    }

    async fn school(&self, owner: &User, name: &str) -> EstablishmentScope {
        let (establishment, _) = self
            .tenants
            .create_establishment_with_owner(owner.id, establishment_payload(name, None))
            .await
            .unwrap();
        self.tenants.authorize(owner.id, establishment.id).await.unwrap()
    }

    async fn payer(&self, scope: &EstablishmentScope, name: &str) -> Uuid {
        self.payers
            .create_payer(
                scope,
                CreatePayerPayload {
                    establishment_id: None,
                    name: name.to_string(),
                    email: None,
                    phone: None,
                    tax_id: None,
                    notes: None,
                },
            )
            .await
            .unwrap()
            .id
    }
}

fn establishment_payload(name: &str, tax_id: Option<&str>) -> CreateEstablishmentPayload {
    CreateEstablishmentPayload {
        name: name.to_string(),
        tax_id: tax_id.map(str::to_string),
        email: None,
        phone: None,
        address: None,
    }
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn charge(payer_id: Uuid, amount: &str, due: NaiveDate, status: Option<ChargeStatus>) -> CreateChargePayload {
    CreateChargePayload {
        establishment_id: None,
        payer_id,
        amount: dec(amount),
        due_date: due,
        payment_date: None,
        status,
        description: None,
    }
}

fn item(name: &str, quantity: &str, unit_price: &str) -> LineItemPayload {
    LineItemPayload {
        product_name: name.to_string(),
        quantity: dec(quantity),
        unit_price: dec(unit_price),
        category: None,
        note: None,
    }
}

#[tokio::test]
async fn creating_an_establishment_links_the_creator_as_owner() {
    let ledger = Ledger::new();
    let owner = ledger.user("dono@escola.com").await;

    let (establishment, link) = ledger
        .tenants
        .create_establishment_with_owner(owner.id, establishment_payload("Escola ABC", None))
        .await
        .unwrap();

    assert_eq!(establishment.name, "Escola ABC");
    assert_eq!(establishment.created_by, owner.id);
    assert_eq!(link.user_id, owner.id);
    assert_eq!(link.establishment_id, establishment.id);
    assert_eq!(link.role, EstablishmentRole::Owner);

    let mine = ledger.tenants.list_user_establishments(owner.id).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].role, EstablishmentRole::Owner);

    let members = ledger.tenants.list_members(&ledger.tenants.authorize(owner.id, establishment.id).await.unwrap()).await.unwrap();
    assert_eq!(members.len(), 1);
}

#[tokio::test]
async fn establishment_for_unknown_user_creates_nothing() {
    let ledger = Ledger::new();
    let ghost = Uuid::new_v4();

    let result = ledger
        .tenants
        .create_establishment_with_owner(ghost, establishment_payload("Fantasma", None))
        .await;

    assert!(result.is_err());
    assert!(ledger.tenants.list_user_establishments(ghost).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_tax_id_is_a_conflict() {
    let ledger = Ledger::new();
    let owner = ledger.user("dono@escola.com").await;

    ledger
        .tenants
        .create_establishment_with_owner(owner.id, establishment_payload("A", Some("12.345.678/0001-99")))
        .await
        .unwrap();
    let second = ledger
        .tenants
        .create_establishment_with_owner(owner.id, establishment_payload("B", Some("12.345.678/0001-99")))
        .await;

    assert!(matches!(second, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn november_aggregate_counts_only_own_establishment() {
    let ledger = Ledger::new();
    let owner = ledger.user("dono@escola.com").await;
    let x = ledger.school(&owner, "Escola X").await;
    let y = ledger.school(&owner, "Escola Y").await;

    let px = ledger.payer(&x, "Maria").await;
    let py = ledger.payer(&y, "José").await;
    let today = d(2025, 11, 2);

    for (amount, due, status) in [
        ("450.00", d(2025, 11, 5), None),
        ("450.00", d(2025, 11, 10), None),
        ("300.00", d(2025, 11, 15), Some(ChargeStatus::Paid)),
    ] {
        ledger.charges.create_charge(&x, charge(px, amount, due, status), today).await.unwrap();
    }
    ledger
        .charges
        .create_charge(&y, charge(py, "999.00", d(2025, 11, 5), None), today)
        .await
        .unwrap();

    let listing = ledger
        .charges
        .list_charges(&x, Some(Period::new(11, 2025).unwrap()), ChargeDateField::DueDate, 1, 10, today)
        .await
        .unwrap();

    assert_eq!(listing.summary.count, 3);
    assert_eq!(listing.summary.pending_total, dec("900.00"));
    assert_eq!(listing.summary.paid_total, dec("300.00"));
    assert_eq!(listing.page.total_items, 3);
    assert!(listing.page.items.iter().all(|c| c.charge.establishment_id == x.establishment_id));
}

#[tokio::test]
async fn pending_charge_past_due_reads_as_overdue_without_being_rewritten() {
    let ledger = Ledger::new();
    let owner = ledger.user("dono@escola.com").await;
    let scope = ledger.school(&owner, "Escola").await;
    let payer = ledger.payer(&scope, "Maria").await;

    let created = ledger
        .charges
        .create_charge(&scope, charge(payer, "100.00", d(2025, 11, 10), None), d(2025, 11, 1))
        .await
        .unwrap();
    assert_eq!(created.effective_status, ChargeStatus::Pending);

    let later = ledger.charges.get_charge(&scope, created.charge.id, d(2025, 11, 20)).await.unwrap();
    assert_eq!(later.effective_status, ChargeStatus::Overdue);
    assert_eq!(later.charge.status, ChargeStatus::Pending);

    let summary = ledger
        .charges
        .summary(&scope, Some(Period::new(11, 2025).unwrap()), ChargeDateField::DueDate, d(2025, 11, 20))
        .await
        .unwrap();
    assert_eq!(summary.overdue_total, dec("100.00"));
    assert_eq!(summary.owed_total, dec("100.00"));
}

#[tokio::test]
async fn charge_lifecycle_pay_revert_and_cancel() {
    let ledger = Ledger::new();
    let owner = ledger.user("dono@escola.com").await;
    let scope = ledger.school(&owner, "Escola").await;
    let payer = ledger.payer(&scope, "Maria").await;
    let today = d(2025, 11, 12);

    let id = ledger
        .charges
        .create_charge(&scope, charge(payer, "450.00", d(2025, 11, 10), None), today)
        .await
        .unwrap()
        .charge
        .id;

    let paid = ledger
        .charges
        .mark_paid(&scope, id, MarkChargePaidPayload::default(), today)
        .await
        .unwrap();
    assert_eq!(paid.charge.status, ChargeStatus::Paid);
    assert_eq!(paid.charge.payment_date, Some(today));

    // Pagar duas vezes não é permitido
    let again = ledger.charges.mark_paid(&scope, id, MarkChargePaidPayload::default(), today).await;
    assert!(matches!(again, Err(AppError::Validation(_))));

    // Paga não vai direto para cancelada
    assert!(matches!(
        ledger.charges.cancel_charge(&scope, id, today).await,
        Err(AppError::Validation(_))
    ));

    let reverted = ledger
        .charges
        .update_charge(
            &scope,
            id,
            UpdateChargePayload {
                status: Some(ChargeStatus::Pending),
                ..Default::default()
            },
            today,
        )
        .await
        .unwrap();
    assert_eq!(reverted.charge.status, ChargeStatus::Pending);
    assert_eq!(reverted.charge.payment_date, None);
    assert_eq!(reverted.effective_status, ChargeStatus::Overdue);

    let cancelled = ledger.charges.cancel_charge(&scope, id, today).await.unwrap();
    assert_eq!(cancelled.charge.status, ChargeStatus::Cancelled);

    // Cancelada é terminal
    let reopen = ledger
        .charges
        .update_charge(
            &scope,
            id,
            UpdateChargePayload {
                status: Some(ChargeStatus::Pending),
                ..Default::default()
            },
            today,
        )
        .await;
    assert!(matches!(reopen, Err(AppError::Validation(_))));

    let summary = ledger
        .charges
        .summary(&scope, None, ChargeDateField::DueDate, today)
        .await
        .unwrap();
    assert_eq!(summary.cancelled_total, dec("450.00"));
    assert_eq!(summary.owed_total, Decimal::ZERO);
}

#[tokio::test]
async fn update_with_payment_date_marks_as_paid() {
    let ledger = Ledger::new();
    let owner = ledger.user("dono@escola.com").await;
    let scope = ledger.school(&owner, "Escola").await;
    let payer = ledger.payer(&scope, "Maria").await;
    let today = d(2025, 11, 12);

    let id = ledger
        .charges
        .create_charge(&scope, charge(payer, "200.00", d(2025, 11, 20), None), today)
        .await
        .unwrap()
        .charge
        .id;

    let updated = ledger
        .charges
        .update_charge(
            &scope,
            id,
            UpdateChargePayload {
                payment_date: Some(d(2025, 11, 11)),
                amount: Some(dec("210.00")),
                ..Default::default()
            },
            today,
        )
        .await
        .unwrap();

    assert_eq!(updated.charge.status, ChargeStatus::Paid);
    assert_eq!(updated.charge.payment_date, Some(d(2025, 11, 11)));
    assert_eq!(updated.charge.amount, dec("210.00"));

    // Editar só a descrição não mexe no status
    let described = ledger
        .charges
        .update_charge(
            &scope,
            id,
            UpdateChargePayload {
                description: Some("Mensalidade Novembro".to_string()),
                ..Default::default()
            },
            today,
        )
        .await
        .unwrap();
    assert_eq!(described.charge.status, ChargeStatus::Paid);
}

#[tokio::test]
async fn non_positive_amount_is_rejected() {
    let ledger = Ledger::new();
    let owner = ledger.user("dono@escola.com").await;
    let scope = ledger.school(&owner, "Escola").await;
    let payer = ledger.payer(&scope, "Maria").await;

    let result = ledger
        .charges
        .create_charge(&scope, charge(payer, "0", d(2025, 11, 10), None), d(2025, 11, 1))
        .await;

    assert!(matches!(result, Err(AppError::ValidationError(_))));
}

#[tokio::test]
async fn records_of_other_establishments_are_not_found() {
    let ledger = Ledger::new();
    let owner = ledger.user("dono@escola.com").await;
    let x = ledger.school(&owner, "Escola X").await;
    let y = ledger.school(&owner, "Escola Y").await;
    let today = d(2025, 11, 1);

    let payer_x = ledger.payer(&x, "Maria").await;
    let charge_x = ledger
        .charges
        .create_charge(&x, charge(payer_x, "100.00", d(2025, 11, 10), None), today)
        .await
        .unwrap()
        .charge
        .id;

    assert!(matches!(ledger.payers.get_payer(&y, payer_x).await, Err(AppError::NotFound(_))));
    assert!(matches!(ledger.charges.get_charge(&y, charge_x, today).await, Err(AppError::NotFound(_))));
    assert!(matches!(ledger.charges.delete_charge(&y, charge_x).await, Err(AppError::NotFound(_))));

    // Pagador de outro estabelecimento não pode receber cobrança aqui
    let foreign = ledger
        .charges
        .create_charge(&y, charge(payer_x, "100.00", d(2025, 11, 10), None), today)
        .await;
    assert!(matches!(foreign, Err(AppError::NotFound(_))));

    // E continua intacto no dono
    assert!(ledger.charges.get_charge(&x, charge_x, today).await.is_ok());
}

#[tokio::test]
async fn user_without_link_is_forbidden() {
    let ledger = Ledger::new();
    let owner = ledger.user("dono@escola.com").await;
    let stranger = ledger.user("curioso@outro.com").await;
    let scope = ledger.school(&owner, "Escola").await;

    let result = ledger.tenants.authorize(stranger.id, scope.establishment_id).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let none = ledger.tenants.resolve_scope(stranger.id, None, None).await;
    assert!(matches!(none, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn explicit_establishment_wins_over_selected_one() {
    let ledger = Ledger::new();
    let owner = ledger.user("dono@escola.com").await;
    let x = ledger.school(&owner, "Escola X").await;
    let y = ledger.school(&owner, "Escola Y").await;

    let scope = ledger
        .tenants
        .resolve_scope(owner.id, Some(y.establishment_id), Some(x.establishment_id))
        .await
        .unwrap();
    assert_eq!(scope.establishment_id, y.establishment_id);
}

#[tokio::test]
async fn team_management_rules() {
    let ledger = Ledger::new();
    let owner = ledger.user("dono@escola.com").await;
    let teacher = ledger.user("prof@escola.com").await;
    let scope = ledger.school(&owner, "Escola").await;

    let invite = |role| InviteMemberPayload {
        email: "PROF@escola.com".to_string(),
        role,
    };

    // Ninguém vira dono por convite
    assert!(matches!(
        ledger.tenants.invite_member(&scope, invite(EstablishmentRole::Owner)).await,
        Err(AppError::Validation(_))
    ));

    let link = ledger.tenants.invite_member(&scope, invite(EstablishmentRole::Teacher)).await.unwrap();
    assert_eq!(link.user_id, teacher.id);

    // Par duplicado
    assert!(matches!(
        ledger.tenants.invite_member(&scope, invite(EstablishmentRole::Teacher)).await,
        Err(AppError::Conflict(_))
    ));

    // Professor usa o razão, mas não gerencia a equipe
    let teacher_scope = ledger.tenants.authorize(teacher.id, scope.establishment_id).await.unwrap();
    assert!(matches!(
        ledger.tenants.set_member_active(&teacher_scope, owner.id, false).await,
        Err(AppError::Forbidden(_))
    ));

    // O vínculo do dono é intocável
    assert!(matches!(
        ledger.tenants.set_member_active(&scope, owner.id, false).await,
        Err(AppError::Forbidden(_))
    ));

    // Desativado perde o acesso
    ledger.tenants.set_member_active(&scope, teacher.id, false).await.unwrap();
    assert!(matches!(
        ledger.tenants.authorize(teacher.id, scope.establishment_id).await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn payer_with_charges_cannot_be_deleted() {
    let ledger = Ledger::new();
    let owner = ledger.user("dono@escola.com").await;
    let scope = ledger.school(&owner, "Escola").await;
    let payer = ledger.payer(&scope, "Maria").await;

    ledger
        .charges
        .create_charge(&scope, charge(payer, "100.00", d(2025, 11, 10), None), d(2025, 11, 1))
        .await
        .unwrap();

    assert!(matches!(ledger.payers.delete_payer(&scope, payer).await, Err(AppError::Conflict(_))));

    // Desativar continua possível
    let inactive = ledger
        .payers
        .update_payer(
            &scope,
            payer,
            UpdatePayerPayload {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!inactive.is_active);

    let free = ledger.payer(&scope, "José").await;
    ledger.payers.delete_payer(&scope, free).await.unwrap();
    assert!(matches!(ledger.payers.get_payer(&scope, free).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn purchase_total_is_the_sum_of_its_items() {
    let ledger = Ledger::new();
    let owner = ledger.user("dono@escola.com").await;
    let scope = ledger.school(&owner, "Escola").await;

    let detail = ledger
        .purchases
        .create_purchase(
            &scope,
            CreatePurchasePayload {
                establishment_id: None,
                responsible_user_id: owner.id,
                name: "Material de limpeza".to_string(),
                category: "limpeza".to_string(),
                date: d(2025, 11, 3),
                description: None,
                line_items: vec![item("Detergente", "5", "3.50"), item("Vassoura", "2", "25.00")],
            },
        )
        .await
        .unwrap();

    assert_eq!(detail.items.len(), 2);
    assert_eq!(detail.items[0].line_total, dec("17.50"));
    assert_eq!(detail.purchase.total, dec("67.50"));

    let id = detail.purchase.id;
    let with_more = ledger.purchases.add_item(&scope, id, item("Pano", "4", "2.25")).await.unwrap();
    assert_eq!(with_more.purchase.total, dec("76.50"));

    let removed_id = with_more.items.iter().find(|i| i.product_name == "Vassoura").unwrap().id;
    let after = ledger.purchases.remove_item(&scope, id, removed_id).await.unwrap();
    assert_eq!(after.purchase.total, dec("26.50"));
    assert_eq!(after.items.len(), 2);

    let fetched = ledger.purchases.get_purchase(&scope, id).await.unwrap();
    assert_eq!(fetched, after);
}

#[tokio::test]
async fn purchase_needs_items_and_a_team_member() {
    let ledger = Ledger::new();
    let owner = ledger.user("dono@escola.com").await;
    let outsider = ledger.user("fora@outro.com").await;
    let scope = ledger.school(&owner, "Escola").await;

    let payload = |responsible: Uuid, line_items: Vec<LineItemPayload>| CreatePurchasePayload {
        establishment_id: None,
        responsible_user_id: responsible,
        name: "Compra".to_string(),
        category: "geral".to_string(),
        date: d(2025, 11, 3),
        description: None,
        line_items,
    };

    assert!(matches!(
        ledger.purchases.create_purchase(&scope, payload(owner.id, vec![])).await,
        Err(AppError::ValidationError(_))
    ));
    assert!(matches!(
        ledger
            .purchases
            .create_purchase(&scope, payload(outsider.id, vec![item("Giz", "1", "5.00")]))
            .await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        ledger
            .purchases
            .create_purchase(&scope, payload(owner.id, vec![item("Giz", "0", "5.00")]))
            .await,
        Err(AppError::ValidationError(_))
    ));
}

#[tokio::test]
async fn dashboard_balance_is_received_minus_spent() {
    let ledger = Ledger::new();
    let owner = ledger.user("dono@escola.com").await;
    let scope = ledger.school(&owner, "Escola").await;
    let payer = ledger.payer(&scope, "Maria").await;
    let today = d(2025, 11, 20);

    ledger
        .charges
        .create_charge(&scope, charge(payer, "450.00", d(2025, 11, 10), Some(ChargeStatus::Paid)), today)
        .await
        .unwrap();
    ledger
        .charges
        .create_charge(&scope, charge(payer, "450.00", d(2025, 11, 15), None), today)
        .await
        .unwrap();
    // Fora do mês
    ledger
        .charges
        .create_charge(&scope, charge(payer, "450.00", d(2025, 12, 10), Some(ChargeStatus::Paid)), today)
        .await
        .unwrap();

    ledger
        .purchases
        .create_purchase(
            &scope,
            CreatePurchasePayload {
                establishment_id: None,
                responsible_user_id: owner.id,
                name: "Papelaria".to_string(),
                category: "material".to_string(),
                date: d(2025, 11, 5),
                description: None,
                line_items: vec![item("Resma", "2", "30.00")],
            },
        )
        .await
        .unwrap();

    let overview = ledger
        .dashboard
        .overview(&scope, Some(Period::new(11, 2025).unwrap()), today)
        .await
        .unwrap();

    assert_eq!((overview.month, overview.year), (11, 2025));
    assert_eq!(overview.charges.count, 2);
    assert_eq!(overview.charges.paid_total, dec("450.00"));
    assert_eq!(overview.charges.overdue_total, dec("450.00"));
    assert_eq!(overview.purchases_count, 1);
    assert_eq!(overview.purchases_total, dec("60.00"));
    assert_eq!(overview.balance, dec("390.00"));

    // Sem período: mês de hoje
    let default = ledger.dashboard.overview(&scope, None, today).await.unwrap();
    assert_eq!(default, overview);
}

#[tokio::test]
async fn charge_listing_is_paginated_over_the_whole_filter() {
    let ledger = Ledger::new();
    let owner = ledger.user("dono@escola.com").await;
    let scope = ledger.school(&owner, "Escola").await;
    let payer = ledger.payer(&scope, "Maria").await;
    let today = d(2025, 11, 1);

    for day in 1..=25 {
        ledger
            .charges
            .create_charge(&scope, charge(payer, "10.00", d(2025, 11, day), None), today)
            .await
            .unwrap();
    }

    let last = ledger
        .charges
        .list_charges(&scope, None, ChargeDateField::DueDate, 99, 10, today)
        .await
        .unwrap();

    assert_eq!(last.page.page, 3);
    assert_eq!(last.page.total_pages, 3);
    assert_eq!(last.page.items.len(), 5);
    assert!(!last.page.can_go_next);
    assert_eq!(last.summary.count, 25);
    assert_eq!(last.summary.total, dec("250.00"));
    // Ordenado por vencimento
    assert_eq!(last.page.items[0].charge.due_date, d(2025, 11, 21));
}

#[tokio::test]
async fn oversized_money_is_rejected_and_the_store_keeps_working() {
    let ledger = Ledger::new();
    let owner = ledger.user("dono@escola.com").await;
    let scope = ledger.school(&owner, "Escola").await;
    let huge = "50000000000000000000000000000";

    let payload = CreatePurchasePayload {
        establishment_id: None,
        responsible_user_id: owner.id,
        name: "Compra gigante".to_string(),
        category: "geral".to_string(),
        date: d(2025, 11, 3),
        description: None,
        line_items: vec![item("Lote", "1", huge), item("Lote", "1", huge)],
    };
    assert!(matches!(
        ledger.purchases.create_purchase(&scope, payload).await,
        Err(AppError::ValidationError(_))
    ));

    // Acima do teto, mesmo sem estourar o Decimal
    assert!(matches!(
        ledger
            .charges
            .create_charge(&scope, charge(Uuid::new_v4(), "1000000000.01", d(2025, 11, 10), None), d(2025, 11, 1))
            .await,
        Err(AppError::ValidationError(_))
    ));

    // Direto no store: a soma estoura antes de qualquer escrita
    let line = NewLineItem {
        product_name: "Lote".to_string(),
        quantity: Decimal::ONE,
        unit_price: dec(huge),
        line_total: dec(huge),
        category: None,
        note: None,
    };
    let stored = ledger
        .repos
        .purchases
        .create_with_items(
            NewPurchase {
                establishment_id: scope.establishment_id,
                responsible_user_id: owner.id,
                name: "Compra gigante".to_string(),
                category: "geral".to_string(),
                description: None,
                purchase_date: d(2025, 11, 3),
            },
            vec![line.clone(), line.clone()],
        )
        .await;
    assert!(matches!(stored, Err(AppError::Validation(_))));

    // Um item grande só cabe uma vez
    let single = ledger
        .repos
        .purchases
        .create_with_items(
            NewPurchase {
                establishment_id: scope.establishment_id,
                responsible_user_id: owner.id,
                name: "Compra grande".to_string(),
                category: "geral".to_string(),
                description: None,
                purchase_date: d(2025, 11, 3),
            },
            vec![line.clone()],
        )
        .await
        .unwrap();
    let grown = ledger
        .repos
        .purchases
        .add_item(scope.establishment_id, single.purchase.id, line)
        .await;
    assert!(matches!(grown, Err(AppError::Validation(_))));
    let unchanged = ledger.purchases.get_purchase(&scope, single.purchase.id).await.unwrap();
    assert_eq!(unchanged.items.len(), 1);
    assert_eq!(unchanged.purchase.total, dec(huge));

    // Nada ficou travado nem pela metade
    assert!(ledger.payers.list_payers(&scope).await.unwrap().is_empty());
    let listing = ledger
        .purchases
        .list_purchases(&scope, None, 1, 10)
        .await
        .unwrap();
    assert_eq!(listing.count, 1);
}

#[tokio::test]
async fn inactive_establishment_blocks_access_until_the_owner_reactivates_it() {
    let ledger = Ledger::new();
    let owner = ledger.user("dono@escola.com").await;
    let admin = ledger.user("admin@escola.com").await;
    let scope = ledger.school(&owner, "Escola").await;

    ledger
        .tenants
        .invite_member(
            &scope,
            InviteMemberPayload {
                email: "admin@escola.com".to_string(),
                role: EstablishmentRole::Admin,
            },
        )
        .await
        .unwrap();

    let closed = ledger
        .tenants
        .update_establishment(
            &scope,
            UpdateEstablishmentPayload {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!closed.is_active);

    for user in [&owner, &admin] {
        assert!(matches!(
            ledger.tenants.authorize(user.id, scope.establishment_id).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            ledger.tenants.resolve_scope(user.id, None, Some(scope.establishment_id)).await,
            Err(AppError::Forbidden(_))
        ));
    }

    // Só o dono alcança as configurações de um estabelecimento inativo
    assert!(matches!(
        ledger.tenants.authorize_settings(admin.id, scope.establishment_id).await,
        Err(AppError::Forbidden(_))
    ));
    let settings = ledger
        .tenants
        .authorize_settings(owner.id, scope.establishment_id)
        .await
        .unwrap();
    ledger
        .tenants
        .update_establishment(
            &settings,
            UpdateEstablishmentPayload {
                is_active: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(ledger.tenants.authorize(admin.id, scope.establishment_id).await.is_ok());
}

#[tokio::test]
async fn inactive_user_cannot_log_in_nor_use_a_token() {
    let ledger = Ledger::new();
    let auth = AuthService::new(ledger.repos.users.clone(), "segredo-de-teste".to_string(), 1).with_bcrypt_cost(4);

    let token = auth
        .register_user(RegisterUserPayload {
            email: "ana@escola.com".to_string(),
            password: "senha-forte-123".to_string(),
            name: "Ana".to_string(),
            phone: None,
        })
        .await
        .unwrap();
    let user = auth.validate_token(&token).await.unwrap();

    let login = || LoginUserPayload {
        email: "ana@escola.com".to_string(),
        password: "senha-forte-123".to_string(),
    };
    assert!(auth.login_user(login()).await.is_ok());

    let disabled = auth.set_user_active(user.id, false).await.unwrap();
    assert!(!disabled.is_active);

    assert!(matches!(auth.login_user(login()).await, Err(AppError::InvalidCredentials)));
    assert!(matches!(auth.validate_token(&token).await, Err(AppError::InvalidToken)));

    auth.set_user_active(user.id, true).await.unwrap();
    assert!(auth.validate_token(&token).await.is_ok());
}

#[tokio::test]
async fn cancelled_charge_still_accepts_field_edits() {
    let ledger = Ledger::new();
    let owner = ledger.user("dono@escola.com").await;
    let scope = ledger.school(&owner, "Escola").await;
    let payer = ledger.payer(&scope, "Maria").await;
    let today = d(2025, 11, 1);

    let id = ledger
        .charges
        .create_charge(&scope, charge(payer, "450.00", d(2025, 11, 10), None), today)
        .await
        .unwrap()
        .charge
        .id;
    ledger.charges.cancel_charge(&scope, id, today).await.unwrap();

    // O cliente devolve o status atual junto com a edição
    let edited = ledger
        .charges
        .update_charge(
            &scope,
            id,
            UpdateChargePayload {
                status: Some(ChargeStatus::Cancelled),
                description: Some("Cancelada: aluno transferido".to_string()),
                ..Default::default()
            },
            today,
        )
        .await
        .unwrap();

    assert_eq!(edited.charge.status, ChargeStatus::Cancelled);
    assert_eq!(edited.charge.description.as_deref(), Some("Cancelada: aluno transferido"));
}
