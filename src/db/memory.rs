// src/db/memory.rs
//
// Implementação em memória de todos os stores. Mesmas regras do Postgres:
// unicidade de e-mail, CNPJ e par (usuário, estabelecimento), escopo por
// estabelecimento e escritas compostas atômicas (tudo sob um único lock).

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::repository::{
        ChargeStore, EstablishmentStore, PayerStore, PurchaseStore, ScopedRepository, UserStore,
    },
    ledger::checked_sum,
    models::{
        auth::{NewUser, User},
        finance::{Charge, NewCharge},
        payers::{NewPayer, Payer},
        purchases::{NewLineItem, NewPurchase, Purchase, PurchaseDetail, PurchaseLineItem},
        tenancy::{
            Establishment, EstablishmentMember, EstablishmentRole, NewEstablishment,
            UserEstablishment, UserEstablishmentLink,
        },
    },
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    establishments: HashMap<Uuid, Establishment>,
    links: Vec<UserEstablishmentLink>,
    payers: HashMap<Uuid, Payer>,
    charges: HashMap<Uuid, Charge>,
    purchases: HashMap<Uuid, Purchase>,
    items: Vec<PurchaseLineItem>,
}

impl Tables {
    fn purchase_detail(&self, purchase: &Purchase) -> PurchaseDetail {
        PurchaseDetail {
            purchase: purchase.clone(),
            items: self.items_of(purchase.id),
        }
    }

    fn items_of(&self, purchase_id: Uuid) -> Vec<PurchaseLineItem> {
        self.items.iter().filter(|i| i.purchase_id == purchase_id).cloned().collect()
    }

    fn line_totals(&self, purchase_id: Uuid) -> impl Iterator<Item = Decimal> + '_ {
        self.items
            .iter()
            .filter(move |i| i.purchase_id == purchase_id)
            .map(|i| i.line_total)
    }

    // O total já vem somado (e conferido) por quem chama, antes de mexer nas tabelas
    fn set_total(&mut self, purchase_id: Uuid, total: Decimal) -> Option<Purchase> {
        let purchase = self.purchases.get_mut(&purchase_id)?;
        purchase.total = total;
        purchase.updated_at = Utc::now();
        Some(purchase.clone())
    }

    fn tax_id_taken(&self, tax_id: Option<&str>, except: Option<Uuid>) -> bool {
        let Some(tax_id) = tax_id else { return false };
        self.establishments
            .values()
            .any(|e| e.tax_id.as_deref() == Some(tax_id) && Some(e.id) != except)
    }
}

fn to_line_item(purchase_id: Uuid, item: NewLineItem) -> PurchaseLineItem {
    PurchaseLineItem {
        id: Uuid::new_v4(),
        purchase_id,
        product_name: item.product_name,
        quantity: item.quantity,
        unit_price: item.unit_price,
        line_total: item.line_total,
        category: item.category,
        note: item.note,
        created_at: Utc::now(),
    }
}

/// Store em memória. Clonar compartilha os mesmos dados.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::InternalServerError(anyhow::anyhow!("store em memória envenenado")))
    }
}

// =========================================================================
//  USUÁRIOS
// =========================================================================

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.lock()?.users.values().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut tables = self.lock()?;
        if tables.users.values().any(|u| u.email == new_user.email) {
            return Err(AppError::EmailAlreadyExists);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            password_hash: new_user.password_hash,
            name: new_user.name,
            phone: new_user.phone,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: &str,
        phone: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        let mut tables = self.lock()?;
        let Some(user) = tables.users.get_mut(&id) else { return Ok(None) };
        user.name = name.to_string();
        user.phone = phone.map(str::to_string);
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<Option<User>, AppError> {
        let mut tables = self.lock()?;
        let Some(user) = tables.users.get_mut(&id) else { return Ok(None) };
        user.is_active = is_active;
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }
}

// =========================================================================
//  ESTABELECIMENTOS E VÍNCULOS
// =========================================================================

#[async_trait]
impl EstablishmentStore for MemoryStore {
    async fn create_with_owner(
        &self,
        new_establishment: NewEstablishment,
    ) -> Result<(Establishment, UserEstablishmentLink), AppError> {
        let mut tables = self.lock()?;

        // Tudo é checado antes de gravar: ou entram os dois registros, ou nenhum
        if tables.tax_id_taken(new_establishment.tax_id.as_deref(), None) {
            return Err(AppError::Conflict("Já existe um estabelecimento com este CNPJ.".to_string()));
        }
        if !tables.users.contains_key(&new_establishment.created_by) {
            return Err(AppError::UserNotFound);
        }

        let now = Utc::now();
        let establishment = Establishment {
            id: Uuid::new_v4(),
            created_by: new_establishment.created_by,
            name: new_establishment.name,
            tax_id: new_establishment.tax_id,
            email: new_establishment.email,
            phone: new_establishment.phone,
            address: new_establishment.address,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let link = UserEstablishmentLink {
            id: Uuid::new_v4(),
            user_id: establishment.created_by,
            establishment_id: establishment.id,
            role: EstablishmentRole::Owner,
            is_active: true,
            created_at: now,
        };

        tables.establishments.insert(establishment.id, establishment.clone());
        tables.links.push(link.clone());
        Ok((establishment, link))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Establishment>, AppError> {
        Ok(self.lock()?.establishments.get(&id).cloned())
    }

    async fn update(&self, establishment: &Establishment) -> Result<Option<Establishment>, AppError> {
        let mut tables = self.lock()?;
        if tables.tax_id_taken(establishment.tax_id.as_deref(), Some(establishment.id)) {
            return Err(AppError::Conflict("Já existe um estabelecimento com este CNPJ.".to_string()));
        }
        let Some(stored) = tables.establishments.get_mut(&establishment.id) else {
            return Ok(None);
        };
        *stored = Establishment { updated_at: Utc::now(), ..establishment.clone() };
        Ok(Some(stored.clone()))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<UserEstablishment>, AppError> {
        let tables = self.lock()?;
        let mut result: Vec<UserEstablishment> = tables
            .links
            .iter()
            .filter(|l| l.user_id == user_id && l.is_active)
            .filter_map(|l| {
                tables.establishments.get(&l.establishment_id).map(|e| UserEstablishment {
                    establishment: e.clone(),
                    role: l.role,
                })
            })
            .collect();
        result.sort_by(|a, b| a.establishment.name.cmp(&b.establishment.name));
        Ok(result)
    }

    async fn find_link(
        &self,
        user_id: Uuid,
        establishment_id: Uuid,
    ) -> Result<Option<UserEstablishmentLink>, AppError> {
        Ok(self
            .lock()?
            .links
            .iter()
            .find(|l| l.user_id == user_id && l.establishment_id == establishment_id)
            .cloned())
    }

    async fn create_link(
        &self,
        user_id: Uuid,
        establishment_id: Uuid,
        role: EstablishmentRole,
    ) -> Result<UserEstablishmentLink, AppError> {
        let mut tables = self.lock()?;
        if tables
            .links
            .iter()
            .any(|l| l.user_id == user_id && l.establishment_id == establishment_id)
        {
            return Err(AppError::Conflict("Usuário já vinculado a este estabelecimento.".to_string()));
        }

        let link = UserEstablishmentLink {
            id: Uuid::new_v4(),
            user_id,
            establishment_id,
            role,
            is_active: true,
            created_at: Utc::now(),
        };
        tables.links.push(link.clone());
        Ok(link)
    }

    async fn set_link_active(
        &self,
        user_id: Uuid,
        establishment_id: Uuid,
        is_active: bool,
    ) -> Result<Option<UserEstablishmentLink>, AppError> {
        let mut tables = self.lock()?;
        let link = tables
            .links
            .iter_mut()
            .find(|l| l.user_id == user_id && l.establishment_id == establishment_id);
        Ok(link.map(|l| {
            l.is_active = is_active;
            l.clone()
        }))
    }

    async fn list_members(&self, establishment_id: Uuid) -> Result<Vec<EstablishmentMember>, AppError> {
        let tables = self.lock()?;
        let mut members: Vec<EstablishmentMember> = tables
            .links
            .iter()
            .filter(|l| l.establishment_id == establishment_id)
            .filter_map(|l| {
                tables.users.get(&l.user_id).map(|u| EstablishmentMember {
                    user_id: u.id,
                    name: u.name.clone(),
                    email: u.email.clone(),
                    role: l.role,
                    is_active: l.is_active,
                })
            })
            .collect();
        members.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(members)
    }
}

// =========================================================================
//  PAGADORES
// =========================================================================

#[async_trait]
impl ScopedRepository<Payer> for MemoryStore {
    async fn find(&self, establishment_id: Uuid, id: Uuid) -> Result<Option<Payer>, AppError> {
        Ok(self
            .lock()?
            .payers
            .get(&id)
            .filter(|p| p.establishment_id == establishment_id)
            .cloned())
    }

    async fn list(&self, establishment_id: Uuid) -> Result<Vec<Payer>, AppError> {
        let mut payers: Vec<Payer> = self
            .lock()?
            .payers
            .values()
            .filter(|p| p.establishment_id == establishment_id)
            .cloned()
            .collect();
        payers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(payers)
    }

    async fn delete(&self, establishment_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.lock()?;
        let owned = tables.payers.get(&id).is_some_and(|p| p.establishment_id == establishment_id);
        if !owned {
            return Ok(false);
        }
        // Mesma regra da chave estrangeira do Postgres
        if tables.charges.values().any(|c| c.payer_id == id) {
            return Err(AppError::Conflict("Registro ainda referenciado por outros dados.".to_string()));
        }
        Ok(tables.payers.remove(&id).is_some())
    }
}

#[async_trait]
impl PayerStore for MemoryStore {
    async fn create_payer(&self, new_payer: NewPayer) -> Result<Payer, AppError> {
        let now = Utc::now();
        let payer = Payer {
            id: Uuid::new_v4(),
            establishment_id: new_payer.establishment_id,
            name: new_payer.name,
            email: new_payer.email,
            phone: new_payer.phone,
            tax_id: new_payer.tax_id,
            notes: new_payer.notes,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.lock()?.payers.insert(payer.id, payer.clone());
        Ok(payer)
    }

    async fn update_payer(&self, payer: &Payer) -> Result<Option<Payer>, AppError> {
        let mut tables = self.lock()?;
        let Some(stored) = tables
            .payers
            .get_mut(&payer.id)
            .filter(|p| p.establishment_id == payer.establishment_id)
        else {
            return Ok(None);
        };
        *stored = Payer { updated_at: Utc::now(), ..payer.clone() };
        Ok(Some(stored.clone()))
    }

    async fn count_charges(&self, establishment_id: Uuid, payer_id: Uuid) -> Result<i64, AppError> {
        let count = self
            .lock()?
            .charges
            .values()
            .filter(|c| c.payer_id == payer_id && c.establishment_id == establishment_id)
            .count();
        Ok(count as i64)
    }
}

// =========================================================================
//  MENSALIDADES
// =========================================================================

#[async_trait]
impl ScopedRepository<Charge> for MemoryStore {
    async fn find(&self, establishment_id: Uuid, id: Uuid) -> Result<Option<Charge>, AppError> {
        Ok(self
            .lock()?
            .charges
            .get(&id)
            .filter(|c| c.establishment_id == establishment_id)
            .cloned())
    }

    async fn list(&self, establishment_id: Uuid) -> Result<Vec<Charge>, AppError> {
        let mut charges: Vec<Charge> = self
            .lock()?
            .charges
            .values()
            .filter(|c| c.establishment_id == establishment_id)
            .cloned()
            .collect();
        charges.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.created_at.cmp(&b.created_at)));
        Ok(charges)
    }

    async fn delete(&self, establishment_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.lock()?;
        let owned = tables.charges.get(&id).is_some_and(|c| c.establishment_id == establishment_id);
        Ok(owned && tables.charges.remove(&id).is_some())
    }
}

#[async_trait]
impl ChargeStore for MemoryStore {
    async fn create_charge(&self, new_charge: NewCharge) -> Result<Charge, AppError> {
        let now = Utc::now();
        let charge = Charge {
            id: Uuid::new_v4(),
            establishment_id: new_charge.establishment_id,
            payer_id: new_charge.payer_id,
            amount: new_charge.amount,
            due_date: new_charge.due_date,
            payment_date: new_charge.payment_date,
            status: new_charge.status,
            description: new_charge.description,
            created_at: now,
            updated_at: now,
        };
        self.lock()?.charges.insert(charge.id, charge.clone());
        Ok(charge)
    }

    async fn update_charge(&self, charge: &Charge) -> Result<Option<Charge>, AppError> {
        let mut tables = self.lock()?;
        let Some(stored) = tables
            .charges
            .get_mut(&charge.id)
            .filter(|c| c.establishment_id == charge.establishment_id)
        else {
            return Ok(None);
        };
        *stored = Charge { updated_at: Utc::now(), ..charge.clone() };
        Ok(Some(stored.clone()))
    }
}

// =========================================================================
//  COMPRAS
// =========================================================================

#[async_trait]
impl ScopedRepository<Purchase> for MemoryStore {
    async fn find(&self, establishment_id: Uuid, id: Uuid) -> Result<Option<Purchase>, AppError> {
        Ok(self
            .lock()?
            .purchases
            .get(&id)
            .filter(|p| p.establishment_id == establishment_id)
            .cloned())
    }

    async fn list(&self, establishment_id: Uuid) -> Result<Vec<Purchase>, AppError> {
        let mut purchases: Vec<Purchase> = self
            .lock()?
            .purchases
            .values()
            .filter(|p| p.establishment_id == establishment_id)
            .cloned()
            .collect();
        purchases.sort_by(|a, b| {
            b.purchase_date.cmp(&a.purchase_date).then(b.created_at.cmp(&a.created_at))
        });
        Ok(purchases)
    }

    async fn delete(&self, establishment_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.lock()?;
        let owned = tables.purchases.get(&id).is_some_and(|p| p.establishment_id == establishment_id);
        if !owned {
            return Ok(false);
        }
        tables.purchases.remove(&id);
        tables.items.retain(|i| i.purchase_id != id);
        Ok(true)
    }
}

#[async_trait]
impl PurchaseStore for MemoryStore {
    async fn create_with_items(
        &self,
        new_purchase: NewPurchase,
        items: Vec<NewLineItem>,
    ) -> Result<PurchaseDetail, AppError> {
        let mut tables = self.lock()?;

        let now = Utc::now();
        let purchase = Purchase {
            id: Uuid::new_v4(),
            establishment_id: new_purchase.establishment_id,
            responsible_user_id: new_purchase.responsible_user_id,
            name: new_purchase.name,
            category: new_purchase.category,
            description: new_purchase.description,
            purchase_date: new_purchase.purchase_date,
            total: checked_sum(items.iter().map(|i| i.line_total))?,
            created_at: now,
            updated_at: now,
        };
        let purchase_id = purchase.id;

        for item in items {
            tables.items.push(to_line_item(purchase_id, item));
        }
        tables.purchases.insert(purchase_id, purchase.clone());

        Ok(tables.purchase_detail(&purchase))
    }

    async fn list_items(
        &self,
        establishment_id: Uuid,
        purchase_id: Uuid,
    ) -> Result<Vec<PurchaseLineItem>, AppError> {
        let tables = self.lock()?;
        let owned = tables
            .purchases
            .get(&purchase_id)
            .is_some_and(|p| p.establishment_id == establishment_id);
        if !owned {
            return Ok(Vec::new());
        }
        Ok(tables.items_of(purchase_id))
    }

    async fn add_item(
        &self,
        establishment_id: Uuid,
        purchase_id: Uuid,
        item: NewLineItem,
    ) -> Result<Option<PurchaseDetail>, AppError> {
        let mut tables = self.lock()?;
        let owned = tables
            .purchases
            .get(&purchase_id)
            .is_some_and(|p| p.establishment_id == establishment_id);
        if !owned {
            return Ok(None);
        }

        let total = checked_sum(tables.line_totals(purchase_id).chain(std::iter::once(item.line_total)))?;

        tables.items.push(to_line_item(purchase_id, item));
        Ok(tables
            .set_total(purchase_id, total)
            .map(|purchase| tables.purchase_detail(&purchase)))
    }

    async fn remove_item(
        &self,
        establishment_id: Uuid,
        purchase_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<PurchaseDetail>, AppError> {
        let mut tables = self.lock()?;
        let owned = tables
            .purchases
            .get(&purchase_id)
            .is_some_and(|p| p.establishment_id == establishment_id);
        if !owned {
            return Ok(None);
        }

        let exists = tables
            .items
            .iter()
            .any(|i| i.id == item_id && i.purchase_id == purchase_id);
        if !exists {
            return Ok(None);
        }
        let total = checked_sum(
            tables
                .items
                .iter()
                .filter(|i| i.purchase_id == purchase_id && i.id != item_id)
                .map(|i| i.line_total),
        )?;

        tables.items.retain(|i| !(i.id == item_id && i.purchase_id == purchase_id));
        Ok(tables
            .set_total(purchase_id, total)
            .map(|purchase| tables.purchase_detail(&purchase)))
    }
}
