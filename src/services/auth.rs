// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::UserStore,
    models::auth::{
        Claims, LoginUserPayload, NewUser, RegisterUserPayload, UpdateProfilePayload, User,
    },
};

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt_secret: String,
    token_ttl_days: i64,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt_secret: String, token_ttl_days: i64) -> Self {
        Self {
            users,
            jwt_secret,
            token_ttl_days,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Custo menor do bcrypt (útil em testes; nunca em produção).
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub async fn register_user(&self, payload: RegisterUserPayload) -> Result<String, AppError> {
        payload.validate()?;

        // Hashing fora da thread do runtime
        let password = payload.password.clone();
        let cost = self.bcrypt_cost;
        let password_hash = tokio::task::spawn_blocking(move || hash(&password, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let new_user = self
            .users
            .create_user(NewUser {
                email: payload.email.trim().to_lowercase(),
                password_hash,
                name: payload.name,
                phone: payload.phone,
            })
            .await?;

        tracing::info!("👤 Novo usuário registrado: {}", new_user.id);

        self.create_token(new_user.id)
    }

    pub async fn login_user(&self, payload: LoginUserPayload) -> Result<String, AppError> {
        payload.validate()?;

        let user = self
            .users
            .find_by_email(&payload.email.trim().to_lowercase())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        // Usuário desativado não entra
        if !user.is_active {
            return Err(AppError::InvalidCredentials);
        }

        let password = payload.password.clone();
        let password_hash = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(user.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        let user = self
            .users
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if !user.is_active {
            return Err(AppError::InvalidToken);
        }

        Ok(user)
    }

    pub async fn update_profile(&self, user: &User, payload: UpdateProfilePayload) -> Result<User, AppError> {
        payload.validate()?;

        let name = payload.name.unwrap_or_else(|| user.name.clone());
        let phone = payload.phone.or_else(|| user.phone.clone());

        self.users
            .update_profile(user.id, &name, phone.as_deref())
            .await?
            .ok_or(AppError::UserNotFound)
    }

    /// Ativa/desativa a conta. Desativada, não faz login e o token deixa de valer.
    pub async fn set_user_active(&self, user_id: Uuid, is_active: bool) -> Result<User, AppError> {
        let user = self
            .users
            .set_active(user_id, is_active)
            .await?
            .ok_or(AppError::UserNotFound)?;

        tracing::info!("👤 Usuário {} agora está {}", user.id, if is_active { "ativo" } else { "inativo" });

        Ok(user)
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(self.token_ttl_days);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
