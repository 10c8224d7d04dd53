use crate::common::error::AppError;

// ---
// Tradução de erros do Postgres
// ---
/// Converte violações de chave única em `Conflict`, usando o nome da constraint
/// para montar uma mensagem útil. Qualquer outro erro segue como erro de banco.
pub(crate) fn translate_db_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some("users_email_key") => AppError::EmailAlreadyExists,
                Some("establishments_tax_id_key") => {
                    AppError::Conflict("Já existe um estabelecimento com este CNPJ.".to_string())
                }
                Some("user_establishment_links_user_id_establishment_id_key") => {
                    AppError::Conflict("Usuário já vinculado a este estabelecimento.".to_string())
                }
                Some(constraint) => {
                    AppError::Conflict(format!("Registro duplicado ({}).", constraint))
                }
                None => AppError::Conflict("Registro duplicado.".to_string()),
            };
        }
        if db_err.is_foreign_key_violation() {
            return AppError::Conflict("Registro ainda referenciado por outros dados.".to_string());
        }
    }
    e.into()
}
