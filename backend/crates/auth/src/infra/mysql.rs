//! MySQL Credential Store
//!
//! Reads and writes the clinic's `usuarios` table. The schema is owned by
//! the clinic database; this module does not create or migrate it.

use chrono::NaiveDateTime;
use kernel::id::{ReferenceId, UserId};
use sqlx::MySqlPool;

use crate::domain::entity::user::{NewUser, User};
use crate::domain::repository::CredentialStore;
use crate::domain::value_object::{
    email::Email, user_name::UserName, user_password::UserPassword, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// Column list shared by every read. Integer ids are widened to BIGINT so
/// they decode as `i64` whatever the column width is.
const USER_COLUMNS: &str = r#"
    CAST(id_usuario AS SIGNED) AS id_usuario,
    usuario,
    correo,
    contrasena,
    rol,
    CAST(id_referencia AS SIGNED) AS id_referencia,
    fecha_registro
"#;

/// MySQL-backed credential store
#[derive(Clone)]
pub struct MySqlCredentialStore {
    pool: MySqlPool,
}

impl MySqlCredentialStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, filter: &str, value: &str) -> AuthResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM usuarios WHERE {filter} = ? LIMIT 1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }
}

impl CredentialStore for MySqlCredentialStore {
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        self.find_one("correo", email.as_str()).await
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        // Case-insensitive through the column collation
        self.find_one("usuario", user_name.original()).await
    }

    async fn find_by_id(&self, id: UserId) -> AuthResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM usuarios WHERE id_usuario = ?");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn list(&self, limit: u32) -> AuthResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM usuarios ORDER BY id_usuario LIMIT ?");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn exists(&self, user_name: &UserName, email: &Email) -> AuthResult<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM usuarios WHERE usuario = ? OR correo = ?",
        )
        .bind(user_name.original())
        .bind(email.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    async fn insert(&self, user: &NewUser) -> AuthResult<UserId> {
        let result = sqlx::query(
            r#"
            INSERT INTO usuarios (
                usuario,
                correo,
                contrasena,
                rol,
                id_referencia,
                fecha_registro
            ) VALUES (?, ?, ?, ?, ?, UTC_TIMESTAMP())
            "#,
        )
        .bind(user.user_name.original())
        .bind(user.email.as_str())
        .bind(user.password.as_stored())
        .bind(user.role.code())
        .bind(user.reference_id.map(|id| id.get()))
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => {
                let id = i64::try_from(done.last_insert_id())
                    .map_err(|_| AuthError::Internal("Inserted id out of range".to_string()))?;
                Ok(UserId::from_raw(id))
            }
            // Lost a race with a concurrent registration
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AuthError::AlreadyRegistered)
            }
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id_usuario: i64,
    usuario: String,
    correo: String,
    contrasena: String,
    rol: String,
    id_referencia: Option<i64>,
    fecha_registro: Option<NaiveDateTime>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let role = UserRole::from_code(&self.rol).ok_or_else(|| {
            AuthError::UnreadableRow(format!(
                "Unknown role '{}' for user {}",
                self.rol, self.id_usuario
            ))
        })?;

        Ok(User {
            id: UserId::from_raw(self.id_usuario),
            user_name: UserName::from_db(&self.usuario),
            email: Email::from_db(&self.correo),
            password: UserPassword::from_stored(self.contrasena),
            role,
            reference_id: self.id_referencia.map(ReferenceId::from_raw),
            registered_at: self.fecha_registro.map(|t| t.and_utc()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(rol: &str) -> UserRow {
        UserRow {
            id_usuario: 7,
            usuario: "Ana María".to_string(),
            correo: "Ana@Clinic.mx".to_string(),
            contrasena: "$2b$10$abcdefghijklmnopqrstuv".to_string(),
            rol: rol.to_string(),
            id_referencia: Some(3),
            fecha_registro: None,
        }
    }

    #[test]
    fn test_row_into_user() {
        let user = row("coordinador").into_user().unwrap();
        assert_eq!(user.id, UserId::from_raw(7));
        assert_eq!(user.user_name.original(), "Ana María");
        assert_eq!(user.email.as_str(), "ana@clinic.mx");
        assert_eq!(user.role, UserRole::Coordinador);
        assert!(user.password.is_legacy());
    }

    #[test]
    fn test_unknown_role_is_unreadable_row() {
        let err = row("jefe").into_user().unwrap_err();
        assert!(matches!(err, AuthError::UnreadableRow(msg) if msg.contains("'jefe'")));
    }
}
