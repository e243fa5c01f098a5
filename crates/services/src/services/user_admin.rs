//! Role and department fix-ups for existing accounts.

use db::models::user::{User, UserRole};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum UserAdminError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("no user with email {0}")]
    UserNotFound(String),
    #[error("email must not be empty")]
    EmptyEmail,
}

pub struct UserAdmin {
    pool: SqlitePool,
}

impl UserAdmin {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Give an existing account the admin role and mark its email verified.
    pub async fn promote_to_admin(&self, email: &str) -> Result<User, UserAdminError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(UserAdminError::EmptyEmail);
        }

        let user = User::update_role_by_email(&self.pool, email, UserRole::Admin)
            .await?
            .ok_or_else(|| UserAdminError::UserNotFound(email.to_string()))?;

        info!(user_id = %user.id, email = %user.email, "User promoted to admin");
        Ok(user)
    }

    /// Put every holder of `role` into `department`.
    pub async fn sync_department_for_role(
        &self,
        role: UserRole,
        department: &str,
    ) -> Result<Vec<User>, UserAdminError> {
        let users = User::set_department_for_role(&self.pool, role, department).await?;
        for user in &users {
            info!(user_id = %user.id, email = %user.email, department, "Department updated");
        }
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use db::{DBService, models::user::CreateUser};

    use super::*;

    async fn seed(db: &DBService, name: &str, role: UserRole, department: Option<&str>) {
        User::create(
            &db.pool,
            &CreateUser {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                role,
                department: department.map(str::to_string),
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_promote_to_admin() {
        let db = DBService::new_in_memory().await.unwrap();
        seed(&db, "Rosa", UserRole::Employee, None).await;
        let admin = UserAdmin::new(db.pool.clone());

        let user = admin.promote_to_admin(" rosa@example.com ").await.unwrap();
        assert_eq!(user.role, UserRole::Admin);
        assert!(user.email_verified);

        let err = admin.promote_to_admin("sam@example.com").await.unwrap_err();
        assert!(matches!(err, UserAdminError::UserNotFound(e) if e == "sam@example.com"));
        assert!(matches!(
            admin.promote_to_admin("  ").await.unwrap_err(),
            UserAdminError::EmptyEmail
        ));
    }

    #[tokio::test]
    async fn test_sync_department_for_role() {
        let db = DBService::new_in_memory().await.unwrap();
        seed(&db, "Tara", UserRole::Hr, Some("Admin")).await;
        seed(&db, "Uma", UserRole::Hr, None).await;
        seed(&db, "Vik", UserRole::Employee, Some("Sales")).await;

        let updated = UserAdmin::new(db.pool.clone())
            .sync_department_for_role(UserRole::Hr, "HR")
            .await
            .unwrap();
        assert_eq!(updated.len(), 2);
        assert!(updated.iter().all(|u| u.department.as_deref() == Some("HR")));

        let vik = User::find_by_email(&db.pool, "vik@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(vik.department.as_deref(), Some("Sales"));
    }
}
