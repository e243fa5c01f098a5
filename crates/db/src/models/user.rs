use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, EnumString, Display, Default)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
    Admin,
    Hr,
    Manager,
    #[default]
    Employee,
    /// Job applicant; not on the payroll and never gets attendance rows
    Candidate,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub department: Option<String>,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub department: Option<String>,
}

const USER_COLUMNS: &str =
    "id, name, email, role, department, email_verified, created_at, updated_at";

impl User {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, rowid ASC"
        ))
        .fetch_all(pool)
        .await
    }

    /// Every user except those holding `role`, in creation order.
    pub async fn find_excluding_role(
        pool: &SqlitePool,
        role: UserRole,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role != $1 ORDER BY created_at ASC, rowid ASC"
        ))
        .bind(role)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_email(
        pool: &SqlitePool,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateUser) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, name, email, role, department)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(&data.name)
        .bind(&data.email)
        .bind(data.role)
        .bind(&data.department)
        .fetch_one(pool)
        .await
    }

    /// Change the role of the user with `email` and mark the address verified.
    /// Returns `None` when no such user exists.
    pub async fn update_role_by_email(
        pool: &SqlitePool,
        email: &str,
        role: UserRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET role = $1, email_verified = 1, updated_at = datetime('now', 'subsec')
             WHERE email = $2
             RETURNING {USER_COLUMNS}"
        ))
        .bind(role)
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    pub async fn set_department_for_role(
        pool: &SqlitePool,
        role: UserRole,
        department: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET department = $1, updated_at = datetime('now', 'subsec')
             WHERE role = $2
             RETURNING {USER_COLUMNS}"
        ))
        .bind(department)
        .bind(role)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::DBService;

    fn new_user(name: &str, role: UserRole) -> CreateUser {
        CreateUser {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role,
            department: None,
        }
    }

    #[test]
    fn test_role_text_round_trip() {
        assert_eq!(UserRole::Candidate.to_string(), "candidate");
        assert_eq!(UserRole::from_str("hr").unwrap(), UserRole::Hr);
        assert!(UserRole::from_str("intern").is_err());
    }

    #[tokio::test]
    async fn test_find_excluding_role_keeps_creation_order() {
        let db = DBService::new_in_memory().await.unwrap();
        for (name, role) in [
            ("Asha", UserRole::Employee),
            ("Bilal", UserRole::Candidate),
            ("Chen", UserRole::Manager),
        ] {
            User::create(&db.pool, &new_user(name, role)).await.unwrap();
        }

        let users = User::find_excluding_role(&db.pool, UserRole::Candidate)
            .await
            .unwrap();
        let names: Vec<_> = users.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Asha", "Chen"]);
        assert_eq!(User::find_all(&db.pool).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_role_by_email() {
        let db = DBService::new_in_memory().await.unwrap();
        User::create(&db.pool, &new_user("Dana", UserRole::Employee))
            .await
            .unwrap();

        let updated = User::update_role_by_email(&db.pool, "dana@example.com", UserRole::Admin)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.role, UserRole::Admin);
        assert!(updated.email_verified);

        let missing = User::update_role_by_email(&db.pool, "nobody@example.com", UserRole::Admin)
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
