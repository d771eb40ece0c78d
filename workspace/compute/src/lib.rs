pub mod error;
pub mod recipe;
pub mod register;
pub mod report;
pub mod supply;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use migration::{Migrator, MigratorTrait};
    use model::entities::user;
    use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set};

    /// In-memory SQLite with the full schema applied and foreign keys on.
    pub async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");
        db.execute_unprepared("PRAGMA foreign_keys = ON;")
            .await
            .expect("Failed to enable foreign keys");
        Migrator::up(&db, None).await.expect("Migrations failed");
        db
    }

    pub async fn insert_user(db: &DatabaseConnection, email: &str) -> user::Model {
        user::ActiveModel {
            email: Set(email.to_string()),
            password_hash: Set("$argon2id$stub".to_string()),
            name: Set("Test".to_string()),
            surname: Set("Baker".to_string()),
            company_name: Set("Test Bakery".to_string()),
            phone: Set(None),
            role: Set(user::UserRole::User),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to insert test user")
    }
}
