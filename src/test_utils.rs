#[cfg(test)]
pub mod test_utils {
    use crate::auth::hash_password;
    use crate::router::create_router;
    use crate::schemas::{ApiResponse, AppState};
    use axum::http::{header::AUTHORIZATION, HeaderName, HeaderValue};
    use axum::Router;
    use axum_test::TestServer;
    use chrono::Local;
    use migration::{Migrator, MigratorTrait};
    use model::entities::user::{self, UserRole};
    use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set};
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // SQLite needs this per connection for the cascade deletes to work
        db.execute_unprepared("PRAGMA foreign_keys = ON;")
            .await
            .expect("Failed to enable foreign keys");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;

        AppState {
            db,
            jwt_secret: "test-secret".to_string(),
        }
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is determined by the RUST_LOG environment variable,
    /// defaulting to WARN if not set.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        let _ = init_test_tracing();

        let state = setup_test_app_state().await;
        create_router(state)
    }

    /// Create an app around an existing state, for tests that need to seed
    /// the database directly.
    pub fn setup_test_app_with_state(state: AppState) -> Router {
        let _ = init_test_tracing();
        create_router(state)
    }

    /// Register an account through the API and return its id and access token
    pub async fn register_user(server: &TestServer, email: &str) -> (i64, String) {
        let response = server
            .post("/auth/register")
            .json(&serde_json::json!({
                "email": email,
                "password": "hunter2hunter2",
                "name": "Ana",
                "surname": "Molina",
                "companyName": "Panaderia Molina",
                "phone": null,
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let body: ApiResponse<serde_json::Value> = response.json();
        let user_id = body.data["user"]["id"].as_i64().expect("user id");
        let token = body.data["tokens"]["accessToken"]
            .as_str()
            .expect("access token")
            .to_string();
        (user_id, token)
    }

    /// Build an Authorization header for a bearer token
    pub fn auth_header(token: &str) -> (HeaderName, HeaderValue) {
        (
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).expect("header value"),
        )
    }

    /// Insert an ADMIN account directly; there is no endpoint that creates one
    pub async fn insert_admin(db: &DatabaseConnection, email: &str, password: &str) -> user::Model {
        user::ActiveModel {
            email: Set(email.to_string()),
            password_hash: Set(hash_password(password).expect("hash password")),
            name: Set("Root".to_string()),
            surname: Set("Admin".to_string()),
            company_name: Set("Obrador".to_string()),
            phone: Set(None),
            role: Set(UserRole::Admin),
            created_at: Set(Local::now().naive_local()),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to insert admin")
    }
}
