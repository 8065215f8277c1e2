#[cfg(test)]
pub mod test_utils {
    use crate::router::create_router;
    use crate::schemas::AppState;
    use crate::storage::{LocalMediaStore, MediaStore};
    use axum::Router;
    use migration::{Migrator, MigratorTrait};
    use model::entities::{profile, user};
    use moka::future::Cache;
    use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set, TransactionTrait};
    use std::sync::Arc;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;
    use uuid::Uuid;

    /// Account ids seeded into every test database, one per role plus a
    /// second resident and a superuser.
    #[derive(Debug, Clone, Copy)]
    pub struct TestAccounts {
        pub resident: i32,
        pub resident2: i32,
        pub authority: i32,
        pub officer: i32,
        pub chief: i32,
        pub admin: i32,
        pub root: i32,
    }

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    async fn seed_account(
        txn: &sea_orm::DatabaseTransaction,
        username: &str,
        role: profile::Role,
        superuser: bool,
    ) -> i32 {
        let account = user::ActiveModel {
            username: Set(username.to_string()),
            is_superuser: Set(superuser),
            ..Default::default()
        }
        .insert(txn)
        .await
        .expect("Failed to create test account");

        profile::ActiveModel {
            account_id: Set(account.id),
            role: Set(role),
            contact_number: Set(Some("0712345678".to_string())),
            location: Set(Some("Nairobi".to_string())),
        }
        .insert(txn)
        .await
        .expect("Failed to create test profile");

        account.id
    }

    /// Create AppState for testing, with one account per role seeded
    pub async fn setup_test_app_state() -> (AppState, TestAccounts) {
        let db = setup_test_db().await;

        let txn = db.begin().await.expect("Failed to open transaction");
        let accounts = TestAccounts {
            resident: seed_account(&txn, "wanjiku", profile::Role::Resident, false).await,
            resident2: seed_account(&txn, "otieno", profile::Role::Resident, false).await,
            authority: seed_account(&txn, "authority_achieng", profile::Role::Authority, false)
                .await,
            officer: seed_account(&txn, "officer_kamau", profile::Role::Officer, false).await,
            chief: seed_account(&txn, "chief_njoroge", profile::Role::Chief, false).await,
            admin: seed_account(&txn, "admin_mwangi", profile::Role::Admin, false).await,
            root: seed_account(&txn, "root", profile::Role::Admin, true).await,
        };
        txn.commit().await.expect("Failed to commit seed data");

        let cache = Cache::new(100);

        let media_root = std::env::temp_dir().join(format!("ulinzi-test-media-{}", Uuid::new_v4()));
        let media: Arc<dyn MediaStore> = Arc::new(LocalMediaStore::new(&media_root));

        (AppState { db, cache, media }, accounts)
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
            .with_writer(std::io::stderr) // Output to stderr, which is captured by tests
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> (Router, TestAccounts) {
        let _ = init_test_tracing();

        let (state, accounts) = setup_test_app_state().await;
        let router = create_router(state);
        (router, accounts)
    }
}
