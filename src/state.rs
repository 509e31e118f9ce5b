use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, HabitService, SeaOrmAuthService, SeaOrmHabitService};

/// Process-wide state built once at startup. Configuration is immutable after load.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub habit_service: Arc<dyn HabitService>,

    pub auth_service: Arc<dyn AuthService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::with_store(config, store))
    }

    /// Wires services over an already-connected store.
    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let habit_service = Arc::new(SeaOrmHabitService::new(store.clone()))
            as Arc<dyn HabitService + Send + Sync + 'static>;

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService + Send + Sync + 'static>;

        Self {
            config: Arc::new(config),
            store,
            habit_service,
            auth_service,
        }
    }
}
