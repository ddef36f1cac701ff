use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// --- Module Structure ---

// Request authentication and the public rule set.
pub mod auth;
// Navigation decisions and the pages they apply to.
pub mod guard;
pub mod navigation;
pub mod routes;
// Sessions, transport and the storage they share.
pub mod api;
pub mod session;
pub mod storage;

pub mod config;
pub mod error;
pub mod models;

// --- Public Re-exports ---

pub use api::{ApiClient, HttpSessionApi, SessionApi, SessionApiState};
pub use auth::{OutgoingRequest, PublicRule, PublicRules, RequestAuthenticator};
pub use config::{AppConfig, Env};
pub use error::{ClientError, NavigationError, StorageError};
pub use guard::{NavigationDecision, RouteGuard};
pub use models::{Area, Credentials, RouteMeta, SessionEvent, SessionRecord};
pub use navigation::{Navigator, Resolved};
pub use routes::{RouteDef, RouteTable};
pub use session::SessionStore;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageState};

/// Portal
///
/// The single container holding every client-side service, shared by whatever
/// UI drives it. All pieces read and write the same `StorageState`, which is
/// the only channel between session stores, the guard and the authenticator.
#[derive(Clone)]
pub struct Portal {
    /// The loaded, immutable configuration.
    pub config: AppConfig,
    /// Credential storage shared by every component below.
    pub storage: StorageState,
    /// Outgoing-call pipeline with the request authenticator installed.
    pub api: Arc<ApiClient>,
    /// Route table plus guard.
    pub navigator: Navigator,
    pub admin: Arc<SessionStore>,
    pub seller: Arc<SessionStore>,
    pub user: Arc<SessionStore>,
}

impl Portal {
    /// new
    ///
    /// Opens the storage the configuration asks for and wires the HTTP-backed
    /// session stores.
    pub fn new(config: AppConfig) -> Result<Self, ClientError> {
        let storage = storage::open_storage(&config)?;
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: AppConfig, storage: StorageState) -> Result<Self, ClientError> {
        let api = Arc::new(ApiClient::new(
            &config,
            RequestAuthenticator::new(storage.clone()),
        )?);
        let session_api = Arc::new(HttpSessionApi::new(api.clone())) as SessionApiState;
        Ok(Self::assemble(config, storage, api, session_api))
    }

    /// Same wiring with a caller-provided remote session implementation.
    pub fn with_session_api(
        config: AppConfig,
        storage: StorageState,
        session_api: SessionApiState,
    ) -> Result<Self, ClientError> {
        let api = Arc::new(ApiClient::new(
            &config,
            RequestAuthenticator::new(storage.clone()),
        )?);
        Ok(Self::assemble(config, storage, api, session_api))
    }

    fn assemble(
        config: AppConfig,
        storage: StorageState,
        api: Arc<ApiClient>,
        session_api: SessionApiState,
    ) -> Self {
        let store = |area| Arc::new(SessionStore::new(area, session_api.clone(), storage.clone()));

        Self {
            navigator: Navigator::new(RouteTable::default(), RouteGuard::new(storage.clone())),
            admin: store(Area::Admin),
            seller: store(Area::Seller),
            user: store(Area::User),
            config,
            storage,
            api,
        }
    }

    pub fn session(&self, area: Area) -> &Arc<SessionStore> {
        match area {
            Area::Admin => &self.admin,
            Area::Seller => &self.seller,
            Area::User => &self.user,
        }
    }

    pub fn navigate(&self, path: &str) -> Result<Resolved, NavigationError> {
        self.navigator.navigate(path)
    }
}

/// init_tracing
///
/// Installs the global subscriber. `RUST_LOG` wins when set; otherwise the
/// crate logs at debug. Local runs get pretty output, production gets JSON for
/// log aggregators. Calling it twice is harmless.
pub fn init_tracing(config: &AppConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "portal_client=debug,reqwest=info".into());

    let result = match config.env {
        Env::Local => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
        Env::Production => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    };

    if result.is_ok() {
        tracing::info!("Portal client logging initialised in {:?} mode", config.env);
    }
}
