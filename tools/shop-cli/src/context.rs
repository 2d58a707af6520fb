//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use shop_cache::FileStore;
use shop_commerce::api::StorefrontApi;
use shop_commerce::cart::CartStore;
use shop_commerce::session::{AuthSession, SessionEvents};
use shop_data::{FetchClient, ReqwestTransport};

use crate::config::CliConfig;
use crate::output::Output;

/// Config file names, in lookup order.
pub const CONFIG_NAMES: [&str; 3] = ["shop.toml", ".shop.toml", "shop.json"];

/// Store shared by the session and the cart.
pub type SharedStore = Arc<FileStore>;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Config file in use, if one was found.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    events: SessionEvents,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => {
                let path = resolve(&cwd, path);
                (CliConfig::load(&path)?, Some(path))
            }
            None => match find_config(&cwd) {
                Some(path) => (CliConfig::load(&path)?, Some(path)),
                None => (CliConfig::default(), None),
            },
        };

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
            events: SessionEvents::new(),
        })
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        resolve(&self.cwd, path)
    }

    /// Open the state file, creating its directory on first use.
    pub fn store(&self) -> Result<SharedStore> {
        let path = self.resolve_path(&self.config.storage.path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create state directory: {}", parent.display()))?;
        }
        let store = FileStore::open(&path)
            .with_context(|| format!("Failed to open state file: {}", path.display()))?;
        Ok(Arc::new(store))
    }

    /// Auth state over `store`.
    pub fn session(&self, store: &SharedStore) -> AuthSession<SharedStore> {
        AuthSession::new(
            Arc::clone(store),
            self.config.storage.namespace.clone(),
            self.events.clone(),
        )
    }

    /// The persisted cart, priced with the configured policy.
    pub fn cart(&self, store: &SharedStore) -> Result<CartStore<SharedStore>> {
        let policy = self.config.pricing.policy()?;
        let cart = CartStore::open(Arc::clone(store), &self.config.storage.namespace)?;
        Ok(cart.with_policy(policy))
    }

    /// REST client for the configured API, sending `token` when given.
    pub fn api(&self, token: Option<&str>) -> Result<StorefrontApi> {
        let transport = match self.config.api.timeout_secs {
            Some(secs) => ReqwestTransport::with_timeout(Duration::from_secs(secs))?,
            None => ReqwestTransport::new()?,
        };
        let client = FetchClient::new(transport).with_base_url(self.config.api.base_url.as_str());

        let mut api = StorefrontApi::new(client, self.config.pricing.currency()?);
        api.set_token(token);
        Ok(api)
    }

    /// REST client carrying the stored token, if any.
    pub fn authed_api(&self, session: &AuthSession<SharedStore>) -> Result<StorefrontApi> {
        let token = session.token()?;
        self.api(token.as_deref())
    }
}

fn resolve(cwd: &Path, path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

/// Find a config file in `start` or one of its parents.
fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_NAMES {
            let candidate = current.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}
