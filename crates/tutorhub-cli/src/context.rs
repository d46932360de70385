// Shared wiring: config, HTTP client and session

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;
use tutorhub_config::{AppConfig, ConfigManager};
use tutorhub_course::ProfileApi;
use tutorhub_http::{ApiClient, HttpConfig};
use tutorhub_session::{AuthApi, DeviceInfo, FileSessionStore, SessionManager, UserInfo};

use crate::error::{CliError, CliResult};

/// Everything a command needs to talk to the backend
pub struct AppContext {
    config: AppConfig,
    client: ApiClient,
    session: SessionManager,
}

impl AppContext {
    /// Load configuration from `path` (or the default location) and wire it up
    pub fn load(path: Option<PathBuf>) -> CliResult<Self> {
        let manager = match path {
            Some(path) => ConfigManager::with_path(path),
            None => ConfigManager::new(),
        };
        debug!("Loading configuration from {}", manager.config_path().display());
        Self::from_config(manager.load()?)
    }

    pub fn from_config(config: AppConfig) -> CliResult<Self> {
        let http = http_config(&config);
        let device = DeviceInfo {
            device_token: config.session.device_token.clone(),
            user_agent: http.user_agent.clone(),
            ..Default::default()
        };
        let client = ApiClient::new(http, &config.api.base_url)?;

        let auth = AuthApi::new(client.clone()).with_device(device);
        let store = FileSessionStore::new(config.session.resolved_storage_path());
        let session = SessionManager::new(auth, Arc::new(store), config.session.expired_policy);

        Ok(Self {
            config,
            client,
            session,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Client without credentials, for the public authenticate endpoints
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Client that attaches and refreshes the stored session
    pub fn authorized(&self) -> CliResult<ApiClient> {
        if !self.session.is_authenticated() {
            return Err(CliError::NotSignedIn);
        }
        Ok(self.session.authorize(&self.client))
    }

    pub async fn current_user(&self) -> CliResult<UserInfo> {
        let client = self.authorized()?;
        self.session
            .load_user_info(&client)
            .await?
            .ok_or(CliError::NotSignedIn)
    }

    /// Teacher id of the signed-in account, via its profile
    pub async fn teacher_id(&self) -> CliResult<String> {
        let user = self.current_user().await?;
        let profile = ProfileApi::new(self.authorized()?)
            .profile(&user.user_id)
            .await?;
        Ok(profile.teacher_id)
    }
}

fn http_config(config: &AppConfig) -> HttpConfig {
    let api = &config.api;
    let mut http = HttpConfig::new()
        .with_timeout(api.timeout())
        .with_connect_timeout(api.connect_timeout());
    if let Some(proxy) = &api.proxy {
        http = http.with_proxy(proxy.clone());
    }
    if let Some(agent) = &api.user_agent {
        http = http.with_user_agent(agent.clone());
    }
    http
}
