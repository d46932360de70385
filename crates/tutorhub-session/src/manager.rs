//! Signed-in state, token refresh and logout

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use tutorhub_config::ExpiredSessionPolicy;
use tutorhub_http::{ApiClient, SessionProvider};

use crate::auth::AuthApi;
use crate::error::SessionResult;
use crate::models::{
    expiry_from_minutes, now_millis, AuthState, AuthTokens, RefreshOutcome, Session, UserInfo,
};
use crate::store::SessionStore;

type RefreshFlight = Shared<BoxFuture<'static, RefreshOutcome>>;

/// Owner of the current session
///
/// Cheap to clone; clones share state. Hand a clone to
/// [`ApiClient::with_session`] (or use [`SessionManager::authorize`]) to get
/// a client that attaches and refreshes tokens through this manager.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    auth: AuthApi,
    store: Arc<dyn SessionStore>,
    session: RwLock<Option<Session>>,
    /// Bumped on every login and sign-out, under the `session` write lock
    generation: AtomicU64,
    refresh: Mutex<Option<RefreshFlight>>,
    state: watch::Sender<AuthState>,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl SessionManager {
    /// Create a manager, restoring any stored session according to `policy`
    pub fn new(auth: AuthApi, store: Arc<dyn SessionStore>, policy: ExpiredSessionPolicy) -> Self {
        let restored = restore(store.as_ref(), policy, now_millis());
        let initial = if restored.is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        };
        let (state, _) = watch::channel(initial);

        Self {
            inner: Arc::new(Inner {
                auth,
                store,
                session: RwLock::new(restored),
                generation: AtomicU64::new(0),
                refresh: Mutex::new(None),
                state,
            }),
        }
    }

    /// Authenticated client sharing `client`'s connection pool
    pub fn authorize(&self, client: &ApiClient) -> ApiClient {
        client.with_session(Arc::new(self.clone()))
    }

    pub fn auth_api(&self) -> &AuthApi {
        &self.inner.auth
    }

    /// Hold and persist freshly issued tokens
    pub fn login(&self, tokens: AuthTokens, identifier: &str) -> SessionResult<Session> {
        let session = Session::from_tokens(tokens, identifier, now_millis());
        self.inner.store.save(&session)?;
        {
            let mut slot = self.inner.session.write();
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
            *slot = Some(session.clone());
        }
        self.inner.state.send_replace(AuthState::Authenticated);
        info!("Signed in as {}", identifier);
        Ok(session)
    }

    /// Tell the backend to revoke the tokens, then forget them locally
    ///
    /// The backend call is best effort; local state is cleared regardless.
    pub async fn logout(&self) {
        let current = self.inner.session.read().clone();
        if let Some(session) = current {
            if let Err(e) = self
                .inner
                .auth
                .logout(&session.access_token, &session.refresh_token)
                .await
            {
                warn!("Logout request failed: {}", e);
            }
        }
        self.inner.clear_local();
        info!("Signed out");
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner
            .session
            .read()
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    pub fn session(&self) -> Option<Session> {
        self.inner.session.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.session.read().is_some()
    }

    /// `true` when there is no session or its deadline has passed
    pub fn is_expired(&self) -> bool {
        self.inner
            .session
            .read()
            .as_ref()
            .map_or(true, |s| s.is_expired())
    }

    /// Observe sign-in and sign-out
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    /// Exchange the refresh token for a new access token
    ///
    /// Concurrent callers share one in-flight refresh and receive the same
    /// outcome. A failed refresh signs the user out.
    pub async fn refresh_session(&self) -> RefreshOutcome {
        let flight = {
            let mut slot = self.inner.refresh.lock();
            match slot.clone() {
                Some(flight) => {
                    debug!("Joining in-flight session refresh");
                    flight
                }
                None => {
                    let inner = Arc::clone(&self.inner);
                    let flight = async move {
                        let outcome = inner.perform_refresh().await;
                        inner.refresh.lock().take();
                        outcome
                    }
                    .boxed()
                    .shared();
                    *slot = Some(flight.clone());
                    flight
                }
            }
        };
        flight.await
    }

    /// Resolve the signed-in identifier to the full user record
    ///
    /// `client` must be authenticated; `Ok(None)` when signed out.
    pub async fn load_user_info(&self, client: &ApiClient) -> SessionResult<Option<UserInfo>> {
        let Some(identifier) = self.session().map(|s| s.identifier) else {
            return Ok(None);
        };
        let lookup = self.inner.auth.lookup_user(&identifier).await?;
        let info = self
            .inner
            .auth
            .with_client(client.clone())
            .user_info(&lookup.user_id)
            .await?;
        Ok(Some(info))
    }
}

impl Inner {
    async fn perform_refresh(&self) -> RefreshOutcome {
        let (current, generation) = {
            let slot = self.session.read();
            let Some(current) = slot.clone() else {
                debug!("No session to refresh");
                return RefreshOutcome::Failed;
            };
            (current, self.generation.load(Ordering::SeqCst))
        };

        let result = self
            .auth
            .refresh(&current.access_token, &current.refresh_token)
            .await;
        match result {
            Ok(res) => {
                let updated = Session {
                    access_token: res.access_token,
                    refresh_token: res.refresh_token.unwrap_or(current.refresh_token),
                    expiration: expiry_from_minutes(res.expiration, now_millis()),
                    identifier: current.identifier,
                };
                let access_token = updated.access_token.clone();
                {
                    let mut slot = self.session.write();
                    if self.generation.load(Ordering::SeqCst) != generation {
                        info!("Session changed during refresh, dropping refreshed tokens");
                        return RefreshOutcome::Failed;
                    }
                    if let Err(e) = self.store.save(&updated) {
                        warn!("Failed to persist refreshed session: {}", e);
                    }
                    *slot = Some(updated);
                }
                self.state.send_replace(AuthState::Authenticated);
                info!("Session refreshed");
                RefreshOutcome::Refreshed { access_token }
            }
            Err(e) => {
                if self.generation.load(Ordering::SeqCst) != generation {
                    debug!("Refresh failed for a session that is already gone: {}", e);
                    return RefreshOutcome::Failed;
                }
                warn!("Session refresh failed, signing out: {}", e);
                self.clear_local();
                RefreshOutcome::Failed
            }
        }
    }

    fn clear_local(&self) {
        let mut slot = self.session.write();
        self.generation.fetch_add(1, Ordering::SeqCst);
        slot.take();
        if let Err(e) = self.store.clear() {
            warn!("Failed to clear stored session: {}", e);
        }
        drop(slot);
        self.state.send_replace(AuthState::Unauthenticated);
    }
}

fn restore(store: &dyn SessionStore, policy: ExpiredSessionPolicy, now_ms: i64) -> Option<Session> {
    let stored = match store.load() {
        Ok(stored) => stored?,
        Err(e) => {
            warn!("Could not read stored session: {}", e);
            if let Err(e) = store.clear() {
                warn!("Failed to clear stored session: {}", e);
            }
            return None;
        }
    };

    if !stored.is_expired_at(now_ms) {
        debug!("Restored session for {}", stored.identifier);
        return Some(stored);
    }

    match policy {
        ExpiredSessionPolicy::Discard => {
            info!("Stored session expired, discarding");
            if let Err(e) = store.clear() {
                warn!("Failed to clear stored session: {}", e);
            }
            None
        }
        ExpiredSessionPolicy::KeepForRefresh => {
            info!("Stored session expired, keeping it for refresh");
            Some(stored)
        }
    }
}

#[async_trait]
impl SessionProvider for SessionManager {
    fn access_token(&self) -> Option<String> {
        SessionManager::access_token(self)
    }

    async fn refresh_session(&self) -> bool {
        SessionManager::refresh_session(self).await.is_refreshed()
    }

    fn on_unauthorized(&self) {
        if self.is_authenticated() {
            self.inner.clear_local();
        }
    }
}
