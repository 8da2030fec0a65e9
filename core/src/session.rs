//! Who is signed in, and the transitions between signed in and out.
//!
//! # Design
//! `Session` owns the in-memory state and keeps it in step with
//! `SessionStorage`. It is also the client's `UnauthorizedHandler`, so a 401
//! from any request tears the session down the same way an explicit logout
//! does. `SessionProvider` adds the transitions that need the network.
//!
//! Restoring is fail-closed: only a token *and* a readable user snapshot
//! count as a session. Anything partial is wiped.

use std::sync::{Arc, PoisonError, RwLock};

use crate::client::UnauthorizedHandler;
use crate::error::ApiError;
use crate::query::QueryCache;
use crate::routes::{Navigator, Route};
use crate::services::AuthService;
use crate::storage::{self, SessionStorage, StorageError, TOKEN_KEY, USER_KEY};
use crate::types::{Credentials, RegisterUser, User, UserRole};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(AuthSession),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("no user is signed in")]
    NotSignedIn,
}

pub struct Session {
    state: RwLock<SessionState>,
    storage: Arc<dyn SessionStorage>,
    navigator: Arc<dyn Navigator>,
    cache: QueryCache,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Rehydrate from `storage`.
    pub fn restore(
        storage: Arc<dyn SessionStorage>,
        navigator: Arc<dyn Navigator>,
        cache: QueryCache,
    ) -> Self {
        let state = match (
            storage::load_token(storage.as_ref()),
            storage::load_user(storage.as_ref()),
        ) {
            (Some(token), Some(user)) => {
                tracing::info!(user = %user.email, "session restored");
                SessionState::Authenticated(AuthSession { token, user })
            }
            _ => {
                let leftovers =
                    storage.get_item(TOKEN_KEY).is_some() || storage.get_item(USER_KEY).is_some();
                if leftovers {
                    tracing::warn!("discarding incomplete stored session");
                    if let Err(err) = storage::clear_session(storage.as_ref()) {
                        tracing::warn!(%err, "could not clear stored session");
                    }
                }
                SessionState::Anonymous
            }
        };

        Self {
            state: RwLock::new(state),
            storage,
            navigator,
            cache,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(
            *self.state.read().unwrap_or_else(PoisonError::into_inner),
            SessionState::Authenticated(_)
        )
    }

    pub fn current_user(&self) -> Option<User> {
        match self.state() {
            SessionState::Authenticated(session) => Some(session.user),
            SessionState::Anonymous => None,
        }
    }

    pub fn token(&self) -> Option<String> {
        match self.state() {
            SessionState::Authenticated(session) => Some(session.token),
            SessionState::Anonymous => None,
        }
    }

    /// Persist and switch to an authenticated session.
    pub fn establish(&self, token: &str, user: User) -> Result<(), StorageError> {
        storage::store_session(self.storage.as_ref(), token, &user)?;
        tracing::info!(user = %user.email, "signed in");
        *self.state.write().unwrap_or_else(PoisonError::into_inner) =
            SessionState::Authenticated(AuthSession {
                token: token.to_string(),
                user,
            });
        Ok(())
    }

    /// Back to anonymous: wipe the stored keys and cached data, then send the
    /// user to sign-in. The in-memory state is reset even if storage fails.
    pub fn end(&self) -> Result<(), StorageError> {
        let cleared = storage::clear_session(self.storage.as_ref());
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = SessionState::Anonymous;
        self.cache.clear();
        self.navigator.navigate(Route::SignIn);
        tracing::info!("signed out");
        cleared
    }

    pub fn is_admin(&self) -> bool {
        self.current_user()
            .is_some_and(|user| user.role == UserRole::Admin)
    }

    /// Admins hold every role.
    pub fn has_permission(&self, role: UserRole) -> bool {
        self.current_user()
            .is_some_and(|user| user.role == UserRole::Admin || user.role == role)
    }

    /// `Err` carries where to send the user instead of `route`.
    pub fn authorize(&self, route: &Route) -> Result<(), Route> {
        if route.is_public() {
            return Ok(());
        }
        if !self.is_authenticated() {
            return Err(Route::SignIn);
        }
        match route.required_role() {
            Some(role) if !self.has_permission(role) => Err(Route::Home),
            _ => Ok(()),
        }
    }

    /// Like `authorize`, but performs the redirect.
    pub fn guard(&self, route: &Route) -> bool {
        match self.authorize(route) {
            Ok(()) => true,
            Err(fallback) => {
                self.navigator.navigate(fallback);
                false
            }
        }
    }
}

impl UnauthorizedHandler for Session {
    fn on_unauthorized(&self) {
        tracing::warn!("request unauthorized; ending session");
        if let Err(err) = self.end() {
            tracing::warn!(%err, "could not clear stored session");
        }
    }
}

/// Session transitions that talk to the backend.
#[derive(Debug, Clone)]
pub struct SessionProvider {
    session: Arc<Session>,
    auth: AuthService,
}

impl SessionProvider {
    pub fn new(session: Arc<Session>, auth: AuthService) -> Self {
        Self { session, auth }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Sign in. When the backend answers with a bare token the profile is
    /// fetched with it before anything is persisted.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, SessionError> {
        let response = self.auth.login(credentials).await?;
        let user = match response.user {
            Some(user) => user,
            None => self.auth.profile_with_token(&response.access_token).await?,
        };
        self.session.cache.clear();
        self.session.establish(&response.access_token, user.clone())?;
        Ok(user)
    }

    /// Create an account. Does not sign in.
    pub async fn register(&self, input: &RegisterUser) -> Result<User, SessionError> {
        Ok(self.auth.register(input).await?)
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        Ok(self.session.end()?)
    }

    /// Reload the signed-in user's profile and persist the new snapshot.
    pub async fn refresh_profile(&self) -> Result<User, SessionError> {
        let token = self.session.token().ok_or(SessionError::NotSignedIn)?;
        let user = self.auth.profile().await?;
        self.session.establish(&token, user.clone())?;
        Ok(user)
    }
}
