use std::sync::Arc;

use tokio::sync::{watch, OnceCell};
use tracing::{debug, info, warn};

use crate::error::PortalResult;
use crate::model::{LoginRequest, User};
use crate::present::RequestSequencer;
use crate::services::AuthService;

use super::resolver::IdentityResolver;
use super::store::{session_ttl, Credential, SessionStore};

/// Client-side authentication state.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// Before rehydration has started.
    Unknown,
    Checking,
    Authenticated(User),
    Anonymous,
}

impl AuthState {
    pub fn is_loading(&self) -> bool { matches!(self, AuthState::Unknown | AuthState::Checking) }

    pub fn user(&self) -> Option<&User> {
        match self { AuthState::Authenticated(u) => Some(u), _ => None }
    }

    pub fn is_authenticated(&self) -> bool { self.user().is_some() }

    pub fn is_admin(&self) -> bool { self.user().map(|u| u.is_admin).unwrap_or(false) }

    pub fn access(&self, required: AccessLevel) -> Access {
        if required == AccessLevel::Public {
            return Access::Granted(self.user().cloned());
        }
        if self.is_loading() {
            return Access::Pending;
        }
        match self.user() {
            None => Access::LoginRequired,
            Some(u) if required == AccessLevel::Admin && !u.is_admin => Access::Forbidden,
            Some(u) => Access::Granted(Some(u.clone())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    Public,
    Authenticated,
    Admin,
}

/// Outcome of gating a view on the current session.
#[derive(Debug, Clone, PartialEq)]
pub enum Access {
    /// Rehydration has not settled yet.
    Pending,
    Granted(Option<User>),
    LoginRequired,
    Forbidden,
}

/// Owns the session state machine: `Unknown -> Checking -> Authenticated | Anonymous`.
///
/// State is published through a `watch` channel; dependents subscribe and observe but
/// never mutate. Every login/logout takes a ticket from the sequencer, so a resolution
/// that finishes after a newer login or logout is dropped instead of overwriting it.
pub struct AuthSessionController {
    store: Arc<dyn SessionStore>,
    resolver: Arc<dyn IdentityResolver>,
    state: watch::Sender<AuthState>,
    rehydrated: OnceCell<()>,
    epochs: RequestSequencer,
}

impl AuthSessionController {
    pub fn new(store: Arc<dyn SessionStore>, resolver: Arc<dyn IdentityResolver>) -> Self {
        let (state, _) = watch::channel(AuthState::Unknown);
        Self { store, resolver, state, rehydrated: OnceCell::new(), epochs: RequestSequencer::new() }
    }

    pub fn state(&self) -> AuthState { self.state.borrow().clone() }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> { self.state.subscribe() }

    pub fn is_authenticated(&self) -> bool { self.state.borrow().is_authenticated() }

    pub fn is_admin(&self) -> bool { self.state.borrow().is_admin() }

    pub fn current_user(&self) -> Option<User> { self.state.borrow().user().cloned() }

    pub fn access(&self, required: AccessLevel) -> Access { self.state.borrow().access(required) }

    fn transition(&self, next: AuthState) {
        let prev = self.state.send_replace(next);
        debug!(target: "campus_portal::session", "auth state {} -> {}", label(&prev), label(&self.state.borrow()));
    }

    /// Rehydrate from the session store. Runs once per controller; concurrent and later
    /// callers wait for that single check and get the resulting state.
    pub async fn initialize(&self) -> AuthState {
        self.rehydrated.get_or_init(|| self.rehydrate()).await;
        self.state()
    }

    async fn rehydrate(&self) {
        let ticket = self.epochs.begin();
        self.transition(AuthState::Checking);
        if self.store.get().is_none() {
            self.transition(AuthState::Anonymous);
            return;
        }
        let result = self.resolver.fetch_current_user().await;
        if !self.epochs.is_current(ticket) {
            debug!(target: "campus_portal::session", "rehydration superseded by login/logout");
            return;
        }
        match result {
            Ok(user) => {
                info!(target: "campus_portal::session", "session restored for {}", user.username);
                self.transition(AuthState::Authenticated(user));
            }
            Err(e) => {
                warn!(target: "campus_portal::session", "auth check failed: {}", e);
                self.discard_credential();
                self.transition(AuthState::Anonymous);
            }
        }
    }

    /// Store the credential and resolve the user. A failed resolution discards the
    /// credential and leaves the session anonymous; the error is only logged.
    pub async fn login(&self, credential: Credential) -> AuthState {
        let ticket = self.epochs.begin();
        if let Err(e) = self.store.set(&credential, session_ttl()) {
            warn!(target: "campus_portal::session", "failed to persist credential: {}", e);
        }
        let result = self.resolver.fetch_current_user().await;
        if !self.epochs.is_current(ticket) {
            debug!(target: "campus_portal::session", "login superseded before user resolved");
            return self.state();
        }
        match result {
            Ok(user) => {
                info!(target: "campus_portal::session", "logged in as {}", user.username);
                self.transition(AuthState::Authenticated(user));
            }
            Err(e) => {
                warn!(target: "campus_portal::session", "failed to fetch user data: {}", e);
                self.discard_credential();
                self.transition(AuthState::Anonymous);
            }
        }
        self.state()
    }

    /// Username/password exchange followed by `login`. Exchange failures (bad password,
    /// backend down) are returned so the caller can show them.
    pub async fn login_with_password(&self, auth: &AuthService, req: &LoginRequest) -> PortalResult<AuthState> {
        let token = auth.login(req).await?;
        Ok(self.login(Credential::from(token)).await)
    }

    /// Discard the credential and go anonymous, whatever the prior state.
    pub fn logout(&self) {
        self.epochs.begin();
        self.discard_credential();
        self.transition(AuthState::Anonymous);
    }

    fn discard_credential(&self) {
        if let Err(e) = self.store.remove() {
            warn!(target: "campus_portal::session", "failed to remove stored credential: {}", e);
        }
    }
}

fn label(s: &AuthState) -> &'static str {
    match s {
        AuthState::Unknown => "unknown",
        AuthState::Checking => "checking",
        AuthState::Authenticated(_) => "authenticated",
        AuthState::Anonymous => "anonymous",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PortalError;
    use crate::session::MemorySessionStore;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeResolver {
        reply: Mutex<PortalResult<User>>,
        calls: AtomicUsize,
    }

    impl FakeResolver {
        fn ok(user: User) -> Arc<Self> { Arc::new(Self { reply: Mutex::new(Ok(user)), calls: AtomicUsize::new(0) }) }
        fn failing() -> Arc<Self> {
            Arc::new(Self { reply: Mutex::new(Err(PortalError::unauthorized("bad token"))), calls: AtomicUsize::new(0) })
        }
        fn set(&self, r: PortalResult<User>) { *self.reply.lock() = r; }
    }

    #[async_trait]
    impl IdentityResolver for FakeResolver {
        async fn fetch_current_user(&self) -> PortalResult<User> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.lock().clone()
        }
    }

    fn user(admin: bool) -> User {
        User { id: 1, username: "asha".into(), email: "asha@campus.edu".into(), is_admin: admin, is_active: true, created_at: String::new() }
    }

    #[tokio::test]
    async fn rehydrate_without_credential_is_anonymous_and_skips_resolver() {
        let store = Arc::new(MemorySessionStore::new());
        let resolver = FakeResolver::ok(user(false));
        let c = AuthSessionController::new(store, resolver.clone());
        assert_eq!(c.state(), AuthState::Unknown);
        assert!(c.state().is_loading());
        assert_eq!(c.initialize().await, AuthState::Anonymous);
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rehydrate_restores_user_once() {
        let store = Arc::new(MemorySessionStore::new());
        store.set(&Credential::bearer("t"), session_ttl()).unwrap();
        let resolver = FakeResolver::ok(user(true));
        let c = AuthSessionController::new(store, resolver.clone());
        let (a, b) = tokio::join!(c.initialize(), c.initialize());
        assert!(a.is_admin() && b.is_admin());
        c.initialize().await;
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_rehydration_discards_credential() {
        let store = Arc::new(MemorySessionStore::new());
        store.set(&Credential::bearer("revoked"), session_ttl()).unwrap();
        let c = AuthSessionController::new(store.clone(), FakeResolver::failing());
        assert_eq!(c.initialize().await, AuthState::Anonymous);
        assert!(store.get().is_none());
    }

    #[tokio::test]
    async fn failed_login_removes_credential() {
        let store = Arc::new(MemorySessionStore::new());
        let c = AuthSessionController::new(store.clone(), FakeResolver::failing());
        c.initialize().await;
        let st = c.login(Credential::bearer("nope")).await;
        assert!(!st.is_authenticated());
        assert!(!c.is_authenticated());
        assert!(store.get().is_none());
    }

    #[tokio::test]
    async fn failed_login_after_success_goes_anonymous() {
        let store = Arc::new(MemorySessionStore::new());
        let resolver = FakeResolver::ok(user(false));
        let c = AuthSessionController::new(store.clone(), resolver.clone());
        c.login(Credential::bearer("good")).await;
        assert!(c.is_authenticated());
        resolver.set(Err(PortalError::network("offline")));
        c.login(Credential::bearer("other")).await;
        assert!(!c.is_authenticated());
        assert!(store.get().is_none());
    }

    #[tokio::test]
    async fn logout_always_clears() {
        let store = Arc::new(MemorySessionStore::new());
        let c = AuthSessionController::new(store.clone(), FakeResolver::ok(user(true)));
        c.logout();
        assert!(!c.is_authenticated() && !c.is_admin());

        c.login(Credential::bearer("t")).await;
        assert!(c.is_admin());
        c.logout();
        assert!(!c.is_authenticated() && !c.is_admin());
        assert!(store.get().is_none());
    }

    #[tokio::test]
    async fn subscribers_observe_transitions() {
        let store = Arc::new(MemorySessionStore::new());
        let c = AuthSessionController::new(store, FakeResolver::ok(user(false)));
        let mut rx = c.subscribe();
        c.login(Credential::bearer("t")).await;
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_authenticated());
        c.logout();
        assert_eq!(*rx.borrow_and_update(), AuthState::Anonymous);
    }

    #[test]
    fn access_gating() {
        assert_eq!(AuthState::Checking.access(AccessLevel::Admin), Access::Pending);
        assert_eq!(AuthState::Anonymous.access(AccessLevel::Admin), Access::LoginRequired);
        assert_eq!(AuthState::Authenticated(user(false)).access(AccessLevel::Admin), Access::Forbidden);
        assert_eq!(AuthState::Authenticated(user(true)).access(AccessLevel::Admin), Access::Granted(Some(user(true))));
        assert_eq!(AuthState::Anonymous.access(AccessLevel::Public), Access::Granted(None));
        assert_eq!(AuthState::Authenticated(user(false)).access(AccessLevel::Authenticated), Access::Granted(Some(user(false))));
    }
}
