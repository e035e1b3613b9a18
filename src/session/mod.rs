//! Session lifecycle: credential persistence, identity resolution and the auth state machine.
//! Keep the public surface thin and split implementation across sub-modules.

mod store;
mod resolver;
mod controller;

pub use store::{Credential, SessionStore, FileSessionStore, MemorySessionStore, SESSION_TTL_DAYS, session_ttl};
pub use resolver::IdentityResolver;
pub use controller::{AuthSessionController, AuthState, Access, AccessLevel};
