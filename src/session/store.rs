use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::PortalResult;
use crate::model::{default_token_type, Token};

/// Lifetime of a stored credential.
pub const SESSION_TTL_DAYS: i64 = 1;

pub fn session_ttl() -> Duration { Duration::days(SESSION_TTL_DAYS) }

/// Opaque bearer credential as issued by `/auth/token`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

impl Credential {
    pub fn bearer<S: Into<String>>(token: S) -> Self {
        Self { access_token: token.into(), token_type: default_token_type() }
    }
}

impl From<Token> for Credential {
    fn from(t: Token) -> Self { Self { access_token: t.access_token, token_type: t.token_type } }
}

// Never print the token itself.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential").field("token_type", &self.token_type).field("access_token", &"<redacted>").finish()
    }
}

/// Persistent single-slot credential cell with automatic expiry.
pub trait SessionStore: Send + Sync {
    fn set(&self, credential: &Credential, ttl: Duration) -> PortalResult<()>;
    /// The stored credential, or `None` when absent or expired.
    fn get(&self) -> Option<Credential>;
    fn remove(&self) -> PortalResult<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCredential {
    #[serde(flatten)]
    credential: Credential,
    expires_at: DateTime<Utc>,
}

impl StoredCredential {
    fn new(credential: &Credential, ttl: Duration) -> Self {
        Self { credential: credential.clone(), expires_at: Utc::now() + ttl }
    }

    fn is_live(&self) -> bool { self.expires_at > Utc::now() }
}

/// In-process store. Nothing survives the process.
#[derive(Default)]
pub struct MemorySessionStore {
    slot: RwLock<Option<StoredCredential>>,
}

impl MemorySessionStore {
    pub fn new() -> Self { Self::default() }
}

impl SessionStore for MemorySessionStore {
    fn set(&self, credential: &Credential, ttl: Duration) -> PortalResult<()> {
        *self.slot.write() = Some(StoredCredential::new(credential, ttl));
        Ok(())
    }

    fn get(&self) -> Option<Credential> {
        let live = self.slot.read().as_ref().map(|s| (s.is_live(), s.credential.clone()));
        match live {
            Some((true, c)) => Some(c),
            Some((false, _)) => { *self.slot.write() = None; None }
            None => None,
        }
    }

    fn remove(&self) -> PortalResult<()> {
        *self.slot.write() = None;
        Ok(())
    }
}

/// JSON file store; the on-disk counterpart of a site cookie.
pub struct FileSessionStore {
    path: PathBuf,
    // serialises read-modify-write on the file within this process
    lock: RwLock<()>,
}

impl FileSessionStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self { Self { path: path.into(), lock: RwLock::new(()) } }

    pub fn path(&self) -> &Path { &self.path }

    fn read_record(&self) -> Option<StoredCredential> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => { warn!(target: "campus_portal::session", "failed to read session file {}: {}", self.path.display(), e); return None; }
        };
        match serde_json::from_slice::<StoredCredential>(&bytes) {
            Ok(rec) => Some(rec),
            Err(e) => {
                warn!(target: "campus_portal::session", "discarding unreadable session file {}: {}", self.path.display(), e);
                let _ = fs::remove_file(&self.path);
                None
            }
        }
    }
}

impl SessionStore for FileSessionStore {
    fn set(&self, credential: &Credential, ttl: Duration) -> PortalResult<()> {
        let _g = self.lock.write();
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() { fs::create_dir_all(dir)?; }
        }
        let rec = StoredCredential::new(credential, ttl);
        let body = serde_json::to_vec_pretty(&rec).map_err(|e| crate::error::PortalError::storage(e.to_string()))?;
        fs::write(&self.path, body)?;
        restrict_permissions(&self.path)?;
        debug!(target: "campus_portal::session", "stored credential, expires_at={}", rec.expires_at);
        Ok(())
    }

    fn get(&self) -> Option<Credential> {
        let rec = {
            let _g = self.lock.read();
            self.read_record()?
        };
        if rec.is_live() {
            return Some(rec.credential);
        }
        debug!(target: "campus_portal::session", "stored credential expired at {}", rec.expires_at);
        let _ = self.remove();
        None
    }

    fn remove(&self) -> PortalResult<()> {
        let _g = self.lock.write();
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> PortalResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> PortalResult<()> { Ok(()) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_remove() {
        let s = MemorySessionStore::new();
        assert!(s.get().is_none());
        s.set(&Credential::bearer("t1"), session_ttl()).unwrap();
        assert_eq!(s.get().unwrap().access_token, "t1");
        s.remove().unwrap();
        assert!(s.get().is_none());
    }

    #[test]
    fn memory_store_expires() {
        let s = MemorySessionStore::new();
        s.set(&Credential::bearer("old"), Duration::seconds(-1)).unwrap();
        assert!(s.get().is_none());
    }

    #[test]
    fn file_store_survives_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("session.json");
        FileSessionStore::new(&path).set(&Credential::bearer("persisted"), session_ttl()).unwrap();

        let reopened = FileSessionStore::new(&path);
        let c = reopened.get().unwrap();
        assert_eq!(c.access_token, "persisted");
        assert_eq!(c.token_type, "bearer");
    }

    #[test]
    fn file_store_drops_expired_and_garbage() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("session.json");
        let s = FileSessionStore::new(&path);
        s.set(&Credential::bearer("stale"), Duration::seconds(-5)).unwrap();
        assert!(s.get().is_none());
        assert!(!path.exists());

        fs::write(&path, b"{not json").unwrap();
        assert!(s.get().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn remove_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let s = FileSessionStore::new(tmp.path().join("session.json"));
        s.remove().unwrap();
        s.remove().unwrap();
    }

    #[test]
    fn debug_redacts_token() {
        let dbg = format!("{:?}", Credential::bearer("secret-value"));
        assert!(!dbg.contains("secret-value"));
    }
}
