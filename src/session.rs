//! User sessions: explicit per-request identity and the bearer-token
//! registry behind login/logout.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Sessions expire after 24 hours without use.
const SESSION_IDLE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

// ═══════════════════════════════════════════════════════════
// Identity
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// Who is making a request. Passed explicitly; there is no global session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    user: Option<UserIdentity>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn authenticated(user: UserIdentity) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&UserIdentity> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

// ═══════════════════════════════════════════════════════════
// Tokens
// ═══════════════════════════════════════════════════════════

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

// ═══════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════

struct SessionEntry {
    user: UserIdentity,
    last_seen: Instant,
}

/// In-memory login sessions keyed by token hash. Raw tokens are never stored.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<[u8; 32], SessionEntry>>,
    idle_ttl: Duration,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::with_idle_ttl(SESSION_IDLE_TTL)
    }

    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Start a session for `user` and return its bearer token.
    pub fn login(&self, user: UserIdentity) -> String {
        let token = generate_token();
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < self.idle_ttl);
        tracing::info!(user_id = %user.id, "Session started");
        sessions.insert(
            hash_token(&token),
            SessionEntry {
                user,
                last_seen: now,
            },
        );
        token
    }

    /// Resolve a bearer token. Unknown or expired tokens give an anonymous
    /// session.
    pub fn resolve(&self, token: &str) -> Session {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let key = hash_token(token);
        let now = Instant::now();

        let expired = match sessions.get_mut(&key) {
            Some(entry) if now.duration_since(entry.last_seen) < self.idle_ttl => {
                entry.last_seen = now;
                return Session::authenticated(entry.user.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            sessions.remove(&key);
        }
        Session::anonymous()
    }

    /// End the session for `token`. Returns whether a session existed.
    pub fn logout(&self, token: &str) -> bool {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let removed = sessions.remove(&hash_token(token));
        if let Some(entry) = &removed {
            tracing::info!(user_id = %entry.user.id, "Session ended");
        }
        removed.is_some()
    }

    pub fn active_count(&self) -> usize {
        self.sessions
            .lock()
            .map(|s| s.len())
            .unwrap_or_else(|e| e.into_inner().len())
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
