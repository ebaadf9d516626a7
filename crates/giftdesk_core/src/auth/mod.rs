//! Session authorization against an external identity provider.
//!
//! # Responsibility
//! - Resolve a bearer session token to an identity (email) via the provider.
//! - Map that identity to a stored back-office user and gate by role.
//!
//! # Invariants
//! - Tokens are never logged.
//! - An identity without a stored user has no access, even for reads.

use crate::model::user::{normalize_email, Role, User};
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use log::warn;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// What a request is trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// List/get any collection, including orders.
    Read,
    /// Create, update, or delete categories, products, offers, committees.
    WriteCatalog,
    /// Create, update, or delete users.
    ManageUsers,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::WriteCatalog => "write_catalog",
            Self::ManageUsers => "manage_users",
        }
    }
}

impl Role {
    /// Whether this role grants `permission`.
    pub fn allows(self, permission: Permission) -> bool {
        match permission {
            Permission::Read => true,
            Permission::WriteCatalog => matches!(self, Role::Admin | Role::Editor),
            Permission::ManageUsers => self == Role::Admin,
        }
    }
}

/// External identity provider contract.
pub trait IdentityProvider {
    /// Returns the email bound to a live session token, if any.
    fn resolve_session(&self, token: &str) -> Option<String>;
}

/// Identity provider backed by a fixed token→email table.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenIdentity {
    sessions: HashMap<String, String>,
}

impl StaticTokenIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `token=email` pairs separated by commas or newlines.
    ///
    /// Malformed pairs are skipped with a warning.
    pub fn from_pairs(raw: &str) -> Self {
        let mut identity = Self::new();
        for pair in raw
            .split(&[',', '\n'][..])
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
        {
            match pair.split_once('=') {
                Some((token, email)) if !token.trim().is_empty() && !email.trim().is_empty() => {
                    identity.insert(token.trim(), email);
                }
                _ => warn!("event=session_table_load module=auth status=skipped reason=malformed_pair"),
            }
        }
        identity
    }

    pub fn insert(&mut self, token: impl Into<String>, email: &str) {
        self.sessions.insert(token.into(), normalize_email(email));
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl IdentityProvider for StaticTokenIdentity {
    fn resolve_session(&self, token: &str) -> Option<String> {
        self.sessions.get(token).cloned()
    }
}

/// Authorization failures.
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    UnknownSession,
    /// Provider knows the identity but no back-office user exists for it.
    UnknownUser(String),
    Forbidden { role: Role, permission: Permission },
    Repo(RepoError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingToken => write!(f, "missing session token"),
            Self::UnknownSession => write!(f, "session is not recognized"),
            Self::UnknownUser(email) => write!(f, "no back-office user for {email}"),
            Self::Forbidden { role, permission } => write!(
                f,
                "role `{}` is not allowed to {}",
                role.as_str(),
                permission.as_str()
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Resolves a session token to a stored user holding `permission`.
pub fn authorize<P, R>(
    provider: &P,
    users: &R,
    token: Option<&str>,
    permission: Permission,
) -> Result<User, AuthError>
where
    P: IdentityProvider + ?Sized,
    R: UserRepository,
{
    let token = token.ok_or(AuthError::MissingToken)?;
    let email = provider
        .resolve_session(token)
        .ok_or(AuthError::UnknownSession)?;
    let user = users
        .find_user_by_email(&normalize_email(&email))?
        .ok_or_else(|| AuthError::UnknownUser(email.clone()))?;

    if !user.role.allows(permission) {
        warn!(
            "event=authorize module=auth status=denied user_id={} role={} permission={}",
            user.id,
            user.role.as_str(),
            permission.as_str()
        );
        return Err(AuthError::Forbidden {
            role: user.role,
            permission,
        });
    }
    Ok(user)
}
