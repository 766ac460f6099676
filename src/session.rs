use crate::state::AppState;
use crate::store;
use crate::store::Store;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::Redirect;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum Role {
    #[serde(rename = "user")]
    Citizen,
    #[serde(rename = "official")]
    Official,
}

/// The stored session record. Its presence in the store is the sole
/// authentication state; the role is self-declared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct User {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) role: Role,
    #[serde(default)]
    pub(crate) department: Option<String>,
}

/// Absent or corrupt session documents both read as "not logged in".
pub(crate) fn current_user(store: &Store) -> Option<User> {
    store.load(store::SESSION_KEY, || None)
}

pub(crate) fn login(store: &Store, user: &User) -> std::io::Result<()> {
    store.save(store::SESSION_KEY, user)
}

pub(crate) fn logout(store: &Store) -> std::io::Result<()> {
    store.remove(store::SESSION_KEY)
}

/// Guard for pages that need any authenticated session. Rejection redirects
/// to the citizen login page.
pub(crate) struct SessionUser(pub(crate) User);

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        current_user(&state.store)
            .map(SessionUser)
            .ok_or_else(|| Redirect::to("/login"))
    }
}

/// Guard for official-only pages. Anything short of an official session
/// redirects to the official login page.
pub(crate) struct OfficialUser(pub(crate) User);

impl FromRequestParts<AppState> for OfficialUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match current_user(&state.store) {
            Some(user) if user.role == Role::Official => Ok(OfficialUser(user)),
            _ => Err(Redirect::to("/official/login")),
        }
    }
}
