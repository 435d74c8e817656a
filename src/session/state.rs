use std::sync::{PoisonError, RwLock};

use secrecy::{ExposeSecret as _, SecretString};

/// Where a client is in the session lifecycle.
///
/// The only way forward is `Unauthenticated -> Bootstrapping -> Ready`; a failed bootstrap falls
/// back to `Unauthenticated`. Nothing moves a `Ready` client back.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum_macros::Display)]
pub enum AuthState {
    Unauthenticated,
    Bootstrapping,
    Ready,
}

/// Mutable session record. The token is `Some` exactly when the state is `Ready`.
#[derive(Debug)]
struct Session {
    state: AuthState,
    session_key: Option<SecretString>,
    token: Option<SecretString>,
}

/// Lock-guarded [`Session`].
///
/// Guards are only ever held for a field read or write, never across an `.await`.
#[derive(Debug)]
pub(crate) struct SessionCell {
    inner: RwLock<Session>,
}

impl SessionCell {
    pub(crate) fn new(session_key: Option<SecretString>) -> Self {
        Self {
            inner: RwLock::new(Session {
                state: AuthState::Unauthenticated,
                session_key: session_key.filter(|key| !key.expose_secret().is_empty()),
                token: None,
            }),
        }
    }

    pub(crate) fn state(&self) -> AuthState {
        self.read(|session| session.state)
    }

    pub(crate) fn session_key(&self) -> Option<SecretString> {
        self.read(|session| session.session_key.clone())
    }

    pub(crate) fn token(&self) -> Option<SecretString> {
        self.read(|session| session.token.clone())
    }

    pub(crate) fn set_session_key(&self, session_key: SecretString) {
        self.write(|session| session.session_key = Some(session_key));
    }

    /// Moves to `Bootstrapping` and hands back a guard that reverts to `Unauthenticated` unless
    /// [`Transition::complete`] is called.
    pub(crate) fn begin(&self) -> Transition<'_> {
        self.write(|session| {
            session.state = AuthState::Bootstrapping;
            session.token = None;
        });
        Transition {
            cell: self,
            done: false,
        }
    }

    fn read<R, F: FnOnce(&Session) -> R>(&self, f: F) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write<R, F: FnOnce(&mut Session) -> R>(&self, f: F) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

/// An in-flight bootstrap. Dropping it without completing (error path, cancelled future) rolls
/// the session back to `Unauthenticated`.
pub(crate) struct Transition<'cell> {
    cell: &'cell SessionCell,
    done: bool,
}

impl Transition<'_> {
    pub(crate) fn complete(mut self, token: SecretString) {
        self.cell.write(|session| {
            session.token = Some(token);
            session.state = AuthState::Ready;
        });
        self.done = true;
    }
}

impl Drop for Transition<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.cell.write(|session| {
                session.token = None;
                session.state = AuthState::Unauthenticated;
            });
        }
    }
}
