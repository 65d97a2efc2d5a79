//! Local session lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where the locally held session currently stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    /// No session.
    #[default]
    Anonymous,
    /// A login is in flight.
    Authenticating,
    /// Signed in until `expires_at`.
    Authenticated {
        /// Signed-in identity.
        identity_id: Uuid,
        /// Access token expiration.
        expires_at: DateTime<Utc>,
    },
    /// The access token ran out.
    Expired,
    /// The caller logged out.
    LoggedOut,
}

/// Something that happened to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Credentials were submitted.
    LoginStarted,
    /// Credentials were accepted.
    LoginSucceeded {
        /// Signed-in identity.
        identity_id: Uuid,
        /// Access token expiration.
        expires_at: DateTime<Utc>,
    },
    /// Credentials were rejected.
    LoginFailed,
    /// A refresh token minted a new pair.
    Refreshed {
        /// Signed-in identity.
        identity_id: Uuid,
        /// New access token expiration.
        expires_at: DateTime<Utc>,
    },
    /// The access token was found past its expiration.
    TokenExpired,
    /// The caller logged out.
    LoggedOut,
    /// A finished session was cleared.
    Reset,
}

impl SessionState {
    /// Returns the next state, or `None` if `event` is not allowed here.
    pub fn transition(self, event: SessionEvent) -> Option<Self> {
        use SessionEvent as E;
        use SessionState as S;

        match (self, event) {
            (S::Authenticating, E::LoginStarted) => None,
            (_, E::LoginStarted) => Some(S::Authenticating),

            (
                S::Authenticating | S::Authenticated { .. },
                E::LoginSucceeded {
                    identity_id,
                    expires_at,
                },
            ) => Some(S::Authenticated {
                identity_id,
                expires_at,
            }),
            (S::Authenticating, E::LoginFailed) => Some(S::Anonymous),

            (S::Authenticating, E::Refreshed { .. }) => None,
            (
                _,
                E::Refreshed {
                    identity_id,
                    expires_at,
                },
            ) => Some(S::Authenticated {
                identity_id,
                expires_at,
            }),

            (S::Authenticated { .. }, E::TokenExpired) => Some(S::Expired),
            (_, E::LoggedOut) => Some(S::LoggedOut),
            (S::Expired | S::LoggedOut, E::Reset) => Some(S::Anonymous),

            _ => None,
        }
    }

    /// Whether a session is signed in and not past `now`.
    pub fn is_authenticated_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self, Self::Authenticated { expires_at, .. } if now < *expires_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn signed_in(now: DateTime<Utc>) -> SessionEvent {
        SessionEvent::LoginSucceeded {
            identity_id: Uuid::nil(),
            expires_at: now + Duration::minutes(30),
        }
    }

    #[test]
    fn test_full_lifecycle() {
        let now = Utc::now();
        let state = SessionState::Anonymous
            .transition(SessionEvent::LoginStarted)
            .and_then(|s| s.transition(signed_in(now)))
            .unwrap();
        assert!(state.is_authenticated_at(now));
        assert!(!state.is_authenticated_at(now + Duration::minutes(30)));

        let state = state.transition(SessionEvent::TokenExpired).unwrap();
        assert_eq!(state, SessionState::Expired);
        let state = state.transition(SessionEvent::Reset).unwrap();
        assert_eq!(state, SessionState::Anonymous);
    }

    #[test]
    fn test_failed_login_returns_to_anonymous() {
        let state = SessionState::Anonymous
            .transition(SessionEvent::LoginStarted)
            .and_then(|s| s.transition(SessionEvent::LoginFailed));
        assert_eq!(state, Some(SessionState::Anonymous));
    }

    #[test]
    fn test_rejects_out_of_order_events() {
        let now = Utc::now();
        assert_eq!(SessionState::Anonymous.transition(signed_in(now)), None);
        assert_eq!(
            SessionState::Anonymous.transition(SessionEvent::TokenExpired),
            None
        );
        assert_eq!(
            SessionState::Authenticating.transition(SessionEvent::LoginStarted),
            None
        );
        assert_eq!(SessionState::Anonymous.transition(SessionEvent::Reset), None);
    }

    #[test]
    fn test_logout_from_any_state() {
        let now = Utc::now();
        let authenticated = SessionState::Authenticated {
            identity_id: Uuid::nil(),
            expires_at: now,
        };
        for state in [
            SessionState::Anonymous,
            SessionState::Authenticating,
            authenticated,
            SessionState::Expired,
            SessionState::LoggedOut,
        ] {
            assert_eq!(
                state.transition(SessionEvent::LoggedOut),
                Some(SessionState::LoggedOut)
            );
        }
    }
}
