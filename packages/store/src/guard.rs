//! Access decision for routes that require a signed-in user.

use std::time::Duration;

use crate::session::Session;

/// What a guarded route should render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// The first identity event has not arrived; render an empty placeholder.
    Pending,
    /// Nobody is signed in; redirect to the sign-in page.
    Redirect,
    /// The identity service did not answer within the timeout; redirect to
    /// sign-in and tell the user.
    TimedOut,
    /// Render the guarded children.
    Allow,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RouteGuard {
    timeout: Option<Duration>,
}

impl RouteGuard {
    /// A guard that waits for the identity service indefinitely.
    pub fn new() -> Self {
        Self::default()
    }

    /// Give up waiting for the first identity event after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    /// Build from a configured number of seconds; 0 waits indefinitely.
    pub fn from_secs(secs: u32) -> Self {
        if secs == 0 {
            Self::new()
        } else {
            Self::with_timeout(Duration::from_secs(u64::from(secs)))
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn decide(&self, session: &Session, waited: Duration) -> GuardDecision {
        if session.initializing {
            return match self.timeout {
                Some(timeout) if waited >= timeout => GuardDecision::TimedOut,
                _ => GuardDecision::Pending,
            };
        }
        if session.signed() {
            GuardDecision::Allow
        } else {
            GuardDecision::Redirect
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryIdentityService;
    use crate::models::Identity;
    use crate::session::SessionHolder;

    #[test]
    fn test_pending_until_first_event_then_redirect() {
        let service = MemoryIdentityService::new();
        let mut holder = SessionHolder::attach(&service);
        let guard = RouteGuard::new();

        assert_eq!(
            guard.decide(holder.session(), Duration::from_secs(3600)),
            GuardDecision::Pending
        );

        service.emit(None);
        holder.drain();
        assert_eq!(
            guard.decide(holder.session(), Duration::ZERO),
            GuardDecision::Redirect
        );
    }

    #[test]
    fn test_signed_session_is_allowed() {
        let mut session = Session::default();
        session.apply(Some(Identity::new("u1", None, None)));
        assert_eq!(
            RouteGuard::new().decide(&session, Duration::ZERO),
            GuardDecision::Allow
        );
    }

    #[test]
    fn test_timeout_only_applies_while_initializing() {
        let guard = RouteGuard::from_secs(10);
        let session = Session::default();
        assert_eq!(guard.decide(&session, Duration::from_secs(9)), GuardDecision::Pending);
        assert_eq!(guard.decide(&session, Duration::from_secs(10)), GuardDecision::TimedOut);

        let mut settled = Session::default();
        settled.apply(Some(Identity::new("u1", None, None)));
        assert_eq!(guard.decide(&settled, Duration::from_secs(60)), GuardDecision::Allow);
    }

    #[test]
    fn test_zero_seconds_disables_timeout() {
        assert_eq!(RouteGuard::from_secs(0).timeout(), None);
    }
}
