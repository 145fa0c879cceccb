//! Provider selection state for one session.

use serde::Serialize;

/// Where the next call goes.
///
/// `Probing -> Sticky(model) -> ...` on success, `* -> FallbackKeyless` on an
/// auth rejection. `FallbackKeyless` is absorbing for the life of the router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "model", rename_all = "snake_case")]
pub enum RouterState {
    /// No primary model has succeeded yet; walk candidates in priority order.
    Probing,
    /// A primary model succeeded; call it first without re-probing.
    Sticky(String),
    /// Credential missing or rejected; every call goes to the keyless client.
    FallbackKeyless,
}

/// Observations that move the router between states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteEvent {
    /// A primary model returned text.
    PrimarySucceeded(String),
    /// The sticky model failed for a non-auth reason; re-probe.
    StickyFailed,
    /// A primary model rejected the credential.
    AuthRejected,
}

impl RouterState {
    /// Initial state: probing with a credential, keyless without one.
    pub fn initial(has_credential: bool) -> Self {
        if has_credential {
            RouterState::Probing
        } else {
            RouterState::FallbackKeyless
        }
    }

    pub fn sticky_model(&self) -> Option<&str> {
        match self {
            RouterState::Sticky(model) => Some(model.as_str()),
            _ => None,
        }
    }

    pub fn is_keyless(&self) -> bool {
        matches!(self, RouterState::FallbackKeyless)
    }

    /// Apply an event, returning the next state.
    pub fn transition(self, event: RouteEvent) -> RouterState {
        match (self, event) {
            (RouterState::FallbackKeyless, _) => RouterState::FallbackKeyless,
            (_, RouteEvent::AuthRejected) => RouterState::FallbackKeyless,
            (_, RouteEvent::PrimarySucceeded(model)) => RouterState::Sticky(model),
            (RouterState::Sticky(_), RouteEvent::StickyFailed) => RouterState::Probing,
            (RouterState::Probing, RouteEvent::StickyFailed) => RouterState::Probing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        assert_eq!(RouterState::initial(true), RouterState::Probing);
        assert_eq!(RouterState::initial(false), RouterState::FallbackKeyless);
    }

    #[test]
    fn test_probing_success_becomes_sticky() {
        let state = RouterState::Probing.transition(RouteEvent::PrimarySucceeded("b".into()));
        assert_eq!(state.sticky_model(), Some("b"));
    }

    #[test]
    fn test_sticky_failure_reprobes() {
        let state = RouterState::Sticky("b".into()).transition(RouteEvent::StickyFailed);
        assert_eq!(state, RouterState::Probing);
        assert!(state.sticky_model().is_none());
    }

    #[test]
    fn test_auth_rejection_from_any_state() {
        for state in [RouterState::Probing, RouterState::Sticky("b".into())] {
            assert!(state.transition(RouteEvent::AuthRejected).is_keyless());
        }
    }

    #[test]
    fn test_keyless_is_absorbing() {
        let state = RouterState::FallbackKeyless
            .transition(RouteEvent::PrimarySucceeded("a".into()))
            .transition(RouteEvent::StickyFailed);
        assert!(state.is_keyless());
    }

    #[test]
    fn test_state_serializes_for_logging() {
        let json = serde_json::to_value(RouterState::Sticky("gemini".into())).unwrap();
        assert_eq!(json, serde_json::json!({"mode": "sticky", "model": "gemini"}));
    }
}
