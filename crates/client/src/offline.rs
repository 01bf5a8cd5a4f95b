//! Connectivity tracking.

use materials_infra::{ServiceError, StoreErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectivityState {
    #[default]
    Online,
    Offline,
}

/// Tracks whether the hosted store answered the last request.
///
/// Only transport failures flip the state to offline; a rejection still
/// means the backend is reachable.
#[derive(Debug, Default)]
pub struct OfflineMode {
    state: ConnectivityState,
    last_error: Option<String>,
}

impl OfflineMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    pub fn is_offline(&self) -> bool {
        self.state == ConnectivityState::Offline
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_online(&mut self) {
        self.state = ConnectivityState::Online;
        self.last_error = None;
    }

    /// Record the outcome of a store-backed operation.
    pub fn observe<T>(&mut self, result: &Result<T, ServiceError>) {
        match result {
            Ok(_) => self.set_online(),
            Err(ServiceError::Store(err)) if err.kind == StoreErrorKind::Transport => {
                if !self.is_offline() {
                    tracing::warn!(error = %err, "store unreachable");
                }
                self.state = ConnectivityState::Offline;
                self.last_error = Some(err.message.clone());
            }
            Err(_) => {
                self.state = ConnectivityState::Online;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use materials_infra::StoreError;

    #[test]
    fn only_transport_failures_go_offline() {
        let mut mode = OfflineMode::new();

        mode.observe::<()>(&Err(ServiceError::Store(StoreError::with_code("42501", "denied"))));
        assert!(!mode.is_offline());

        mode.observe::<()>(&Err(ServiceError::Store(StoreError::transport("connection refused"))));
        assert!(mode.is_offline());
        assert_eq!(mode.last_error(), Some("connection refused"));

        mode.observe(&Ok::<_, ServiceError>(1));
        assert_eq!(mode.state(), ConnectivityState::Online);
        assert_eq!(mode.last_error(), None);
    }

    #[test]
    fn gateway_outage_goes_offline() {
        let mut mode = OfflineMode::new();
        let outage = StoreError::from_response(503, "<html>Service Unavailable</html>");

        mode.observe::<()>(&Err(ServiceError::Store(outage)));
        assert!(mode.is_offline());
    }
}
