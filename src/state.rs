use std::sync::Arc;

use crate::config::AppConfig;
use crate::store::Store;
use crate::verification::{IdentityVerifier, SimulatedVerifier};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub jwt_secret: Arc<str>,
    pub session_ttl_hours: i64,
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl AppState {
    pub fn new(store: Store, config: &AppConfig) -> Self {
        Self {
            store: Arc::new(store),
            jwt_secret: Arc::from(config.jwt_secret.as_str()),
            session_ttl_hours: config.session_ttl_hours,
            verifier: Arc::new(SimulatedVerifier::new(config.verification_pass_rate)),
        }
    }

    pub fn with_verifier(mut self, verifier: impl IdentityVerifier + 'static) -> Self {
        self.verifier = Arc::new(verifier);
        self
    }
}
