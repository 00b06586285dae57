// Account service - Use cases for login and registration
use crate::application::probe_repository::ProbeRepository;
use crate::domain::user::{Credentials, NewAccount, SessionUser};
use std::sync::Arc;

#[derive(Clone)]
pub struct AccountService {
    repository: Arc<dyn ProbeRepository>,
}

impl AccountService {
    pub fn new(repository: Arc<dyn ProbeRepository>) -> Self {
        Self { repository }
    }

    pub async fn login(&self, credentials: &Credentials) -> anyhow::Result<SessionUser> {
        let user = self.repository.login(credentials).await?;
        tracing::info!("User {} logged in as {:?}", user.id, user.role);
        Ok(user)
    }

    pub async fn register(&self, account: &NewAccount) -> anyhow::Result<i64> {
        self.repository.register(account).await
    }
}
