use super::{ClientError, EmployeeApi};

/// Explicit session state: login sets the token, logout clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Exchanges credentials for a token and keeps it.
    pub async fn login(
        &mut self,
        api: &dyn EmployeeApi,
        username: &str,
        password: &str,
    ) -> Result<(), ClientError> {
        let response = api.login(username, password).await?;
        self.token = Some(response.token);
        Ok(())
    }

    pub fn logout(&mut self) {
        self.token = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::FakeApi;

    #[test_log::test(tokio::test)]
    async fn login_sets_and_logout_clears_token() {
        let api = FakeApi::accepting("t0k3n");
        let mut session = Session::new();

        session.login(&api, "admin", "pw").await.unwrap();
        assert_eq!(session.token(), Some("t0k3n"));

        session.logout();
        assert!(!session.is_authenticated());
    }

    #[test_log::test(tokio::test)]
    async fn failed_login_leaves_session_empty() {
        let api = FakeApi::accepting("t0k3n");
        let mut session = Session::new();

        let err = session.login(&api, "intruder", "pw").await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "Invalid username or password");
        assert_eq!(session.token(), None);
    }
}
