use super::{AuthError, Claims, CurrentUser, JwtKeys, verify_password};
use crate::config::AuthConfig;
use crate::store::{ClientStore, UserRecord};

/// Validates bearer tokens and login credentials against the user store
pub struct Authenticator {
    keys: JwtKeys,
    token_expiry: std::time::Duration,
    store: ClientStore,
}

impl Authenticator {
    pub fn new(config: &AuthConfig, store: ClientStore) -> Self {
        Self {
            keys: JwtKeys::new(config.secret_key.as_bytes()),
            token_expiry: config.token_expiry,
            store,
        }
    }

    /// Validate a bearer token and resolve the account behind it
    pub async fn authenticate(&self, token: &str) -> Result<CurrentUser, AuthError> {
        let claims = self.keys.verify(token)?;

        let user = self
            .store
            .find_user_by_id(claims.sub)
            .await
            .map_err(|e| AuthError::internal(format!("User lookup failed: {e}")))?
            .ok_or_else(|| AuthError::unauthorized("Unknown user"))?;

        if !user.is_active {
            return Err(AuthError::forbidden("Account is deactivated"));
        }

        Ok(CurrentUser {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            is_admin: user.is_admin,
        })
    }

    /// Verify login credentials and issue an access token
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let user = self
            .store
            .find_user_by_email(email)
            .await
            .map_err(|e| AuthError::internal(format!("User lookup failed: {e}")))?
            .ok_or_else(|| AuthError::unauthorized("Incorrect email or password"))?;

        if !verify_password(password, &user.hashed_password) {
            return Err(AuthError::unauthorized("Incorrect email or password"));
        }

        if !user.is_active {
            return Err(AuthError::forbidden("Account is deactivated"));
        }

        self.issue_token(&user)
    }

    /// Issue an access token for a known account
    pub fn issue_token(&self, user: &UserRecord) -> Result<String, AuthError> {
        let claims = Claims::new(user.id, &user.email, self.token_expiry);
        self.keys.issue(&claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use crate::store::NewUser;

    async fn store_with_user() -> (ClientStore, UserRecord) {
        let store = ClientStore::new("sqlite::memory:").await.unwrap();
        let user = store
            .insert_user(&NewUser {
                email: "op@cadastro.local".to_string(),
                hashed_password: hash_password("Secret123").unwrap(),
                full_name: "Operator".to_string(),
                is_admin: false,
            })
            .await
            .unwrap();
        (store, user)
    }

    #[tokio::test]
    async fn test_login_and_authenticate() {
        let (store, user) = store_with_user().await;
        let authenticator = Authenticator::new(&AuthConfig::default(), store);

        let token = authenticator
            .login("op@cadastro.local", "Secret123")
            .await
            .unwrap();

        let current = authenticator.authenticate(&token).await.unwrap();
        assert_eq!(current.id, user.id);
        assert_eq!(current.email, "op@cadastro.local");
        assert_eq!(current.full_name, "Operator");
        assert!(!current.is_admin);
    }

    #[tokio::test]
    async fn test_login_rejects_bad_password() {
        let (store, _) = store_with_user().await;
        let authenticator = Authenticator::new(&AuthConfig::default(), store);

        let err = authenticator
            .login("op@cadastro.local", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.status_code, 401);
    }

    #[tokio::test]
    async fn test_login_rejects_unknown_email() {
        let (store, _) = store_with_user().await;
        let authenticator = Authenticator::new(&AuthConfig::default(), store);

        let err = authenticator
            .login("nobody@cadastro.local", "Secret123")
            .await
            .unwrap_err();
        assert_eq!(err.status_code, 401);
    }

    #[tokio::test]
    async fn test_authenticate_rejects_garbage_token() {
        let (store, _) = store_with_user().await;
        let authenticator = Authenticator::new(&AuthConfig::default(), store);

        let err = authenticator.authenticate("not-a-token").await.unwrap_err();
        assert_eq!(err.status_code, 401);
    }
}
