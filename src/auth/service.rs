// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use crate::auth::jwt::{Claims, JwtManager};
use crate::auth::password::{verify_dummy_password, verify_password};
use crate::auth::types::{AuthResponse, User};
use crate::auth::user_store::UserStore;
use crate::config::AuthConfig;
use crate::error::{AppError, AuthError};

pub const TOKEN_TYPE: &str = "bearer";

/// Login and bearer-token verification over a [`UserStore`].
#[derive(Clone)]
pub struct AuthService {
    store: Arc<UserStore>,
    jwt: Arc<JwtManager>,
}

impl AuthService {
    pub fn new(store: Arc<UserStore>, jwt: Arc<JwtManager>) -> Self {
        Self { store, jwt }
    }

    /// Builds the token manager from `config` with the already resolved secret.
    pub fn from_config(
        config: &AuthConfig,
        secret: &str,
        store: Arc<UserStore>,
    ) -> Result<Self, AppError> {
        let jwt = JwtManager::new(secret)
            .with_algorithm(&config.algorithm)?
            .with_ttl(chrono::Duration::minutes(config.token_ttl_minutes));
        Ok(Self::new(store, Arc::new(jwt)))
    }

    pub fn store(&self) -> &Arc<UserStore> {
        &self.store
    }

    pub fn jwt(&self) -> &Arc<JwtManager> {
        &self.jwt
    }

    /// Checks credentials and issues a session token.
    ///
    /// An unknown user, an inactive user and a wrong password all fail with
    /// [`AuthError::InvalidCredentials`].
    pub fn login(&self, username: &str, password: &str) -> Result<AuthResponse, AppError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AppError::Unprocessable(
                "username and password are required".to_string(),
            ));
        }

        let user = match self.store.get_user_by_username(username) {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => {
                verify_dummy_password(password);
                tracing::warn!(username = %username, "Login failed: unknown user");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        if !user.is_active {
            verify_dummy_password(password);
            tracing::warn!(username = %username, "Login failed: inactive user");
            return Err(AuthError::InvalidCredentials.into());
        }

        if !verify_password(password, &user.hashed_password) {
            tracing::warn!(username = %username, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let access_token = self.jwt.issue(user.id, &user.username)?;
        tracing::info!(user_id = user.id, username = %user.username, "User logged in");

        Ok(AuthResponse {
            access_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: self.jwt.expires_in_secs(),
        })
    }

    /// Resolves an `Authorization` header value to the active user it names.
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<(User, Claims), AuthError> {
        let token = bearer_token(authorization)?;
        let claims = self.jwt.verify_token(Some(token))?;
        let user_id = claims.user_id()?;

        let user = match self.store.get_user_by_id(user_id) {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => return Err(AuthError::UserNotFound),
            Err(e) => return Err(AuthError::InvalidToken(e.to_string())),
        };

        if !user.is_active {
            return Err(AuthError::InactiveUser);
        }

        Ok((user, claims))
    }
}

/// Extracts the token from `Bearer <token>`; the scheme is case-insensitive.
pub fn bearer_token(authorization: Option<&str>) -> Result<&str, AuthError> {
    let header = authorization.ok_or(AuthError::MissingToken)?;

    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::{hash_password, verification_count};

    const SECRET: &str = "test-secret-key";

    fn service_with_user(username: &str, password: &str) -> (AuthService, User) {
        let store = Arc::new(UserStore::in_memory());
        let user = store
            .create_user(username, &hash_password(password).unwrap(), false)
            .unwrap();
        let service = AuthService::new(store, Arc::new(JwtManager::new(SECRET)));
        (service, user)
    }

    #[test]
    fn test_login_success() {
        let (service, user) = service_with_user("testuser", "testpass");

        let response = service.login("testuser", "testpass").unwrap();
        assert_eq!(response.token_type, "bearer");
        assert_eq!(response.expires_in, 1800);

        let header = format!("Bearer {}", response.access_token);
        let (resolved, claims) = service.authenticate(Some(header.as_str())).unwrap();
        assert_eq!(resolved.id, user.id);
        assert_eq!(claims.username.as_deref(), Some("testuser"));
    }

    #[test]
    fn test_login_is_case_insensitive_on_username() {
        let (service, _) = service_with_user("TestUser", "pw");
        assert!(service.login("testuser", "pw").is_ok());
    }

    #[test]
    fn test_login_failures_are_indistinguishable() {
        let (service, user) = service_with_user("alice", "right");
        service.store().set_active(user.id, false).unwrap();
        service.store().create_user("bob", &hash_password("right").unwrap(), false).unwrap();

        let inactive = service.login("alice", "right").unwrap_err();
        let wrong_password = service.login("bob", "wrong").unwrap_err();
        let unknown = service.login("nobody", "right").unwrap_err();

        for error in [&inactive, &wrong_password, &unknown] {
            assert!(matches!(error, AppError::Auth(AuthError::InvalidCredentials)));
            assert_eq!(error.to_string(), "Incorrect username or password");
        }
    }

    #[test]
    fn test_every_failed_login_runs_one_verification() {
        let (service, user) = service_with_user("alice", "right");
        service.store().create_user("carol", &hash_password("right").unwrap(), false).unwrap();
        service.store().set_active(user.id, false).unwrap();

        for (username, password) in [("nobody", "right"), ("alice", "right"), ("carol", "wrong")] {
            let before = verification_count();
            assert!(service.login(username, password).is_err());
            assert_eq!(verification_count() - before, 1, "{}", username);
        }
    }

    #[test]
    fn test_login_requires_fields() {
        let (service, _) = service_with_user("alice", "pw");
        assert!(matches!(
            service.login("", "pw"),
            Err(AppError::Unprocessable(_))
        ));
        assert!(matches!(
            service.login("alice", ""),
            Err(AppError::Unprocessable(_))
        ));
    }

    #[test]
    fn test_authenticate_header_shapes() {
        let (service, _) = service_with_user("alice", "pw");
        let token = service.login("alice", "pw").unwrap().access_token;

        assert_eq!(service.authenticate(None).unwrap_err(), AuthError::MissingToken);
        for header in ["Basic abc", "Bearer", "Bearer a b", token.as_str()] {
            assert_eq!(
                service.authenticate(Some(header)).unwrap_err(),
                AuthError::MalformedHeader,
                "{}",
                header
            );
        }

        let lowercase = format!("bearer {}", token);
        assert!(service.authenticate(Some(lowercase.as_str())).is_ok());
    }

    #[test]
    fn test_authenticate_rejects_inactive_and_missing_users() {
        let (service, user) = service_with_user("alice", "pw");
        let header = format!("Bearer {}", service.login("alice", "pw").unwrap().access_token);

        service.store().set_active(user.id, false).unwrap();
        assert_eq!(
            service.authenticate(Some(header.as_str())).unwrap_err(),
            AuthError::InactiveUser
        );

        let ghost = service.jwt().issue(99, "ghost").unwrap();
        let header = format!("Bearer {}", ghost);
        assert_eq!(
            service.authenticate(Some(header.as_str())).unwrap_err(),
            AuthError::UserNotFound
        );
    }

    #[test]
    fn test_authenticate_expired_token() {
        let (service, user) = service_with_user("alice", "pw");
        let token = service
            .jwt()
            .create_token(
                Claims::for_subject(user.id, "alice"),
                chrono::Duration::seconds(-1),
            )
            .unwrap();
        let header = format!("Bearer {}", token);

        assert_eq!(
            service.authenticate(Some(header.as_str())).unwrap_err(),
            AuthError::ExpiredToken
        );
    }

    #[test]
    fn test_from_config_rejects_unknown_algorithm() {
        let config = AuthConfig {
            algorithm: "none".to_string(),
            ..AuthConfig::default()
        };
        let store = Arc::new(UserStore::in_memory());
        assert!(matches!(
            AuthService::from_config(&config, SECRET, store),
            Err(AppError::Configuration(_))
        ));
    }
}
