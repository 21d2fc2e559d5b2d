// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{AppError, AuthError};

pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

/// Claim names owned by [`Claims`] fields; never taken from `extra`.
pub const RESERVED_CLAIMS: &[&str] = &["sub", "username", "iat", "exp", "jti"];

/// Decoded claim set of a bearer token.
///
/// `sub` and `username` are optional at the type level so that a token
/// lacking them still decodes; [`JwtManager::verify_token`] then rejects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Claims {
    /// Claims for `subject`, to be stamped with `iat`/`exp` on signing.
    pub fn for_subject(subject: impl ToString, username: impl Into<String>) -> Self {
        Self {
            sub: Some(subject.to_string()),
            username: Some(username.into()),
            iat: None,
            exp: 0,
            jti: None,
            extra: HashMap::new(),
        }
    }

    /// Adds an extra claim. Reserved names are ignored.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        if RESERVED_CLAIMS.contains(&key.as_str()) {
            tracing::debug!(claim = %key, "Ignoring extra claim with a reserved name");
        } else {
            self.extra.insert(key, value);
        }
        self
    }

    /// Subject as a numeric user id.
    pub fn user_id(&self) -> Result<u64, AuthError> {
        self.sub
            .as_deref()
            .ok_or_else(|| AuthError::InvalidToken("missing user ID (sub claim)".to_string()))?
            .parse()
            .map_err(|_| AuthError::InvalidToken("subject is not a user ID".to_string()))
    }
}

#[derive(Clone)]
pub struct JwtManager {
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    algorithm: Algorithm,
    ttl: Duration,
}

impl JwtManager {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding_key: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            algorithm: Algorithm::HS256,
            ttl: Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
        }
    }

    /// Only the HMAC family is accepted, since keys are shared secrets.
    pub fn with_algorithm(mut self, name: &str) -> Result<Self, AppError> {
        let algorithm = Algorithm::from_str(name).map_err(|_| {
            AppError::Configuration(format!("Unknown token algorithm: {}", name))
        })?;

        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                self.algorithm = algorithm;
                Ok(self)
            }
            other => Err(AppError::Configuration(format!(
                "Unsupported token algorithm for a shared secret: {:?}",
                other
            ))),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Signs `claims` with `iat = now` and `exp = now + ttl`.
    pub fn create_token(&self, mut claims: Claims, ttl: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        claims.iat = Some(now.timestamp());
        claims.exp = (now + ttl).timestamp();
        if claims.jti.is_none() {
            claims.jti = Some(uuid::Uuid::new_v4().to_string());
        }
        // A flattened duplicate would make the token undecodable.
        claims
            .extra
            .retain(|key, _| !RESERVED_CLAIMS.contains(&key.as_str()));

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Issues a session token for a user with the configured ttl.
    pub fn issue(&self, user_id: u64, username: &str) -> Result<String, AppError> {
        self.create_token(Claims::for_subject(user_id, username), self.ttl)
    }

    pub fn verify_token(&self, token: Option<&str>) -> Result<Claims, AuthError> {
        let token = match token {
            Some(t) if !t.trim().is_empty() => t.trim(),
            _ => return Err(AuthError::MissingToken),
        };

        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;
        let claims = token_data.claims;

        // A token is valid strictly before `exp`.
        if Utc::now().timestamp() >= claims.exp {
            return Err(AuthError::ExpiredToken);
        }

        if claims.sub.as_deref().map_or(true, str::is_empty) {
            return Err(AuthError::InvalidToken(
                "missing user ID (sub claim)".to_string(),
            ));
        }
        if claims.username.as_deref().map_or(true, str::is_empty) {
            return Err(AuthError::InvalidToken("missing username".to_string()));
        }

        Ok(claims)
    }

    pub fn expires_in_secs(&self) -> u64 {
        self.ttl.num_seconds().max(0) as u64
    }
}
