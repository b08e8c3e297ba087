//! services/api/src/adapters/auth.rs
//!
//! Implements the `AuthService` port: HS256 bearer tokens via `jsonwebtoken`
//! and password hashing via Argon2.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use reading_list_core::domain::Identity;
use reading_list_core::ports::{AuthService, PortError, PortResult};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

/// The identity carried inside every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenData {
    username: String,
    email: String,
    #[serde(rename = "_id")]
    id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    data: TokenData,
    iat: i64,
    exp: i64,
}

pub struct JwtAuthAdapter {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl_seconds: i64,
}

impl JwtAuthAdapter {
    pub fn new(secret: &str, token_ttl_seconds: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl_seconds,
        }
    }
}

impl AuthService for JwtAuthAdapter {
    fn sign_token(&self, username: &str, email: &str, id: Uuid) -> PortResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            data: TokenData {
                username: username.to_string(),
                email: email.to_string(),
                id,
            },
            iat: now,
            exp: now + self.token_ttl_seconds,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            error!("Failed to sign token: {:?}", e);
            PortError::Unexpected("Failed to sign token".to_string())
        })
    }

    fn verify_token(&self, token: &str) -> PortResult<Identity> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| PortError::Unauthorized)?;

        let data = token_data.claims.data;
        Ok(Identity {
            id: data.id,
            username: data.username,
            email: data.email,
        })
    }

    fn hash_password(&self, plaintext: &str) -> PortResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                error!("Failed to hash password: {:?}", e);
                PortError::Unexpected("Failed to hash password".to_string())
            })
    }

    fn is_correct_password(&self, plaintext: &str, hashed_password: &str) -> PortResult<bool> {
        let parsed_hash = PasswordHash::new(hashed_password).map_err(|e| {
            error!("Failed to parse password hash: {:?}", e);
            PortError::Unexpected("Stored password hash is malformed".to_string())
        })?;

        Ok(Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
