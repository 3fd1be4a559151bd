use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Identity id the token is bound to.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and validates the signed bearer credential (HS256).
#[derive(Clone)]
pub struct TokenSigner {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    token_hours: i64,
}

impl TokenSigner {
    pub fn new(secret: &str, token_hours: i64) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            token_hours,
        }
    }

    /// Sign a token binding `user_id` with the configured expiry.
    pub fn issue(&self, user_id: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.token_hours)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Verify signature and expiry, yielding the bound identity id.
    pub fn verify(&self, token: &str) -> Option<String> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims.sub)
            .ok()
    }
}

/// Resolve the signing secret: configured value if present, otherwise a
/// random secret generated once and persisted in the data directory so
/// tokens survive restarts.
pub fn load_or_create_secret(
    configured: Option<&str>,
    data_dir: &Path,
) -> anyhow::Result<String> {
    if let Some(secret) = configured {
        return Ok(secret.to_string());
    }

    let path = data_dir.join("token_secret");
    if path.exists() {
        let secret = std::fs::read_to_string(&path)?;
        let secret = secret.trim().to_string();
        if !secret.is_empty() {
            return Ok(secret);
        }
    }

    let secret = generate_secret();
    std::fs::create_dir_all(data_dir)?;
    std::fs::write(&path, &secret)?;
    tracing::info!("Generated new token secret at {}", path.display());
    Ok(secret)
}

/// Cryptographically random 64-character hex secret.
fn generate_secret() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
