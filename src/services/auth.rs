use crate::models::AuthContext;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role carried by end-user tokens
const AUTHENTICATED_ROLE: &str = "authenticated";

/// Errors raised while authenticating a request
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid token role: {0}")]
    InvalidRole(String),

    #[error("Access restricted to verified college students only")]
    DomainNotAllowed(String),
}

/// JWT claims issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    pub exp: usize,
}

/// Verifies bearer tokens and builds the caller's [`AuthContext`]
#[derive(Clone)]
pub struct AuthVerifier {
    key: DecodingKey,
    validation: Validation,
    allowed_domains: Vec<String>,
}

impl AuthVerifier {
    pub fn new(secret: &str, allowed_domains: Vec<String>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Provider tokens do not reliably carry a standard audience
        validation.validate_aud = false;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            allowed_domains: allowed_domains.into_iter().map(|d| d.to_lowercase()).collect(),
        }
    }

    /// Verify an `Authorization` header value
    pub fn verify_header(&self, header: Option<&str>) -> Result<AuthContext, AuthError> {
        let token = header
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        self.verify(token)
    }

    /// Verify a raw token
    pub fn verify(&self, token: &str) -> Result<AuthContext, AuthError> {
        let claims = decode::<Claims>(token, &self.key, &self.validation)?.claims;

        if claims.role != AUTHENTICATED_ROLE {
            return Err(AuthError::InvalidRole(claims.role));
        }

        if !self.is_allowed_email(&claims.email) {
            tracing::info!("Rejected token for {} with non-campus email", claims.sub);
            return Err(AuthError::DomainNotAllowed(claims.email));
        }

        let campus = campus_for_email(&claims.email).to_string();

        Ok(AuthContext {
            user_id: claims.sub,
            email: claims.email,
            campus,
        })
    }

    fn is_allowed_email(&self, email: &str) -> bool {
        match email.rsplit_once('@') {
            Some((local, domain)) if !local.is_empty() => {
                self.allowed_domains.iter().any(|d| d == &domain.to_lowercase())
            }
            _ => false,
        }
    }
}

/// Campus names keyed by email domain
const CAMPUSES: [(&str, &str); 8] = [
    ("goa.bits-pilani.ac.in", "Goa"),
    ("hyderabad.bits-pilani.ac.in", "Hyderabad"),
    ("dubai.bits-pilani.ac.in", "Dubai"),
    ("iitd.ac.in", "IIT Delhi"),
    ("iitb.ac.in", "IIT Bombay"),
    ("iitkgp.ac.in", "IIT Kharagpur"),
    ("nitk.edu.in", "NIT Karnataka"),
    ("nitt.edu", "NIT Trichy"),
];

/// Campus for display, derived from the email domain
pub fn campus_for_email(email: &str) -> &'static str {
    let email = email.to_lowercase();
    CAMPUSES
        .iter()
        .find(|(domain, _)| email.ends_with(&format!("@{}", domain)))
        .map(|(_, campus)| *campus)
        .unwrap_or("Pilani")
}

/// Domains accepted when none are configured
pub fn default_allowed_domains() -> Vec<String> {
    [
        "pilani.bits-pilani.ac.in",
        "goa.bits-pilani.ac.in",
        "hyderabad.bits-pilani.ac.in",
        "dubai.bits-pilani.ac.in",
        "iitd.ac.in",
        "iitb.ac.in",
        "iitkgp.ac.in",
        "nitk.edu.in",
        "nitt.edu",
    ]
    .iter()
    .map(|d| d.to_string())
    .collect()
}
