use jsonwebtoken::{DecodingKey, Validation};
use serde::{Deserialize, Serialize};

pub const SESSION_COOKIE: &str = "hrm_session";

/// Verification settings for bearer tokens minted by the identity service.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
        }
    }

    pub fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.jwt_secret.as_bytes())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub exp: usize,
    pub iat: usize,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub enum HrRole {
    Admin,
    Hr,
    Viewer,
}

impl HrRole {
    pub fn as_str(self) -> &'static str {
        match self {
            HrRole::Admin => "ADMIN",
            HrRole::Hr => "HR",
            HrRole::Viewer => "VIEWER",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "ADMIN" => Some(HrRole::Admin),
            "HR" => Some(HrRole::Hr),
            "VIEWER" => Some(HrRole::Viewer),
            _ => None,
        }
    }

    pub fn level(self) -> u8 {
        match self {
            HrRole::Admin => 3,
            HrRole::Hr => 2,
            HrRole::Viewer => 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub subject: String,
    pub roles: Vec<HrRole>,
}

impl CurrentUser {
    pub fn new(subject: impl Into<String>, roles: Vec<HrRole>) -> Self {
        Self {
            subject: subject.into(),
            roles,
        }
    }

    pub fn from_claims(claims: SessionClaims) -> Self {
        let roles = claims
            .roles
            .iter()
            .filter_map(|r| HrRole::parse(r))
            .collect();
        Self {
            subject: claims.sub,
            roles,
        }
    }

    pub fn has_role(&self, role: HrRole) -> bool {
        self.roles.iter().any(|r| r.level() >= role.level())
    }

    pub fn highest_role(&self) -> Option<HrRole> {
        self.roles.iter().copied().max_by_key(|r| r.level())
    }
}

pub fn decode_token(
    token: &str,
    config: &AuthConfig,
) -> jsonwebtoken::errors::Result<SessionClaims> {
    jsonwebtoken::decode::<SessionClaims>(token, &config.decoding_key(), &Validation::default())
        .map(|data| data.claims)
}

/// Pulls a token from an `Authorization: Bearer` value or a cookie header.
pub fn token_from_headers(authorization: Option<&str>, cookie: Option<&str>) -> Option<String> {
    if let Some(rest) = authorization.and_then(|v| v.strip_prefix("Bearer ")) {
        let token = rest.trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }
    cookie?.split(';').find_map(|part| {
        part.trim()
            .strip_prefix(SESSION_COOKIE)
            .and_then(|rest| rest.strip_prefix('='))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header};

    use super::*;

    fn sign(subject: &str, roles: &[HrRole], secret: &str, exp: usize) -> String {
        let claims = SessionClaims {
            sub: subject.to_string(),
            roles: roles.iter().map(|r| r.as_str().to_string()).collect(),
            exp,
            iat: 1_700_000_000,
        };
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    const FAR_FUTURE: usize = 4_102_444_800;

    #[test]
    fn token_round_trip_keeps_roles() {
        let config = AuthConfig::new("test-secret");
        let token = sign("hr@example.test", &[HrRole::Hr], "test-secret", FAR_FUTURE);
        let claims = decode_token(&token, &config).unwrap();
        let user = CurrentUser::from_claims(claims);
        assert_eq!(user.subject, "hr@example.test");
        assert_eq!(user.highest_role(), Some(HrRole::Hr));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign("x", &[HrRole::Admin], "a", FAR_FUTURE);
        assert!(decode_token(&token, &AuthConfig::new("b")).is_err());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let token = sign("x", &[HrRole::Admin], "a", 1_700_000_100);
        assert!(decode_token(&token, &AuthConfig::new("a")).is_err());
    }

    #[test]
    fn unknown_roles_are_dropped() {
        let claims = SessionClaims {
            sub: "svc".into(),
            roles: vec!["hr".into(), "AUDITOR".into()],
            exp: FAR_FUTURE,
            iat: 0,
        };
        assert_eq!(CurrentUser::from_claims(claims).roles, vec![HrRole::Hr]);
    }

    #[test]
    fn role_levels_are_hierarchical() {
        let admin = CurrentUser::new("a", vec![HrRole::Admin]);
        assert!(admin.has_role(HrRole::Viewer));
        assert!(admin.has_role(HrRole::Hr));
        let viewer = CurrentUser::new("v", vec![HrRole::Viewer]);
        assert!(!viewer.has_role(HrRole::Hr));
    }

    #[test]
    fn token_extraction_prefers_bearer() {
        assert_eq!(
            token_from_headers(Some("Bearer abc"), Some("hrm_session=def")),
            Some("abc".to_string())
        );
        assert_eq!(
            token_from_headers(None, Some("theme=dark; hrm_session=def")),
            Some("def".to_string())
        );
        assert_eq!(token_from_headers(Some("Basic xyz"), None), None);
    }
}
