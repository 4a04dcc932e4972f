//! Signed JWT pairs: a long-lived refresh token and short-lived access
//! tokens derived from it.
//!
//! The claim set is kept as a plain JSON map so that callers can add their
//! own claims on top of the standard ones without a new claims type.

use crate::{conf::TokenConf, model::User};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

pub const TOKEN_TYPE: &str = "token_type";
pub const EXP: &str = "exp";
pub const IAT: &str = "iat";
pub const JTI: &str = "jti";
pub const USER_ID: &str = "user_id";

/// Claims that identify a single token and are never copied into a token
/// derived from it.
const NO_COPY_CLAIMS: [&str; 4] = [TOKEN_TYPE, EXP, IAT, JTI];

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }

    fn lifetime_secs(self, conf: &TokenConf) -> i64 {
        match self {
            TokenKind::Access => conf.access_lifetime_secs,
            TokenKind::Refresh => conf.refresh_lifetime_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token is invalid or expired")]
    Invalid(#[source] jsonwebtoken::errors::Error),
    #[error("Token is invalid or expired")]
    WrongType,
    #[error("Token lifetime of {0} seconds is out of range")]
    Lifetime(i64),
    #[error("Failed to sign token")]
    Encoding(#[source] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    claims: Map<String, Value>,
}

impl Token {
    fn new(kind: TokenKind, conf: &TokenConf, now: DateTime<Utc>) -> Result<Token, TokenError> {
        let mut token = Token { claims: Map::new() };
        token.stamp(kind, conf, now)?;
        Ok(token)
    }

    /// Standard refresh token for a user.
    pub fn for_user(
        user: &User,
        conf: &TokenConf,
        now: DateTime<Utc>,
    ) -> Result<Token, TokenError> {
        let mut token = Token::new(TokenKind::Refresh, conf, now)?;
        token.insert(USER_ID, user.id);
        Ok(token)
    }

    /// Derives an access token carrying every non-identifying claim of this
    /// one, custom claims included.
    pub fn access_token(
        &self,
        conf: &TokenConf,
        now: DateTime<Utc>,
    ) -> Result<Token, TokenError> {
        let mut access = Token::new(TokenKind::Access, conf, now)?;

        for (claim, value) in &self.claims {
            if !NO_COPY_CLAIMS.contains(&claim.as_str()) {
                access.claims.insert(claim.clone(), value.clone());
            }
        }

        Ok(access)
    }

    fn stamp(
        &mut self,
        kind: TokenKind,
        conf: &TokenConf,
        now: DateTime<Utc>,
    ) -> Result<(), TokenError> {
        let secs = kind.lifetime_secs(conf);
        let exp = Duration::try_seconds(secs)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or(TokenError::Lifetime(secs))?;

        self.insert(TOKEN_TYPE, kind.as_str());
        self.insert(EXP, exp.timestamp());
        self.insert(IAT, now.timestamp());
        self.insert(JTI, Uuid::new_v4().simple().to_string());
        Ok(())
    }

    pub fn insert(&mut self, claim: &str, value: impl Into<Value>) {
        self.claims.insert(claim.to_string(), value.into());
    }

    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.claims.get(claim)
    }

    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    pub fn kind(&self) -> Option<TokenKind> {
        match self.get(TOKEN_TYPE).and_then(|it| it.as_str()) {
            Some("access") => Some(TokenKind::Access),
            Some("refresh") => Some(TokenKind::Refresh),
            _ => None,
        }
    }

    pub fn encode(&self, conf: &TokenConf) -> Result<String, TokenError> {
        encode(
            &Header::new(ALGORITHM),
            &self.claims,
            &EncodingKey::from_secret(conf.secret.as_bytes()),
        )
        .map_err(TokenError::Encoding)
    }

    /// Verifies signature and expiry, then checks that the token is of the
    /// expected kind.
    pub fn decode(raw: &str, kind: TokenKind, conf: &TokenConf) -> Result<Token, TokenError> {
        let claims = decode::<Map<String, Value>>(
            raw,
            &DecodingKey::from_secret(conf.secret.as_bytes()),
            &Validation::new(ALGORITHM),
        )
        .map_err(TokenError::Invalid)?
        .claims;

        let token = Token { claims };

        if token.kind() != Some(kind) {
            return Err(TokenError::WrongType);
        }

        Ok(token)
    }
}

#[cfg(test)]
mod test {
    use super::{Token, TokenError, TokenKind};
    use crate::{conf::TokenConf, model::User, test::token_conf};
    use anyhow::Result;
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn user() -> User {
        User {
            id: 42,
            username: "alice".into(),
            password_hash: "hash".into(),
        }
    }

    #[test]
    fn for_user() -> Result<()> {
        let now = Utc::now();
        let token = Token::for_user(&user(), &token_conf(), now)?;
        assert_eq!(Some(TokenKind::Refresh), token.kind());
        assert_eq!(Some(&json!(42)), token.get("user_id"));
        assert_eq!(Some(&json!(now.timestamp())), token.get("iat"));
        assert_eq!(Some(&json!(now.timestamp() + 86400)), token.get("exp"));
        assert_eq!(32, token.get("jti").and_then(|it| it.as_str()).unwrap().len());
        Ok(())
    }

    #[test]
    fn encode_and_decode() -> Result<()> {
        let token = Token::for_user(&user(), &token_conf(), Utc::now())?;
        let raw = token.encode(&token_conf())?;
        let decoded = Token::decode(&raw, TokenKind::Refresh, &token_conf())?;
        assert_eq!(token, decoded);
        Ok(())
    }

    #[test]
    fn access_token_copies_custom_claims() -> Result<()> {
        let mut refresh = Token::for_user(&user(), &token_conf(), Utc::now())?;
        refresh.insert("username", "alice");
        let access = refresh.access_token(&token_conf(), Utc::now())?;
        assert_eq!(Some(TokenKind::Access), access.kind());
        assert_eq!(Some(&json!("alice")), access.get("username"));
        assert_eq!(Some(&json!(42)), access.get("user_id"));
        assert_ne!(refresh.get("jti"), access.get("jti"));
        Ok(())
    }

    #[test]
    fn decode_expired() -> Result<()> {
        let token = Token::for_user(&user(), &token_conf(), Utc::now() - Duration::days(2))?;
        let raw = token.encode(&token_conf())?;
        let res = Token::decode(&raw, TokenKind::Refresh, &token_conf());
        assert!(matches!(res, Err(TokenError::Invalid(_))));
        Ok(())
    }

    #[test]
    fn decode_bad_signature() -> Result<()> {
        let raw = Token::for_user(&user(), &token_conf(), Utc::now())?.encode(&token_conf())?;
        let other = TokenConf {
            secret: "another-secret".into(),
            ..token_conf()
        };
        let res = Token::decode(&raw, TokenKind::Refresh, &other);
        assert!(matches!(res, Err(TokenError::Invalid(_))));
        Ok(())
    }

    #[test]
    fn decode_wrong_kind() -> Result<()> {
        let refresh = Token::for_user(&user(), &token_conf(), Utc::now())?;
        let raw = refresh.access_token(&token_conf(), Utc::now())?.encode(&token_conf())?;
        let res = Token::decode(&raw, TokenKind::Refresh, &token_conf());
        assert!(matches!(res, Err(TokenError::WrongType)));
        Ok(())
    }

    #[test]
    fn lifetime_out_of_range() {
        let conf = TokenConf {
            refresh_lifetime_secs: i64::MAX,
            ..token_conf()
        };
        let res = Token::for_user(&user(), &conf, Utc::now());
        assert!(matches!(res, Err(TokenError::Lifetime(_))));
    }
}
