use crate::{
    conf::TokenConf,
    model::User,
    token::{Token, TokenError, TokenKind},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const USERNAME: &str = "username";

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

/// Refresh token for the user, with the standard claims plus `username`.
pub fn get_token(user: &User, conf: &TokenConf, now: DateTime<Utc>) -> Result<Token, TokenError> {
    let mut token = Token::for_user(user, conf, now)?;
    token.insert(USERNAME, user.username.as_str());
    Ok(token)
}

pub fn obtain_pair(user: &User, conf: &TokenConf) -> Result<TokenPair, TokenError> {
    let now = Utc::now();
    let refresh = get_token(user, conf, now)?;
    let access = refresh.access_token(conf, now)?;
    Ok(TokenPair {
        refresh: refresh.encode(conf)?,
        access: access.encode(conf)?,
    })
}

/// Exchanges a valid refresh token for a new access token.
pub fn refresh(raw: &str, conf: &TokenConf) -> Result<String, TokenError> {
    let refresh = Token::decode(raw, TokenKind::Refresh, conf)?;
    refresh.access_token(conf, Utc::now())?.encode(conf)
}
