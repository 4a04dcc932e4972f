use crate::{
    conf::TokenConf,
    model::{ApiResponse, ApiResult},
    repository::UserRepository,
    serializer::{LoginSerializer, RefreshSerializer},
    service::{
        token::{self, TokenPair},
        user,
    },
};
use rocket::{post, serde::json::Json, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize)]
pub struct RefreshOutput {
    access: String,
}

#[post("/token", data = "<input>")]
pub async fn post(
    input: Json<Value>,
    user_repo: &State<UserRepository>,
    conf: &State<TokenConf>,
) -> ApiResult<TokenPair> {
    let credentials = LoginSerializer::validate(&input)?;
    let user = user::authenticate(&credentials, user_repo)?;
    ApiResponse::ok(token::obtain_pair(&user, conf)?)
}

#[post("/token/refresh", data = "<input>")]
pub async fn refresh(input: Json<Value>, conf: &State<TokenConf>) -> ApiResult<RefreshOutput> {
    let refresh = RefreshSerializer::validate(&input)?;
    ApiResponse::ok(RefreshOutput {
        access: token::refresh(&refresh, conf)?,
    })
}

#[cfg(test)]
mod test {
    use super::RefreshOutput;
    use crate::{
        serializer::LoginData,
        service::{token::TokenPair, user},
        test::{client, token_conf},
        token::{Token, TokenKind},
    };
    use anyhow::Result;
    use rocket::http::Status;
    use serde_json::{json, Value};

    fn register(repo: &crate::repository::UserRepository) -> Result<()> {
        let data = LoginData {
            username: "alice".into(),
            password: "secret".into(),
        };
        user::register(&data, repo)?;
        Ok(())
    }

    #[test]
    fn post() -> Result<()> {
        let (client, repos) = client();
        register(&repos.users)?;

        let input = json!({"username": "alice", "password": "secret"});
        let res = client.post("/api/token").json(&input).dispatch();
        assert_eq!(Status::Ok, res.status());
        let pair = res.into_json::<TokenPair>().unwrap();

        let conf = token_conf();
        let refresh = Token::decode(&pair.refresh, TokenKind::Refresh, &conf)?;
        let access = Token::decode(&pair.access, TokenKind::Access, &conf)?;
        assert_eq!(Some(&json!("alice")), refresh.get("username"));
        assert_eq!(Some(&json!("alice")), access.get("username"));
        Ok(())
    }

    #[test]
    fn post_invalid_credentials() -> Result<()> {
        let (client, repos) = client();
        register(&repos.users)?;

        let input = json!({"username": "alice", "password": "wrong"});
        let res = client.post("/api/token").json(&input).dispatch();
        assert_eq!(Status::Unauthorized, res.status());
        let body = res.into_json::<Value>().unwrap();
        assert_eq!(
            json!("No active account found with the given credentials"),
            body["message"]
        );
        Ok(())
    }

    #[test]
    fn post_missing_password() -> Result<()> {
        let (client, _) = client();
        let res = client
            .post("/api/token")
            .json(&json!({"username": "alice"}))
            .dispatch();
        assert_eq!(Status::BadRequest, res.status());
        Ok(())
    }

    #[test]
    fn refresh() -> Result<()> {
        let (client, repos) = client();
        register(&repos.users)?;
        let input = json!({"username": "alice", "password": "secret"});
        let pair = client
            .post("/api/token")
            .json(&input)
            .dispatch()
            .into_json::<TokenPair>()
            .unwrap();

        let res = client
            .post("/api/token/refresh")
            .json(&json!({ "refresh": pair.refresh }))
            .dispatch();
        assert_eq!(Status::Ok, res.status());
        let output = res.into_json::<RefreshOutput>().unwrap();
        let access = Token::decode(&output.access, TokenKind::Access, &token_conf())?;
        assert_eq!(Some(&json!("alice")), access.get("username"));

        let res = client
            .post("/api/token/refresh")
            .json(&json!({ "refresh": pair.access }))
            .dispatch();
        assert_eq!(Status::Unauthorized, res.status());
        let body = res.into_json::<Value>().unwrap();
        assert_eq!(json!("Token is invalid or expired"), body["message"]);
        Ok(())
    }
}
