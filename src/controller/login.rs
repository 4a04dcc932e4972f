use crate::{
    conf::TokenConf,
    model::{ApiResponse, ApiResult},
    repository::UserRepository,
    serializer::LoginSerializer,
    service::{token, user},
};
use rocket::{post, serde::json::Json, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize)]
pub struct LoginOutput {
    refresh: String,
    access: String,
    username: String,
}

#[derive(Serialize, Deserialize)]
pub struct UserView {
    id: i64,
    username: String,
}

#[post("/login", data = "<input>")]
pub async fn login(
    input: Json<Value>,
    user_repo: &State<UserRepository>,
    conf: &State<TokenConf>,
) -> ApiResult<LoginOutput> {
    let credentials = LoginSerializer::validate(&input)?;
    let user = user::authenticate(&credentials, user_repo)?;
    let pair = token::obtain_pair(&user, conf)?;

    ApiResponse::ok(LoginOutput {
        refresh: pair.refresh,
        access: pair.access,
        username: user.username,
    })
}

#[post("/register", data = "<input>")]
pub async fn register(
    input: Json<Value>,
    user_repo: &State<UserRepository>,
) -> ApiResult<UserView> {
    let credentials = LoginSerializer::validate(&input)?;
    let user = user::register(&credentials, user_repo)?;

    ApiResponse::created(UserView {
        id: user.id,
        username: user.username,
    })
}

#[cfg(test)]
mod test {
    use super::{LoginOutput, UserView};
    use crate::{
        test::{client, token_conf},
        token::{Token, TokenKind},
    };
    use anyhow::Result;
    use rocket::http::Status;
    use serde_json::{json, Value};

    #[test]
    fn register_and_login() -> Result<()> {
        let (client, _) = client();
        let credentials = json!({"username": "alice", "password": "x"});

        let res = client.post("/api/register").json(&credentials).dispatch();
        assert_eq!(Status::Created, res.status());
        let user = res.into_json::<UserView>().unwrap();
        assert_eq!("alice", user.username);

        let res = client.post("/api/login").json(&credentials).dispatch();
        assert_eq!(Status::Ok, res.status());
        let output = res.into_json::<LoginOutput>().unwrap();
        assert_eq!("alice", output.username);

        let access = Token::decode(&output.access, TokenKind::Access, &token_conf())?;
        assert_eq!(Some(&json!("alice")), access.get("username"));
        assert_eq!(Some(&json!(user.id)), access.get("user_id"));
        Ok(())
    }

    #[test]
    fn register_hides_password() -> Result<()> {
        let (client, _) = client();
        let res = client
            .post("/api/register")
            .json(&json!({"username": "alice", "password": "x"}))
            .dispatch();
        let body = res.into_json::<Value>().unwrap();
        assert!(body.get("password").is_none());
        assert!(body.get("password_hash").is_none());
        Ok(())
    }

    #[test]
    fn register_duplicate() -> Result<()> {
        let (client, _) = client();
        let credentials = json!({"username": "alice", "password": "x"});
        client.post("/api/register").json(&credentials).dispatch();
        let res = client.post("/api/register").json(&credentials).dispatch();
        assert_eq!(Status::BadRequest, res.status());
        let body = res.into_json::<Value>().unwrap();
        assert_eq!(
            json!(["A user with that username already exists."]),
            body["errors"]["username"]
        );
        Ok(())
    }

    #[test]
    fn login_validation() -> Result<()> {
        let (client, _) = client();

        let res = client
            .post("/api/login")
            .json(&json!({"username": "alice"}))
            .dispatch();
        assert_eq!(Status::BadRequest, res.status());
        let body = res.into_json::<Value>().unwrap();
        assert_eq!(json!(["This field is required."]), body["errors"]["password"]);

        let res = client
            .post("/api/login")
            .json(&json!({"username": 123, "password": "x"}))
            .dispatch();
        assert_eq!(Status::BadRequest, res.status());
        let body = res.into_json::<Value>().unwrap();
        assert_eq!(json!(["Not a valid string."]), body["errors"]["username"]);
        Ok(())
    }

    #[test]
    fn login_unknown_user() -> Result<()> {
        let (client, _) = client();
        let res = client
            .post("/api/login")
            .json(&json!({"username": "alice", "password": "x"}))
            .dispatch();
        assert_eq!(Status::Unauthorized, res.status());
        Ok(())
    }
}
