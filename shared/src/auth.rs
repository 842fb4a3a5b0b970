//! 认证网关
//!
//! 用 Basic 认证换取 bearer 令牌并写入会话。令牌的签发与校验都在外部 API，
//! 这里只负责交换、规范化与本地声明解码。

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::config::AppConfig;
use crate::error::{DashError, DashResult};
use crate::session::Session;
use crate::transport::{HttpRequest, Transport};

const AUTH_FAILED: &str = "Authentication failed. Please check your credentials.";
const NO_TOKEN: &str = "No token received from server";

pub struct AuthGateway<T> {
    transport: T,
    signin_url: String,
    session: Session,
}

impl<T: Transport> AuthGateway<T> {
    pub fn new(transport: T, config: &AppConfig, session: Session) -> Self {
        Self {
            transport,
            signin_url: config.signin_url(),
            session,
        }
    }

    /// 登录并保存令牌
    ///
    /// # Returns
    /// 规范化后的令牌
    pub async fn sign_in(&self, username: &str, password: &str) -> DashResult<String> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(DashError::invalid_input("Please enter both username and password")
                .in_op("auth.sign_in"));
        }

        let request = HttpRequest::post(&self.signin_url)
            .header("Authorization", &basic_credentials(username, password))
            .header("Content-Type", "application/json");

        let reply = self
            .transport
            .send(request)
            .await
            .map_err(|e| e.in_op("auth.sign_in"))?;

        if !reply.ok() {
            log::warn!("[Auth] Sign-in rejected with status {}", reply.status);
            return Err(DashError::unauthorized(AUTH_FAILED)
                .in_op_with("auth.sign_in", format!("status={}", reply.status)));
        }

        let token = normalize_token(&reply.body).map_err(|e| e.in_op("auth.sign_in"))?;
        self.session.store_token(&token);
        // 新令牌对应新用户，旧缓存不再可信
        self.session.discard_profile();
        log::info!("[Auth] Signed in as {}", username);
        Ok(token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_valid()
    }

    pub fn user_id(&self) -> DashResult<Option<String>> {
        self.session.user_id()
    }

    pub fn sign_out(&self) {
        self.session.clear();
        log::info!("[Auth] Signed out");
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

/// `Basic base64(username:password)`
pub fn basic_credentials(username: &str, password: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", username, password))
    )
}

/// 将登录响应体规范化为单一令牌
///
/// 响应体可能是裸令牌、JSON 字符串，或带 `token` 字段的 JSON 对象。
pub fn normalize_token(body: &str) -> DashResult<String> {
    let body = body.trim();
    let token = match serde_json::from_str::<Value>(body) {
        Ok(Value::String(token)) => token,
        Ok(Value::Object(map)) => map
            .get("token")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| DashError::no_data(NO_TOKEN).in_op("auth.normalize_token"))?,
        _ => body.trim_matches('"').to_string(),
    };

    let token = token.trim().to_string();
    if token.is_empty() {
        return Err(DashError::no_data(NO_TOKEN).in_op("auth.normalize_token"));
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::tests::token_with;
    use crate::error::DashErrorStatus;
    use crate::profile::tests::sample_profile;
    use crate::transport::tests::ScriptedTransport;

    fn gateway(transport: ScriptedTransport) -> AuthGateway<ScriptedTransport> {
        AuthGateway::new(transport, &AppConfig::default(), Session::in_memory())
    }

    #[test]
    fn credentials_are_basic_encoded() {
        assert_eq!(basic_credentials("alice", "s3cret"), "Basic YWxpY2U6czNjcmV0");
    }

    #[test]
    fn token_normalization() {
        assert_eq!(normalize_token("abc.def.ghi").unwrap(), "abc.def.ghi");
        assert_eq!(normalize_token("\"abc.def.ghi\"\n").unwrap(), "abc.def.ghi");
        assert_eq!(
            normalize_token(r#"{"token": " abc.def.ghi "}"#).unwrap(),
            "abc.def.ghi"
        );
        assert_eq!(
            normalize_token(r#"{"other": 1}"#).unwrap_err().status,
            DashErrorStatus::NoData
        );
        assert!(normalize_token("   ").is_err());
        assert!(normalize_token("\"\"").is_err());
    }

    #[tokio::test]
    async fn sign_in_stores_token_and_sends_basic_auth() {
        let token = token_with(r#"{"sub": "5"}"#);
        let transport = ScriptedTransport::default().reply(200, &format!("\"{}\"", token));
        let gateway = gateway(transport.clone());
        gateway.session().cache_profile(&sample_profile()).unwrap();

        let returned = gateway.sign_in(" alice ", "pw").await.unwrap();
        assert_eq!(returned, token);
        assert_eq!(gateway.session().token(), Some(token));
        assert!(gateway.session().cached_profile().is_none());
        assert!(gateway.is_authenticated());
        assert_eq!(gateway.user_id().unwrap().as_deref(), Some("5"));

        let request = transport.last_request();
        assert_eq!(request.url, "https://learn.reboot01.com/api/auth/signin");
        assert_eq!(
            request.header_value("Authorization"),
            Some(basic_credentials("alice", "pw").as_str())
        );
    }

    #[tokio::test]
    async fn rejected_credentials() {
        let gateway = gateway(ScriptedTransport::default().reply(403, "forbidden"));
        let err = gateway.sign_in("alice", "wrong").await.unwrap_err();
        assert_eq!(err.status, DashErrorStatus::Unauthorized);
        assert_eq!(err.message(), AUTH_FAILED);
        assert_eq!(gateway.session().token(), None);
    }

    #[tokio::test]
    async fn empty_fields_skip_the_network() {
        let transport = ScriptedTransport::default();
        let gateway = gateway(transport.clone());
        let err = gateway.sign_in("  ", "pw").await.unwrap_err();
        assert_eq!(err.status, DashErrorStatus::InvalidInput);
        assert!(transport.sent.borrow().is_empty());
    }

    #[tokio::test]
    async fn network_failure_propagates() {
        let gateway = gateway(ScriptedTransport::default().fail("offline"));
        let err = gateway.sign_in("alice", "pw").await.unwrap_err();
        assert_eq!(err.status, DashErrorStatus::Network);
        assert_eq!(err.spans()[0].operation, "auth.sign_in");
    }

    #[tokio::test]
    async fn sign_out_clears_session() {
        let token = token_with(r#"{"sub": "5"}"#);
        let gateway = gateway(ScriptedTransport::default().reply(200, &token));
        gateway.sign_in("alice", "pw").await.unwrap();
        gateway.sign_out();
        assert!(!gateway.is_authenticated());
    }
}
