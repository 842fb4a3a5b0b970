//! 令牌声明解析
//!
//! 只在本地解码 JWT 的 payload 以取得用户标识与过期时间，不做签名校验
//! (签发与校验由外部 API 负责)。

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{DashError, DashResult};

/// 声明中的标识既可能是数字也可能是字符串
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ClaimId {
    Number(i64),
    Text(String),
}

impl ClaimId {
    fn non_empty(&self) -> Option<String> {
        match self {
            ClaimId::Number(n) => Some(n.to_string()),
            ClaimId::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            ClaimId::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HasuraClaims {
    #[serde(default, rename = "x-hasura-user-id")]
    pub user_id: Option<ClaimId>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub user_id: Option<ClaimId>,
    #[serde(default)]
    pub sub: Option<ClaimId>,
    /// NumericDate，单位秒
    #[serde(default)]
    pub exp: Option<f64>,
    #[serde(default, rename = "https://hasura.io/jwt/claims")]
    pub hasura: Option<HasuraClaims>,
}

impl TokenClaims {
    /// 解码 `header.payload.signature` 形式的令牌
    pub fn decode(token: &str) -> DashResult<Self> {
        let segments: Vec<&str> = token.trim().split('.').collect();
        if segments.len() != 3 {
            return Err(DashError::invalid_token(format!(
                "token has {} segments, expected 3",
                segments.len()
            ))
            .in_op("claims.decode"));
        }

        let payload = segments[1].trim_end_matches('=');
        let bytes = URL_SAFE_NO_PAD.decode(payload).map_err(|e| {
            DashError::invalid_token(format!("token payload is not base64url: {}", e))
                .in_op("claims.decode")
        })?;

        serde_json::from_slice::<TokenClaims>(&bytes).map_err(|e| {
            DashError::invalid_token(format!("token payload is not a claims object: {}", e))
                .in_op("claims.decode")
        })
    }

    /// 用户标识：依次尝试 `user_id`, `sub`, Hasura 命名空间下的 `x-hasura-user-id`
    pub fn user_id(&self) -> Option<String> {
        self.user_id
            .as_ref()
            .and_then(ClaimId::non_empty)
            .or_else(|| self.sub.as_ref().and_then(ClaimId::non_empty))
            .or_else(|| {
                self.hasura
                    .as_ref()
                    .and_then(|h| h.user_id.as_ref())
                    .and_then(ClaimId::non_empty)
            })
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp
            .and_then(|secs| DateTime::from_timestamp(secs.floor() as i64, 0))
    }

    /// 没有 `exp` 的令牌视为不过期
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|exp| exp <= now)
    }
}
