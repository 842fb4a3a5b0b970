//! GraphQL 数据客户端
//!
//! 向固定端点发送参数化查询，携带会话中的 bearer 令牌，返回原始类型化记录。

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::AppConfig;
use crate::error::{DashError, DashResult};
use crate::session::Session;
use crate::transport::{HttpRequest, Transport};

// =========================================================
// 协议类型
// =========================================================

#[derive(Debug, Serialize)]
pub struct GraphqlRequest<'a, V> {
    pub query: &'a str,
    pub variables: V,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<D> {
    pub data: Option<D>,
    #[serde(default)]
    pub errors: Option<Vec<GraphqlError>>,
}

impl<D> GraphqlResponse<D> {
    /// 非空 `errors` 优先于 `data`
    ///
    /// Hasura 以 200 状态返回 JWT 校验失败，这类错误归为未认证。
    pub fn into_result(self) -> DashResult<D> {
        if let Some(errors) = self.errors.filter(|e| !e.is_empty()) {
            let message = errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            if errors.iter().any(|e| e.message.contains("JWT")) {
                return Err(DashError::unauthorized(message));
            }
            return Err(DashError::graphql(message));
        }
        self.data
            .ok_or_else(|| DashError::no_data("GraphQL response contained no data"))
    }
}

// =========================================================
// 原始记录 (Raw Records)
// =========================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawUser {
    pub id: i64,
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    pub id: i64,
    pub amount: i64,
    pub created_at: String,
    #[serde(default)]
    pub path: String,
}

/// `progress` 与 `result` 共用的形状
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGrade {
    pub id: i64,
    /// 进行中的项目没有成绩
    pub grade: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProfileData {
    #[serde(default)]
    pub user: Vec<RawUser>,
    #[serde(default)]
    pub transaction: Option<Vec<RawTransaction>>,
    #[serde(default)]
    pub progress: Option<Vec<RawGrade>>,
    #[serde(default)]
    pub result: Option<Vec<RawGrade>>,
}

pub const PROFILE_QUERY: &str = r#"
query Profile($xpType: String!) {
  user {
    id
    login
  }
  transaction(where: {type: {_eq: $xpType}}, order_by: {createdAt: desc}) {
    id
    amount
    createdAt
    path
  }
  progress(order_by: {updatedAt: desc}) {
    id
    grade
    createdAt
    updatedAt
    path
  }
  result(order_by: {updatedAt: desc}) {
    id
    grade
    createdAt
    updatedAt
    path
  }
}
"#;

// =========================================================
// 客户端
// =========================================================

pub struct GraphqlClient<T> {
    transport: T,
    endpoint: String,
    session: Session,
}

impl<T: Transport> GraphqlClient<T> {
    pub fn new(transport: T, config: &AppConfig, session: Session) -> Self {
        Self {
            transport,
            endpoint: config.graphql_url(),
            session,
        }
    }

    /// 发送查询并解析 `data`
    pub async fn query<V, D>(&self, query: &str, variables: &V) -> DashResult<D>
    where
        V: Serialize,
        D: DeserializeOwned,
    {
        let body = serde_json::to_string(&GraphqlRequest { query, variables })
            .map_err(|e| DashError::from(e).in_op("graphql.serialize"))?;

        let mut request = HttpRequest::post(&self.endpoint)
            .header("Content-Type", "application/json")
            .body(body);
        if let Some(token) = self.session.token() {
            request = request.header("Authorization", &format!("Bearer {}", token));
        }

        let reply = self
            .transport
            .send(request)
            .await
            .map_err(|e| e.in_op("graphql.query"))?;

        if !reply.ok() {
            log::warn!("[GraphQL] Response error {}: {}", reply.status, reply.body);
            let message = format!("Network response was not ok: {}", reply.status);
            let err = match reply.status {
                401 | 403 => DashError::unauthorized(message),
                _ => DashError::http(message),
            };
            return Err(err.in_op_with("graphql.query", format!("status={}", reply.status)));
        }

        serde_json::from_str::<GraphqlResponse<D>>(&reply.body)
            .map_err(|e| DashError::from(e).in_op("graphql.decode"))?
            .into_result()
            .map_err(|e| e.in_op("graphql.query"))
    }

    /// 拉取档案所需的全部原始记录
    pub async fn fetch_profile_data(&self) -> DashResult<ProfileData> {
        self.query(PROFILE_QUERY, &json!({ "xpType": "xp" })).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashErrorStatus;
    use crate::transport::tests::ScriptedTransport;

    fn client(transport: ScriptedTransport, session: Session) -> GraphqlClient<ScriptedTransport> {
        GraphqlClient::new(transport, &AppConfig::default(), session)
    }

    #[tokio::test]
    async fn sends_query_with_bearer_token() {
        let session = Session::in_memory();
        session.store_token("tok");
        let transport =
            ScriptedTransport::default().reply(200, r#"{"data": {"user": [{"id": 1, "login": "a"}]}}"#);
        let client = client(transport.clone(), session);

        let data = client.fetch_profile_data().await.unwrap();
        assert_eq!(data.user[0].login, "a");
        assert_eq!(data.transaction, None);

        let request = transport.last_request();
        assert_eq!(request.url, "https://learn.reboot01.com/api/graphql-engine/v1/graphql");
        assert_eq!(request.header_value("authorization"), Some("Bearer tok"));
        let body: serde_json::Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["variables"]["xpType"], "xp");
        assert!(body["query"].as_str().unwrap().contains("query Profile"));
    }

    #[tokio::test]
    async fn omits_authorization_without_token() {
        let transport = ScriptedTransport::default().reply(200, r#"{"data": {"user": []}}"#);
        let client = client(transport.clone(), Session::in_memory());
        client.fetch_profile_data().await.unwrap();
        assert_eq!(transport.last_request().header_value("Authorization"), None);
    }

    #[tokio::test]
    async fn non_success_status_is_surfaced() {
        let client = client(
            ScriptedTransport::default().reply(500, "boom"),
            Session::in_memory(),
        );
        let err = client.fetch_profile_data().await.unwrap_err();
        assert_eq!(err.status, DashErrorStatus::Http);
        assert_eq!(err.message(), "Network response was not ok: 500");
    }

    #[tokio::test]
    async fn unauthorized_status_requires_reauth() {
        let client = client(
            ScriptedTransport::default().reply(401, ""),
            Session::in_memory(),
        );
        let err = client.fetch_profile_data().await.unwrap_err();
        assert!(err.requires_reauth());
    }

    #[tokio::test]
    async fn graphql_errors_are_joined() {
        let client = client(
            ScriptedTransport::default().reply(
                200,
                r#"{"data": null, "errors": [{"message": "field 'x' not found"}, {"message": "check failed"}]}"#,
            ),
            Session::in_memory(),
        );
        let err = client.fetch_profile_data().await.unwrap_err();
        assert_eq!(err.status, DashErrorStatus::Graphql);
        assert_eq!(err.message(), "field 'x' not found, check failed");
    }

    #[tokio::test]
    async fn jwt_errors_are_unauthorized() {
        let client = client(
            ScriptedTransport::default().reply(
                200,
                r#"{"errors": [{"message": "Could not verify JWT: JWTExpired"}]}"#,
            ),
            Session::in_memory(),
        );
        let err = client.fetch_profile_data().await.unwrap_err();
        assert_eq!(err.status, DashErrorStatus::Unauthorized);
    }

    #[tokio::test]
    async fn malformed_body_is_a_serialization_error() {
        let client = client(
            ScriptedTransport::default().reply(200, "<html>"),
            Session::in_memory(),
        );
        let err = client.fetch_profile_data().await.unwrap_err();
        assert_eq!(err.status, DashErrorStatus::Serialization);
    }

    #[test]
    fn empty_errors_array_is_not_a_failure() {
        let response: GraphqlResponse<u8> =
            serde_json::from_str(r#"{"data": 3, "errors": []}"#).unwrap();
        assert_eq!(response.into_result().unwrap(), 3);

        let missing: GraphqlResponse<u8> = serde_json::from_str(r#"{"data": null}"#).unwrap();
        assert_eq!(missing.into_result().unwrap_err().status, DashErrorStatus::NoData);
    }
}
