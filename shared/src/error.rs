use std::fmt;

use serde::{Deserialize, Serialize};

// =========================================================
// 错误状态枚举
// =========================================================

/// 错误状态枚举
/// 视图根据状态决定展示内联错误面板还是触发重新认证
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DashErrorStatus {
    /// fetch 被拒绝或连接中断
    Network,
    /// 非 2xx 的 HTTP 响应
    Http,
    /// 401/403，或登录凭据被拒绝
    Unauthorized,
    /// GraphQL 响应中携带 errors
    Graphql,
    /// JSON 解析或序列化错误
    Serialization,
    /// 令牌格式错误或已过期
    InvalidToken,
    /// 响应中缺少期望的数据
    NoData,
    /// 用户输入校验失败
    InvalidInput,
    /// 配置或路由表校验失败
    Config,
}

impl DashErrorStatus {
    pub fn error_code(&self) -> &'static str {
        match self {
            DashErrorStatus::Network => "NETWORK_ERROR",
            DashErrorStatus::Http => "HTTP_ERROR",
            DashErrorStatus::Unauthorized => "UNAUTHORIZED",
            DashErrorStatus::Graphql => "GRAPHQL_ERROR",
            DashErrorStatus::Serialization => "JSON_PARSE_ERROR",
            DashErrorStatus::InvalidToken => "INVALID_TOKEN",
            DashErrorStatus::NoData => "NO_DATA",
            DashErrorStatus::InvalidInput => "INVALID_INPUT",
            DashErrorStatus::Config => "CONFIG_ERROR",
        }
    }

    /// 该错误是否意味着当前会话已不可用
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            DashErrorStatus::Unauthorized | DashErrorStatus::InvalidToken
        )
    }
}

// =========================================================
// 错误上下文追踪
// =========================================================

/// 结构化的错误追踪片段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSpan {
    /// 操作名称，如 "graphql.query", "auth.sign_in"
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorSpan {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: None,
        }
    }

    pub fn with_detail(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: Some(detail.into()),
        }
    }
}

// =========================================================
// 核心错误类型
// =========================================================

/// 应用错误
///
/// - status: 错误类型/语义
/// - message: 面向用户的错误消息
/// - source: 原始错误（可选，用于错误链）
/// - spans: 结构化的调用追踪栈
#[derive(Debug)]
pub struct DashError {
    pub status: DashErrorStatus,
    pub message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
    spans: Vec<ErrorSpan>,
}

impl DashError {
    pub fn new(status: DashErrorStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            source: None,
            spans: Vec::new(),
        }
    }

    // --- Convenience constructors ---

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(DashErrorStatus::Network, message)
    }

    pub fn http(message: impl Into<String>) -> Self {
        Self::new(DashErrorStatus::Http, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(DashErrorStatus::Unauthorized, message)
    }

    pub fn graphql(message: impl Into<String>) -> Self {
        Self::new(DashErrorStatus::Graphql, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(DashErrorStatus::Serialization, message)
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(DashErrorStatus::InvalidToken, message)
    }

    pub fn no_data(message: impl Into<String>) -> Self {
        Self::new(DashErrorStatus::NoData, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(DashErrorStatus::InvalidInput, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(DashErrorStatus::Config, message)
    }

    // --- Context builders ---

    /// 添加操作追踪（无额外细节）
    pub fn in_op(mut self, operation: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::new(operation));
        self
    }

    /// 添加操作追踪（带额外细节）
    pub fn in_op_with(mut self, operation: impl Into<String>, detail: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::with_detail(operation, detail));
        self
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // --- Accessors ---

    pub fn error_code(&self) -> &'static str {
        self.status.error_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn spans(&self) -> &[ErrorSpan] {
        &self.spans
    }

    pub fn requires_reauth(&self) -> bool {
        self.status.requires_reauth()
    }
}

// =========================================================
// Display & Error trait 实现
// =========================================================

impl fmt::Display for DashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error_code(), self.message)?;

        if !self.spans.is_empty() {
            write!(f, " | trace: ")?;
            for (i, span) in self.spans.iter().enumerate() {
                if i > 0 {
                    write!(f, " -> ")?;
                }
                write!(f, "{}", span.operation)?;
                if let Some(detail) = &span.detail {
                    write!(f, "({})", detail)?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for DashError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

pub type DashResult<T> = std::result::Result<T, DashError>;

// =========================================================
// 类型转换实现
// =========================================================

impl From<serde_json::Error> for DashError {
    fn from(e: serde_json::Error) -> Self {
        DashError::serialization(e.to_string()).with_source(e)
    }
}
