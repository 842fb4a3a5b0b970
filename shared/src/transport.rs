//! HTTP 传输抽象
//!
//! 认证网关和 GraphQL 客户端只依赖 [`Transport`]，浏览器里由 `fetch` 实现，
//! 测试里由记录请求的模拟实现替代。

use async_trait::async_trait;

use crate::error::DashResult;

/// HTTP 请求方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// 添加请求头
    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    /// 设置请求体
    pub fn body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    /// 按名称查找请求头（大小写不敏感）
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait(?Send)]
pub trait Transport {
    /// 发送请求。只有网络层失败才返回错误，非 2xx 状态由调用方解释。
    async fn send(&self, request: HttpRequest) -> DashResult<HttpReply>;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use crate::error::DashError;

    /// Replays queued replies and records every request it sees.
    #[derive(Clone, Default)]
    pub(crate) struct ScriptedTransport {
        pub(crate) sent: Rc<RefCell<Vec<HttpRequest>>>,
        replies: Rc<RefCell<VecDeque<DashResult<HttpReply>>>>,
    }

    impl ScriptedTransport {
        pub(crate) fn reply(self, status: u16, body: &str) -> Self {
            self.replies
                .borrow_mut()
                .push_back(Ok(HttpReply::new(status, body)));
            self
        }

        pub(crate) fn fail(self, message: &str) -> Self {
            self.replies
                .borrow_mut()
                .push_back(Err(DashError::network(message)));
            self
        }

        pub(crate) fn last_request(&self) -> HttpRequest {
            self.sent.borrow().last().cloned().expect("a request was sent")
        }
    }

    #[async_trait(?Send)]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: HttpRequest) -> DashResult<HttpReply> {
            self.sent.borrow_mut().push(request);
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(DashError::network("no scripted reply left")))
        }
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let request = HttpRequest::post("https://example.test")
            .header("Authorization", "Bearer t")
            .header("Content-Type", "application/json");
        assert_eq!(request.header_value("authorization"), Some("Bearer t"));
        assert_eq!(request.header_value("x-missing"), None);
        assert_eq!(request.method.as_str(), "POST");
    }

    #[test]
    fn reply_success_range() {
        assert!(HttpReply::new(200, "").ok());
        assert!(HttpReply::new(204, "").ok());
        assert!(!HttpReply::new(301, "").ok());
        assert!(!HttpReply::new(401, "").ok());
    }
}
