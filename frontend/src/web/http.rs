//! HTTP 请求封装模块
//!
//! 使用 `web_sys::fetch` 实现共享层的 [`Transport`]。
//! 只有网络层失败才返回错误，状态码由网关和 GraphQL 客户端解释。

use async_trait::async_trait;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};
use xpboard_shared::{DashError, DashResult, HttpReply, HttpRequest, Transport};

fn js_detail(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

/// 基于 `window.fetch` 的传输层
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

impl FetchTransport {
    fn build(request: &HttpRequest) -> DashResult<Request> {
        let headers = Headers::new().map_err(|e| {
            DashError::network(format!("failed to create Headers: {}", js_detail(&e)))
                .in_op("fetch.build")
        })?;

        for (key, value) in &request.headers {
            headers.set(key, value).map_err(|e| {
                DashError::network(format!("failed to set header {}: {}", key, js_detail(&e)))
                    .in_op("fetch.build")
            })?;
        }

        let opts = RequestInit::new();
        opts.set_method(request.method.as_str());
        opts.set_headers(&headers.into());

        if let Some(body) = &request.body {
            opts.set_body(&JsValue::from_str(body));
        }

        Request::new_with_str_and_init(&request.url, &opts).map_err(|e| {
            DashError::network(js_detail(&e)).in_op_with("fetch.build", request.url.clone())
        })
    }

    async fn text(response: &Response) -> DashResult<String> {
        let promise = response
            .text()
            .map_err(|e| DashError::network(js_detail(&e)).in_op("fetch.text"))?;

        let text = JsFuture::from(promise)
            .await
            .map_err(|e| DashError::network(js_detail(&e)).in_op("fetch.text"))?;

        text.as_string().ok_or_else(|| {
            DashError::serialization("response body is not a string").in_op("fetch.text")
        })
    }
}

#[async_trait(?Send)]
impl Transport for FetchTransport {
    async fn send(&self, request: HttpRequest) -> DashResult<HttpReply> {
        let js_request = Self::build(&request)?;

        let window = web_sys::window()
            .ok_or_else(|| DashError::network("window is unavailable").in_op("fetch.send"))?;

        let resp_value = JsFuture::from(window.fetch_with_request(&js_request))
            .await
            .map_err(|e| {
                DashError::network(format!("Failed to fetch: {}", js_detail(&e)))
                    .in_op_with("fetch.send", request.url.clone())
            })?;

        let response: Response = resp_value.dyn_into().map_err(|e| {
            DashError::network(format!("unexpected fetch result: {}", js_detail(&e)))
                .in_op("fetch.send")
        })?;

        let body = Self::text(&response).await?;
        Ok(HttpReply::new(response.status(), body))
    }
}
