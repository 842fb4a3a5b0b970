//! 会话上下文
//!
//! 会话对象在构造时注入到路由器与数据客户端，取代对全局存储的直接访问。
//! 底层是一个浏览器风格的键值存储：浏览器里是 LocalStorage，测试中是内存表。

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::claims::TokenClaims;
use crate::error::{DashError, DashResult};
use crate::profile::ProfileAggregate;
use crate::route::RouteName;
use crate::{STORAGE_LAST_VIEW_KEY, STORAGE_PROFILE_KEY, STORAGE_TOKEN_KEY};

// =========================================================
// 抽象接口定义
// =========================================================

/// 持久化键值存储
///
/// - `get` 返回不存在或字符串
/// - `set` 覆盖旧值
/// - `remove` 幂等，删除不存在的键不是错误
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> bool;
    fn remove(&self, key: &str) -> bool;
}

// =========================================================
// 内存实现 (MemoryStore)
// =========================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        match self.map.lock() {
            Ok(mut map) => {
                map.insert(key.to_string(), value.to_string());
                true
            }
            Err(_) => false,
        }
    }

    fn remove(&self, key: &str) -> bool {
        match self.map.lock() {
            Ok(mut map) => {
                map.remove(key);
                true
            }
            Err(_) => false,
        }
    }
}

// =========================================================
// 会话
// =========================================================

#[derive(Clone)]
pub struct Session {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("has_token", &self.token().is_some())
            .finish()
    }
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    // --- 令牌 ---

    /// 存储中的令牌；空白值视为不存在
    pub fn token(&self) -> Option<String> {
        self.store
            .get(STORAGE_TOKEN_KEY)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }

    pub fn store_token(&self, token: &str) {
        if !self.store.set(STORAGE_TOKEN_KEY, token.trim()) {
            log::warn!("[Session] Failed to persist token");
        }
    }

    pub fn clear_token(&self) {
        self.store.remove(STORAGE_TOKEN_KEY);
    }

    /// 解码当前令牌；没有令牌时返回 `Ok(None)`
    pub fn claims(&self) -> DashResult<Option<TokenClaims>> {
        self.token()
            .map(|token| TokenClaims::decode(&token))
            .transpose()
    }

    /// 会话在 `now` 时刻是否有效
    ///
    /// 令牌格式错误或已过期时会被强制清除，连同缓存的档案一起。
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match self.claims() {
            Ok(Some(claims)) if !claims.is_expired_at(now) => true,
            Ok(Some(_)) => {
                log::warn!("[Session] Token expired. Clearing session.");
                self.invalidate();
                false
            }
            Ok(None) => false,
            Err(e) => {
                log::warn!("[Session] Malformed token ({}). Clearing session.", e);
                self.invalidate();
                false
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// 令牌中的用户标识；令牌损坏时清除会话并返回错误
    pub fn user_id(&self) -> DashResult<Option<String>> {
        match self.claims() {
            Ok(claims) => Ok(claims.and_then(|c| c.user_id())),
            Err(e) => {
                self.invalidate();
                Err(e.in_op("session.user_id"))
            }
        }
    }

    fn invalidate(&self) {
        self.clear_token();
        self.discard_profile();
    }

    // --- 最近访问的视图 ---

    pub fn remember_view(&self, route: RouteName) {
        self.store.set(STORAGE_LAST_VIEW_KEY, route.as_str());
    }

    pub fn last_view(&self) -> Option<RouteName> {
        self.store
            .get(STORAGE_LAST_VIEW_KEY)
            .and_then(|name| RouteName::from_name(&name))
    }

    // --- 档案缓存 ---

    pub fn cache_profile(&self, profile: &ProfileAggregate) -> DashResult<()> {
        let json = serde_json::to_string(profile)
            .map_err(|e| DashError::from(e).in_op("session.cache_profile"))?;
        if self.store.set(STORAGE_PROFILE_KEY, &json) {
            Ok(())
        } else {
            Err(DashError::serialization("profile cache could not be written")
                .in_op("session.cache_profile"))
        }
    }

    /// 缓存的档案；内容损坏时丢弃缓存
    pub fn cached_profile(&self) -> Option<ProfileAggregate> {
        let raw = self.store.get(STORAGE_PROFILE_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                log::warn!("[Session] Discarding unreadable profile cache: {}", e);
                self.discard_profile();
                None
            }
        }
    }

    pub fn discard_profile(&self) {
        self.store.remove(STORAGE_PROFILE_KEY);
    }

    /// 注销：清除令牌、最近视图与档案缓存
    pub fn clear(&self) {
        self.clear_token();
        self.store.remove(STORAGE_LAST_VIEW_KEY);
        self.discard_profile();
    }
}
