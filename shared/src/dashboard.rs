//! 档案服务
//!
//! 拉取原始记录、转换为聚合并写入会话缓存。统计视图优先读缓存。

use crate::error::DashResult;
use crate::graphql::GraphqlClient;
use crate::profile::ProfileAggregate;
use crate::session::Session;
use crate::transport::Transport;

pub struct DashboardService<T> {
    client: GraphqlClient<T>,
    session: Session,
}

impl<T: Transport> DashboardService<T> {
    pub fn new(client: GraphqlClient<T>, session: Session) -> Self {
        Self { client, session }
    }

    /// 从网络加载档案并刷新缓存
    ///
    /// 请求期间令牌变化（注销或换号登录）时结果照常返回，但不写缓存。
    pub async fn load_profile(&self) -> DashResult<ProfileAggregate> {
        let token = self.session.token();
        let data = self
            .client
            .fetch_profile_data()
            .await
            .map_err(|e| e.in_op("dashboard.load_profile"))?;
        let profile = ProfileAggregate::from_raw(data).map_err(|e| e.in_op("dashboard.load_profile"))?;

        if self.session.token() != token {
            log::debug!("[Dashboard] Session changed during fetch. Not caching.");
        } else if let Err(e) = self.session.cache_profile(&profile) {
            // 缓存失败不影响本次展示
            log::warn!("[Dashboard] Failed to cache profile: {}", e);
        }
        log::debug!(
            "[Dashboard] Loaded profile for {} ({} XP)",
            profile.login,
            profile.total_xp
        );
        Ok(profile)
    }

    /// 统计视图使用：有缓存时不发请求
    pub async fn profile_for_stats(&self) -> DashResult<ProfileAggregate> {
        if let Some(profile) = self.session.cached_profile() {
            log::debug!("[Dashboard] Using cached profile");
            return Ok(profile);
        }
        self.load_profile().await
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}
