//! 应用服务上下文
//!
//! 会话、认证网关与档案服务在启动时构造一次，通过 Context 共享给视图。
//! 会话对象同时注入到路由器，两者看到的是同一个存储。

use std::sync::Arc;

use leptos::prelude::*;
use xpboard_shared::{
    AppConfig, AuthGateway, DashboardService, GraphqlClient, Session,
};

use crate::web::{FetchTransport, LocalStorage};

#[derive(Clone)]
pub struct AppServices {
    pub config: Arc<AppConfig>,
    pub session: Session,
    pub gateway: Arc<AuthGateway<FetchTransport>>,
    pub dashboard: Arc<DashboardService<FetchTransport>>,
}

impl AppServices {
    pub fn new(config: AppConfig) -> Self {
        let session = Session::new(Arc::new(LocalStorage));
        let gateway = AuthGateway::new(FetchTransport, &config, session.clone());
        let client = GraphqlClient::new(FetchTransport, &config, session.clone());
        let dashboard = DashboardService::new(client, session.clone());
        Self {
            config: Arc::new(config),
            session,
            gateway: Arc::new(gateway),
            dashboard: Arc::new(dashboard),
        }
    }
}

/// 读取构建期配置；配置无效时退回默认值并记录错误
pub fn load_config() -> AppConfig {
    match AppConfig::from_build_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("[Config] {}. Falling back to defaults.", e);
            AppConfig::default()
        }
    }
}

pub fn provide_services(config: AppConfig) -> AppServices {
    let services = AppServices::new(config);
    provide_context(services.clone());
    services
}

/// 从 Context 获取应用服务
pub fn use_services() -> AppServices {
    use_context::<AppServices>().expect("AppServices should be provided")
}
