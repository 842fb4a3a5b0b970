//! xpboard 共享核心
//!
//! 不依赖 DOM 的领域层：路由表与路由状态机、视图生命周期、会话上下文、
//! 认证网关、GraphQL 客户端、档案聚合与图表几何。
//! 所有浏览器副作用都通过 trait 注入，因此整个核心可以在原生环境下测试。

pub mod auth;
pub mod chart;
pub mod claims;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod graphql;
pub mod lifecycle;
pub mod profile;
pub mod route;
pub mod router;
pub mod session;
pub mod transport;

pub use chrono;

pub use auth::AuthGateway;
pub use config::AppConfig;
pub use dashboard::DashboardService;
pub use error::{DashError, DashErrorStatus, DashResult};
pub use graphql::GraphqlClient;
pub use lifecycle::{MountGeneration, Outlet, ViewTicket};
pub use profile::ProfileAggregate;
pub use route::{Route, RouteName, RouteTable};
pub use router::{AddressBar, Router};
pub use session::{KeyValueStore, MemoryStore, Session};
pub use transport::{HttpReply, HttpRequest, Transport};

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const DEFAULT_API_ORIGIN: &str = "https://learn.reboot01.com";
pub const SIGNIN_PATH: &str = "/api/auth/signin";
pub const GRAPHQL_PATH: &str = "/api/graphql-engine/v1/graphql";
/// XP 曲线默认只展示最近 6 个月
pub const DEFAULT_XP_CHART_MONTHS: u32 = 6;

pub const STORAGE_TOKEN_KEY: &str = "xpboard.token";
pub const STORAGE_LAST_VIEW_KEY: &str = "xpboard.last_view";
pub const STORAGE_PROFILE_KEY: &str = "xpboard.profile";

/// 页内导航元素携带的路由属性
pub const ROUTE_ATTRIBUTE: &str = "data-route";
pub const HASURA_CLAIMS_NAMESPACE: &str = "https://hasura.io/jwt/claims";
