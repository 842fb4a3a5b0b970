//! xpboard 前端应用
//!
//! 采用 Context-Driven 的架构：
//! - `web::router`: 路由服务（把共享状态机接入浏览器）
//! - `services`: 会话、认证网关与档案服务
//! - `components`: 视图注册表与 UI 组件

mod components {
    pub mod charts;
    pub mod error_panel;
    pub mod footer;
    pub mod home;
    mod icons;
    pub mod login;
    pub mod navbar;
    pub mod not_found;
    pub mod profile;
    pub mod stats;
}
mod services;

use crate::components::footer::Footer;
use crate::components::home::HomePage;
use crate::components::login::LoginPage;
use crate::components::navbar::Navbar;
use crate::components::not_found::NotFoundPage;
use crate::components::profile::ProfilePage;
use crate::components::stats::StatsPage;
use crate::services::{load_config, provide_services};

use leptos::prelude::*;
use xpboard_shared::{RouteName, ViewTicket};

// 原生 Web API 封装模块
// 对浏览器 API 的轻量级封装，实现共享层定义的 trait。
pub(crate) mod web {
    mod http;
    pub mod router;
    mod storage;

    pub use http::FetchTransport;
    pub use storage::LocalStorage;
}

use web::router::{Router, RouterOutlet};

/// 视图注册表
///
/// 路由标识到视图组件的穷尽匹配，新增路由时编译器会要求补上视图。
fn route_matcher(ticket: ViewTicket) -> AnyView {
    match ticket.route() {
        RouteName::Home => view! { <HomePage /> }.into_any(),
        RouteName::Login => view! { <LoginPage ticket=ticket /> }.into_any(),
        RouteName::Profile => view! { <ProfilePage ticket=ticket /> }.into_any(),
        RouteName::Stats => view! { <StatsPage ticket=ticket /> }.into_any(),
        RouteName::Error => view! { <NotFoundPage /> }.into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 构造服务并放入 Context
    let services = provide_services(load_config());

    // 2. 路由器共享同一个会话
    view! {
        <Router session=services.session.clone()>
            <div class="min-h-screen flex flex-col bg-base-200">
                <Navbar />
                <main class="flex-1 w-full max-w-6xl mx-auto p-4 md:p-8">
                    <RouterOutlet matcher=route_matcher />
                </main>
                <Footer />
            </div>
        </Router>
    }
}
