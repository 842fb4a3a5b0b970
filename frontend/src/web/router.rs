//! 路由服务模块 - 浏览器适配
//!
//! 把共享层的路由状态机接入浏览器：
//! - 地址栏基于 `location.hash`，写入走 History API，不会触发 `hashchange`
//! - 挂载出口是一个信号，`RouterOutlet` 订阅它渲染唯一的当前视图
//! - `hashchange` 与全局点击（`data-route`）监听器在此注册

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use xpboard_shared::Router as CoreRouter;
use xpboard_shared::{AddressBar, Outlet, ROUTE_ATTRIBUTE, RouteName, RouteTable, Session, ViewTicket};

// =========================================================
// 浏览器适配器
// =========================================================

/// 基于 `location.hash` 与 History API 的地址栏
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserAddressBar;

impl AddressBar for BrowserAddressBar {
    fn fragment(&self) -> String {
        web_sys::window()
            .and_then(|w| w.location().hash().ok())
            .unwrap_or_default()
    }

    fn push(&self, fragment: &str) {
        if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
            if history
                .push_state_with_url(&JsValue::NULL, "", Some(fragment))
                .is_err()
            {
                log::warn!("[Router] pushState failed for {}", fragment);
            }
        }
    }

    fn replace(&self, fragment: &str) {
        if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
            if history
                .replace_state_with_url(&JsValue::NULL, "", Some(fragment))
                .is_err()
            {
                log::warn!("[Router] replaceState failed for {}", fragment);
            }
        }
    }
}

/// 挂载出口：写入信号即替换当前视图
#[derive(Clone, Copy)]
pub struct SignalOutlet {
    set_mounted: WriteSignal<Option<ViewTicket>>,
}

impl Outlet for SignalOutlet {
    fn mount(&self, ticket: ViewTicket) {
        self.set_mounted.set(Some(ticket));
    }
}

type BrowserRouter = CoreRouter<BrowserAddressBar, SignalOutlet>;

// =========================================================
// 路由服务
// =========================================================

/// 路由器服务
///
/// 持有共享路由器，视图通过它发起导航。`mounted` 是当前挂载的票据。
#[derive(Clone, Copy)]
pub struct RouterService {
    engine: StoredValue<BrowserRouter>,
    mounted: ReadSignal<Option<ViewTicket>>,
}

impl RouterService {
    fn new(session: Session) -> Self {
        let (mounted, set_mounted) = signal(None::<ViewTicket>);
        let router = CoreRouter::new(
            RouteTable::standard(),
            BrowserAddressBar,
            SignalOutlet { set_mounted },
            session,
        );
        Self {
            engine: StoredValue::new(router),
            mounted,
        }
    }

    /// 当前挂载的票据（只读信号）
    pub fn mounted(&self) -> ReadSignal<Option<ViewTicket>> {
        self.mounted
    }

    /// 会话是否持有令牌；随每次挂载重新计算
    pub fn signed_in(&self) -> Signal<bool> {
        let engine = self.engine;
        let mounted = self.mounted;
        Signal::derive(move || {
            mounted.track();
            engine.with_value(|r| r.session().token().is_some())
        })
    }

    pub fn navigate(&self, name: RouteName) {
        self.engine.with_value(|r| r.navigate(name));
    }

    pub fn navigate_to(&self, name: &str) {
        self.engine.with_value(|r| r.navigate_to(name));
    }

    pub fn logout(&self) {
        self.engine.with_value(|r| r.logout());
    }

    /// 视图发现会话损坏后调用
    pub fn revalidate(&self) {
        self.engine.with_value(|r| r.revalidate());
    }

    fn start(&self) {
        self.engine.with_value(|r| r.start());
    }

    /// 地址栏被用户修改（输入、前进/后退）
    fn init_hashchange_listener(&self) {
        let engine = self.engine;
        let closure = Closure::<dyn Fn()>::new(move || {
            engine.with_value(|r| r.on_location_change());
        });

        if let Some(window) = web_sys::window() {
            if window
                .add_event_listener_with_callback("hashchange", closure.as_ref().unchecked_ref())
                .is_err()
            {
                log::warn!("[Router] Failed to register hashchange listener");
            }
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 全局点击：最近的 `data-route` 祖先元素接管导航
    fn init_link_listener(&self) {
        let engine = self.engine;
        let selector = format!("[{}]", ROUTE_ATTRIBUTE);
        let closure = Closure::<dyn Fn(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
            let Some(element) = ev
                .target()
                .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
            else {
                return;
            };
            let Some(link) = element.closest(&selector).ok().flatten() else {
                return;
            };
            let Some(route) = link.get_attribute(ROUTE_ATTRIBUTE) else {
                return;
            };
            ev.prevent_default();
            engine.with_value(|r| r.activate_link(&route));
        });

        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            if document
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
                .is_err()
            {
                log::warn!("[Router] Failed to register click listener");
            }
        }

        closure.forget();
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(session: Session) -> RouterService {
    let router = RouterService::new(session);

    router.init_hashchange_listener();
    router.init_link_listener();
    provide_context(router);
    router.start();
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
///
/// 提供路由上下文并完成首次挂载，应在 App 根部使用。
#[component]
pub fn Router(
    /// 注入的会话上下文
    session: Session,
    /// 子组件
    children: Children,
) -> impl IntoView {
    provide_router(session);

    children()
}

/// 路由出口组件
///
/// 每次挂载整体替换为新视图。
#[component]
pub fn RouterOutlet(
    /// 视图注册表：接收挂载票据，返回对应视图
    matcher: fn(ViewTicket) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || router.mounted().get().map(matcher)
}
