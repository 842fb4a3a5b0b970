//! 路由器 - 核心状态机
//!
//! 实现了"请求 -> 解析 -> 守卫 -> 同步地址栏 -> 挂载"的导航流程。
//! 导航状态只存在于地址栏中，每次地址栏事件都重新推导当前路由；
//! 内存里唯一的状态是挂载代数。
//!
//! 地址栏与挂载出口都通过 trait 注入，浏览器与测试各有实现。

use std::sync::Mutex;

use crate::lifecycle::{MountGeneration, Outlet, ViewTicket};
use crate::route::{HashLocation, Route, RouteName, RouteTable};
use crate::session::Session;

// =========================================================
// 抽象接口定义
// =========================================================

/// 地址栏
///
/// `push` 与 `replace` 不会触发位置变化事件，
/// 只有用户操作（输入、前进/后退）才会回调 [`Router::on_location_change`]。
pub trait AddressBar {
    /// 当前原始片段，如 `#/profile`，没有片段时为空串
    fn fragment(&self) -> String;
    /// 新增一条历史记录
    fn push(&self, fragment: &str);
    /// 替换当前历史记录
    fn replace(&self, fragment: &str);
}

// =========================================================
// 纯解析 (Resolution)
// =========================================================

/// 导航请求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request<'a> {
    /// 路由名，来自程序调用或 `data-route` 属性
    Name(&'a str),
    /// 规范化后的地址栏路径
    Path(&'a str),
    Route(RouteName),
}

/// 守卫或解析造成的替换
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Substitution {
    None,
    /// 已登录时访问登录页
    AlreadyAuthenticated,
    /// 未登录时访问受保护页
    AuthRequired,
    /// 名称或路径不在路由表中
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub route: Route,
    pub substitution: Substitution,
}

impl Resolution {
    /// 地址栏应显示的规范片段
    pub fn fragment(&self) -> String {
        HashLocation::format(self.route.path)
    }
}

/// 解析请求并应用认证守卫
///
/// 结果只取决于请求、会话是否有效与路由表，同样的输入总得到同样的结果。
pub fn resolve(table: &RouteTable, request: Request<'_>, authenticated: bool) -> Resolution {
    let found = match request {
        Request::Name(name) => table.by_name(name),
        Request::Path(path) => table.by_path(path),
        Request::Route(name) => table.get(name),
    };

    let Some(requested) = found else {
        return Resolution {
            route: *table.not_found(),
            substitution: Substitution::NotFound,
        };
    };

    if requested.name == RouteName::Login && authenticated {
        return Resolution {
            route: *table.profile(),
            substitution: Substitution::AlreadyAuthenticated,
        };
    }

    if requested.requires_auth && !authenticated {
        return Resolution {
            route: *table.login(),
            substitution: Substitution::AuthRequired,
        };
    }

    Resolution {
        route: *requested,
        substitution: Substitution::None,
    }
}

// =========================================================
// 路由器
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryWrite {
    Push,
    Replace,
}

pub struct Router<B, O> {
    table: RouteTable,
    bar: B,
    outlet: O,
    session: Session,
    generation: MountGeneration,
    current: Mutex<Option<ViewTicket>>,
}

impl<B: AddressBar, O: Outlet> Router<B, O> {
    pub fn new(table: RouteTable, bar: B, outlet: O, session: Session) -> Self {
        Self {
            table,
            bar,
            outlet,
            session,
            generation: MountGeneration::new(),
            current: Mutex::new(None),
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn address_bar(&self) -> &B {
        &self.bar
    }

    /// 最近一次挂载的票据
    pub fn current(&self) -> Option<ViewTicket> {
        self.current.lock().ok().and_then(|current| current.clone())
    }

    /// 应用启动
    ///
    /// 地址栏没有给出路由、会话有效且记得上次访问的受保护页面时，恢复到该页面。
    pub fn start(&self) -> ViewTicket {
        let raw = self.bar.fragment();
        let authenticated = self.session.is_valid();

        let restored = if HashLocation::is_unset(&raw) && authenticated {
            self.session
                .last_view()
                .filter(|name| self.table.get(*name).is_some_and(|r| r.requires_auth))
        } else {
            None
        };

        let resolution = match restored {
            Some(name) => {
                log::debug!("[Router] Restoring last view: {}", name);
                resolve(&self.table, Request::Route(name), authenticated)
            }
            None => {
                let path = HashLocation::parse(&raw);
                resolve(&self.table, Request::Path(&path), authenticated)
            }
        };
        self.commit(resolution, HistoryWrite::Replace)
    }

    /// 地址栏变化（输入、前进/后退）
    pub fn on_location_change(&self) -> ViewTicket {
        let path = HashLocation::parse(&self.bar.fragment());
        let resolution = resolve(&self.table, Request::Path(&path), self.session.is_valid());
        self.commit(resolution, HistoryWrite::Replace)
    }

    /// 按路由名导航，未知名称进入未找到页
    pub fn navigate_to(&self, name: &str) -> ViewTicket {
        let resolution = resolve(&self.table, Request::Name(name), self.session.is_valid());
        self.commit(resolution, HistoryWrite::Push)
    }

    pub fn navigate(&self, name: RouteName) -> ViewTicket {
        let resolution = resolve(&self.table, Request::Route(name), self.session.is_valid());
        self.commit(resolution, HistoryWrite::Push)
    }

    /// 页内链接激活，参数为元素上 `data-route` 的值
    pub fn activate_link(&self, attribute: &str) -> ViewTicket {
        log::debug!("[Router] Link activated: {}", attribute);
        // 属性值两端的空白来自标记书写
        self.navigate_to(attribute.trim())
    }

    /// 注销并回到登录页
    pub fn logout(&self) -> ViewTicket {
        self.session.clear();
        log::info!("[Router] Logged out");
        self.navigate(RouteName::Login)
    }

    /// 会话状态在路由之外发生变化后重新评估当前位置
    pub fn revalidate(&self) -> ViewTicket {
        self.on_location_change()
    }

    fn commit(&self, resolution: Resolution, write: HistoryWrite) -> ViewTicket {
        let route = resolution.route;

        match resolution.substitution {
            Substitution::None => {}
            Substitution::AuthRequired => {
                log::debug!("[Router] Access denied. Redirecting to {}.", route.name);
                self.session.discard_profile();
            }
            Substitution::AlreadyAuthenticated => {
                log::debug!("[Router] Already authenticated. Redirecting to {}.", route.name);
            }
            Substitution::NotFound => {
                log::debug!("[Router] No matching route. Showing {}.", route.name);
            }
        }

        if route.requires_auth {
            self.session.remember_view(route.name);
        }

        let fragment = resolution.fragment();
        if self.bar.fragment() != fragment {
            match write {
                HistoryWrite::Push => self.bar.push(&fragment),
                HistoryWrite::Replace => self.bar.replace(&fragment),
            }
        }

        let ticket = self.generation.advance(route.name);
        if let Ok(mut current) = self.current.lock() {
            *current = Some(ticket.clone());
        }
        log::debug!(
            "[Router] Mounting {} (generation {})",
            route.name,
            ticket.generation()
        );
        self.outlet.mount(ticket.clone());
        ticket
    }
}
