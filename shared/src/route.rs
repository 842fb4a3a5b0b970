//! 路由定义模块 - 领域模型
//!
//! 纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由、路由表的校验规则以及地址栏片段的解析方式。

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::{DashError, DashResult};

/// 路由标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteName {
    /// 首页
    Home,
    /// 登录页
    Login,
    /// 个人档案 (需要认证)
    Profile,
    /// 统计图表 (需要认证)
    Stats,
    /// 页面未找到
    Error,
}

impl RouteName {
    pub const ALL: [RouteName; 5] = [
        RouteName::Home,
        RouteName::Login,
        RouteName::Profile,
        RouteName::Stats,
        RouteName::Error,
    ];

    /// 从路由名解析，未知名称返回 None
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "home" => Some(Self::Home),
            "login" => Some(Self::Login),
            "profile" => Some(Self::Profile),
            "stats" => Some(Self::Stats),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Login => "login",
            Self::Profile => "profile",
            Self::Stats => "stats",
            Self::Error => "error",
        }
    }
}

impl Display for RouteName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 路由条目，启动时定义，运行期不可变
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub name: RouteName,
    pub path: &'static str,
    pub requires_auth: bool,
}

impl Route {
    pub const fn open(name: RouteName, path: &'static str) -> Self {
        Self {
            name,
            path,
            requires_auth: false,
        }
    }

    pub const fn guarded(name: RouteName, path: &'static str) -> Self {
        Self {
            name,
            path,
            requires_auth: true,
        }
    }
}

const STANDARD_ROUTES: [Route; 5] = [
    Route::open(RouteName::Home, "/"),
    Route::open(RouteName::Login, "/login"),
    Route::guarded(RouteName::Profile, "/profile"),
    Route::guarded(RouteName::Stats, "/stats"),
    Route::open(RouteName::Error, "/error"),
];

/// 有序路由表
///
/// 构造时校验名称与路径唯一，并确认守卫所需的登录、档案、未找到三个角色都存在，
/// 之后这些角色的查找不会失败。
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    login: usize,
    profile: usize,
    not_found: usize,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> DashResult<Self> {
        for (i, route) in routes.iter().enumerate() {
            if !route.path.starts_with('/') {
                return Err(DashError::config(format!(
                    "route '{}' has a path without a leading '/': {}",
                    route.name, route.path
                ))
                .in_op("route_table.new"));
            }
            for other in &routes[..i] {
                if other.name == route.name {
                    return Err(DashError::config(format!(
                        "route '{}' is registered twice",
                        route.name
                    ))
                    .in_op("route_table.new"));
                }
                if other.path == route.path {
                    return Err(DashError::config(format!(
                        "routes '{}' and '{}' share the path {}",
                        other.name, route.name, route.path
                    ))
                    .in_op("route_table.new"));
                }
            }
        }

        let position = |name: RouteName| {
            routes.iter().position(|r| r.name == name).ok_or_else(|| {
                DashError::config(format!("route table is missing the '{}' route", name))
                    .in_op("route_table.new")
            })
        };
        let login = position(RouteName::Login)?;
        let profile = position(RouteName::Profile)?;
        let not_found = position(RouteName::Error)?;

        Ok(Self {
            routes,
            login,
            profile,
            not_found,
        })
    }

    /// 标准路由表: home, login, profile*, stats*, error
    pub fn standard() -> Self {
        Self {
            routes: STANDARD_ROUTES.to_vec(),
            login: 1,
            profile: 2,
            not_found: 4,
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn get(&self, name: RouteName) -> Option<&Route> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// 按路由名字符串查找；不在表中的名称返回 None
    pub fn by_name(&self, name: &str) -> Option<&Route> {
        RouteName::from_name(name).and_then(|n| self.get(n))
    }

    /// 按规范化后的路径查找
    pub fn by_path(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.path == path)
    }

    pub fn login(&self) -> &Route {
        &self.routes[self.login]
    }

    pub fn profile(&self) -> &Route {
        &self.routes[self.profile]
    }

    pub fn not_found(&self) -> &Route {
        &self.routes[self.not_found]
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

// =========================================================
// 地址栏片段 (Hash Location)
// =========================================================

/// 基于 `#/path` 的地址栏表示
pub struct HashLocation;

impl HashLocation {
    /// 将原始片段规范化为路由路径
    ///
    /// `""`, `"#"`, `"#/"` 都对应 `/`；去掉查询串与末尾的 `/`；
    /// 缺少前导 `/` 的片段（如 `#profile`）会被补齐。
    pub fn parse(raw: &str) -> String {
        let fragment = raw.trim().trim_start_matches('#');
        let fragment = fragment.split('?').next().unwrap_or_default();
        let trimmed = fragment.trim_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", trimmed)
        }
    }

    /// 路由路径对应的规范片段
    pub fn format(path: &str) -> String {
        format!("#{}", path)
    }

    /// 地址栏完全没有给出路由（首次打开站点）
    pub fn is_unset(raw: &str) -> bool {
        matches!(raw.trim(), "" | "#")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_resolves_every_name_and_path() {
        let table = RouteTable::standard();
        for name in RouteName::ALL {
            let route = table.get(name).expect("standard route");
            assert_eq!(table.by_path(route.path), Some(route));
            assert_eq!(table.by_name(name.as_str()), Some(route));
        }
        assert_eq!(table.login().name, RouteName::Login);
        assert_eq!(table.profile().name, RouteName::Profile);
        assert_eq!(table.not_found().path, "/error");
    }

    #[test]
    fn standard_table_matches_validated_construction() {
        let validated = RouteTable::new(STANDARD_ROUTES.to_vec()).unwrap();
        let standard = RouteTable::standard();
        assert_eq!(validated.routes(), standard.routes());
        assert_eq!(validated.login(), standard.login());
        assert_eq!(validated.profile(), standard.profile());
        assert_eq!(validated.not_found(), standard.not_found());
    }

    #[test]
    fn guarded_routes() {
        let table = RouteTable::standard();
        let guarded: Vec<_> = table
            .routes()
            .iter()
            .filter(|r| r.requires_auth)
            .map(|r| r.name)
            .collect();
        assert_eq!(guarded, vec![RouteName::Profile, RouteName::Stats]);
    }

    #[test]
    fn unknown_names_do_not_parse() {
        assert_eq!(RouteName::from_name("bogus"), None);
        assert_eq!(RouteName::from_name("Profile"), None);
        assert_eq!(RouteName::from_name(" stats "), None);
        assert_eq!(RouteName::from_name("stats"), Some(RouteName::Stats));
    }

    #[test]
    fn names_missing_from_a_smaller_table_are_absent() {
        let table = RouteTable::new(vec![
            Route::open(RouteName::Home, "/"),
            Route::open(RouteName::Login, "/login"),
            Route::guarded(RouteName::Profile, "/profile"),
            Route::open(RouteName::Error, "/error"),
        ])
        .unwrap();
        assert!(table.by_name("stats").is_none());
        assert!(table.by_path("/stats").is_none());
    }

    #[test]
    fn rejects_duplicate_paths() {
        let err = RouteTable::new(vec![
            Route::open(RouteName::Home, "/"),
            Route::open(RouteName::Login, "/"),
            Route::guarded(RouteName::Profile, "/profile"),
            Route::open(RouteName::Error, "/error"),
        ])
        .unwrap_err();
        assert!(err.message().contains("share the path"));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = RouteTable::new(vec![
            Route::open(RouteName::Login, "/login"),
            Route::open(RouteName::Login, "/signin"),
            Route::guarded(RouteName::Profile, "/profile"),
            Route::open(RouteName::Error, "/error"),
        ])
        .unwrap_err();
        assert!(err.message().contains("registered twice"));
    }

    #[test]
    fn rejects_missing_roles_and_relative_paths() {
        let missing = RouteTable::new(vec![
            Route::open(RouteName::Login, "/login"),
            Route::guarded(RouteName::Profile, "/profile"),
        ])
        .unwrap_err();
        assert!(missing.message().contains("'error'"));

        let relative = RouteTable::new(vec![
            Route::open(RouteName::Login, "login"),
            Route::guarded(RouteName::Profile, "/profile"),
            Route::open(RouteName::Error, "/error"),
        ])
        .unwrap_err();
        assert!(relative.message().contains("leading '/'"));
    }

    #[test]
    fn hash_location_parsing() {
        assert_eq!(HashLocation::parse(""), "/");
        assert_eq!(HashLocation::parse("#"), "/");
        assert_eq!(HashLocation::parse("#/"), "/");
        assert_eq!(HashLocation::parse("#/profile"), "/profile");
        assert_eq!(HashLocation::parse("#/profile/"), "/profile");
        assert_eq!(HashLocation::parse("#profile"), "/profile");
        assert_eq!(HashLocation::parse("#/stats?tab=xp"), "/stats");
        assert_eq!(HashLocation::parse("#/a/b"), "/a/b");
    }

    #[test]
    fn hash_location_round_trips_canonical_paths() {
        for route in RouteTable::standard().routes() {
            let fragment = HashLocation::format(route.path);
            assert_eq!(HashLocation::parse(&fragment), route.path);
        }
    }

    #[test]
    fn unset_location() {
        assert!(HashLocation::is_unset(""));
        assert!(HashLocation::is_unset("#"));
        assert!(!HashLocation::is_unset("#/"));
        assert!(!HashLocation::is_unset("#/login"));
    }
}
