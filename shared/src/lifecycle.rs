//! 视图生命周期
//!
//! 每次挂载都会推进挂载代数并生成一张 [`ViewTicket`]。视图的异步任务完成时
//! 先检查票据是否仍是当前的，过期结果直接丢弃，避免慢请求覆盖新视图。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::route::RouteName;

/// 挂载出口：唯一的视图容器
///
/// 实现必须用新视图完整替换旧视图的输出，而不是追加。
pub trait Outlet {
    fn mount(&self, ticket: ViewTicket);
}

/// 单调递增的挂载代数
#[derive(Debug, Clone, Default)]
pub struct MountGeneration(Arc<AtomicU64>);

impl MountGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// 推进代数并签发新票据，之前签发的票据全部失效
    pub fn advance(&self, route: RouteName) -> ViewTicket {
        let generation = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        ViewTicket {
            route,
            generation,
            live: self.0.clone(),
        }
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// 一次挂载的凭据
#[derive(Debug, Clone)]
pub struct ViewTicket {
    route: RouteName,
    generation: u64,
    live: Arc<AtomicU64>,
}

impl ViewTicket {
    /// 不受路由管理的票据，永远是当前的
    pub fn detached(route: RouteName) -> Self {
        MountGeneration::new().advance(route)
    }

    pub fn route(&self) -> RouteName {
        self.route
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.live.load(Ordering::SeqCst) == self.generation
    }
}

impl PartialEq for ViewTicket {
    fn eq(&self, other: &Self) -> bool {
        self.route == other.route
            && self.generation == other.generation
            && Arc::ptr_eq(&self.live, &other.live)
    }
}

impl Eq for ViewTicket {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_ticket_invalidates_older() {
        let generation = MountGeneration::new();
        let first = generation.advance(RouteName::Profile);
        assert!(first.is_current());

        let second = generation.advance(RouteName::Stats);
        assert!(!first.is_current());
        assert!(second.is_current());
        assert_eq!(second.generation(), first.generation() + 1);
        assert_eq!(generation.current(), second.generation());
    }

    #[test]
    fn remounting_same_route_still_invalidates() {
        let generation = MountGeneration::new();
        let first = generation.advance(RouteName::Profile);
        let second = generation.advance(RouteName::Profile);
        assert_ne!(first, second);
        assert!(!first.is_current());
    }

    #[test]
    fn detached_tickets_are_independent() {
        let a = ViewTicket::detached(RouteName::Home);
        let b = ViewTicket::detached(RouteName::Home);
        assert!(a.is_current());
        assert!(b.is_current());
        assert_ne!(a, b);
    }
}
