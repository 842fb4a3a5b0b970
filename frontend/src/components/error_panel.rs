//! 视图内联错误面板
//!
//! 视图自己持有错误状态；面板只负责展示，操作按钮由调用方传入。

use crate::components::icons::AlertTriangle;
use leptos::prelude::*;

/// 视图的异步加载状态
#[derive(Debug, Clone)]
pub enum LoadState<T> {
    Loading,
    Ready(T),
    Failed(LoadFailure),
}

#[derive(Debug, Clone)]
pub struct LoadFailure {
    pub message: String,
    pub debug: Vec<(&'static str, String)>,
}

#[component]
pub fn LoadingPanel(message: &'static str) -> impl IntoView {
    view! {
        <div class="flex flex-col items-center justify-center gap-4 min-h-[40vh]">
            <span class="loading loading-spinner loading-lg text-primary"></span>
            <p class="text-base-content/70">{message}</p>
        </div>
    }
}

#[component]
pub fn ErrorPanel(
    title: &'static str,
    #[prop(into)] message: String,
    /// 调试信息（键, 值），为空时不显示折叠区
    #[prop(optional)]
    debug: Vec<(&'static str, String)>,
    /// 操作按钮
    children: Children,
) -> impl IntoView {
    let details = (!debug.is_empty()).then(|| {
        view! {
            <details class="collapse collapse-arrow bg-base-200 mt-2">
                <summary class="collapse-title text-sm font-medium">"Debug information"</summary>
                <div class="collapse-content text-sm">
                    <ul class="font-mono">
                        {debug
                            .into_iter()
                            .map(|(key, value)| view! { <li>{key} ": " {value}</li> })
                            .collect_view()}
                    </ul>
                </div>
            </details>
        }
    });

    view! {
        <div class="card bg-base-100 shadow-xl max-w-2xl mx-auto">
            <div class="card-body">
                <div role="alert" class="alert alert-error">
                    <AlertTriangle attr:class="h-6 w-6 shrink-0" />
                    <div>
                        <h2 class="font-bold">{title}</h2>
                        <p class="text-sm">{message}</p>
                    </div>
                </div>
                {details}
                <div class="card-actions justify-end mt-4">{children()}</div>
            </div>
        </div>
    }
}
