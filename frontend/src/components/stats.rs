use crate::components::charts::{GradeBarChart, PassFailDonut, XpLineChart};
use crate::components::error_panel::{ErrorPanel, LoadFailure, LoadState, LoadingPanel};
use crate::components::icons::RefreshCw;
use crate::services::use_services;
use crate::web::router::use_router;
use leptos::prelude::*;
use leptos::task::spawn_local;
use xpboard_shared::profile::{ProfileAggregate, group_thousands};
use xpboard_shared::ViewTicket;

/// 柱状图最多展示的科目数
const CHART_SUBJECTS: usize = 12;

#[component]
pub fn StatsPage(ticket: ViewTicket) -> impl IntoView {
    let services = StoredValue::new(use_services());
    let router = use_router();
    let ticket = StoredValue::new(ticket);
    let months = services.with_value(|s| s.config.xp_chart_months);

    let state = RwSignal::new(LoadState::<ProfileAggregate>::Loading);

    // 重试时跳过缓存
    let load = move |fresh: bool| {
        let services = services.get_value();
        let ticket = ticket.get_value();

        state.set(LoadState::Loading);
        spawn_local(async move {
            let result = if fresh {
                services.dashboard.load_profile().await
            } else {
                services.dashboard.profile_for_stats().await
            };
            if !ticket.is_current() {
                return;
            }
            match result {
                Ok(profile) => state.set(LoadState::Ready(profile)),
                Err(e) if e.requires_reauth() => {
                    log::warn!("[Stats] Session rejected: {}", e);
                    services.session.clear_token();
                    router.revalidate();
                }
                Err(e) => {
                    log::warn!("[Stats] Failed to load statistics: {}", e);
                    state.set(LoadState::Failed(LoadFailure {
                        message: e.message().to_string(),
                        debug: Vec::new(),
                    }));
                }
            }
        });
    };

    load(false);

    move || match state.get() {
        LoadState::Loading => view! { <LoadingPanel message="Loading statistics..." /> }.into_any(),
        LoadState::Ready(profile) => view! { <StatsContent profile=profile months=months /> }.into_any(),
        LoadState::Failed(failure) => view! {
            <ErrorPanel title="Error Loading Statistics" message=failure.message>
                <button on:click=move |_| load(true) class="btn btn-primary gap-2">
                    <RefreshCw attr:class="h-4 w-4" /> "Retry"
                </button>
                <button data-route="profile" class="btn btn-ghost">"Return to Profile"</button>
                <button data-route="home" class="btn btn-ghost">"Return Home"</button>
            </ErrorPanel>
        }
        .into_any(),
    }
}

#[component]
fn StatsContent(profile: ProfileAggregate, months: u32) -> impl IntoView {
    let average = profile
        .stats
        .average_grade
        .map(|g| format!("{:.2}", g))
        .unwrap_or_else(|| "n/a".to_string());
    let window = match months {
        0 => "All time".to_string(),
        1 => "Last month".to_string(),
        m => format!("Last {} months", m),
    };
    let chart_grades = profile.recent_grades(CHART_SUBJECTS).to_vec();

    view! {
        <div class="space-y-6">
            <div class="flex flex-wrap items-center justify-between gap-4">
                <h2 class="text-2xl font-bold">{format!("{}'s Statistics", profile.login)}</h2>
                <div class="flex gap-2">
                    <button data-route="profile" class="btn btn-sm">"Back to Profile"</button>
                    <button data-route="home" class="btn btn-sm btn-ghost">"Home"</button>
                </div>
            </div>

            <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                <div class="stat">
                    <div class="stat-title">"Total XP"</div>
                    <div class="stat-value text-primary">{group_thousands(profile.total_xp)}</div>
                    <div class="stat-desc">{format!("Level {}", profile.level.level)}</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"Grades"</div>
                    <div class="stat-value">{profile.grades.len()}</div>
                    <div class="stat-desc">"Subjects"</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"Average Grade"</div>
                    <div class="stat-value">{average}</div>
                </div>
            </div>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h3 class="card-title">"XP Progress"</h3>
                    <p class="text-sm text-base-content/60">{window}</p>
                    <XpLineChart history=profile.xp_history.clone() months=months />
                </div>
            </div>

            <div class="grid gap-6 lg:grid-cols-2">
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"Grade Performance"</h3>
                        <GradeBarChart grades=chart_grades />
                    </div>
                </div>
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"Pass / Fail"</h3>
                        <PassFailDonut passed=profile.stats.passed_projects failed=profile.stats.failed_projects />
                    </div>
                </div>
            </div>
        </div>
    }
}
