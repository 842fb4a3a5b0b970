use crate::components::charts::LevelRing;
use crate::components::error_panel::{ErrorPanel, LoadFailure, LoadState, LoadingPanel};
use crate::components::icons::{ChartLine, LogOut, RefreshCw, User};
use crate::services::use_services;
use crate::web::router::use_router;
use leptos::prelude::*;
use leptos::task::spawn_local;
use xpboard_shared::profile::{Outcome, ProfileAggregate, group_thousands};
use xpboard_shared::ViewTicket;

const RECENT_ITEMS: usize = 10;

#[component]
pub fn ProfilePage(ticket: ViewTicket) -> impl IntoView {
    let services = StoredValue::new(use_services());
    let router = use_router();
    let ticket = StoredValue::new(ticket);

    let state = RwSignal::new(LoadState::<ProfileAggregate>::Loading);

    let load = move || {
        let services = services.get_value();
        let ticket = ticket.get_value();

        state.set(LoadState::Loading);
        spawn_local(async move {
            // 令牌损坏时会话已被清除，交给路由器重新评估
            let user_id = match services.session.user_id() {
                Ok(id) => id,
                Err(e) => {
                    log::warn!("[Profile] {}", e);
                    if ticket.is_current() {
                        router.revalidate();
                    }
                    return;
                }
            };

            let result = services.dashboard.load_profile().await;
            if !ticket.is_current() {
                return;
            }
            match result {
                Ok(profile) => state.set(LoadState::Ready(profile)),
                Err(e) if e.requires_reauth() => {
                    log::warn!("[Profile] Session rejected: {}", e);
                    services.session.clear_token();
                    router.revalidate();
                }
                Err(e) => {
                    log::warn!("[Profile] Failed to load profile: {}", e);
                    state.set(LoadState::Failed(LoadFailure {
                        message: e.message().to_string(),
                        debug: vec![
                            ("token present", services.session.token().is_some().to_string()),
                            ("user id", user_id.unwrap_or_else(|| "unknown".to_string())),
                            ("error", e.error_code().to_string()),
                        ],
                    }));
                }
            }
        });
    };

    load();

    move || match state.get() {
        LoadState::Loading => view! { <LoadingPanel message="Loading your profile..." /> }.into_any(),
        LoadState::Ready(profile) => view! { <ProfileContent profile=profile /> }.into_any(),
        LoadState::Failed(failure) => view! {
            <ErrorPanel title="Error Loading Profile" message=failure.message debug=failure.debug>
                <button on:click=move |_| load() class="btn btn-primary gap-2">
                    <RefreshCw attr:class="h-4 w-4" /> "Retry"
                </button>
                <button data-route="home" class="btn btn-ghost">"Return Home"</button>
                <button data-route="login" class="btn btn-ghost">"Login Again"</button>
            </ErrorPanel>
        }
        .into_any(),
    }
}

#[component]
fn ProfileContent(profile: ProfileAggregate) -> impl IntoView {
    let router = use_router();
    let stats = profile.stats.clone();
    let remaining = profile.level.remaining_xp(profile.total_xp);
    let no_grades = profile.grades.is_empty();

    let grades = profile
        .recent_grades(RECENT_ITEMS)
        .iter()
        .map(|g| {
            let badge = match g.status {
                Outcome::Passed => "badge badge-success",
                Outcome::Failed => "badge badge-error",
                Outcome::Pending => "badge badge-ghost",
            };
            let score = g
                .score
                .map(|s| format!("{:.2}", s))
                .unwrap_or_else(|| "-".to_string());
            view! {
                <tr>
                    <td>{g.subject.clone()}</td>
                    <td>{score}</td>
                    <td><span class=badge>{g.status.label()}</span></td>
                    <td class="text-base-content/60">{g.date.clone()}</td>
                </tr>
            }
        })
        .collect_view();

    let audits = profile
        .recent_audits(RECENT_ITEMS)
        .iter()
        .map(|a| {
            view! {
                <li class="flex justify-between py-1">
                    <span>{a.title.clone()}</span>
                    <span class="text-base-content/60">{format!("{} · {}", a.status.audit_label(), a.date)}</span>
                </li>
            }
        })
        .collect_view();

    view! {
        <div class="space-y-6">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body md:flex-row md:items-center gap-6">
                    <div class="flex-1 space-y-1">
                        <h2 class="card-title text-2xl gap-2">
                            <User attr:class="h-6 w-6 text-primary" />
                            {profile.login.clone()}
                        </h2>
                        <p class="text-base-content/60">"ID: " {profile.id}</p>
                        <p class="text-lg">
                            <strong>"Total XP: "</strong>
                            {group_thousands(profile.total_xp)}
                        </p>
                        <p class="text-sm text-base-content/60">
                            {format!("{} XP to level {}", group_thousands(remaining), profile.level.level + 1)}
                        </p>
                    </div>
                    <LevelRing level=profile.level />
                    <div class="flex flex-col gap-2">
                        <button data-route="stats" class="btn btn-primary gap-2">
                            <ChartLine attr:class="h-4 w-4" /> "View Statistics"
                        </button>
                        <button on:click=move |_| router.logout() class="btn btn-outline btn-error gap-2">
                            <LogOut attr:class="h-4 w-4" /> "Logout"
                        </button>
                    </div>
                </div>
            </div>

            <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                <div class="stat">
                    <div class="stat-title">"Total Projects"</div>
                    <div class="stat-value">{stats.total_projects}</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"Passed Projects"</div>
                    <div class="stat-value text-success">{stats.passed_projects}</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"Success Rate"</div>
                    <div class="stat-value">{format!("{}%", stats.success_rate)}</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"Audit Ratio"</div>
                    <div class="stat-value">{format!("{}%", stats.audit_ratio)}</div>
                </div>
            </div>

            <div class="grid gap-6 lg:grid-cols-2">
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"Recent Grades"</h3>
                        <div class="overflow-x-auto">
                            <table class="table table-zebra">
                                <thead>
                                    <tr>
                                        <th>"Subject"</th>
                                        <th>"Score"</th>
                                        <th>"Status"</th>
                                        <th>"Date"</th>
                                    </tr>
                                </thead>
                                <tbody>{grades}</tbody>
                            </table>
                        </div>
                        {no_grades.then(|| view! { <p class="text-center text-base-content/50">"No grades yet"</p> })}
                    </div>
                </div>
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"Recent Audits"</h3>
                        <ul class="divide-y divide-base-200">{audits}</ul>
                    </div>
                </div>
            </div>
        </div>
    }
}
