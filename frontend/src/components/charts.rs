//! SVG 图表组件
//!
//! 坐标全部来自 `xpboard_shared::chart`，这里只负责把几何结果画成 SVG。

use leptos::prelude::*;
use xpboard_shared::chart::{self, Frame};
use xpboard_shared::chrono::Utc;
use xpboard_shared::profile::{GradeEntry, LevelProgress, Outcome, XpEntry};

fn px(value: f64) -> String {
    format!("{:.1}", value)
}

fn empty_chart(message: &'static str) -> AnyView {
    view! { <p class="text-center text-base-content/50 py-8">{message}</p> }.into_any()
}

fn outcome_fill(status: Outcome) -> &'static str {
    match status {
        Outcome::Passed => "fill-success",
        Outcome::Failed => "fill-error",
        Outcome::Pending => "fill-base-300",
    }
}

/// 累计 XP 折线
#[component]
pub fn XpLineChart(history: Vec<XpEntry>, months: u32) -> impl IntoView {
    let Some(line) = chart::xp_line(&history, months, Utc::now(), Frame::default()) else {
        return empty_chart("No XP history data available");
    };
    let frame = line.frame;
    let left = px(frame.margin.left);
    let right = px(frame.width - frame.margin.right);
    let baseline = px(frame.baseline());

    view! {
        <svg viewBox=frame.view_box() class="w-full h-auto" role="img" aria-label="Cumulative XP">
            {line
                .y_ticks
                .iter()
                .map(|tick| {
                    let y = px(tick.position);
                    view! {
                        <g>
                            <line x1=left.clone() x2=right.clone() y1=y.clone() y2=y.clone() class="stroke-base-300" stroke-dasharray="4 4" />
                            <text x=px(frame.margin.left - 6.0) y=y text-anchor="end" dominant-baseline="middle" class="fill-base-content/60 text-[10px]">
                                {tick.label.clone()}
                            </text>
                        </g>
                    }
                })
                .collect_view()}
            <path d=line.area_path.clone() class="fill-primary/15" />
            <path d=line.line_path.clone() fill="none" class="stroke-primary" stroke-width="2" />
            {line
                .points
                .iter()
                .map(|p| view! { <circle cx=px(p.x) cy=px(p.y) r="3" class="fill-primary" /> })
                .collect_view()}
            {line
                .x_ticks
                .iter()
                .map(|tick| {
                    view! {
                        <text x=px(tick.position) y=px(frame.baseline() + 18.0) text-anchor="middle" class="fill-base-content/60 text-[10px]">
                            {tick.label.clone()}
                        </text>
                    }
                })
                .collect_view()}
            <line x1=left.clone() x2=right y1=baseline.clone() y2=baseline class="stroke-base-content/40" />
        </svg>
    }
    .into_any()
}

/// 成绩柱状图
#[component]
pub fn GradeBarChart(grades: Vec<GradeEntry>) -> impl IntoView {
    let Some(bars) = chart::grade_bars(&grades, Frame::default()) else {
        return empty_chart("No grades data available");
    };
    let frame = bars.frame;
    let baseline = px(frame.baseline());

    view! {
        <svg viewBox=frame.view_box() class="w-full h-auto" role="img" aria-label="Grades">
            {bars
                .y_ticks
                .iter()
                .map(|tick| {
                    view! {
                        <text x=px(frame.margin.left - 6.0) y=px(tick.position) text-anchor="end" dominant-baseline="middle" class="fill-base-content/60 text-[10px]">
                            {tick.label.clone()}
                        </text>
                    }
                })
                .collect_view()}
            {bars
                .bars
                .iter()
                .map(|bar| {
                    let center = bar.x + bar.width / 2.0;
                    view! {
                        <g>
                            <rect x=px(bar.x) y=px(bar.y) width=px(bar.width) height=px(bar.height) class=outcome_fill(bar.status) />
                            <text x=px(center) y=px(bar.y - 4.0) text-anchor="middle" class="fill-base-content/70 text-[9px]">
                                {format!("{:.2}", bar.value)}
                            </text>
                            <text
                                x=px(center)
                                y=px(frame.baseline() + 12.0)
                                text-anchor="end"
                                transform=format!("rotate(-45 {} {})", px(center), px(frame.baseline() + 12.0))
                                class="fill-base-content/60 text-[9px]"
                            >
                                {bar.label.clone()}
                            </text>
                        </g>
                    }
                })
                .collect_view()}
            <line x1=px(frame.margin.left) x2=px(frame.width - frame.margin.right) y1=baseline.clone() y2=baseline class="stroke-base-content/40" />
        </svg>
    }
    .into_any()
}

/// 通过/未通过环形图
#[component]
pub fn PassFailDonut(passed: usize, failed: usize) -> impl IntoView {
    let Some(donut) = chart::pass_fail_donut(passed, failed, 200.0) else {
        return empty_chart("No graded projects yet");
    };
    let center = px(donut.size / 2.0);

    view! {
        <div class="flex flex-col items-center gap-4">
            <svg viewBox=format!("0 0 {0} {0}", donut.size) class="w-48 h-48" role="img" aria-label="Pass and fail ratio">
                {donut
                    .slices
                    .iter()
                    .map(|slice| view! { <path d=slice.path.clone() class=outcome_fill(slice.status) /> })
                    .collect_view()}
                <text x=center.clone() y=center text-anchor="middle" dominant-baseline="middle" class="fill-base-content text-2xl font-bold">
                    {donut.total}
                </text>
            </svg>
            <ul class="flex gap-4 text-sm">
                {donut
                    .slices
                    .iter()
                    .map(|slice| {
                        view! {
                            <li class="flex items-center gap-1">
                                <svg viewBox="0 0 10 10" class="w-3 h-3">
                                    <rect width="10" height="10" class=outcome_fill(slice.status) />
                                </svg>
                                {format!("{} {} ({:.0}%)", slice.status.label(), slice.count, slice.percent)}
                            </li>
                        }
                    })
                    .collect_view()}
            </ul>
        </div>
    }
    .into_any()
}

/// 等级进度环
#[component]
pub fn LevelRing(level: LevelProgress) -> impl IntoView {
    let ring = chart::progress_ring(level.percent, 52.0);

    view! {
        <div class="relative w-32 h-32">
            <svg viewBox="0 0 120 120" class="w-full h-full -rotate-90">
                <circle cx="60" cy="60" r=px(ring.radius) fill="none" class="stroke-base-300" stroke-width="10" />
                <circle
                    cx="60"
                    cy="60"
                    r=px(ring.radius)
                    fill="none"
                    class="stroke-primary"
                    stroke-width="10"
                    stroke-linecap="round"
                    stroke-dasharray=px(ring.circumference)
                    stroke-dashoffset=px(ring.dash_offset)
                />
            </svg>
            <div class="absolute inset-0 flex flex-col items-center justify-center">
                <span class="text-3xl font-bold">{level.level}</span>
                <span class="text-xs text-base-content/60">{format!("{:.1}%", level.percent)}</span>
            </div>
        </div>
    }
}
