//! 图表几何
//!
//! 只计算坐标与 SVG 路径，渲染交给前端组件。所有函数在数据为空时返回 `None`，
//! 由调用方显示占位文字。

use std::f64::consts::{PI, TAU};

use chrono::{DateTime, Months, Utc};

use crate::profile::{GradeEntry, Outcome, XpEntry, group_thousands};

const Y_TICKS: usize = 5;
const MAX_X_TICKS: usize = 5;
const BAND_PADDING: f64 = 0.1;
const HEADROOM: f64 = 1.1;

// =========================================================
// 画布
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 300.0,
            margin: Margin {
                top: 20.0,
                right: 30.0,
                bottom: 50.0,
                left: 50.0,
            },
        }
    }
}

impl Frame {
    pub fn inner_width(&self) -> f64 {
        (self.width - self.margin.left - self.margin.right).max(0.0)
    }

    pub fn inner_height(&self) -> f64 {
        (self.height - self.margin.top - self.margin.bottom).max(0.0)
    }

    /// 绘图区底边的 y 坐标
    pub fn baseline(&self) -> f64 {
        self.height - self.margin.bottom
    }

    /// `value` 在 `0..=max` 线性刻度上的 y 坐标
    fn y_for(&self, value: f64, max: f64) -> f64 {
        self.baseline() - value / max * self.inner_height()
    }

    pub fn view_box(&self) -> String {
        format!("0 0 {} {}", self.width, self.height)
    }

    fn y_ticks(&self, max: f64) -> Vec<Tick> {
        (0..Y_TICKS)
            .map(|i| {
                let value = max * i as f64 / (Y_TICKS - 1) as f64;
                Tick {
                    value,
                    position: self.y_for(value, max),
                    label: group_thousands(value.round() as i64),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: f64,
    /// 轴方向上的坐标
    pub position: f64,
    pub label: String,
}

// =========================================================
// 累计 XP 折线
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub frame: Frame,
    pub points: Vec<Point>,
    pub line_path: String,
    pub area_path: String,
    pub x_ticks: Vec<Tick>,
    pub y_ticks: Vec<Tick>,
    pub y_max: f64,
}

/// 累计 XP 折线
///
/// 只统计正向 XP；`months` 为 0 时使用全部历史，否则只保留最近 `months`
/// 个月的点，起点仍按全部历史累计。
pub fn xp_line(
    history: &[XpEntry],
    months: u32,
    now: DateTime<Utc>,
    frame: Frame,
) -> Option<LineChart> {
    let cutoff = match months {
        0 => None,
        m => now.checked_sub_months(Months::new(m)),
    };

    let mut running = 0i64;
    let mut series: Vec<(DateTime<Utc>, i64, &str)> = Vec::new();
    for entry in history.iter().filter(|e| e.amount > 0) {
        let Some(at) = entry.at else { continue };
        running += entry.amount;
        if cutoff.is_none_or(|c| at >= c) {
            series.push((at, running, entry.date.as_str()));
        }
    }
    if series.is_empty() {
        return None;
    }

    let first = series[0].0.timestamp() as f64;
    let last = series[series.len() - 1].0.timestamp() as f64;
    let span = last - first;
    let y_max = series.iter().map(|(_, v, _)| *v).max().unwrap_or(0) as f64 * HEADROOM;

    let x_for = |at: &DateTime<Utc>| -> f64 {
        if span <= 0.0 {
            frame.margin.left + frame.inner_width() / 2.0
        } else {
            frame.margin.left + (at.timestamp() as f64 - first) / span * frame.inner_width()
        }
    };

    let points: Vec<Point> = series
        .iter()
        .map(|(at, value, _)| Point {
            x: x_for(at),
            y: frame.y_for(*value as f64, y_max),
        })
        .collect();

    let line_path = polyline(&points);
    let area_path = format!(
        "{} L{:.1},{:.1} L{:.1},{:.1} Z",
        line_path,
        points[points.len() - 1].x,
        frame.baseline(),
        points[0].x,
        frame.baseline()
    );

    let x_ticks = spread_indices(series.len(), MAX_X_TICKS)
        .into_iter()
        .map(|i| Tick {
            value: series[i].1 as f64,
            position: points[i].x,
            label: series[i].2.to_string(),
        })
        .collect();

    Some(LineChart {
        frame,
        points,
        line_path,
        area_path,
        x_ticks,
        y_ticks: frame.y_ticks(y_max),
        y_max,
    })
}

fn polyline(points: &[Point]) -> String {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{}{:.1},{:.1}", if i == 0 { "M" } else { "L" }, p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// 从 `len` 个下标中均匀取至多 `max` 个，总包含首尾
fn spread_indices(len: usize, max: usize) -> Vec<usize> {
    if len <= max {
        return (0..len).collect();
    }
    let mut indices: Vec<usize> = (0..max)
        .map(|i| ((i * (len - 1)) as f64 / (max - 1) as f64).round() as usize)
        .collect();
    indices.dedup();
    indices
}

// =========================================================
// 成绩柱状图
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub status: Outcome,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub frame: Frame,
    pub bars: Vec<Bar>,
    pub y_ticks: Vec<Tick>,
    pub y_max: f64,
}

/// 已评分成绩的柱状图，类别刻度两侧与柱间留 10% 间隔
pub fn grade_bars(grades: &[GradeEntry], frame: Frame) -> Option<BarChart> {
    let scored: Vec<(&GradeEntry, f64)> = grades
        .iter()
        .filter_map(|g| g.score.map(|s| (g, s)))
        .collect();
    if scored.is_empty() {
        return None;
    }

    let max = scored.iter().map(|(_, s)| *s).fold(0.0, f64::max);
    let y_max = if max > 0.0 { max * HEADROOM } else { 1.0 };

    let n = scored.len() as f64;
    let step = frame.inner_width() / (n - BAND_PADDING + 2.0 * BAND_PADDING);
    let band = step * (1.0 - BAND_PADDING);
    let offset = frame.margin.left + step * BAND_PADDING;

    let bars = scored
        .into_iter()
        .enumerate()
        .map(|(i, (grade, score))| {
            let value = score.max(0.0);
            let y = frame.y_for(value, y_max);
            Bar {
                label: grade.subject.clone(),
                value: score,
                status: grade.status,
                x: offset + i as f64 * step,
                y,
                width: band,
                height: frame.baseline() - y,
            }
        })
        .collect();

    Some(BarChart {
        frame,
        bars,
        y_ticks: grade_ticks(&frame, y_max),
        y_max,
    })
}

fn grade_ticks(frame: &Frame, max: f64) -> Vec<Tick> {
    (0..Y_TICKS)
        .map(|i| {
            let value = max * i as f64 / (Y_TICKS - 1) as f64;
            Tick {
                value,
                position: frame.y_for(value, max),
                label: format!("{:.1}", value),
            }
        })
        .collect()
}

// =========================================================
// 通过/未通过环形图
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct DonutSlice {
    pub status: Outcome,
    pub count: usize,
    pub percent: f64,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Donut {
    pub size: f64,
    pub slices: Vec<DonutSlice>,
    pub total: usize,
}

/// 通过与未通过数量的环形图；两者都为 0 时没有图
pub fn pass_fail_donut(passed: usize, failed: usize, size: f64) -> Option<Donut> {
    let total = passed + failed;
    if total == 0 {
        return None;
    }
    let center = size / 2.0;
    let outer = size / 2.0;
    let inner = outer * 0.6;

    let mut start = 0.0;
    let slices = [(Outcome::Passed, passed), (Outcome::Failed, failed)]
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(status, count)| {
            let sweep = TAU * count as f64 / total as f64;
            let path = annular_sector(center, outer, inner, start, start + sweep);
            start += sweep;
            DonutSlice {
                status,
                count,
                percent: count as f64 * 100.0 / total as f64,
                path,
            }
        })
        .collect();

    Some(Donut {
        size,
        slices,
        total,
    })
}

/// 环形扇区路径，角度从 12 点方向顺时针计
///
/// SVG 的单段弧无法闭合成整圆，整圆拆成两个半圆。
fn annular_sector(center: f64, outer: f64, inner: f64, from: f64, to: f64) -> String {
    if to - from >= TAU - 1e-9 {
        return format!(
            "{} {}",
            annular_sector(center, outer, inner, from, from + PI),
            annular_sector(center, outer, inner, from + PI, to)
        );
    }
    let large = if to - from > PI { 1 } else { 0 };
    let at = |angle: f64, radius: f64| {
        (
            center + radius * angle.sin(),
            center - radius * angle.cos(),
        )
    };
    let (ox0, oy0) = at(from, outer);
    let (ox1, oy1) = at(to, outer);
    let (ix1, iy1) = at(to, inner);
    let (ix0, iy0) = at(from, inner);
    format!(
        "M{:.2},{:.2} A{:.2},{:.2} 0 {} 1 {:.2},{:.2} L{:.2},{:.2} A{:.2},{:.2} 0 {} 0 {:.2},{:.2} Z",
        ox0, oy0, outer, outer, large, ox1, oy1, ix1, iy1, inner, inner, large, ix0, iy0
    )
}

// =========================================================
// 等级进度环
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressRing {
    pub radius: f64,
    pub circumference: f64,
    /// `stroke-dashoffset`，0 表示满环
    pub dash_offset: f64,
}

pub fn progress_ring(percent: f64, radius: f64) -> ProgressRing {
    let circumference = TAU * radius;
    let fraction = (percent / 100.0).clamp(0.0, 1.0);
    ProgressRing {
        radius,
        circumference,
        dash_offset: circumference * (1.0 - fraction),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::tests::sample_profile;

    fn at(date: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(date).unwrap().with_timezone(&Utc)
    }

    fn entry(date: &str, amount: i64) -> XpEntry {
        XpEntry {
            date: date[..10].to_string(),
            at: Some(at(date)),
            amount,
            path: String::new(),
            cumulative: 0,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn xp_line_spans_the_frame() {
        let frame = Frame::default();
        let history = vec![
            entry("2024-01-01T00:00:00Z", 100),
            entry("2024-01-02T00:00:00Z", -50),
            entry("2024-01-03T00:00:00Z", 100),
        ];
        let chart = xp_line(&history, 0, at("2024-02-01T00:00:00Z"), frame).unwrap();

        assert_eq!(chart.points.len(), 2);
        assert!(close(chart.points[0].x, frame.margin.left));
        assert!(close(chart.points[1].x, frame.margin.left + frame.inner_width()));
        assert!(close(chart.y_max, 220.0));
        // 200 / 220 of the inner height above the baseline
        let expected = frame.baseline() - 200.0 / 220.0 * frame.inner_height();
        assert!(close(chart.points[1].y, expected));
        assert!(chart.line_path.starts_with("M50.0,"));
        assert!(chart.area_path.ends_with(" Z"));
        assert_eq!(chart.y_ticks.len(), 5);
        assert_eq!(chart.y_ticks[0].label, "0");
        assert!(close(chart.y_ticks[4].position, frame.margin.top));
    }

    #[test]
    fn xp_line_window_keeps_running_total() {
        let history = vec![
            entry("2023-01-01T00:00:00Z", 1_000),
            entry("2024-01-10T00:00:00Z", 500),
        ];
        let chart = xp_line(&history, 6, at("2024-02-01T00:00:00Z"), Frame::default()).unwrap();
        assert_eq!(chart.points.len(), 1);
        assert_eq!(chart.x_ticks[0].value, 1_500.0);
        assert_eq!(chart.x_ticks[0].label, "2024-01-10");
        assert!(close(chart.points[0].x, 50.0 + Frame::default().inner_width() / 2.0));
    }

    #[test]
    fn xp_line_without_positive_points() {
        let history = vec![entry("2024-01-01T00:00:00Z", -10)];
        assert!(xp_line(&history, 0, at("2024-02-01T00:00:00Z"), Frame::default()).is_none());
        assert!(xp_line(&[], 0, at("2024-02-01T00:00:00Z"), Frame::default()).is_none());
    }

    #[test]
    fn x_ticks_are_spread() {
        assert_eq!(spread_indices(3, 5), vec![0, 1, 2]);
        assert_eq!(spread_indices(9, 5), vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn grade_bars_use_band_scale() {
        let frame = Frame::default();
        let profile = sample_profile();
        let chart = grade_bars(&profile.grades, frame).unwrap();

        // 未评分的不画
        assert_eq!(chart.bars.len(), 3);
        assert!(close(chart.y_max, 1.65));

        let step = frame.inner_width() / 3.1;
        assert!(close(chart.bars[0].x, frame.margin.left + 0.1 * step));
        assert!(close(chart.bars[1].x - chart.bars[0].x, step));
        assert!(close(chart.bars[0].width, step * 0.9));

        // 0 分的柱高度为 0
        assert_eq!(chart.bars[1].status, Outcome::Failed);
        assert!(close(chart.bars[1].height, 0.0));
        assert!(close(chart.bars[0].y + chart.bars[0].height, frame.baseline()));
    }

    #[test]
    fn grade_bars_with_all_zero_scores() {
        let mut profile = sample_profile();
        for g in &mut profile.grades {
            g.score = g.score.map(|_| 0.0);
        }
        let chart = grade_bars(&profile.grades, Frame::default()).unwrap();
        assert_eq!(chart.y_max, 1.0);
        assert!(grade_bars(&[], Frame::default()).is_none());
    }

    #[test]
    fn donut_slices() {
        let donut = pass_fail_donut(3, 1, 200.0).unwrap();
        assert_eq!(donut.total, 4);
        assert_eq!(donut.slices.len(), 2);
        assert_eq!(donut.slices[0].percent, 75.0);
        // 起点在 12 点方向
        assert!(donut.slices[0].path.starts_with("M100.00,0.00 A100.00,100.00 0 1 1"));
        assert!(donut.slices[1].path.contains(" 0 0 1 "));

        assert!(pass_fail_donut(0, 0, 200.0).is_none());
    }

    #[test]
    fn full_donut_is_two_half_arcs() {
        let donut = pass_fail_donut(0, 2, 100.0).unwrap();
        assert_eq!(donut.slices.len(), 1);
        assert_eq!(donut.slices[0].status, Outcome::Failed);
        assert_eq!(donut.slices[0].path.matches('Z').count(), 2);
    }

    #[test]
    fn ring_offsets() {
        let ring = progress_ring(25.0, 10.0);
        assert!(close(ring.circumference, TAU * 10.0));
        assert!(close(ring.dash_offset, ring.circumference * 0.75));
        assert_eq!(progress_ring(150.0, 10.0).dash_offset, 0.0);
        assert!(close(progress_ring(-5.0, 10.0).dash_offset, ring.circumference));
    }
}
