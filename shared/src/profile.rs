//! 档案聚合
//!
//! 把 GraphQL 原始记录转换为可直接展示的聚合：XP 总量与等级、成绩与审核列表、
//! 通过/未通过统计、累计 XP 历史。纯函数，没有 I/O。

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DashError, DashResult};
use crate::graphql::{ProfileData, RawGrade, RawTransaction};

/// 从等级 n 升到 n+1 需要 `LEVEL_BASE_XP * (n + 1)` XP
pub const LEVEL_BASE_XP: i64 = 5_000;

const UNKNOWN_SUBJECT: &str = "Unknown";
const DATE_FORMAT: &str = "%Y-%m-%d";

// =========================================================
// 结果状态
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Passed,
    Failed,
    /// 尚未评分
    Pending,
}

impl Outcome {
    /// 成绩 > 0 为通过，= 0 为未通过，缺失为待定
    pub fn from_grade(grade: Option<f64>) -> Self {
        match grade {
            Some(g) if g > 0.0 => Outcome::Passed,
            Some(_) => Outcome::Failed,
            None => Outcome::Pending,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Passed => "Passed",
            Outcome::Failed => "Failed",
            Outcome::Pending => "Pending",
        }
    }

    /// 审核列表的措辞
    pub fn audit_label(&self) -> &'static str {
        match self {
            Outcome::Passed => "Completed",
            Outcome::Failed => "Failed",
            Outcome::Pending => "Pending",
        }
    }

    pub fn is_graded(&self) -> bool {
        !matches!(self, Outcome::Pending)
    }
}

// =========================================================
// 聚合类型
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub level: u32,
    /// 当前等级的起点 XP
    pub floor_xp: i64,
    /// 下一等级的起点 XP
    pub next_xp: i64,
    /// 0.0 ..= 100.0，保留一位小数
    pub percent: f64,
}

impl LevelProgress {
    pub fn remaining_xp(&self, total_xp: i64) -> i64 {
        (self.next_xp - total_xp).max(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XpEntry {
    /// `YYYY-MM-DD`；无法解析时保留原始字符串
    pub date: String,
    pub at: Option<DateTime<Utc>>,
    pub amount: i64,
    pub path: String,
    /// 截至本条的累计 XP
    pub cumulative: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeEntry {
    pub subject: String,
    pub path: String,
    pub score: Option<f64>,
    pub status: Outcome,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub title: String,
    pub grade: Option<f64>,
    pub status: Outcome,
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileStats {
    pub total_projects: usize,
    pub passed_projects: usize,
    pub failed_projects: usize,
    /// 已评分项目中通过的百分比（四舍五入）
    pub success_rate: u32,
    /// 已评分审核中完成的百分比（四舍五入）
    pub audit_ratio: u32,
    /// 已评分成绩的平均值，保留两位小数
    pub average_grade: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileAggregate {
    pub id: i64,
    pub login: String,
    pub total_xp: i64,
    pub level: LevelProgress,
    /// 按时间升序
    pub xp_history: Vec<XpEntry>,
    /// 与查询顺序一致，最近更新的在前
    pub grades: Vec<GradeEntry>,
    pub audits: Vec<AuditEntry>,
    pub stats: ProfileStats,
}

impl ProfileAggregate {
    pub fn from_raw(data: ProfileData) -> DashResult<Self> {
        let user = data
            .user
            .into_iter()
            .next()
            .ok_or_else(|| DashError::no_data("No user data found").in_op("profile.from_raw"))?;

        let transactions = data.transaction.unwrap_or_default();
        let total_xp = transactions.iter().map(|tx| tx.amount).sum();
        let xp_history = xp_history(&transactions);

        let grades: Vec<GradeEntry> = data
            .progress
            .unwrap_or_default()
            .iter()
            .map(grade_entry)
            .collect();
        let audits: Vec<AuditEntry> = data
            .result
            .unwrap_or_default()
            .iter()
            .map(audit_entry)
            .collect();

        let stats = summarize(&grades, &audits);

        Ok(Self {
            id: user.id,
            login: user.login,
            total_xp,
            level: level_for_xp(total_xp),
            xp_history,
            grades,
            audits,
            stats,
        })
    }

    pub fn recent_grades(&self, n: usize) -> &[GradeEntry] {
        &self.grades[..n.min(self.grades.len())]
    }

    pub fn recent_audits(&self, n: usize) -> &[AuditEntry] {
        &self.audits[..n.min(self.audits.len())]
    }

    pub fn passed_subjects(&self) -> Vec<&str> {
        self.subjects_with(Outcome::Passed)
    }

    pub fn failed_subjects(&self) -> Vec<&str> {
        self.subjects_with(Outcome::Failed)
    }

    fn subjects_with(&self, status: Outcome) -> Vec<&str> {
        self.grades
            .iter()
            .filter(|g| g.status == status)
            .map(|g| g.subject.as_str())
            .collect()
    }
}

// =========================================================
// 转换步骤
// =========================================================

/// 累计阈值：达到等级 n 需要 `2500 * n * (n + 1)` XP
pub fn level_threshold(level: u32) -> i64 {
    let n = level as i64;
    LEVEL_BASE_XP * n * (n + 1) / 2
}

pub fn level_for_xp(total_xp: i64) -> LevelProgress {
    let mut level = 0u32;
    while level_threshold(level + 1) <= total_xp {
        level += 1;
    }
    let floor_xp = level_threshold(level);
    let next_xp = level_threshold(level + 1);
    let gained = (total_xp - floor_xp).max(0) as f64;
    let percent = round_to(gained * 100.0 / (next_xp - floor_xp) as f64, 1);
    LevelProgress {
        level,
        floor_xp,
        next_xp,
        percent,
    }
}

fn xp_history(transactions: &[RawTransaction]) -> Vec<XpEntry> {
    let mut dated: Vec<(Option<DateTime<Utc>>, &RawTransaction)> = transactions
        .iter()
        .map(|tx| (parse_timestamp(&tx.created_at), tx))
        .collect();
    // 无法解析的时间排在最后，保持原有相对顺序
    dated.sort_by_key(|(at, _)| (at.is_none(), *at));

    let mut cumulative = 0;
    dated
        .into_iter()
        .map(|(at, tx)| {
            cumulative += tx.amount;
            XpEntry {
                date: display_date(at, &tx.created_at),
                at,
                amount: tx.amount,
                path: tx.path.clone(),
                cumulative,
            }
        })
        .collect()
}

fn grade_entry(raw: &RawGrade) -> GradeEntry {
    GradeEntry {
        subject: subject_of(&raw.path),
        path: raw.path.clone(),
        score: raw.grade,
        status: Outcome::from_grade(raw.grade),
        date: display_date(parse_timestamp(&raw.updated_at), &raw.updated_at),
    }
}

fn audit_entry(raw: &RawGrade) -> AuditEntry {
    AuditEntry {
        title: subject_of(&raw.path),
        grade: raw.grade,
        status: Outcome::from_grade(raw.grade),
        date: display_date(parse_timestamp(&raw.updated_at), &raw.updated_at),
    }
}

fn summarize(grades: &[GradeEntry], audits: &[AuditEntry]) -> ProfileStats {
    let passed = grades.iter().filter(|g| g.status == Outcome::Passed).count();
    let failed = grades.iter().filter(|g| g.status == Outcome::Failed).count();

    let audits_done = audits.iter().filter(|a| a.status == Outcome::Passed).count();
    let audits_graded = audits.iter().filter(|a| a.status.is_graded()).count();

    let scores: Vec<f64> = grades.iter().filter_map(|g| g.score).collect();
    let average_grade = if scores.is_empty() {
        None
    } else {
        Some(round_to(scores.iter().sum::<f64>() / scores.len() as f64, 2))
    };

    ProfileStats {
        total_projects: grades.len(),
        passed_projects: passed,
        failed_projects: failed,
        success_rate: percentage(passed, passed + failed),
        audit_ratio: percentage(audits_done, audits_graded),
        average_grade,
    }
}

fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 * 100.0 / whole as f64).round() as u32
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// 路径最后一段，如 `/bahrain/bh-module/graphql` → `graphql`
///
/// 以 `/` 结尾的路径最后一段为空，记为 `Unknown`。
pub fn subject_of(path: &str) -> String {
    path.rsplit('/')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_SUBJECT)
        .to_string()
}

/// 解析 Hasura 时间戳；没有时区后缀的按 UTC 处理
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn display_date(at: Option<DateTime<Utc>>, raw: &str) -> String {
    match at {
        Some(at) => at.format(DATE_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

/// `1234567` → `1,234,567`
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::DashErrorStatus;
    use crate::graphql::RawUser;

    fn tx(id: i64, amount: i64, created_at: &str, path: &str) -> RawTransaction {
        RawTransaction {
            id,
            amount,
            created_at: created_at.to_string(),
            path: path.to_string(),
        }
    }

    fn graded(id: i64, grade: Option<f64>, updated_at: &str, path: &str) -> RawGrade {
        RawGrade {
            id,
            grade,
            created_at: updated_at.to_string(),
            updated_at: updated_at.to_string(),
            path: path.to_string(),
        }
    }

    pub(crate) fn sample_data() -> ProfileData {
        ProfileData {
            user: vec![RawUser {
                id: 42,
                login: "student".to_string(),
            }],
            transaction: Some(vec![
                tx(3, 4_000, "2024-03-01T10:00:00.000+00:00", "/bh/module/graphql"),
                tx(2, 2_000, "2024-02-01T10:00:00+00:00", "/bh/module/ascii-art"),
                tx(1, 1_500, "2024-01-15T08:30:00.123456", "/bh/module/go-reloaded"),
            ]),
            progress: Some(vec![
                graded(10, Some(1.5), "2024-03-02T00:00:00+00:00", "/bh/module/graphql"),
                graded(11, Some(0.0), "2024-02-02T00:00:00+00:00", "/bh/module/ascii-art"),
                graded(12, Some(1.0), "2024-01-16T00:00:00+00:00", "/bh/module/go-reloaded"),
                graded(13, None, "2024-03-05T00:00:00+00:00", "/bh/module/forum/"),
            ]),
            result: Some(vec![
                graded(20, Some(1.0), "2024-03-03T00:00:00+00:00", "/bh/audit/graphql"),
                graded(21, Some(0.0), "2024-02-03T00:00:00+00:00", ""),
            ]),
        }
    }

    pub(crate) fn sample_profile() -> ProfileAggregate {
        ProfileAggregate::from_raw(sample_data()).unwrap()
    }

    #[test]
    fn missing_user_is_no_data() {
        let err = ProfileAggregate::from_raw(ProfileData::default()).unwrap_err();
        assert_eq!(err.status, DashErrorStatus::NoData);
        assert_eq!(err.message(), "No user data found");
    }

    #[test]
    fn totals_and_level() {
        let profile = sample_profile();
        assert_eq!(profile.id, 42);
        assert_eq!(profile.login, "student");
        assert_eq!(profile.total_xp, 7_500);
        // 5000 ..= 15000 为等级 1
        assert_eq!(profile.level.level, 1);
        assert_eq!(profile.level.floor_xp, 5_000);
        assert_eq!(profile.level.next_xp, 15_000);
        assert_eq!(profile.level.percent, 25.0);
        assert_eq!(profile.level.remaining_xp(profile.total_xp), 7_500);
    }

    #[test]
    fn history_is_ascending_and_cumulative() {
        let profile = sample_profile();
        let amounts: Vec<_> = profile.xp_history.iter().map(|e| e.cumulative).collect();
        assert_eq!(amounts, vec![1_500, 3_500, 7_500]);
        assert_eq!(profile.xp_history[0].date, "2024-01-15");
        assert_eq!(profile.xp_history[2].date, "2024-03-01");
    }

    #[test]
    fn unparseable_dates_keep_raw_text_and_sort_last() {
        let mut data = sample_data();
        data.transaction = Some(vec![
            tx(1, 10, "yesterday", "/a"),
            tx(2, 20, "2024-01-01T00:00:00Z", "/b"),
        ]);
        let profile = ProfileAggregate::from_raw(data).unwrap();
        assert_eq!(profile.xp_history[0].path, "/b");
        assert_eq!(profile.xp_history[1].date, "yesterday");
        assert_eq!(profile.xp_history[1].at, None);
        assert_eq!(profile.xp_history[1].cumulative, 30);
    }

    #[test]
    fn subject_is_last_path_segment() {
        assert_eq!(subject_of("/bahrain/bh-module/graphql"), "graphql");
        assert_eq!(subject_of("graphql"), "graphql");
        assert_eq!(subject_of("/bh/module/forum/"), "Unknown");
        assert_eq!(subject_of(""), "Unknown");
    }

    #[test]
    fn grades_and_statistics() {
        let profile = sample_profile();
        let subjects: Vec<_> = profile.grades.iter().map(|g| g.subject.as_str()).collect();
        assert_eq!(subjects, vec!["graphql", "ascii-art", "go-reloaded", "Unknown"]);
        assert_eq!(profile.grades[3].status, Outcome::Pending);

        assert_eq!(profile.passed_subjects(), vec!["graphql", "go-reloaded"]);
        assert_eq!(profile.failed_subjects(), vec!["ascii-art"]);

        let stats = &profile.stats;
        assert_eq!(stats.total_projects, 4);
        assert_eq!(stats.passed_projects, 2);
        assert_eq!(stats.failed_projects, 1);
        assert_eq!(stats.success_rate, 67);
        assert_eq!(stats.audit_ratio, 50);
        assert_eq!(stats.average_grade, Some(0.83));
    }

    #[test]
    fn audits_use_completion_wording() {
        let profile = sample_profile();
        assert_eq!(profile.audits[0].title, "graphql");
        assert_eq!(profile.audits[0].status.audit_label(), "Completed");
        assert_eq!(profile.audits[1].title, "Unknown");
        assert_eq!(profile.audits[1].status.audit_label(), "Failed");
    }

    #[test]
    fn empty_collections_produce_zeroed_stats() {
        let data = ProfileData {
            user: sample_data().user,
            ..ProfileData::default()
        };
        let profile = ProfileAggregate::from_raw(data).unwrap();
        assert_eq!(profile.total_xp, 0);
        assert_eq!(profile.level.level, 0);
        assert_eq!(profile.level.percent, 0.0);
        assert!(profile.xp_history.is_empty());
        assert_eq!(profile.stats, ProfileStats::default());
        assert!(profile.recent_grades(10).is_empty());
    }

    #[test]
    fn recent_slices_are_bounded() {
        let profile = sample_profile();
        assert_eq!(profile.recent_grades(2).len(), 2);
        assert_eq!(profile.recent_grades(10).len(), 4);
        assert_eq!(profile.recent_audits(1)[0].title, "graphql");
    }

    #[test]
    fn level_boundaries() {
        assert_eq!(level_for_xp(-100).level, 0);
        assert_eq!(level_for_xp(4_999).level, 0);
        assert_eq!(level_for_xp(5_000).level, 1);
        assert_eq!(level_for_xp(15_000).level, 2);
        assert_eq!(level_for_xp(15_000).percent, 0.0);
        assert_eq!(level_threshold(3), 30_000);
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
        assert_eq!(group_thousands(-45_000), "-45,000");
    }
}
