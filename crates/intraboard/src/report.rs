//! Report building and terminal formatting
//!
//! Turns core results into tables (comfy-table) or JSON.

use crate::coalition::CoalitionIndex;
use chrono::{Duration, NaiveDate};
use comfy_table::{Cell, Color, ContentArrangement, Table};
use intraboard_core::models::ProjectUser;
use intraboard_core::{DayLog, DropReport, EmptyLog, WeekTotal};
use serde::Serialize;

// ============================================================================
// Project Completions
// ============================================================================

/// One graded attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub mark: i64,
    pub login: String,
    pub user_id: u64,
}

/// Valid / fail counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub valid: usize,
    pub fail: usize,
}

impl Tally {
    pub fn tries(&self) -> usize {
        self.valid + self.fail
    }
}

/// Tally of one coalition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoalitionTally {
    pub name: String,
    #[serde(flatten)]
    pub tally: Tally,
}

/// Who validated and who failed a project
#[derive(Debug, Clone, Serialize)]
pub struct ProjectReport {
    pub slug: String,
    pub valid: Vec<Completion>,
    pub fail: Vec<Completion>,
    pub coalitions: Vec<CoalitionTally>,
}

impl ProjectReport {
    /// Sort by mark (desc) then login, split on the passing mark and tally
    /// per coalition. Users outside every coalition are not tallied.
    pub fn build(slug: &str, entries: &[ProjectUser], index: &CoalitionIndex) -> Self {
        let mut completions: Vec<(bool, Completion)> = entries
            .iter()
            .map(|entry| {
                (
                    entry.passed(),
                    Completion {
                        mark: entry.mark(),
                        login: entry.user.login.clone(),
                        user_id: entry.user.id,
                    },
                )
            })
            .collect();
        completions.sort_by(|(_, a), (_, b)| b.mark.cmp(&a.mark).then_with(|| a.login.cmp(&b.login)));

        let mut coalitions: Vec<CoalitionTally> = index
            .coalitions()
            .iter()
            .map(|c| CoalitionTally {
                name: c.name.clone(),
                tally: Tally::default(),
            })
            .collect();

        let mut valid = Vec::new();
        let mut fail = Vec::new();
        for (passed, completion) in completions {
            if let Some(pos) = index.position_of(completion.user_id) {
                let tally = &mut coalitions[pos].tally;
                if passed {
                    tally.valid += 1;
                } else {
                    tally.fail += 1;
                }
            }
            if passed {
                valid.push(completion);
            } else {
                fail.push(completion);
            }
        }

        Self {
            slug: slug.to_string(),
            valid,
            fail,
            coalitions,
        }
    }

    pub fn totals(&self) -> Tally {
        Tally {
            valid: self.valid.len(),
            fail: self.fail.len(),
        }
    }
}

fn colored(text: impl ToString, color: Color, no_color: bool) -> Cell {
    let cell = Cell::new(text.to_string());
    if no_color {
        cell
    } else {
        cell.fg(color)
    }
}

/// Project report as a human-readable block
pub fn format_project_report(report: &ProjectReport, index: &CoalitionIndex, no_color: bool) -> String {
    let totals = report.totals();
    let mut lines = vec![format!("({})", report.slug)];

    if totals.tries() == 0 {
        return lines.join("\n");
    }

    lines.push(format!(
        "valid: {:>3} fail: {:>3} tries: {:>3}",
        totals.valid,
        totals.fail,
        totals.tries()
    ));

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        colored("Mark", Color::Cyan, no_color),
        colored("Login", Color::Cyan, no_color),
        colored("Coalition", Color::Cyan, no_color),
    ]);

    for (completion, mark_color) in report
        .valid
        .iter()
        .map(|c| (c, Color::Green))
        .chain(report.fail.iter().map(|c| (c, Color::Red)))
    {
        let user_color = index.color_of(completion.user_id).to_table_color();
        let coalition = index
            .classify(completion.user_id)
            .map(|c| c.name.as_str())
            .unwrap_or("-");
        table.add_row(vec![
            colored(completion.mark, mark_color, no_color),
            colored(&completion.login, user_color, no_color),
            colored(coalition, user_color, no_color),
        ]);
    }
    lines.push(table.to_string());

    if !report.coalitions.is_empty() {
        let mut tallies = Table::new();
        tallies.set_header(vec![
            colored("Coalition", Color::Cyan, no_color),
            colored("Valid", Color::Green, no_color),
            colored("Fail", Color::Red, no_color),
            colored("Tries", Color::Yellow, no_color),
        ]);
        for (entry, coalition) in report.coalitions.iter().zip(index.coalitions()) {
            let color = coalition.color.to_table_color();
            tallies.add_row(vec![
                colored(&entry.name, color, no_color),
                colored(entry.tally.valid, color, no_color),
                colored(entry.tally.fail, color, no_color),
                colored(entry.tally.tries(), color, no_color),
            ]);
        }
        lines.push(tallies.to_string());
    }

    lines.join("\n")
}

// ============================================================================
// Logtime
// ============================================================================

/// Serializable logtime summary of one user
#[derive(Debug, Clone, Serialize)]
pub struct LogtimeSummary {
    pub login: String,
    pub days: Vec<DayEntry>,
    pub total_seconds: i64,
    pub week: Option<WeekEntry>,
    pub dropped_records: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayEntry {
    pub date: NaiveDate,
    pub seconds: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekEntry {
    pub week_start: NaiveDate,
    pub seconds: i64,
}

impl LogtimeSummary {
    pub fn new(login: &str, log: &DayLog, drops: &DropReport) -> Self {
        Self {
            login: login.to_string(),
            days: log
                .iter()
                .map(|(date, d)| DayEntry {
                    date,
                    seconds: d.num_seconds(),
                })
                .collect(),
            total_seconds: log.total().num_seconds(),
            week: log.week_total().ok().map(|w| WeekEntry {
                week_start: w.week_start,
                seconds: w.total.num_seconds(),
            }),
            dropped_records: drops.dropped_count(),
        }
    }
}

/// `H:MM:SS`, hours are not wrapped at 24
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    format!(
        "{}{}:{:02}:{:02}",
        sign,
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Day-by-day logtime table
pub fn format_day_log(login: &str, log: &DayLog, no_color: bool) -> String {
    if log.is_empty() {
        return format!("{login} logtime: no data");
    }

    let mut table = Table::new();
    table.set_header(vec![
        colored("Date", Color::Magenta, no_color),
        colored("Logtime", Color::Blue, no_color),
    ]);
    for (date, duration) in log.iter().rev() {
        table.add_row(vec![
            colored(date.format("%Y-%m-%d (%a)"), Color::Magenta, no_color),
            colored(format_duration(duration), Color::Blue, no_color),
        ]);
    }

    format!("{login} logtime:\n{table}")
}

/// Week total line, explicit about missing data
pub fn format_week_total(login: &str, week: Result<WeekTotal, EmptyLog>) -> String {
    match week {
        Ok(week) => format!(
            "{login} hours this week (since {}): {}",
            week.week_start.format("%Y-%m-%d"),
            format_duration(week.total)
        ),
        Err(EmptyLog) => format!("{login} hours this week: no data"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coalition::Coalition;
    use crate::settings::CoalitionColor;
    use intraboard_core::models::{ProjectRef, UserRef};
    use intraboard_core::DaySpan;

    fn entry(login: &str, id: u64, mark: Option<i64>) -> ProjectUser {
        ProjectUser {
            final_mark: mark,
            user: UserRef {
                id,
                login: login.to_string(),
            },
            project: ProjectRef {
                id: None,
                slug: "42cursus-libft".to_string(),
                name: None,
            },
            validated: None,
        }
    }

    fn index() -> CoalitionIndex {
        let mut index = CoalitionIndex::new(CoalitionColor::Yellow);
        index.push(Coalition::new("Vela", CoalitionColor::Red, [1, 2].into_iter().collect()));
        index.push(Coalition::new("Cetus", CoalitionColor::Blue, [3].into_iter().collect()));
        index
    }

    #[test]
    fn test_report_sort_and_partition() {
        let entries = vec![
            entry("zed", 1, Some(100)),
            entry("amy", 2, Some(100)),
            entry("bob", 3, Some(125)),
            entry("cat", 4, Some(42)),
            entry("dan", 3, None),
        ];

        let report = ProjectReport::build("42cursus-libft", &entries, &index());

        let valid: Vec<_> = report.valid.iter().map(|c| c.login.as_str()).collect();
        let fail: Vec<_> = report.fail.iter().map(|c| c.login.as_str()).collect();
        assert_eq!(valid, vec!["bob", "amy", "zed"]);
        assert_eq!(fail, vec!["cat", "dan"]);
        assert_eq!(report.totals().tries(), 5);
    }

    #[test]
    fn test_report_coalition_tallies() {
        let entries = vec![
            entry("zed", 1, Some(100)),
            entry("amy", 2, Some(20)),
            entry("bob", 3, Some(125)),
            entry("cat", 4, Some(42)),
        ];

        let report = ProjectReport::build("42cursus-libft", &entries, &index());

        assert_eq!(report.coalitions[0].tally, Tally { valid: 1, fail: 1 });
        assert_eq!(report.coalitions[1].tally, Tally { valid: 1, fail: 0 });
        // cat belongs to no coalition
        let tallied: usize = report.coalitions.iter().map(|c| c.tally.tries()).sum();
        assert_eq!(tallied, 3);
    }

    #[test]
    fn test_format_empty_project() {
        let report = ProjectReport::build("ft_nothing", &[], &index());
        assert_eq!(format_project_report(&report, &index(), true), "(ft_nothing)");
    }

    #[test]
    fn test_format_project_no_color() {
        let entries = vec![entry("bob", 3, Some(125))];
        let report = ProjectReport::build("42cursus-libft", &entries, &index());
        let output = format_project_report(&report, &index(), true);

        assert!(output.contains("valid:   1 fail:   0 tries:   1"));
        assert!(output.contains("bob"));
        assert!(output.contains("Cetus"));
        assert!(!output.contains('\u{1b}'));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::zero()), "0:00:00");
        assert_eq!(format_duration(Duration::seconds(3723)), "1:02:03");
        assert_eq!(format_duration(Duration::hours(31)), "31:00:00");
    }

    #[test]
    fn test_week_total_messages() {
        let week = WeekTotal {
            week_start: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            total: Duration::minutes(90),
        };
        assert_eq!(
            format_week_total("jdoe", Ok(week)),
            "jdoe hours this week (since 2024-01-08): 1:30:00"
        );
        assert_eq!(
            format_week_total("jdoe", Err(EmptyLog)),
            "jdoe hours this week: no data"
        );
    }

    #[test]
    fn test_logtime_summary() {
        let mut log = DayLog::new();
        log.record(DaySpan::new(
            NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(),
            Duration::hours(2),
        ));
        log.record(DaySpan::new(
            NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            Duration::hours(1),
        ));

        let summary = LogtimeSummary::new("jdoe", &log, &DropReport::default());

        assert_eq!(summary.days.len(), 2);
        assert_eq!(summary.total_seconds, 3 * 3600);
        assert_eq!(summary.week.as_ref().map(|w| w.seconds), Some(3 * 3600));
        assert_eq!(summary.dropped_records, 0);
    }

    #[test]
    fn test_format_day_log_empty() {
        assert_eq!(format_day_log("jdoe", &DayLog::new(), true), "jdoe logtime: no data");
    }
}
