//! CLI formatting for roleboard views
//!
//! Every formatter returns a String: a comfy-table rendering for humans or
//! pretty JSON when `json` is set.

use chrono::{NaiveDate, NaiveDateTime};
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};
use roleboard_core::models::{
    AggregatedData, GroupBy, LogPage, MonthlyTrend, PlayerRecord, RankingEntry, SessionRecord,
    TrainingStats,
};
use roleboard_core::{CheckState, CoreError, FilterState, Hierarchy, HierarchyNode, TableSort};
use serde::Serialize;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug)]
pub enum CliError {
    /// Neither `--file` nor `--demo` given
    NoInput,
    /// A filter key matched nothing in the loaded data
    UnknownKey { kind: &'static str, key: String },
    Core(CoreError),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::NoInput => write!(
                f,
                "No input: pass --file <CSV> (or set ROLEBOARD_CSV) or use --demo"
            ),
            CliError::UnknownKey { kind, key } => {
                write!(f, "No {} matches '{}'", kind, key)
            }
            CliError::Core(e) => match e.suggestion() {
                Some(hint) => write!(f, "{}\nHint: {}", e, hint),
                None => write!(f, "{}", e),
            },
        }
    }
}

impl std::error::Error for CliError {}

impl From<CoreError> for CliError {
    fn from(e: CoreError) -> Self {
        CliError::Core(e)
    }
}

// ============================================================================
// Formatters
// ============================================================================

/// Dataset summary plus the active filter
pub fn format_summary(
    stats: &TrainingStats,
    filter: &FilterState,
    filtered_count: usize,
    json: bool,
) -> String {
    if json {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Summary<'a> {
            stats: &'a TrainingStats,
            filter: &'a FilterState,
            filtered_count: usize,
        }
        return to_json(&Summary {
            stats,
            filter,
            filtered_count,
        });
    }

    let bound = |m: Option<roleboard_core::Month>| {
        m.map(|m| m.to_string()).unwrap_or_else(|| "-".to_string())
    };
    let day = |d: Option<NaiveDate>| {
        d.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
    };

    let mut lines = vec![];
    lines.push(format!("Records:          {}", stats.record_count));
    lines.push(format!("Players:          {}", stats.player_count));
    lines.push(format!("Lessons:          {}", stats.lesson_count));
    lines.push(format!(
        "Date range:       {} .. {}",
        format_date_opt(stats.date_range.min),
        format_date_opt(stats.date_range.max)
    ));
    lines.push(String::new());
    lines.push(format!(
        "Month window:     {} .. {}",
        bound(filter.start_month),
        bound(filter.end_month)
    ));
    lines.push(format!(
        "Day window:       {} .. {}",
        day(filter.start_month.map(|m| m.first_day())),
        day(filter.end_month.map(|m| m.last_day()))
    ));
    lines.push(format!("Excluded keys:    {}", filter.excluded_count()));
    lines.push(format!("Filtered records: {}", filtered_count));
    lines.join("\n")
}

/// Raw records (preview)
pub fn format_records(
    records: &[SessionRecord],
    sort: &TableSort,
    json: bool,
    no_color: bool,
) -> String {
    let records = sort.sorted(records);
    if json {
        return to_json(&records);
    }
    if records.is_empty() {
        return "No records loaded.".to_string();
    }

    let rows = records.iter().map(record_cells).collect();
    render_table(RECORD_COLUMNS, rows, sort, no_color)
}

/// Player rankings, optionally truncated to the top `limit`
pub fn format_rankings(
    rankings: &[RankingEntry],
    limit: Option<usize>,
    sort: &TableSort,
    json: bool,
    no_color: bool,
) -> String {
    let top = &rankings[..limit.unwrap_or(rankings.len()).min(rankings.len())];
    let rows_sorted = sort.sorted(top);
    if json {
        return to_json(&rows_sorted);
    }
    if rows_sorted.is_empty() {
        return "No sessions in the current filter.".to_string();
    }

    let rows = rows_sorted
        .iter()
        .map(|r| {
            vec![
                r.rank.to_string(),
                r.player.clone(),
                r.avg_score.to_string(),
                r.play_count.to_string(),
                r.best_score.to_string(),
            ]
        })
        .collect();
    render_table(
        &[
            ("rank", "Rank"),
            ("player", "Player"),
            ("avgScore", "Avg score"),
            ("playCount", "Plays"),
            ("bestScore", "Best"),
        ],
        rows,
        sort,
        no_color,
    )
}

/// Monthly play counts and averages
pub fn format_trends(
    trends: &[MonthlyTrend],
    sort: &TableSort,
    json: bool,
    no_color: bool,
) -> String {
    let trends = sort.sorted(trends);
    if json {
        return to_json(&trends);
    }
    if trends.is_empty() {
        return "No sessions in the current filter.".to_string();
    }

    let peak = trends.iter().map(|t| t.play_count).max().unwrap_or(0);
    let rows = trends
        .iter()
        .map(|t| {
            vec![
                t.month.to_string(),
                t.play_count.to_string(),
                t.avg_score.to_string(),
                bar(t.play_count, peak, 20),
            ]
        })
        .collect();
    render_table(
        &[
            ("month", "Month"),
            ("playCount", "Plays"),
            ("avgScore", "Avg score"),
            ("", ""),
        ],
        rows,
        sort,
        no_color,
    )
}

/// Grouped aggregates
pub fn format_aggregates(
    aggregates: &[AggregatedData],
    by: GroupBy,
    sort: &TableSort,
    json: bool,
    no_color: bool,
) -> String {
    let aggregates = sort.sorted(aggregates);
    if json {
        return to_json(&aggregates);
    }
    if aggregates.is_empty() {
        return "No sessions in the current filter.".to_string();
    }

    let name_label = match by {
        GroupBy::Lesson => "Lesson",
        GroupBy::Level => "Level",
        GroupBy::Category => "Category",
    };
    let rows = aggregates
        .iter()
        .map(|a| {
            vec![
                a.name.clone(),
                a.play_count.to_string(),
                a.avg_score.to_string(),
                format!("{:.1}", a.avg_speech_time),
                format!("{:.1}", a.avg_play_time),
            ]
        })
        .collect();
    render_table(
        &[
            ("name", name_label),
            ("playCount", "Plays"),
            ("avgScore", "Avg score"),
            ("avgSpeechTime", "Avg speech"),
            ("avgPlayTime", "Avg play"),
        ],
        rows,
        sort,
        no_color,
    )
}

/// Per-player records
pub fn format_players(
    players: &[PlayerRecord],
    sort: &TableSort,
    json: bool,
    no_color: bool,
) -> String {
    let players = sort.sorted(players);
    if json {
        return to_json(&players);
    }
    if players.is_empty() {
        return "No sessions in the current filter.".to_string();
    }

    let rows = players
        .iter()
        .map(|p| {
            vec![
                p.player.clone(),
                p.play_count.to_string(),
                p.avg_score.to_string(),
                format_date(&p.last_play_date),
            ]
        })
        .collect();
    render_table(
        &[
            ("player", "Player"),
            ("playCount", "Plays"),
            ("avgScore", "Avg score"),
            ("lastPlayDate", "Last played"),
        ],
        rows,
        sort,
        no_color,
    )
}

/// One page of the session log; `sort` reorders rows within the page
pub fn format_log_page(
    page: &LogPage,
    page_number: usize,
    sort: &TableSort,
    json: bool,
    no_color: bool,
) -> String {
    let entries = sort.sorted(&page.entries);
    if json {
        return to_json(&LogPage {
            entries,
            total_pages: page.total_pages,
            total_count: page.total_count,
        });
    }
    if page.total_count == 0 {
        return "No sessions in the current filter.".to_string();
    }

    let mut columns = vec![("id", "ID")];
    columns.extend_from_slice(RECORD_COLUMNS);
    let rows = entries
        .iter()
        .map(|e| {
            let mut cells = vec![e.id.clone()];
            cells.extend(record_cells(&e.record));
            cells
        })
        .collect();

    format!(
        "{}\nPage {}/{} ({} sessions)",
        render_table(&columns, rows, sort, no_color),
        page_number.max(1),
        page.total_pages,
        page.total_count
    )
}

/// Indented tree with `[x]` / `[ ]` / `[-]` check markers
pub fn format_hierarchy(tree: &Hierarchy, json: bool) -> String {
    if json {
        return to_json(tree);
    }
    if tree.is_empty() {
        return "No records loaded.".to_string();
    }

    let mut lines = vec![];
    for root in &tree.roots {
        push_node(root, 0, &mut lines);
    }
    lines.join("\n")
}

fn push_node(node: &HierarchyNode, depth: usize, lines: &mut Vec<String>) {
    let marker = match node.state() {
        CheckState::Checked => "[x]",
        CheckState::Unchecked => "[ ]",
        CheckState::Indeterminate => "[-]",
    };
    let key = node
        .key
        .as_ref()
        .map(|k| format!("  ({})", k))
        .unwrap_or_default();
    lines.push(format!("{}{} {}{}", "    ".repeat(depth), marker, node.label, key));
    for child in &node.children {
        push_node(child, depth + 1, lines);
    }
}

// ============================================================================
// Utilities
// ============================================================================

const RECORD_COLUMNS: &[(&str, &str)] = &[
    ("date", "Date"),
    ("org", "Org"),
    ("account", "Account"),
    ("group", "Group"),
    ("player", "Player"),
    ("category", "Category"),
    ("level", "Level"),
    ("lesson", "Lesson"),
    ("score", "Score"),
    ("speechTime", "Speech"),
    ("playTime", "Play"),
];

fn record_cells(r: &SessionRecord) -> Vec<String> {
    vec![
        format_date(&r.date),
        r.org.clone(),
        r.account.clone(),
        r.group.clone(),
        r.player.clone(),
        r.category.clone(),
        roleboard_core::models::level_label(r.level),
        r.lesson.clone(),
        r.score.to_string(),
        r.speech_time.to_string(),
        r.play_time.to_string(),
    ]
}

/// Table with the sorted column's header marked by its sort icon
fn render_table(
    columns: &[(&str, &str)],
    rows: Vec<Vec<String>>,
    sort: &TableSort,
    no_color: bool,
) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let headers: Vec<String> = columns
        .iter()
        .map(|(key, label)| {
            if !key.is_empty() && sort.is_sorted(key) {
                format!("{} {}", label, sort.sort_icon(key))
            } else {
                label.to_string()
            }
        })
        .collect();

    // Apply colors only if enabled
    if no_color {
        table.set_header(headers);
    } else {
        table.set_header(
            headers
                .into_iter()
                .map(|h| Cell::new(h).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }

    for row in rows {
        table.add_row(Row::from(row));
    }

    table.to_string()
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

fn format_date(date: &NaiveDateTime) -> String {
    date.format("%Y-%m-%d %H:%M").to_string()
}

fn format_date_opt(date: Option<NaiveDateTime>) -> String {
    date.map(|d| format_date(&d)).unwrap_or_else(|| "-".to_string())
}

fn bar(value: usize, max: usize, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    "█".repeat((value * width).div_ceil(max))
}

// ============================================================================
// Tests
// ============================================================================
