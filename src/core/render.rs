//! Racecard presentation.
//!
//! Turns the tolerant [`Meeting`]/[`Runner`] records into display-ready
//! cards, and renders a whole [`RacecardsView`] as plain text for the
//! one-shot mode. The TUI draws the same [`MeetingCard`] values.

use crate::domain::model::{EmptyReason, Meeting, RacecardsView, Runner};
use serde_json::Value;

pub const UNKNOWN_COURSE: &str = "Unknown course";
pub const CAPTION_SEPARATOR: &str = " • ";
pub const RUNNER_COLUMNS: [&str; 12] = [
    "No", "Draw", "Horse", "Age", "Sex", "Trainer", "Jockey", "Headgear", "OR", "Lbs", "Last",
    "Form",
];

pub type RunnerRow = [String; 12];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingCard {
    pub title: String,
    pub region: Option<String>,
    pub race_name: Option<String>,
    pub captions: Vec<String>,
    pub runners: Vec<RunnerRow>,
}

impl MeetingCard {
    /// 卡片標題：場地名稱，有地區時加上標籤
    pub fn header(&self) -> String {
        match &self.region {
            Some(region) => format!("{} [{}]", self.title, region),
            None => self.title.clone(),
        }
    }
}

impl From<&Meeting> for MeetingCard {
    fn from(meeting: &Meeting) -> Self {
        let top = [
            meeting.start_time.as_ref().map(|t| format!("Off: {}", t)),
            meeting.field_size.as_ref().map(|f| format!("Field: {}", f)),
            meeting.prize.as_ref().map(|p| format!("Prize: {}", p)),
        ];
        let bottom = [
            meeting.race_class.clone(),
            meeting.race_type.clone(),
            meeting.distance_f.as_ref().map(|d| format!("{}f", d)),
            meeting.going.as_ref().map(|g| format!("Going: {}", g)),
            meeting.surface.clone(),
            meeting.age_band.clone(),
            meeting.rating_band.clone(),
        ];

        let captions = [caption_line(&top), caption_line(&bottom)]
            .into_iter()
            .flatten()
            .collect();

        Self {
            title: meeting
                .course
                .clone()
                .unwrap_or_else(|| UNKNOWN_COURSE.to_string()),
            region: meeting.region.clone(),
            race_name: meeting.race_name.clone(),
            captions,
            runners: meeting.runners.iter().map(runner_row).collect(),
        }
    }
}

fn caption_line(bits: &[Option<String>]) -> Option<String> {
    let present: Vec<&str> = bits.iter().flatten().map(String::as_str).collect();
    if present.is_empty() {
        None
    } else {
        Some(present.join(CAPTION_SEPARATOR))
    }
}

pub fn runner_row(runner: &Runner) -> RunnerRow {
    [
        &runner.number,
        &runner.draw,
        &runner.horse,
        &runner.age,
        &runner.sex,
        &runner.trainer,
        &runner.jockey,
        &runner.headgear,
        &runner.official_rating,
        &runner.lbs,
        &runner.last_run,
        &runner.form,
    ]
    .map(|cell| cell.clone().unwrap_or_default())
}

pub fn cards(meetings: &[Meeting]) -> Vec<MeetingCard> {
    meetings.iter().map(MeetingCard::from).collect()
}

pub fn results_heading(count: usize) -> String {
    format!("Results: {} meetings", count)
}

pub fn empty_message(reason: EmptyReason) -> &'static str {
    match reason {
        EmptyReason::NothingReturned => "No results returned.",
        EmptyReason::EmptyPayload => "The API returned an empty result.",
    }
}

pub fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// 純文字輸出，給 --once 使用
pub fn render_text(view: &RacecardsView) -> String {
    match view {
        RacecardsView::Empty(reason) => format!("{}\n", empty_message(*reason)),
        RacecardsView::Raw(value) => format!("{}\n", pretty_json(value)),
        RacecardsView::Cards(meetings) => {
            let mut out = format!("{}\n", results_heading(meetings.len()));
            for card in cards(meetings) {
                out.push('\n');
                out.push_str(&render_card_text(&card));
            }
            out
        }
    }
}

pub fn render_card_text(card: &MeetingCard) -> String {
    let mut out = format!("{}\n", card.header());
    if let Some(race_name) = &card.race_name {
        out.push_str(race_name);
        out.push('\n');
    }
    for caption in &card.captions {
        out.push_str(caption);
        out.push('\n');
    }
    if !card.runners.is_empty() {
        out.push_str(&format_table(&card.runners));
    }
    out
}

fn format_table(rows: &[RunnerRow]) -> String {
    let mut widths: Vec<usize> = RUNNER_COLUMNS.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = RUNNER_COLUMNS.iter().map(|h| h.to_string()).collect();
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    for line in [header.as_slice(), rule.as_slice()]
        .into_iter()
        .chain(rows.iter().map(|r| r.as_slice()))
    {
        let padded: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        out.push_str(padded.join("  ").trim_end());
        out.push('\n');
    }
    out
}
