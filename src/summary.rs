//! Export-wide summary statistics
//!
//! Aggregates transformed rows into headline numbers: like and match
//! counts, conversion percentages, messaging totals, meeting count, daily
//! rates over the like activity window and match timing histograms.
//!
//! Every ratio guards its denominator and reports `None` instead of dividing
//! by zero.

use crate::config::SummaryConfig;
use crate::types::{InteractionRow, LikeType, MatchType};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Headline statistics for a whole export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub total_interactions: usize,

    pub likes_received: usize,
    pub likes_sent: usize,
    pub total_likes: usize,
    pub matches_from_received_likes: usize,
    pub matches_from_sent_likes: usize,
    pub total_matches: usize,

    /// Percent of received likes that matched
    pub pct_matches_from_received_likes: Option<f64>,
    /// Percent of sent likes that matched
    pub pct_matches_from_sent_likes: Option<f64>,
    /// Percent of all likes that matched
    pub pct_matches_from_total_likes: Option<f64>,
    pub pct_likes_received: Option<f64>,
    pub pct_likes_sent: Option<f64>,

    pub total_messages: usize,
    pub avg_messages_per_match: Option<f64>,
    pub total_voice_notes: usize,
    /// Interactions with a definite "we met" answer
    pub total_met: usize,

    pub like_activity: LikeActivity,

    pub matches_by_weekday: Vec<WeekdayCount>,
    /// Match counts for hours 0..=23
    pub matches_by_hour: Vec<usize>,
    pub likes_over_time: Vec<DailyCount>,
    pub matches_over_time: Vec<DailyCount>,
}

/// Rates over the window between the first and last sent like
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikeActivity {
    #[serde(with = "crate::timestamp::optional_fixed")]
    pub first_like: Option<NaiveDateTime>,
    #[serde(with = "crate::timestamp::optional_fixed")]
    pub last_like: Option<NaiveDateTime>,
    /// Whole days between first and last like
    pub span_days: Option<i64>,
    pub avg_likes_sent_per_day: Option<f64>,
    pub avg_likes_received_per_day: Option<f64>,
    pub avg_matches_per_day: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayCount {
    pub weekday: String,
    pub count: usize,
}

/// Running total as of the end of `date`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub cumulative: usize,
}

impl ExportSummary {
    /// Summarize transformed rows
    pub fn from_rows(rows: &[InteractionRow], config: &SummaryConfig) -> Self {
        let received: Vec<&InteractionRow> =
            rows.iter().filter(|r| r.like_type == LikeType::Received).collect();
        let sent: Vec<&InteractionRow> =
            rows.iter().filter(|r| r.like_type == LikeType::Sent).collect();

        let likes_received = received.len();
        let likes_sent = sent.len();
        let total_likes = likes_received + likes_sent;
        let matches_from_received_likes = received.iter().filter(|r| is_match(r)).count();
        let matches_from_sent_likes = sent.iter().filter(|r| is_match(r)).count();
        let total_matches = rows.iter().filter(|r| is_match(r)).count();

        let total_messages: usize = rows.iter().map(|r| r.num_messages).sum();
        let total_voice_notes: usize = rows.iter().map(|r| r.num_voice_notes).sum();
        let total_met = rows
            .iter()
            .filter(|r| has_met(r.met.as_ref(), &config.met_pending_label))
            .count();

        let match_times: Vec<NaiveDateTime> = rows.iter().filter_map(|r| r.match_timestamp).collect();
        let like_times: Vec<NaiveDateTime> = rows.iter().filter_map(|r| r.like_timestamp).collect();

        let like_activity =
            like_activity(&like_times, likes_sent, likes_received, total_matches);

        ExportSummary {
            total_interactions: rows.len(),
            likes_received,
            likes_sent,
            total_likes,
            matches_from_received_likes,
            matches_from_sent_likes,
            total_matches,
            pct_matches_from_received_likes: percent(matches_from_received_likes, likes_received),
            pct_matches_from_sent_likes: percent(matches_from_sent_likes, likes_sent),
            pct_matches_from_total_likes: percent(total_matches, total_likes),
            pct_likes_received: percent(likes_received, total_likes),
            pct_likes_sent: percent(likes_sent, total_likes),
            total_messages,
            avg_messages_per_match: ratio(total_messages as f64, total_matches),
            total_voice_notes,
            total_met,
            like_activity,
            matches_by_weekday: weekday_counts(&match_times),
            matches_by_hour: hour_counts(&match_times),
            likes_over_time: cumulative_by_date(&like_times),
            matches_over_time: cumulative_by_date(&match_times),
        }
    }
}

fn is_match(row: &InteractionRow) -> bool {
    row.match_type == MatchType::Match
}

fn has_met(met: Option<&Value>, pending_label: &str) -> bool {
    match met {
        None | Some(Value::Null) => false,
        Some(Value::String(answer)) => answer != pending_label,
        Some(_) => true,
    }
}

fn ratio(numerator: f64, denominator: usize) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator / denominator as f64)
    }
}

fn percent(part: usize, whole: usize) -> Option<f64> {
    ratio(part as f64 * 100.0, whole)
}

fn like_activity(
    like_times: &[NaiveDateTime],
    likes_sent: usize,
    likes_received: usize,
    total_matches: usize,
) -> LikeActivity {
    let first_like = like_times.iter().min().copied();
    let last_like = like_times.iter().max().copied();

    let span_days = match (first_like, last_like) {
        (Some(first), Some(last)) => Some((last - first).num_days()),
        _ => None,
    };

    let per_day = |count: usize| match span_days {
        Some(days) if days > 0 => Some(count as f64 / days as f64),
        _ => None,
    };

    LikeActivity {
        first_like,
        last_like,
        span_days,
        avg_likes_sent_per_day: per_day(likes_sent),
        avg_likes_received_per_day: per_day(likes_received),
        avg_matches_per_day: per_day(total_matches),
    }
}

fn weekday_counts(times: &[NaiveDateTime]) -> Vec<WeekdayCount> {
    let mut counts = [0usize; 7];
    for t in times {
        counts[t.weekday().num_days_from_monday() as usize] += 1;
    }

    WEEKDAYS
        .iter()
        .zip(counts)
        .map(|(day, count)| WeekdayCount {
            weekday: weekday_name(*day).to_string(),
            count,
        })
        .collect()
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn hour_counts(times: &[NaiveDateTime]) -> Vec<usize> {
    let mut counts = vec![0usize; 24];
    for t in times {
        counts[t.hour() as usize] += 1;
    }
    counts
}

fn cumulative_by_date(times: &[NaiveDateTime]) -> Vec<DailyCount> {
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for t in times {
        *per_day.entry(t.date()).or_insert(0) += 1;
    }

    let mut running = 0;
    per_day
        .into_iter()
        .map(|(date, count)| {
            running += count;
            DailyCount {
                date,
                cumulative: running,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ExportAdapter;
    use crate::transformer::InteractionTransformer;
    use pretty_assertions::assert_eq;

    fn rows_from(json: &str) -> Vec<InteractionRow> {
        let interactions = ExportAdapter::parse_array(json).unwrap();
        InteractionTransformer::transform(&interactions).unwrap()
    }

    fn sample_rows() -> Vec<InteractionRow> {
        rows_from(
            r#"[
                {
                    "like": [{ "timestamp": "2023-01-02 09:00:00" }],
                    "match": [{ "timestamp": "2023-01-02 09:30:00" }],
                    "chats": [
                        { "timestamp": "2023-01-02 10:00:00", "body": "hi" },
                        { "timestamp": "2023-01-02 11:00:00", "body": "hey" },
                        { "timestamp": "2023-01-02 12:00:00", "body": "lunch?" }
                    ],
                    "we_met": [{ "did_meet_subject": "Yes" }],
                    "voice_notes": [{}]
                },
                { "like": [{ "timestamp": "2023-01-06 20:00:00" }] },
                {
                    "match": [{ "timestamp": "2023-01-03 21:15:00" }],
                    "chats": [{ "timestamp": "2023-01-03 21:20:00", "body": "hello" }],
                    "we_met": [{ "did_meet_subject": "Not yet" }]
                },
                {},
                { "we_met": [{ "did_meet_subject": "No" }] }
            ]"#,
        )
    }

    #[test]
    fn test_like_and_match_counts() {
        let summary = ExportSummary::from_rows(&sample_rows(), &SummaryConfig::default());

        assert_eq!(summary.total_interactions, 5);
        assert_eq!(summary.likes_sent, 2);
        assert_eq!(summary.likes_received, 3);
        assert_eq!(summary.total_likes, 5);
        assert_eq!(summary.matches_from_sent_likes, 1);
        assert_eq!(summary.matches_from_received_likes, 1);
        assert_eq!(summary.total_matches, 2);

        assert_eq!(summary.pct_matches_from_sent_likes, Some(50.0));
        assert_eq!(summary.pct_matches_from_total_likes, Some(40.0));
        assert_eq!(summary.pct_likes_sent, Some(40.0));
        assert_eq!(summary.pct_likes_received, Some(60.0));
    }

    #[test]
    fn test_messaging_and_meeting_totals() {
        let summary = ExportSummary::from_rows(&sample_rows(), &SummaryConfig::default());

        assert_eq!(summary.total_messages, 4);
        assert_eq!(summary.avg_messages_per_match, Some(2.0));
        assert_eq!(summary.total_voice_notes, 1);
        // "Yes" and "No" count, "Not yet" does not
        assert_eq!(summary.total_met, 2);
    }

    #[test]
    fn test_custom_pending_label() {
        let config = SummaryConfig {
            met_pending_label: "No".to_string(),
        };
        let summary = ExportSummary::from_rows(&sample_rows(), &config);
        assert_eq!(summary.total_met, 2);
    }

    #[test]
    fn test_like_activity_window() {
        let summary = ExportSummary::from_rows(&sample_rows(), &SummaryConfig::default());
        let activity = &summary.like_activity;

        assert_eq!(activity.span_days, Some(4));
        assert_eq!(activity.avg_likes_sent_per_day, Some(0.5));
        assert_eq!(activity.avg_likes_received_per_day, Some(0.75));
        assert_eq!(activity.avg_matches_per_day, Some(0.5));
    }

    #[test]
    fn test_match_histograms() {
        let summary = ExportSummary::from_rows(&sample_rows(), &SummaryConfig::default());

        // 2023-01-02 is a Monday, 2023-01-03 a Tuesday
        let weekdays: Vec<(&str, usize)> = summary
            .matches_by_weekday
            .iter()
            .map(|w| (w.weekday.as_str(), w.count))
            .collect();
        assert_eq!(
            weekdays,
            vec![
                ("Monday", 1),
                ("Tuesday", 1),
                ("Wednesday", 0),
                ("Thursday", 0),
                ("Friday", 0),
                ("Saturday", 0),
                ("Sunday", 0),
            ]
        );

        assert_eq!(summary.matches_by_hour.len(), 24);
        assert_eq!(summary.matches_by_hour[9], 1);
        assert_eq!(summary.matches_by_hour[21], 1);
        assert_eq!(summary.matches_by_hour.iter().sum::<usize>(), 2);
    }

    #[test]
    fn test_cumulative_over_time() {
        let summary = ExportSummary::from_rows(&sample_rows(), &SummaryConfig::default());

        let likes: Vec<(String, usize)> = summary
            .likes_over_time
            .iter()
            .map(|d| (d.date.to_string(), d.cumulative))
            .collect();
        assert_eq!(
            likes,
            vec![("2023-01-02".to_string(), 1), ("2023-01-06".to_string(), 2)]
        );
        assert_eq!(summary.matches_over_time.last().unwrap().cumulative, 2);
    }

    #[test]
    fn test_zero_denominators_are_absent() {
        let summary = ExportSummary::from_rows(&[], &SummaryConfig::default());

        assert_eq!(summary.total_likes, 0);
        assert_eq!(summary.pct_matches_from_received_likes, None);
        assert_eq!(summary.pct_matches_from_sent_likes, None);
        assert_eq!(summary.pct_matches_from_total_likes, None);
        assert_eq!(summary.pct_likes_received, None);
        assert_eq!(summary.avg_messages_per_match, None);
        assert_eq!(summary.like_activity.first_like, None);
        assert_eq!(summary.like_activity.span_days, None);
        assert_eq!(summary.like_activity.avg_matches_per_day, None);
        assert!(summary.likes_over_time.is_empty());
    }

    #[test]
    fn test_single_day_of_likes_has_no_daily_rate() {
        let rows = rows_from(
            r#"[
                { "like": [{ "timestamp": "2023-01-02 09:00:00" }] },
                { "like": [{ "timestamp": "2023-01-02 17:00:00" }] }
            ]"#,
        );
        let summary = ExportSummary::from_rows(&rows, &SummaryConfig::default());

        assert_eq!(summary.like_activity.span_days, Some(0));
        assert_eq!(summary.like_activity.avg_likes_sent_per_day, None);
        assert_eq!(summary.pct_matches_from_sent_likes, Some(0.0));
        assert_eq!(summary.pct_matches_from_received_likes, None);
    }
}
