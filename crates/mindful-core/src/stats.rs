//! Aggregates derived from session history.
//!
//! Every aggregate is a pure function of the record list and an explicit
//! `today`, so callers (and tests) control the reference day. Records are
//! bucketed by the local calendar day they started on.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Days, Local, NaiveDate, Utc};
use serde::Serialize;

use crate::history::SessionRecord;

/// Minutes credited to one calendar day of the trailing week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayMinutes {
    pub day: NaiveDate,
    pub minutes: u64,
}

/// Everything the stats view shows, computed in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_sessions: usize,
    pub total_minutes: u64,
    pub minutes_today: u64,
    pub streak_days: u32,
    pub weekly: Vec<DayMinutes>,
}

/// Local calendar day a timestamp falls on.
pub fn local_day(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&Local).date_naive()
}

fn minutes_by_day(records: &[SessionRecord]) -> HashMap<NaiveDate, u64> {
    let mut map = HashMap::new();
    for record in records {
        *map.entry(local_day(record.started_at)).or_insert(0) += record.minutes();
    }
    map
}

pub fn total_minutes(records: &[SessionRecord]) -> u64 {
    records.iter().map(SessionRecord::minutes).sum()
}

pub fn minutes_today(records: &[SessionRecord], today: NaiveDate) -> u64 {
    records
        .iter()
        .filter(|r| local_day(r.started_at) == today)
        .map(SessionRecord::minutes)
        .sum()
}

/// Consecutive days with at least one session, counting back from `today`.
/// A day with no practice breaks the streak; no practice today means zero.
/// Presence is what counts, so a session too short to earn a minute still
/// keeps the streak alive.
pub fn compute_streak(records: &[SessionRecord], today: NaiveDate) -> u32 {
    let days: HashSet<NaiveDate> = records.iter().map(|r| local_day(r.started_at)).collect();
    let mut streak = 0;
    let mut day = today;
    while days.contains(&day) {
        streak += 1;
        let Some(prev) = day.checked_sub_days(Days::new(1)) else {
            break;
        };
        day = prev;
    }
    streak
}

/// Minutes for each of the last seven days, oldest first, zero-filled.
/// Always exactly seven entries and the last one is `today`.
pub fn weekly_minutes(records: &[SessionRecord], today: NaiveDate) -> Vec<DayMinutes> {
    let by_day = minutes_by_day(records);
    (0..7)
        .rev()
        .map(|back| {
            let day = today - Days::new(back);
            DayMinutes {
                day,
                minutes: by_day.get(&day).copied().unwrap_or(0),
            }
        })
        .collect()
}

pub fn summarize(records: &[SessionRecord], today: NaiveDate) -> StatsSummary {
    StatsSummary {
        total_sessions: records.len(),
        total_minutes: total_minutes(records),
        minutes_today: minutes_today(records, today),
        streak_days: compute_streak(records, today),
        weekly: weekly_minutes(records, today),
    }
}
