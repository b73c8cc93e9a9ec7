/// Streak calculation over a user's journal days
///
/// This module derives the current and highest writing streak from the set of
/// calendar days on which a user has a qualifying (non-blank) entry. The
/// calculation is a pure function of those days and "today"; it is re-run from
/// scratch after every entry mutation instead of being adjusted incrementally.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone};
use crate::domain::HighestStreakScope;

/// Anything that can be reduced to a server-local calendar day
///
/// Timestamps are truncated to their day so that two writes on the same day
/// collapse into one streak day.
pub trait CalendarDay {
    fn calendar_day(&self) -> NaiveDate;
}

impl CalendarDay for NaiveDate {
    fn calendar_day(&self) -> NaiveDate {
        *self
    }
}

impl CalendarDay for NaiveDateTime {
    fn calendar_day(&self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> CalendarDay for DateTime<Tz> {
    fn calendar_day(&self) -> NaiveDate {
        self.with_timezone(&Local).date_naive()
    }
}

impl<T: CalendarDay + ?Sized> CalendarDay for &T {
    fn calendar_day(&self) -> NaiveDate {
        (**self).calendar_day()
    }
}

/// Result of a streak calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakResult {
    /// Consecutive days ending today or yesterday
    pub current_streak: u32,
    /// Longest run of consecutive days within the configured scope
    pub highest_streak: u32,
}

impl StreakResult {
    /// Get an encouraging message based on the current streak
    pub fn motivational_message(&self) -> String {
        match self.current_streak {
            0 => "No active streak. Write a few words today to start one.".to_string(),
            1 => "Day one of a new streak. Come back tomorrow to keep it going.".to_string(),
            2..=6 => format!("{} days in a row. The habit is taking shape.", self.current_streak),
            7..=29 => format!("{} days of writing without a break. Keep the pages coming!", self.current_streak),
            30..=99 => format!("{} consecutive days. Writing is part of your day now.", self.current_streak),
            _ => format!("{} days straight. That's a remarkable journal.", self.current_streak),
        }
    }
}

/// A maximal run of consecutive days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakRun {
    /// Last day of the run
    pub end: NaiveDate,
    pub length: u32,
}

/// Pure streak calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct StreakCalculator {
    scope: HighestStreakScope,
}

impl StreakCalculator {
    pub fn new(scope: HighestStreakScope) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> HighestStreakScope {
        self.scope
    }

    /// Calculate both streaks from the days a user wrote on
    ///
    /// Input may be unsorted, contain duplicates, or carry time-of-day; it is
    /// normalized first. Days after `today` are ignored.
    pub fn calculate<I>(&self, days: I, today: NaiveDate) -> StreakResult
    where
        I: IntoIterator,
        I::Item: CalendarDay,
    {
        let days = normalize_days(days, today);

        let current_streak = current_streak(&days, today);
        let highest_streak = match self.scope {
            HighestStreakScope::AllTime => highest_streak(&days),
            HighestStreakScope::CalendarYear => streak_runs(&days)
                .into_iter()
                .filter(|run| run.end.year() == today.year())
                .map(|run| run.length)
                .max()
                .unwrap_or(0)
                // The current run may have ended on Dec 31st when today is Jan 1st
                .max(current_streak),
        };

        StreakResult {
            current_streak,
            highest_streak,
        }
    }
}

/// Sort, deduplicate and truncate to days, dropping anything after `today`
pub fn normalize_days<I>(days: I, today: NaiveDate) -> Vec<NaiveDate>
where
    I: IntoIterator,
    I::Item: CalendarDay,
{
    let mut future = 0usize;
    let unique: BTreeSet<NaiveDate> = days
        .into_iter()
        .map(|d| d.calendar_day())
        .filter(|d| {
            let keep = *d <= today;
            if !keep {
                future += 1;
            }
            keep
        })
        .collect();

    if future > 0 {
        tracing::warn!("Ignoring {} journal day(s) dated after {}", future, today);
    }

    unique.into_iter().collect()
}

/// Length of the run ending today or yesterday
///
/// `days` must be sorted ascending without duplicates. A run whose latest day
/// is two or more days ago is already broken and yields 0.
pub fn current_streak(days: &[NaiveDate], today: NaiveDate) -> u32 {
    let Some(&latest) = days.last() else {
        return 0;
    };

    if (today - latest).num_days() > 1 {
        return 0;
    }

    let mut streak = 1;
    let mut previous = latest;
    for &day in days.iter().rev().skip(1) {
        if (previous - day).num_days() == 1 {
            streak += 1;
            previous = day;
        } else {
            break;
        }
    }

    streak
}

/// Longest run anywhere in `days` (sorted ascending, deduplicated)
pub fn highest_streak(days: &[NaiveDate]) -> u32 {
    let Some(&first) = days.first() else {
        return 0;
    };

    let mut longest = 1;
    let mut running = 1;
    let mut last = first;

    for &day in days.iter().skip(1) {
        if (day - last).num_days() == 1 {
            running += 1;
        } else {
            running = 1;
        }
        longest = longest.max(running);
        last = day;
    }

    longest
}

/// Split sorted, deduplicated days into maximal consecutive runs
pub fn streak_runs(days: &[NaiveDate]) -> Vec<StreakRun> {
    let mut runs: Vec<StreakRun> = Vec::new();

    for &day in days {
        match runs.last_mut() {
            Some(run) if (day - run.end).num_days() == 1 => {
                run.end = day;
                run.length += 1;
            }
            _ => runs.push(StreakRun {
                end: day,
                length: 1,
            }),
        }
    }

    runs
}
