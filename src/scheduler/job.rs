use chrono::{DateTime, Datelike, Duration as ChronoDuration, Timelike, Utc, Weekday};

use crate::models::Category;

/// How a job's `next_run` is recomputed after each dispatch (spec.md §4.8).
#[derive(Debug, Clone)]
pub enum Schedule {
    Interval(std::time::Duration),
    Daily { hour: u32, minute: u32 },
    Weekly { hour: u32, minute: u32, day: Weekday },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Briefing,
    Trending,
    CategoryDigest(Category),
}

pub struct Job {
    pub name: String,
    pub schedule: Schedule,
    pub kind: JobKind,
    pub last_run: Option<DateTime<Utc>>,
    pub next_run: DateTime<Utc>,
}

impl Job {
    pub fn new(name: impl Into<String>, schedule: Schedule, kind: JobKind, from: DateTime<Utc>) -> Self {
        let next_run = next_run_after(&schedule, from);
        Self {
            name: name.into(),
            schedule,
            kind,
            last_run: None,
            next_run,
        }
    }

    pub fn mark_dispatched(&mut self, now: DateTime<Utc>) {
        self.last_run = Some(now);
        self.next_run = next_run_after(&self.schedule, now);
    }
}

/// Computes the next dispatch time strictly after `from` (spec.md §4.8:
/// `interval(d)` → `now + d`; `daily(hh:mm)` → next occurrence at that UTC
/// time; `weekly(hh:mm, days)` → next occurrence on the next matching
/// weekday).
fn next_run_after(schedule: &Schedule, from: DateTime<Utc>) -> DateTime<Utc> {
    match schedule {
        Schedule::Interval(d) => from + ChronoDuration::from_std(*d).unwrap_or(ChronoDuration::zero()),
        Schedule::Daily { hour, minute } => next_daily_at(from, *hour, *minute),
        Schedule::Weekly { hour, minute, day } => next_weekly_at(from, *hour, *minute, *day),
    }
}

fn next_daily_at(from: DateTime<Utc>, hour: u32, minute: u32) -> DateTime<Utc> {
    let candidate = from
        .date_naive()
        .and_hms_opt(hour, minute, 0)
        .expect("valid hour/minute")
        .and_utc();
    if candidate > from {
        candidate
    } else {
        candidate + ChronoDuration::days(1)
    }
}

fn next_weekly_at(from: DateTime<Utc>, hour: u32, minute: u32, day: Weekday) -> DateTime<Utc> {
    let mut candidate = next_daily_at(from, hour, minute);
    while candidate.weekday() != day {
        candidate += ChronoDuration::days(1);
    }
    candidate
}

/// Builds the default job set (spec.md §4.8 "Default job set"): three daily
/// briefings (morning/midday/evening), one weekly roundup briefing, one
/// trending job every two hours, and one digest per static category
/// staggered one hour apart starting at `cfg.briefing_hour_utc`.
pub fn default_jobs(cfg: &crate::config::Config, now: DateTime<Utc>) -> Vec<Job> {
    let mut jobs = vec![
        Job::new(
            "briefing-morning",
            Schedule::Daily { hour: 7, minute: 0 },
            JobKind::Briefing,
            now,
        ),
        Job::new(
            "briefing-midday",
            Schedule::Daily { hour: 12, minute: 0 },
            JobKind::Briefing,
            now,
        ),
        Job::new(
            "briefing-evening",
            Schedule::Daily { hour: 18, minute: 0 },
            JobKind::Briefing,
            now,
        ),
        Job::new(
            "briefing-weekly",
            Schedule::Weekly {
                hour: cfg.briefing_hour_utc,
                minute: 0,
                day: weekday_from_u32(cfg.digest_weekday),
            },
            JobKind::Briefing,
            now,
        ),
        Job::new(
            "trending",
            Schedule::Interval(std::time::Duration::from_secs(2 * 3600)),
            JobKind::Trending,
            now,
        ),
    ];

    for (i, category) in Category::all_static().iter().enumerate() {
        let hour = (cfg.briefing_hour_utc + 1 + i as u32) % 24;
        jobs.push(Job::new(
            format!("digest-{}", category.as_str()),
            Schedule::Daily { hour, minute: 0 },
            JobKind::CategoryDigest(*category),
            now,
        ));
    }

    jobs
}

fn weekday_from_u32(n: u32) -> Weekday {
    match n % 7 {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        _ => Weekday::Sat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn daily_schedule_rolls_to_next_day_once_past() {
        let from = Utc.with_ymd_and_hms(2026, 1, 1, 20, 0, 0).unwrap();
        let next = next_daily_at(from, 7, 0);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 1, 2, 7, 0, 0).unwrap());
    }

    #[test]
    fn daily_schedule_same_day_if_still_ahead() {
        let from = Utc.with_ymd_and_hms(2026, 1, 1, 3, 0, 0).unwrap();
        let next = next_daily_at(from, 7, 0);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 1, 1, 7, 0, 0).unwrap());
    }

    #[test]
    fn weekly_schedule_finds_next_matching_weekday() {
        let from = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(); // Thursday
        let next = next_weekly_at(from, 13, 0, Weekday::Mon);
        assert_eq!(next.weekday(), Weekday::Mon);
        assert!(next > from);
    }

    #[test]
    fn interval_schedule_adds_duration() {
        let from = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let next = next_run_after(&Schedule::Interval(std::time::Duration::from_secs(7200)), from);
        assert_eq!(next, from + ChronoDuration::hours(2));
    }
}
