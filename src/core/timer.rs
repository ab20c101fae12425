use crate::utils::time::format_countdown;
use chrono::{Duration, NaiveDateTime};

/// Under this much time left an exam in progress is flagged urgent.
pub const URGENT_MINUTES: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamStatus {
    NotStarted,
    InProgress,
    Ended,
}

impl ExamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamStatus::NotStarted => "NOT_STARTED",
            ExamStatus::InProgress => "IN_PROGRESS",
            ExamStatus::Ended => "ENDED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerReading {
    pub status: ExamStatus,
    /// Until start (not started), until end (in progress), zero (ended).
    pub remaining: Duration,
}

impl TimerReading {
    /// `HH:MM:SS`, seconds floored.
    pub fn display(&self) -> String {
        format_countdown(self.remaining.num_seconds())
    }

    pub fn is_urgent(&self) -> bool {
        self.status == ExamStatus::InProgress && self.remaining < Duration::minutes(URGENT_MINUTES)
    }

    pub fn label(&self) -> &'static str {
        match self.status {
            ExamStatus::NotStarted => "Starts in",
            ExamStatus::InProgress => "Time left",
            ExamStatus::Ended => "Exam ended",
        }
    }

    pub fn message(&self) -> &'static str {
        match self.status {
            ExamStatus::NotStarted => "Exam not started",
            ExamStatus::InProgress => "Exam in progress",
            ExamStatus::Ended => "Time expired",
        }
    }
}

/// Status of an exam starting at `start` and lasting `duration_minutes`,
/// seen at `now`. The start instant already counts as in progress, the end
/// instant as ended. A duration too large for the calendar never ends.
pub fn read_timer(start: NaiveDateTime, duration_minutes: i64, now: NaiveDateTime) -> TimerReading {
    let end = Duration::try_minutes(duration_minutes.max(0))
        .and_then(|d| start.checked_add_signed(d))
        .unwrap_or(NaiveDateTime::MAX);

    if now < start {
        TimerReading {
            status: ExamStatus::NotStarted,
            remaining: start - now,
        }
    } else if now < end {
        TimerReading {
            status: ExamStatus::InProgress,
            remaining: end - now,
        }
    } else {
        TimerReading {
            status: ExamStatus::Ended,
            remaining: Duration::zero(),
        }
    }
}
