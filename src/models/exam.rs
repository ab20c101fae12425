use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::core::timer::{self, TimerReading};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: i64,
    pub course_code: String,
    pub course_name: String,
    pub venue: String,
    pub exam_date: NaiveDate, // "YYYY-MM-DD"
    pub start_time: NaiveTime, // "HH:MM:SS"
    pub duration: i64,        // minutes
}

impl Exam {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.exam_date.and_time(self.start_time)
    }

    pub fn timer(&self, now: NaiveDateTime) -> TimerReading {
        timer::read_timer(self.starts_at(), self.duration, now)
    }

    pub fn title(&self) -> String {
        format!("{} - {}", self.course_code, self.course_name)
    }
}
