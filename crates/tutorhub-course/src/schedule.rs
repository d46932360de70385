//! Weekly schedule blocks and busy maps

use std::collections::BTreeMap;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tutorhub_http::{ApiClient, ApiRequest};

use crate::error::{CourseError, CourseResult};
use crate::rest::fetch_first;

const BASE: &str = "/api/course/course/schedule";

/// What occupies a busy interval
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntervalSource {
    pub kind: String,
    pub object_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Interval {
    /// Schedule block id; `None` for intervals owned by something else
    #[serde(default)]
    pub id: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub source: IntervalSource,
}

/// Busy intervals keyed by ISO weekday (1 = Monday ... 7 = Sunday)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeeklyBusyMap {
    #[serde(default)]
    pub busy: BTreeMap<u8, Vec<Interval>>,
}

impl WeeklyBusyMap {
    pub fn day(&self, day_of_week: u8) -> &[Interval] {
        self.busy.get(&day_of_week).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn block_count(&self) -> usize {
        self.busy.values().map(Vec::len).sum()
    }

    /// Find the day and interval holding a schedule block
    pub fn find_block(&self, schedule_id: &str) -> Option<(u8, &Interval)> {
        self.busy.iter().find_map(|(day, intervals)| {
            intervals
                .iter()
                .find(|i| i.id.as_deref() == Some(schedule_id))
                .map(|i| (*day, i))
        })
    }
}

/// Parse `HH:MM` or `HH:MM:SS`
pub fn parse_time(value: &str) -> CourseResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| CourseError::invalid(format!("'{value}' is not a HH:MM time")))
}

/// Reject a block before it reaches the backend
pub fn validate_block(day_of_week: u8, start_time: &str, end_time: &str) -> CourseResult<()> {
    if !(1..=7).contains(&day_of_week) {
        return Err(CourseError::invalid("day of week must be between 1 and 7"));
    }
    let start = parse_time(start_time)?;
    let end = parse_time(end_time)?;
    if start >= end {
        return Err(CourseError::invalid("start time must be before end time"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleInsert {
    pub course_id: String,
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleUpdate {
    pub course_id: String,
    pub schedule_id: String,
    pub new_day_of_week: u8,
    pub new_start_time: String,
    pub new_end_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleRemove {
    pub course_id: String,
    pub schedule_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleClear {
    pub course_id: String,
}

/// Schedule endpoints; mutations answer with the course's new busy map
#[derive(Debug, Clone)]
pub struct ScheduleApi {
    client: ApiClient,
}

impl ScheduleApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn by_course(&self, course_id: &str) -> CourseResult<Option<WeeklyBusyMap>> {
        let req = ApiRequest::get(format!("{BASE}/by-course"))
            .query("course_id", course_id)
            .auth();
        fetch_first(&self.client, &req).await
    }

    /// Everything the teacher is busy with across courses
    pub async fn by_teacher(&self, teacher_id: &str) -> CourseResult<Option<WeeklyBusyMap>> {
        let req = ApiRequest::get(format!("{BASE}/by-teacher"))
            .query("teacher_id", teacher_id)
            .auth();
        fetch_first(&self.client, &req).await
    }

    pub async fn insert(&self, request: &ScheduleInsert) -> CourseResult<Option<WeeklyBusyMap>> {
        validate_block(request.day_of_week, &request.start_time, &request.end_time)?;
        let req = ApiRequest::post(format!("{BASE}/insert")).json(request)?.auth();
        fetch_first(&self.client, &req).await
    }

    pub async fn update(&self, request: &ScheduleUpdate) -> CourseResult<Option<WeeklyBusyMap>> {
        validate_block(
            request.new_day_of_week,
            &request.new_start_time,
            &request.new_end_time,
        )?;
        let req = ApiRequest::patch(format!("{BASE}/update")).json(request)?.auth();
        fetch_first(&self.client, &req).await
    }

    pub async fn remove(&self, request: &ScheduleRemove) -> CourseResult<Option<WeeklyBusyMap>> {
        let req = ApiRequest::delete(format!("{BASE}/remove")).json(request)?.auth();
        fetch_first(&self.client, &req).await
    }

    pub async fn clear(&self, request: &ScheduleClear) -> CourseResult<Option<WeeklyBusyMap>> {
        let req = ApiRequest::post(format!("{BASE}/clear")).json(request)?.auth();
        fetch_first(&self.client, &req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_time_formats() {
        assert_eq!(parse_time("09:30").unwrap(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(parse_time("09:30:15").unwrap(), NaiveTime::from_hms_opt(9, 30, 15).unwrap());
        assert!(parse_time("9.30").is_err());
        assert!(parse_time("25:00").is_err());
    }

    #[test]
    fn test_block_validation() {
        assert!(validate_block(1, "09:00", "10:00").is_ok());
        assert!(validate_block(7, "09:00:00", "09:00:01").is_ok());
        assert!(validate_block(0, "09:00", "10:00").is_err());
        assert!(validate_block(8, "09:00", "10:00").is_err());
        assert!(validate_block(3, "10:00", "10:00").is_err());
        assert!(validate_block(3, "11:00", "10:00").is_err());
    }

    #[test]
    fn test_busy_map_string_keys() {
        let map: WeeklyBusyMap = serde_json::from_value(json!({
            "busy": {
                "1": [{"id": "s1", "start_time": "09:00", "end_time": "10:00", "source": {"kind": "COURSE", "object_id": "c1"}}],
                "3": []
            }
        }))
        .unwrap();
        assert_eq!(map.day(1).len(), 1);
        assert!(map.day(2).is_empty());
        assert_eq!(map.block_count(), 1);
        assert_eq!(map.find_block("s1").map(|(d, _)| d), Some(1));
    }
}
