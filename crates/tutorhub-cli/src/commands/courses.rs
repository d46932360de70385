//! courses list / course show

use async_trait::async_trait;
use tutorhub_course::{CourseRead, CourseStore, TeacherCourses, WeeklyBusyMap};

use crate::commands::Command;
use crate::context::AppContext;
use crate::error::CliResult;
use crate::output::OutputStyle;

const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub struct CoursesListCommand;

#[async_trait]
impl Command for CoursesListCommand {
    async fn execute(&self, ctx: &AppContext) -> CliResult<()> {
        let teacher_id = ctx.teacher_id().await?;
        let courses = TeacherCourses::new(ctx.authorized()?, teacher_id);
        courses.refresh().await?;

        let style = OutputStyle::default();
        if courses.all().is_empty() {
            println!("{}", style.info("You have no courses yet"));
            return Ok(());
        }
        print_group(&style, "Published", &courses.published());
        print_group(&style, "Not published", &courses.unpublished());
        Ok(())
    }
}

fn print_group(style: &OutputStyle, title: &str, courses: &[CourseRead]) {
    if courses.is_empty() {
        return;
    }
    println!("{}", style.header(title));
    for course in courses {
        println!("  {}", course_line(style, course));
    }
    println!();
}

fn course_line(style: &OutputStyle, course: &CourseRead) -> String {
    format!(
        "{}  {}  [{}]  {}/{} students",
        style.code(&course.course_id),
        course.course_name,
        course.course_status,
        course.course_students,
        course.course_capacity
    )
}

pub struct CourseShowCommand {
    course_id: String,
}

impl CourseShowCommand {
    pub fn new(course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
        }
    }
}

#[async_trait]
impl Command for CourseShowCommand {
    async fn execute(&self, ctx: &AppContext) -> CliResult<()> {
        let store = CourseStore::new(ctx.authorized()?, self.course_id.clone());
        store.load().await?;

        let style = OutputStyle::default();
        let state = store.state();
        if let Some(course) = &state.course {
            println!("{}", style.header(&course.course_name));
            println!("{}", style.key_value("id", &style.code(&course.course_id)));
            println!("{}", style.key_value("status", course.course_status.as_str()));
            println!("{}", style.key_value("price", &course.course_price));
            println!(
                "{}",
                style.key_value(
                    "students",
                    &format!("{}/{}", course.course_students, course.course_capacity)
                )
            );
            println!(
                "{}",
                style.key_value(
                    "lessons",
                    &format!("{}/{}", course.completed_lessons, course.total_lessons)
                )
            );
            if let Some(start) = &course.start_date {
                println!("{}", style.key_value("starts", start));
            }
        }

        if let Some(syllabus) = &state.syllabus {
            println!();
            println!("{}", style.header("Syllabus"));
            let weeks = syllabus.weeks();
            if weeks.is_empty() {
                println!("  {}", style.dim("empty"));
            }
            for (week, rows) in weeks {
                let names: Vec<String> = rows
                    .iter()
                    .map(|row| match &row.subunit {
                        Some(subunit) => subunit.name.clone(),
                        None => row.id.clone(),
                    })
                    .collect();
                println!("  week {}: {}", week, names.join(", "));
            }
        }

        if let Some(schedule) = &state.schedule {
            println!();
            println!("{}", style.header("Weekly schedule"));
            for line in schedule_lines(schedule) {
                println!("  {}", line);
            }
        }
        Ok(())
    }
}

/// One line per day that has blocks, `Mon 09:00-10:00, 14:00-15:00`
pub fn schedule_lines(schedule: &WeeklyBusyMap) -> Vec<String> {
    schedule
        .busy
        .iter()
        .filter(|(_, blocks)| !blocks.is_empty())
        .map(|(day, blocks)| {
            let name = day
                .checked_sub(1)
                .and_then(|i| DAY_NAMES.get(i as usize))
                .copied()
                .unwrap_or("?");
            let spans: Vec<String> = blocks
                .iter()
                .map(|b| format!("{}-{}", b.start_time, b.end_time))
                .collect();
            format!("{} {}", name, spans.join(", "))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tutorhub_course::{Interval, IntervalSource};

    fn block(start: &str, end: &str) -> Interval {
        Interval {
            id: None,
            start_time: start.into(),
            end_time: end.into(),
            source: IntervalSource {
                kind: "COURSE".into(),
                object_id: "c1".into(),
            },
        }
    }

    #[test]
    fn test_schedule_lines_skip_empty_days() {
        let mut busy = BTreeMap::new();
        busy.insert(1, vec![block("09:00", "10:00"), block("14:00", "15:00")]);
        busy.insert(2, vec![]);
        busy.insert(7, vec![block("10:00", "11:00")]);
        let lines = schedule_lines(&WeeklyBusyMap { busy });
        assert_eq!(lines, vec!["Mon 09:00-10:00, 14:00-15:00", "Sun 10:00-11:00"]);
    }
}
