//! Driving port for course lookups.

use async_trait::async_trait;

use crate::domain::{Course, CourseCode, CourseDetails, Error};

/// Use-case port for `get_course`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseQuery: Send + Sync {
    /// Fetch a course; `not_found` when the code is unknown.
    async fn get_course(&self, code: &CourseCode) -> Result<Course, Error>;
}

/// Fixture query serving a single introductory course.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCourseQuery;

#[async_trait]
impl CourseQuery for FixtureCourseQuery {
    async fn get_course(&self, code: &CourseCode) -> Result<Course, Error> {
        if code.as_ref() != "CSC101" {
            return Err(Error::not_found("Course not found"));
        }
        Ok(Course::new(
            code.clone(),
            "Introduction to Programming",
            CourseDetails {
                lecturer: Some("Dr. Smith".to_owned()),
                next_topic: Some("Recursion".to_owned()),
                lab_schedule: Some("Tuesdays 2-4pm".to_owned()),
            },
        ))
    }
}
