//! Output CSV layouts.
//!
//! Column order is consumed by the database seeders as-is, including the
//! `recommended_preperation` spelling.

use crate::catalog::{Course, Requisite};
use crate::timetable::Offering;

pub const COURSE_HEADERS: [&str; 10] = [
    "code",
    "breadth_requirement",
    "course_experience",
    "description",
    "recommended_preperation",
    "prerequisite_description",
    "exclusion_description",
    "name",
    "corequisite_description",
    "note",
];

pub const PREREQUISITE_HEADERS: [&str; 2] = ["prerequisite_code", "course_code"];

pub const COREQUISITE_HEADERS: [&str; 2] = ["corequisite_code", "course_code"];

pub const OFFERING_HEADERS: [&str; 13] = [
    "course_code",
    "meeting_section",
    "offering",
    "day",
    "start",
    "end",
    "location",
    "current",
    "max",
    "is_waitlisted",
    "delivery_mode",
    "instructor",
    "notes",
];

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

impl Course {
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.code.clone(),
            self.breadth_requirement
                .map(|b| b.to_string())
                .unwrap_or_default(),
            self.course_experience.clone(),
            self.description.clone(),
            self.recommended_preparation.clone(),
            self.prerequisite_description.clone(),
            self.exclusion_description.clone(),
            self.name.clone(),
            self.corequisite_description.clone(),
            self.note.clone(),
        ]
    }
}

impl Requisite {
    pub fn to_record(&self) -> Vec<String> {
        vec![self.required.clone(), self.course.clone()]
    }
}

impl Offering {
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.course_code.clone(),
            self.meeting_section.clone(),
            self.offering.clone(),
            text(&self.day),
            text(&self.start),
            text(&self.end),
            text(&self.location),
            text(&self.current),
            text(&self.max),
            self.is_waitlisted
                .map(|w| w.to_string())
                .unwrap_or_default(),
            self.delivery_mode
                .map(|d| d.to_string())
                .unwrap_or_default(),
            text(&self.instructor),
            text(&self.notes),
        ]
    }
}
