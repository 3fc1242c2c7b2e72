//! Turning timeline events into notes.
//!
//! # Responsibility
//! - Map an age to its developmental age range.
//! - Build the markdown note body for one event.
//! - Hand the note to an external note store.

use crate::model::node::Node;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Developmental age ranges used to file notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeRange {
    #[serde(rename = "infancy")]
    Infancy,
    #[serde(rename = "toddler")]
    Toddler,
    #[serde(rename = "preschool")]
    Preschool,
    #[serde(rename = "primary-school")]
    PrimarySchool,
    #[serde(rename = "earlyAdolescence")]
    EarlyAdolescence,
    #[serde(rename = "adolescence")]
    Adolescence,
    #[serde(rename = "emergingAdult")]
    EmergingAdult,
    #[serde(rename = "earlyAdult")]
    EarlyAdult,
    #[serde(rename = "midlife")]
    Midlife,
    #[serde(rename = "lateAdult")]
    LateAdult,
    #[serde(rename = "oldestOld")]
    OldestOld,
}

impl AgeRange {
    pub fn label(self) -> &'static str {
        match self {
            Self::Infancy => "Infancy (0-1)",
            Self::Toddler => "Early childhood (1-3)",
            Self::Preschool => "Preschool (3-7)",
            Self::PrimarySchool => "Primary school (7-10)",
            Self::EarlyAdolescence => "Early adolescence (10-13)",
            Self::Adolescence => "Adolescence (13-18)",
            Self::EmergingAdult => "Emerging adulthood (18-22)",
            Self::EarlyAdult => "Early adulthood (22-40)",
            Self::Midlife => "Midlife (40-65)",
            Self::LateAdult => "Late adulthood (65-80)",
            Self::OldestOld => "Oldest old (80+)",
        }
    }
}

/// Age range for `age` in years; `None` for negative or non-finite ages.
///
/// An age on a boundary belongs to the older range, except 13, 18 and 65,
/// which close their ranges.
pub fn age_to_range(age: f64) -> Option<AgeRange> {
    if age.is_nan() || age < 0.0 {
        return None;
    }
    let range = if age < 1.0 {
        AgeRange::Infancy
    } else if age < 3.0 {
        AgeRange::Toddler
    } else if age < 7.0 {
        AgeRange::Preschool
    } else if age < 10.0 {
        AgeRange::PrimarySchool
    } else if age <= 13.0 {
        AgeRange::EarlyAdolescence
    } else if age <= 18.0 {
        AgeRange::Adolescence
    } else if age < 22.0 {
        AgeRange::EmergingAdult
    } else if age < 40.0 {
        AgeRange::EarlyAdult
    } else if age <= 65.0 {
        AgeRange::Midlife
    } else if age < 80.0 {
        AgeRange::LateAdult
    } else {
        AgeRange::OldestOld
    };
    Some(range)
}

/// Note ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventNote {
    pub title: String,
    pub content: String,
    pub age_range: Option<AgeRange>,
}

pub fn format_event_as_note(event: &Node) -> EventNote {
    let age_range = age_to_range(event.age);
    let period = age_range.map_or("Age range unknown", AgeRange::label);
    let sphere = event
        .sphere
        .map_or("Not specified", |sphere| sphere.meta().label);

    let mut lines = vec![
        format!("**Age:** {} years", event.age),
        format!("**Period:** {period}"),
        format!("**Sphere:** {sphere}"),
    ];
    let details = event.notes.trim();
    if !details.is_empty() {
        lines.push("**Details:**".to_string());
        lines.push(details.to_string());
    }

    EventNote {
        title: event.label.clone(),
        content: lines.join("\n"),
        age_range,
    }
}

/// External note store. Returns the id of the created note.
pub trait NoteSink {
    fn create_note(
        &mut self,
        note: &EventNote,
        topic_id: Option<&str>,
        topic_title: Option<&str>,
    ) -> Result<String, String>;
}

/// A note accepted by the note store.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedNote {
    pub note_id: String,
    pub note: EventNote,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NoteError {
    NodeNotFound(String),
    Sink(String),
}

impl Display for NoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "event not found: {id}"),
            Self::Sink(message) => write!(f, "note store rejected the note: {message}"),
        }
    }
}

impl Error for NoteError {}
