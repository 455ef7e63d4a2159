//! Participant enrollment and questionnaire records.

use crate::{Design, ValidationError};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Timestamp layout stored in session and response documents.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Number of workshop groups.
pub const GROUP_COUNT: u8 = 12;
/// Default answer for every rating.
pub const DEFAULT_RATING: f32 = 2.5;

/// Question labels, in the order of `q1..q8`.
pub const QUESTIONS: [&str; 8] = [
    "My previous experience",
    "Discussion with my colleagues",
    "Risk registry",
    "Value analysis models",
    "Binary DSMs",
    "Numerical (Spatial) DSMs",
    "Risk propagation matrices",
    "Risk mitigations registry",
];

/// Fresh random session identifier.
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Group assignment and consent given at the start of the workshop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub group: u8,
    pub consent: bool,
}

impl Enrollment {
    /// Nothing is recorded for a participant until this passes.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=GROUP_COUNT).contains(&self.group) {
            return Err(ValidationError::GroupOutOfRange(self.group));
        }
        if !self.consent {
            return Err(ValidationError::ConsentMissing);
        }
        Ok(())
    }
}

/// Answers on a 0 (not at all) to 5 (very much) scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ratings {
    pub q1: f32,
    pub q2: f32,
    pub q3: f32,
    pub q4: f32,
    pub q5: f32,
    pub q6: f32,
    pub q7: f32,
    pub q8: f32,
}

impl Default for Ratings {
    fn default() -> Self {
        Self::from_array([DEFAULT_RATING; 8])
    }
}

impl Ratings {
    pub fn from_array(v: [f32; 8]) -> Self {
        let [q1, q2, q3, q4, q5, q6, q7, q8] = v;
        Self {
            q1,
            q2,
            q3,
            q4,
            q5,
            q6,
            q7,
            q8,
        }
    }

    pub fn to_array(&self) -> [f32; 8] {
        [
            self.q1, self.q2, self.q3, self.q4, self.q5, self.q6, self.q7, self.q8,
        ]
    }

    /// Ratings paired with their question labels.
    pub fn labelled(&self) -> impl Iterator<Item = (&'static str, f32)> {
        QUESTIONS.into_iter().zip(self.to_array())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (question, value) in self.labelled() {
            if !value.is_finite() || !(0.0..=5.0).contains(&value) {
                return Err(ValidationError::RatingOutOfRange { question, value });
            }
        }
        Ok(())
    }
}

/// Questionnaire as filled in by a participant.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Questionnaire {
    /// Professional role, free text.
    pub role: String,
    /// Professional experience in years, in [0, 100].
    pub experience_years: u32,
    pub ratings: Ratings,
    /// Mitigation ids picked in the mitigation step.
    #[serde(default)]
    pub mitigations: Vec<String>,
}

impl Questionnaire {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.experience_years > 100 {
            return Err(ValidationError::ExperienceOutOfRange(self.experience_years));
        }
        self.ratings.validate()?;
        crate::catalog::select_mitigations(&self.mitigations)?;
        Ok(())
    }
}

/// Document written once a participant is enrolled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub timestamp: String,
    pub group: u8,
}

impl SessionRecord {
    pub fn new(
        session_id: &str,
        at: NaiveDateTime,
        enrollment: &Enrollment,
    ) -> Result<Self, ValidationError> {
        enrollment.validate()?;
        Ok(Self {
            session_id: session_id.to_string(),
            timestamp: format_timestamp(at),
            group: enrollment.group,
        })
    }
}

/// Latest role and group of a participant, overwritten on every save.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantState {
    pub role: String,
    pub group: u8,
}

impl ParticipantState {
    pub fn new(role: &str, group: u8) -> Self {
        Self {
            role: role.trim().to_string(),
            group,
        }
    }
}

/// Document written when the questionnaire is submitted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuestionnaireResponse {
    pub session_id: String,
    pub timestamp: String,
    pub group: u8,
    pub role: String,
    pub experience: u32,
    #[serde(flatten)]
    pub ratings: Ratings,
    pub mitigations: Vec<String>,
    pub consent: bool,
    /// Design table as it stood at submission time.
    pub session_state: Vec<Design>,
}

impl QuestionnaireResponse {
    pub fn new(
        session_id: &str,
        at: NaiveDateTime,
        enrollment: &Enrollment,
        questionnaire: &Questionnaire,
        designs: &[Design],
    ) -> Result<Self, ValidationError> {
        enrollment.validate()?;
        questionnaire.validate()?;
        let mitigations = crate::catalog::select_mitigations(&questionnaire.mitigations)?
            .into_iter()
            .map(|m| m.id.to_string())
            .collect();
        Ok(Self {
            session_id: session_id.to_string(),
            timestamp: format_timestamp(at),
            group: enrollment.group,
            role: questionnaire.role.trim().to_string(),
            experience: questionnaire.experience_years,
            ratings: questionnaire.ratings,
            mitigations,
            consent: enrollment.consent,
            session_state: designs.to_vec(),
        })
    }
}
