//! Table row types
//!
//! Plain mirrors of the remote rows. Nothing beyond type shape is enforced
//! here; integrity and uniqueness are the service's job.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Cycle length assumed until the user says otherwise
pub const DEFAULT_CYCLE_LENGTH: u32 = 28;
/// Period length assumed until the user says otherwise
pub const DEFAULT_PERIOD_LENGTH: u32 = 5;

/// Array columns come back as `null` when never written
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_cycle_length() -> u32 {
    DEFAULT_CYCLE_LENGTH
}

fn default_period_length() -> u32 {
    DEFAULT_PERIOD_LENGTH
}

/// Per-user settings record (`profiles`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Same id as the auth user
    pub id: String,
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Average cycle length in days
    #[serde(default = "default_cycle_length")]
    pub cycle_length: u32,
    /// Average period length in days
    #[serde(default = "default_period_length")]
    pub period_length: u32,
}

/// Avatar initial: first letter of the name, else the uppercased first
/// letter of the email
pub fn avatar_initial(name: Option<&str>, email: Option<&str>) -> Option<char> {
    name.and_then(|n| n.chars().next()).or_else(|| {
        email
            .and_then(|e| e.chars().next())
            .and_then(|c| c.to_uppercase().next())
    })
}

impl Profile {
    /// Avatar initial for this profile
    pub fn initial(&self) -> Option<char> {
        avatar_initial(Some(self.name.as_str()), Some(self.email.as_str()))
    }
}

/// Profile row written at sign-up
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProfile {
    /// Same id as the auth user
    pub id: String,
    /// Email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Average cycle length in days
    pub cycle_length: u32,
    /// Average period length in days
    pub period_length: u32,
}

impl NewProfile {
    /// Profile with the default cycle and period lengths
    pub fn with_defaults(id: impl Into<String>, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
            cycle_length: DEFAULT_CYCLE_LENGTH,
            period_length: DEFAULT_PERIOD_LENGTH,
        }
    }
}

/// Patch applied to a profile after the quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleLengths {
    /// Average cycle length in days
    pub cycle_length: u32,
    /// Average period length in days
    pub period_length: u32,
}

/// A logged period (`cycles`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    /// Row id
    pub id: String,
    /// Owner
    pub user_id: String,
    /// First day of the period
    pub start_date: NaiveDate,
    /// Last day, once known
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Length of the cycle this period started, once known
    #[serde(default)]
    pub cycle_length: Option<u32>,
    /// Free-text notes
    #[serde(default)]
    pub notes: Option<String>,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Cycle row written by "register period"
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCycle {
    /// Owner
    pub user_id: String,
    /// First day of the period
    pub start_date: NaiveDate,
    /// Free-text notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A community feed entry (`posts`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Row id
    pub id: String,
    /// Author id
    pub user_id: String,
    /// Author display name
    #[serde(default)]
    pub user_name: String,
    /// Body text
    pub content: String,
    /// Topic tags
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    /// Like counter
    #[serde(default)]
    pub likes: u32,
    /// Comment counter
    #[serde(default)]
    pub comments_count: u32,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Author avatar initial
    pub fn author_initial(&self) -> Option<char> {
        self.user_name.chars().next()
    }
}

/// A direct message (`messages`)
///
/// The table exists but no screen reads or writes it yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Row id
    pub id: String,
    /// Sender id
    pub sender_id: String,
    /// Receiver id
    pub receiver_id: String,
    /// Body text
    pub content: String,
    /// Whether the receiver has read it
    #[serde(default)]
    pub read: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Stored onboarding questionnaire (`user_quiz_data`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizData {
    /// Row id
    pub id: String,
    /// Owner
    pub user_id: String,
    /// Age in years
    #[serde(default)]
    pub age: Option<u32>,
    /// Weight in kg
    #[serde(default)]
    pub weight: Option<f64>,
    /// Height in cm
    #[serde(default)]
    pub height: Option<f64>,
    /// First day of the last period
    #[serde(default)]
    pub last_period_date: Option<NaiveDate>,
    /// Average cycle length in days
    #[serde(default = "default_cycle_length")]
    pub cycle_length: u32,
    /// Average period length in days
    #[serde(default = "default_period_length")]
    pub period_length: u32,
    /// Selected symptoms
    #[serde(default, deserialize_with = "null_as_empty")]
    pub symptoms: Vec<String>,
    /// Selected health conditions
    #[serde(default, deserialize_with = "null_as_empty")]
    pub health_conditions: Vec<String>,
    /// Medications in use
    #[serde(default, deserialize_with = "null_as_empty")]
    pub medications: Vec<String>,
    /// Free-text lifestyle notes
    #[serde(default)]
    pub lifestyle_notes: String,
    /// When the quiz was completed
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Quiz row written on submit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizSubmission {
    /// Owner
    pub user_id: String,
    /// Age in years
    pub age: Option<u32>,
    /// Weight in kg
    pub weight: Option<f64>,
    /// Height in cm
    pub height: Option<f64>,
    /// First day of the last period
    pub last_period_date: Option<NaiveDate>,
    /// Average cycle length in days
    pub cycle_length: u32,
    /// Average period length in days
    pub period_length: u32,
    /// Selected symptoms
    pub symptoms: Vec<String>,
    /// Selected health conditions
    pub health_conditions: Vec<String>,
    /// Medications in use
    pub medications: Vec<String>,
    /// Free-text lifestyle notes
    pub lifestyle_notes: String,
}
