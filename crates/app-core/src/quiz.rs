//! Onboarding quiz
//!
//! The quiz is a five-step wizard over a single in-memory [`QuizDraft`].
//! Only the first two steps carry required fields; the rest are optional.
//! Submitting writes the draft as one `user_quiz_data` row and then copies
//! the cycle and period lengths onto the profile.
//!
//! # Example
//!
//! ```rust
//! use app_core::quiz::{QuizStep, QuizWizard};
//!
//! let mut wizard = QuizWizard::new();
//! assert!(!wizard.next());
//!
//! wizard.draft.set_age("29");
//! wizard.draft.set_weight("61.5");
//! wizard.draft.set_height("168");
//! assert!(wizard.next());
//! assert_eq!(wizard.step(), QuizStep::Cycle);
//! assert_eq!(wizard.progress_percent(), 40);
//! ```

use crate::models::{
    CycleLengths, QuizSubmission, DEFAULT_CYCLE_LENGTH, DEFAULT_PERIOD_LENGTH,
};
use crate::{CoreError, Result};
use backend_client::{BackendClient, Table};
use chrono::NaiveDate;
use std::sync::Arc;

/// Symptom choices offered on step 3
pub const SYMPTOM_OPTIONS: [&str; 10] = [
    "Severe cramps",
    "Severe PMS",
    "Heavy flow",
    "Irregular flow",
    "Headaches",
    "Nausea",
    "Bloating",
    "Mood swings",
    "Fatigue",
    "Insomnia",
];

/// Health condition choices offered on step 4
pub const CONDITION_OPTIONS: [&str; 7] = [
    "PCOS (Polycystic Ovary Syndrome)",
    "Endometriosis",
    "Fibroids",
    "Diabetes",
    "Hypertension",
    "Thyroid",
    "No conditions",
];

/// Number of quiz steps
pub const STEP_COUNT: u8 = 5;

/// Wizard steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum QuizStep {
    /// Age, weight and height
    #[default]
    Biometrics,
    /// Last period and average lengths
    Cycle,
    /// Symptoms
    Symptoms,
    /// Health conditions and medications
    Conditions,
    /// Lifestyle notes
    Lifestyle,
}

impl QuizStep {
    /// 1-based step number
    pub fn number(&self) -> u8 {
        match self {
            QuizStep::Biometrics => 1,
            QuizStep::Cycle => 2,
            QuizStep::Symptoms => 3,
            QuizStep::Conditions => 4,
            QuizStep::Lifestyle => 5,
        }
    }

    /// Step with the given 1-based number
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(QuizStep::Biometrics),
            2 => Some(QuizStep::Cycle),
            3 => Some(QuizStep::Symptoms),
            4 => Some(QuizStep::Conditions),
            5 => Some(QuizStep::Lifestyle),
            _ => None,
        }
    }

    fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    fn previous(self) -> Option<Self> {
        Self::from_number(self.number().wrapping_sub(1))
    }
}

/// Append `item` if absent, remove it if present
pub fn toggle(items: &mut Vec<String>, item: &str) {
    match items.iter().position(|i| i == item) {
        Some(index) => {
            items.remove(index);
        }
        None => items.push(item.to_string()),
    }
}

/// Parse a numeric input; empty, invalid and zero all mean "not given"
fn parse_positive<T>(input: &str) -> Option<T>
where
    T: std::str::FromStr + Default + PartialEq,
{
    input
        .trim()
        .parse::<T>()
        .ok()
        .filter(|v| *v != T::default())
}

/// Like [`parse_positive`] for measurements; NaN and infinities are not given
fn parse_measure(input: &str) -> Option<f64> {
    parse_positive::<f64>(input).filter(|v| v.is_finite())
}

/// Answers collected so far
#[derive(Debug, Clone, PartialEq)]
pub struct QuizDraft {
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

impl Default for QuizDraft {
    fn default() -> Self {
        Self {
            age: None,
            weight: None,
            height: None,
            last_period_date: None,
            cycle_length: DEFAULT_CYCLE_LENGTH,
            period_length: DEFAULT_PERIOD_LENGTH,
            symptoms: Vec::new(),
            health_conditions: Vec::new(),
            medications: Vec::new(),
            lifestyle_notes: String::new(),
        }
    }
}

impl QuizDraft {
    /// Set age from the raw input text
    pub fn set_age(&mut self, input: &str) {
        self.age = parse_positive(input);
    }

    /// Set weight from the raw input text
    pub fn set_weight(&mut self, input: &str) {
        self.weight = parse_measure(input);
    }

    /// Set height from the raw input text
    pub fn set_height(&mut self, input: &str) {
        self.height = parse_measure(input);
    }

    /// Set the last period date from a `YYYY-MM-DD` input; empty clears it
    pub fn set_last_period_date(&mut self, input: &str) {
        self.last_period_date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok();
    }

    /// Set cycle length from the raw input text, falling back to the default
    pub fn set_cycle_length(&mut self, input: &str) {
        self.cycle_length = parse_positive(input).unwrap_or(DEFAULT_CYCLE_LENGTH);
    }

    /// Set period length from the raw input text, falling back to the default
    pub fn set_period_length(&mut self, input: &str) {
        self.period_length = parse_positive(input).unwrap_or(DEFAULT_PERIOD_LENGTH);
    }

    /// Toggle a symptom
    pub fn toggle_symptom(&mut self, symptom: &str) {
        toggle(&mut self.symptoms, symptom);
    }

    /// Toggle a health condition
    pub fn toggle_condition(&mut self, condition: &str) {
        toggle(&mut self.health_conditions, condition);
    }

    /// Toggle a medication
    pub fn toggle_medication(&mut self, medication: &str) {
        toggle(&mut self.medications, medication);
    }

    /// Replace medications from comma-separated text
    pub fn set_medications_text(&mut self, input: &str) {
        self.medications = input
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();
    }

    /// Set lifestyle notes
    pub fn set_lifestyle_notes(&mut self, input: &str) {
        self.lifestyle_notes = input.to_string();
    }

    /// Whether the required fields of `step` are filled in
    pub fn is_step_valid(&self, step: QuizStep) -> bool {
        match step {
            QuizStep::Biometrics => {
                self.age.is_some_and(|v| v > 0)
                    && self.weight.is_some_and(|v| v != 0.0)
                    && self.height.is_some_and(|v| v != 0.0)
            }
            QuizStep::Cycle => {
                self.last_period_date.is_some() && self.cycle_length > 0 && self.period_length > 0
            }
            QuizStep::Symptoms | QuizStep::Conditions | QuizStep::Lifestyle => true,
        }
    }

    /// Row to insert for `user_id`
    pub fn to_submission(&self, user_id: &str) -> QuizSubmission {
        QuizSubmission {
            user_id: user_id.to_string(),
            age: self.age,
            weight: self.weight,
            height: self.height,
            last_period_date: self.last_period_date,
            cycle_length: self.cycle_length,
            period_length: self.period_length,
            symptoms: self.symptoms.clone(),
            health_conditions: self.health_conditions.clone(),
            medications: self.medications.clone(),
            lifestyle_notes: self.lifestyle_notes.clone(),
        }
    }
}

/// Wizard position plus the draft
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuizWizard {
    step: QuizStep,
    /// Answers so far
    pub draft: QuizDraft,
}

impl QuizWizard {
    /// Wizard on step 1 with a default draft
    pub fn new() -> Self {
        Self::default()
    }

    /// Current step
    pub fn step(&self) -> QuizStep {
        self.step
    }

    /// Whether the current step's required fields are filled in
    pub fn is_step_valid(&self) -> bool {
        self.draft.is_step_valid(self.step)
    }

    /// Whether the current step is the last one
    pub fn is_last_step(&self) -> bool {
        self.step == QuizStep::Lifestyle
    }

    /// Advance one step; returns whether the step changed
    pub fn next(&mut self) -> bool {
        if !self.is_step_valid() {
            return false;
        }
        match self.step.next() {
            Some(step) => {
                self.step = step;
                true
            }
            None => false,
        }
    }

    /// Go back one step; returns whether the step changed
    pub fn back(&mut self) -> bool {
        match self.step.previous() {
            Some(step) => {
                self.step = step;
                true
            }
            None => false,
        }
    }

    /// Completion of the wizard in percent
    pub fn progress_percent(&self) -> u8 {
        ((f64::from(self.step.number()) / f64::from(STEP_COUNT)) * 100.0).round() as u8
    }
}

/// Quiz service
pub struct QuizService {
    client: Arc<BackendClient>,
}

impl QuizService {
    /// Create a new quiz service
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }

    /// Whether `user_id` already has a stored quiz
    pub async fn has_completed(&self, user_id: &str) -> Result<bool> {
        let row: Option<serde_json::Value> = self
            .client
            .from(Table::UserQuizData)
            .select("id")
            .eq("user_id", user_id)
            .limit(1)
            .maybe_single()
            .await?;
        Ok(row.is_some())
    }

    /// Store the draft and copy its lengths onto the profile
    ///
    /// An insert failure is returned as [`CoreError::SaveFailed`]. The
    /// profile patch is best-effort and only logged when it fails.
    pub async fn submit(&self, user_id: &str, draft: &QuizDraft) -> Result<()> {
        let row = draft.to_submission(user_id);

        if let Err(e) = self.client.from(Table::UserQuizData).insert(&row).await {
            tracing::error!(user_id, "Failed to save quiz: {}", e);
            return Err(CoreError::SaveFailed(e));
        }

        let lengths = CycleLengths {
            cycle_length: draft.cycle_length,
            period_length: draft.period_length,
        };
        if let Err(e) = self
            .client
            .from(Table::Profiles)
            .eq("id", user_id)
            .update(&lengths)
            .await
        {
            tracing::warn!(user_id, "Failed to update profile cycle lengths: {}", e);
        }

        tracing::info!(user_id, "quiz submitted");
        Ok(())
    }
}
