//! Onboarding quiz screen state
//!
//! Completion is not re-checked here; the route guard already sent the user
//! to this screen only when no quiz is stored.

use app_core::quiz::{QuizService, QuizStep, QuizWizard};
use app_core::Route;
use backend_client::{BackendClient, User};
use std::sync::Arc;

/// Quiz screen
pub struct QuizScreen {
    service: QuizService,
    user_id: Option<String>,
    /// Wizard position and answers
    pub wizard: QuizWizard,
    saving: bool,
    error: Option<String>,
}

impl QuizScreen {
    /// Fresh wizard for `user`
    pub fn new(client: Arc<BackendClient>, user: Option<&User>) -> Self {
        Self {
            service: QuizService::new(client),
            user_id: user.map(|u| u.id.clone()),
            wizard: QuizWizard::new(),
            saving: false,
            error: None,
        }
    }

    /// Current step
    pub fn step(&self) -> QuizStep {
        self.wizard.step()
    }

    /// Advance if the current step is valid
    pub fn next(&mut self) -> bool {
        self.wizard.next()
    }

    /// Go back one step
    pub fn back(&mut self) -> bool {
        self.wizard.back()
    }

    /// Whether a submit is in flight
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Error from the last submit
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Submit the draft from the last step; returns the shell route on success
    pub async fn submit(&mut self) -> Option<Route> {
        let user_id = self.user_id.clone()?;
        if !self.wizard.is_last_step() {
            return None;
        }

        self.saving = true;
        self.error = None;

        let result = self.service.submit(&user_id, &self.wizard.draft).await;
        self.saving = false;

        match result {
            Ok(()) => Some(Route::Home),
            Err(e) => {
                self.error = Some(e.user_message());
                None
            }
        }
    }
}
