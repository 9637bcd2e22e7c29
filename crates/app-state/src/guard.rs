//! Route guard and navigation
//!
//! Every navigation goes through [`RouteGuard::authorize`], which is the
//! only place that asks whether the user has finished the onboarding quiz.
//! It asks at most once per navigation.

use app_core::quiz::QuizService;
use app_core::Route;
use async_trait::async_trait;
use backend_client::{BackendClient, User};
use std::sync::Arc;

/// Source of truth for quiz completion
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionCheck: Send + Sync {
    /// Whether `user_id` has a stored quiz
    async fn has_completed(&self, user_id: &str) -> app_core::Result<bool>;
}

#[async_trait]
impl CompletionCheck for QuizService {
    async fn has_completed(&self, user_id: &str) -> app_core::Result<bool> {
        QuizService::has_completed(self, user_id).await
    }
}

/// Resolves requested routes against the session and quiz state
#[derive(Clone)]
pub struct RouteGuard {
    check: Arc<dyn CompletionCheck>,
}

impl RouteGuard {
    /// Guard backed by an arbitrary completion check
    pub fn new(check: Arc<dyn CompletionCheck>) -> Self {
        Self { check }
    }

    /// Guard that queries the quiz table through `client`
    pub fn for_client(client: Arc<BackendClient>) -> Self {
        Self::new(Arc::new(QuizService::new(client)))
    }

    /// Route the user actually lands on when asking for `requested`
    ///
    /// Without a user everything resolves to the auth screen. The quiz and
    /// the shell both resolve by quiz completion; a failed lookup counts as
    /// not completed.
    pub async fn authorize(&self, requested: Route, user: Option<&User>) -> Route {
        let Some(user) = user else {
            return Route::Auth;
        };

        if requested == Route::Auth {
            return Route::Auth;
        }

        match self.check.has_completed(&user.id).await {
            Ok(true) => Route::Home,
            Ok(false) => Route::Quiz,
            Err(e) => {
                tracing::warn!(user_id = %user.id, "Quiz completion lookup failed: {}", e);
                Route::Quiz
            }
        }
    }
}

/// Current route plus the guard every navigation passes through
pub struct Navigator {
    guard: RouteGuard,
    current: Route,
}

impl Navigator {
    /// Navigator starting on the auth screen
    pub fn new(guard: RouteGuard) -> Self {
        Self {
            guard,
            current: Route::Auth,
        }
    }

    /// Current route
    pub fn current(&self) -> Route {
        self.current
    }

    /// Navigate to `requested`, landing wherever the guard allows
    pub async fn navigate(&mut self, requested: Route, user: Option<&User>) -> Route {
        let resolved = self.guard.authorize(requested, user).await;
        if resolved != requested {
            tracing::debug!(requested = %requested, resolved = %resolved, "navigation redirected");
        }
        self.current = resolved;
        resolved
    }
}
