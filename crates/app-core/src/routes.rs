//! Routes and shell tabs

use std::fmt;

/// Client-visible routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Sign-in / sign-up screen
    Auth,
    /// Onboarding quiz
    Quiz,
    /// Main shell
    Home,
}

impl Route {
    /// URL path of the route
    pub fn path(&self) -> &'static str {
        match self {
            Route::Auth => "/auth",
            Route::Quiz => "/quiz",
            Route::Home => "/",
        }
    }

    /// Route for a path, if known
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/auth" => Some(Route::Auth),
            "/quiz" => Some(Route::Quiz),
            "/" => Some(Route::Home),
            _ => None,
        }
    }

    /// Whether the route needs a signed-in user
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Auth)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Main shell tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    /// Cycle overview
    #[default]
    Today,
    /// Community feed
    Community,
    /// Educational content
    Content,
    /// Direct messages
    Messages,
    /// Profile settings
    Profile,
}

impl Tab {
    /// All tabs in display order
    pub const ALL: [Tab; 5] = [Tab::Today, Tab::Community, Tab::Content, Tab::Messages, Tab::Profile];

    /// Tab label
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Today => "Today",
            Tab::Community => "Community",
            Tab::Content => "Content",
            Tab::Messages => "Messages",
            Tab::Profile => "Profile",
        }
    }
}
