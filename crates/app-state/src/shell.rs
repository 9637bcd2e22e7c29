//! Main shell state
//!
//! The shell loads the profile, recent cycles and community posts once, in
//! that order, and every tab renders from that shared load. Mutations are
//! limited to liking a post and registering a period.

use app_core::content::{self, ContentItem};
use app_core::cycles::CycleService;
use app_core::models::avatar_initial;
use app_core::posts::{apply_like, PostService};
use app_core::profiles::ProfileService;
use app_core::{Cycle, Post, Profile, Tab};
use backend_client::{BackendClient, User};
use std::sync::Arc;

/// Notice shown after a period is registered
pub const PERIOD_REGISTERED_NOTICE: &str = "Period registered successfully!";

/// Main shell
pub struct MainShell {
    user: User,
    profiles: ProfileService,
    cycle_service: CycleService,
    post_service: PostService,
    tab: Tab,
    profile: Option<Profile>,
    cycles: Vec<Cycle>,
    posts: Vec<Post>,
    loading: bool,
    notice: Option<String>,
}

impl MainShell {
    /// Shell for `user`; nothing is loaded until [`MainShell::load`]
    pub fn new(client: Arc<BackendClient>, user: User) -> Self {
        Self {
            user,
            profiles: ProfileService::new(client.clone()),
            cycle_service: CycleService::new(client.clone()),
            post_service: PostService::new(client),
            tab: Tab::default(),
            profile: None,
            cycles: Vec::new(),
            posts: Vec::new(),
            loading: true,
            notice: None,
        }
    }

    /// Load profile, cycles and posts
    ///
    /// A missing profile row is not a failure. The first failure stops the
    /// load and is logged; whatever loaded before it is kept.
    pub async fn load(&mut self) {
        self.loading = true;
        if let Err(e) = self.fetch_all().await {
            tracing::error!(user_id = %self.user.id, "Failed to load data: {}", e);
        }
        self.loading = false;
    }

    async fn fetch_all(&mut self) -> app_core::Result<()> {
        self.profile = self.profiles.find_profile(&self.user.id).await?;
        self.cycles = self.cycle_service.recent_cycles(&self.user.id).await?;
        self.posts = self.post_service.latest_posts().await?;
        Ok(())
    }

    /// Like a post, updating its displayed count on success
    pub async fn like_post(&mut self, post_id: &str) -> bool {
        let Some(current) = self.posts.iter().find(|p| p.id == post_id).map(|p| p.likes) else {
            tracing::warn!(post_id, "Like on a post that is not displayed");
            return false;
        };

        match self.post_service.like_post(post_id, current).await {
            Ok(likes) => apply_like(&mut self.posts, post_id, likes),
            Err(e) => {
                tracing::error!(post_id, "Failed to like post: {}", e);
                false
            }
        }
    }

    /// Register a period starting today, then reload everything
    pub async fn register_period(&mut self) -> bool {
        match self.cycle_service.register_period_today(&self.user.id).await {
            Ok(()) => {
                self.notice = Some(PERIOD_REGISTERED_NOTICE.to_string());
                self.load().await;
                true
            }
            Err(e) => {
                tracing::error!(user_id = %self.user.id, "Failed to register period: {}", e);
                false
            }
        }
    }

    /// Switch tab
    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    /// Active tab
    pub fn tab(&self) -> Tab {
        self.tab
    }

    /// Signed-in user
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Loaded profile
    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Loaded cycles, newest first
    pub fn cycles(&self) -> &[Cycle] {
        &self.cycles
    }

    /// Loaded posts, newest first
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Whether a load is running
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Take the pending notice, if any
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Content tab catalogue
    pub fn content(&self) -> &'static [ContentItem] {
        content::catalogue()
    }

    /// Avatar initial for the profile tab
    pub fn avatar_initial(&self) -> Option<char> {
        avatar_initial(
            self.profile.as_ref().map(|p| p.name.as_str()),
            self.user.email.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend_client::BackendConfig;

    fn shell(email: &str) -> MainShell {
        let client = BackendClient::new(BackendConfig::new("http://127.0.0.1:9", "anon")).unwrap();
        MainShell::new(Arc::new(client), User::new("u1", Some(email.to_string())))
    }

    #[test]
    fn test_initial_state() {
        let mut shell = shell("zoe@example.com");

        assert_eq!(shell.tab(), Tab::Today);
        assert!(shell.is_loading());
        assert_eq!(shell.content().len(), 4);
        assert_eq!(shell.avatar_initial(), Some('Z'));
        assert_eq!(shell.take_notice(), None);

        shell.select_tab(Tab::Community);
        assert_eq!(shell.tab(), Tab::Community);
    }

    #[tokio::test]
    async fn test_like_unknown_post_makes_no_request() {
        let mut shell = shell("zoe@example.com");
        assert!(!shell.like_post("missing").await);
    }
}
