//! Community feed
//!
//! This module provides reading the latest community posts and the like
//! counter increment.

use crate::models::Post;
use crate::Result;
use backend_client::{BackendClient, Table};
use serde_json::json;
use std::sync::Arc;

/// How many posts the community tab shows
pub const LATEST_POSTS_LIMIT: usize = 20;

/// Post service
///
/// # Example
///
/// ```rust,no_run
/// use app_core::posts::PostService;
/// use backend_client::{BackendClient, BackendConfig};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Arc::new(BackendClient::new(BackendConfig::from_env()?)?);
///     let service = PostService::new(client);
///
///     let posts = service.latest_posts().await?;
///     if let Some(post) = posts.first() {
///         let likes = service.like_post(&post.id, post.likes).await?;
///         println!("{} now has {} likes", post.id, likes);
///     }
///     Ok(())
/// }
/// ```
pub struct PostService {
    client: Arc<BackendClient>,
}

impl PostService {
    /// Create a new post service
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }

    /// Latest posts, newest first
    pub async fn latest_posts(&self) -> Result<Vec<Post>> {
        Ok(self
            .client
            .from(Table::Posts)
            .order("created_at", false)
            .limit(LATEST_POSTS_LIMIT)
            .fetch()
            .await?)
    }

    /// Like a post
    ///
    /// Writes `current_likes + 1` as the new count and returns it. The count
    /// is whatever the caller last displayed, so concurrent likes from other
    /// users can be lost and one user may like a post any number of times.
    pub async fn like_post(&self, post_id: &str, current_likes: u32) -> Result<u32> {
        let likes = current_likes.saturating_add(1);

        self.client
            .from(Table::Posts)
            .eq("id", post_id)
            .update(&json!({ "likes": likes }))
            .await?;

        Ok(likes)
    }
}

/// Replace the like count of `post_id` in a displayed list
///
/// Returns whether a matching post was found.
pub fn apply_like(posts: &mut [Post], post_id: &str, likes: u32) -> bool {
    match posts.iter_mut().find(|p| p.id == post_id) {
        Some(post) => {
            post.likes = likes;
            true
        }
        None => false,
    }
}
