use chirp_types::models::Post;

use crate::http::{ApiClient, ClientError};

/// Feed screen state: a single fetch when the screen mounts, then
/// in-memory updates only.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedState {
    Loading,
    Ready(Vec<Post>),
}

pub struct FeedScreen {
    state: FeedState,
}

impl FeedScreen {
    pub fn new() -> Self {
        Self {
            state: FeedState::Loading,
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn posts(&self) -> &[Post] {
        match &self.state {
            FeedState::Loading => &[],
            FeedState::Ready(posts) => posts,
        }
    }

    /// The one fetch performed on mount. No polling; posts created while
    /// the screen is up arrive through `prepend`.
    pub async fn refresh(&mut self, api: &ApiClient) -> Result<(), ClientError> {
        let resp = api.all_posts().await?;
        self.state = FeedState::Ready(resp.posts);
        Ok(())
    }

    /// Optimistically insert a freshly created post at the head of the
    /// feed instead of re-fetching the whole list.
    pub fn prepend(&mut self, post: Post) {
        match &mut self.state {
            FeedState::Ready(posts) => posts.insert(0, post),
            FeedState::Loading => self.state = FeedState::Ready(vec![post]),
        }
    }
}

impl Default for FeedScreen {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post(id: i64, content: &str) -> Post {
        Post {
            id,
            author_id: 1,
            content: content.to_string(),
            created_at: Utc::now(),
            username: "alice".to_string(),
        }
    }

    #[test]
    fn starts_loading_with_an_empty_view() {
        let feed = FeedScreen::new();
        assert_eq!(feed.state(), &FeedState::Loading);
        assert!(feed.posts().is_empty());
    }

    #[test]
    fn prepend_puts_the_new_post_first() {
        let mut feed = FeedScreen::new();
        feed.prepend(post(1, "older"));
        feed.prepend(post(2, "newer"));

        let contents: Vec<&str> = feed.posts().iter().map(|p| p.content.as_str()).collect();
        assert_eq!(contents, ["newer", "older"]);
    }

    #[test]
    fn prepend_while_loading_becomes_ready() {
        let mut feed = FeedScreen::new();
        feed.prepend(post(1, "only"));

        assert!(matches!(feed.state(), FeedState::Ready(_)));
        assert_eq!(feed.posts().len(), 1);
    }
}
