//! The schedules board: saved posts, likes, comments, and deleting a saved
//! day along with everything hanging off it.

use std::collections::HashSet;

use crate::api::{ApiError, Comment, NewComment, NewLike, Post, RowId, TripStore, WorkspaceKey};

/// A saved schedule as shown on the board
#[derive(Debug, Clone, PartialEq)]
pub struct PostCard {
    pub post: Post,
    pub comments: Vec<Comment>,
    pub liked: bool,
    pub draft: String,
}

/// Likes and comments for one post, shared by the board cards and the
/// read-only schedule preview.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reactions {
    pub liked: bool,
    pub comments: Vec<Comment>,
    pub draft: String,
    /// Initial fetch still outstanding; the like state isn't known yet
    pub loading: bool,
}

impl Reactions {
    pub fn pending() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    /// Flip the like locally and return the new state to send. Ignored until
    /// the current state has loaded.
    pub fn toggle_like(&mut self) -> Option<bool> {
        if self.loading {
            return None;
        }
        self.liked = !self.liked;
        Some(self.liked)
    }

    /// Server accepted a comment: show it and clear the input
    pub fn push_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
        self.draft.clear();
    }
}

/// Trimmed comment text, or None when there's nothing to send
pub fn comment_text(draft: &str) -> Option<String> {
    let trimmed = draft.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn post_title(author: &str, vibe: &str, destination: &str) -> String {
    let vibe = if vibe.is_empty() { "Surprise" } else { vibe };
    format!("{}'s {} Day in {}", author, vibe, destination)
}

/// Stitch the three board queries together, keeping post order
pub fn build_cards(posts: Vec<Post>, comments: Vec<Comment>, liked: Vec<RowId>) -> Vec<PostCard> {
    let liked: HashSet<RowId> = liked.into_iter().collect();
    posts
        .into_iter()
        .map(|post| {
            let post_comments = comments
                .iter()
                .filter(|c| c.post_id == post.id)
                .cloned()
                .collect();
            PostCard {
                liked: liked.contains(&post.id),
                comments: post_comments,
                draft: String::new(),
                post,
            }
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct Board {
    pub cards: Vec<PostCard>,
    pub loading: bool,
}

impl Board {
    pub fn card_mut(&mut self, post_id: &RowId) -> Option<&mut PostCard> {
        self.cards.iter_mut().find(|c| &c.post.id == post_id)
    }

    /// Optimistic like flip; returns the new state
    pub fn toggle_like(&mut self, post_id: &RowId) -> Option<bool> {
        let card = self.card_mut(post_id)?;
        card.liked = !card.liked;
        Some(card.liked)
    }

    pub fn push_comment(&mut self, comment: Comment) {
        if let Some(card) = self.card_mut(&comment.post_id.clone()) {
            card.comments.push(comment);
            card.draft.clear();
        }
    }

    pub fn remove(&mut self, post_id: &RowId) -> Option<PostCard> {
        let idx = self.cards.iter().position(|c| &c.post.id == post_id)?;
        Some(self.cards.remove(idx))
    }
}

// ============================================================================
// Backend operations (run on the async runtime)
// ============================================================================

/// Posts newest first, with comments and this workspace's likes. Failing to
/// load comments or likes still shows the posts.
pub async fn load_board(
    store: &dyn TripStore,
    workspace: &WorkspaceKey,
) -> Result<Vec<PostCard>, ApiError> {
    let posts = store.list_posts(workspace).await?;
    let ids: Vec<RowId> = posts.iter().map(|p| p.id.clone()).collect();

    let comments = store.list_comments(&ids).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Error loading comments");
        Vec::new()
    });
    let liked = store.liked_posts(workspace, &ids).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Error loading likes");
        Vec::new()
    });

    Ok(build_cards(posts, comments, liked))
}

pub async fn load_reactions(
    store: &dyn TripStore,
    workspace: &WorkspaceKey,
    post_id: &RowId,
) -> Reactions {
    let ids = [post_id.clone()];
    let comments = store.list_comments(&ids).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, post = %post_id, "Error loading preview comments");
        Vec::new()
    });
    let liked = match store.liked_posts(workspace, &ids).await {
        Ok(rows) => !rows.is_empty(),
        Err(e) => {
            tracing::error!(error = %e, post = %post_id, "Error loading preview like");
            false
        }
    };
    Reactions {
        liked,
        comments,
        draft: String::new(),
        loading: false,
    }
}

pub async fn send_like(
    store: &dyn TripStore,
    workspace: &WorkspaceKey,
    post_id: &RowId,
    liked: bool,
) -> Result<(), ApiError> {
    if liked {
        store
            .insert_like(&NewLike {
                post_id: post_id.clone(),
                profile_key: workspace.clone(),
            })
            .await
    } else {
        store.delete_like(workspace, post_id).await
    }
}

pub async fn send_comment(
    store: &dyn TripStore,
    workspace: &WorkspaceKey,
    post_id: &RowId,
    author: &str,
    text: String,
) -> Result<Comment, ApiError> {
    store
        .insert_comment(&NewComment {
            post_id: post_id.clone(),
            profile_key: workspace.clone(),
            author_name: author.to_string(),
            content: text,
        })
        .await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStep {
    Likes,
    Comments,
    Blocks,
    Schedule,
    Post,
}

impl CascadeStep {
    /// Children first, the post row last
    pub const ORDER: [CascadeStep; 5] = [
        CascadeStep::Likes,
        CascadeStep::Comments,
        CascadeStep::Blocks,
        CascadeStep::Schedule,
        CascadeStep::Post,
    ];

    async fn run(self, store: &dyn TripStore, post: &Post) -> Result<(), ApiError> {
        match self {
            CascadeStep::Likes => store.delete_likes_for_post(&post.id).await,
            CascadeStep::Comments => store.delete_comments_for_post(&post.id).await,
            CascadeStep::Blocks => store.delete_blocks_for_schedule(&post.schedule_id).await,
            CascadeStep::Schedule => store.delete_schedule(&post.schedule_id).await,
            CascadeStep::Post => store.delete_post(&post.id).await,
        }
    }
}

/// Delete a saved day and everything attached to it. Steps are independent
/// calls; a failed step is logged and the rest still run. Returns the steps
/// that failed.
pub async fn delete_cascade(store: &dyn TripStore, post: &Post) -> Vec<CascadeStep> {
    let mut failed = Vec::new();
    for step in CascadeStep::ORDER {
        if let Err(e) = step.run(store, post).await {
            tracing::error!(?step, post = %post.id, error = %e, "Error deleting schedule");
            failed.push(step);
        }
    }
    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        BlockKind, Direction, MemoryStore, NewBlock, NewSchedule, PostUpsert,
    };
    use pretty_assertions::assert_eq;

    fn ws() -> WorkspaceKey {
        WorkspaceKey::new("us")
    }

    async fn saved_day(store: &MemoryStore) -> Post {
        let schedule = store
            .create_schedule(&NewSchedule {
                profile_key: ws(),
                direction: Direction::NyuToIu,
                day_label: "Day 1".into(),
            })
            .await
            .unwrap();
        store
            .insert_block(&NewBlock {
                schedule_id: schedule.id.clone(),
                label: "Coffee".into(),
                kind: BlockKind::Do,
                day_index: 0,
                start_minutes: 540,
                end_minutes: 600,
            })
            .await
            .unwrap();
        store
            .upsert_post(&PostUpsert {
                profile_key: ws(),
                schedule_id: schedule.id.clone(),
                direction: Direction::NyuToIu,
                day_label: "Day 1".into(),
                title: post_title("Veyd", "Cozy", "IU"),
                author_name: Some("Veyd".into()),
            })
            .await
            .unwrap();
        store.list_posts(&ws()).await.unwrap().remove(0)
    }

    #[test]
    fn title_falls_back_to_surprise() {
        assert_eq!(post_title("Manasi", "", "NYU"), "Manasi's Surprise Day in NYU");
        assert_eq!(post_title("Veyd", "Cozy", "IU"), "Veyd's Cozy Day in IU");
    }

    #[test]
    fn blank_comments_are_not_sent() {
        assert_eq!(comment_text("   "), None);
        assert_eq!(comment_text("  see you soon "), Some("see you soon".to_string()));
    }

    #[test]
    fn board_like_toggle_is_local_and_reversible() {
        let post = Post {
            id: RowId::Int(1),
            schedule_id: RowId::Int(2),
            direction: Direction::IuToNyu,
            day_label: "Day 1".into(),
            title: None,
            note: None,
            author_name: None,
            created_at: None,
        };
        let mut board = Board {
            cards: build_cards(vec![post], vec![], vec![]),
            loading: false,
        };
        assert_eq!(board.toggle_like(&RowId::Int(1)), Some(true));
        assert_eq!(board.toggle_like(&RowId::Int(1)), Some(false));
        assert_eq!(board.toggle_like(&RowId::Int(9)), None);
    }

    #[tokio::test]
    async fn board_groups_comments_and_likes() {
        let store = MemoryStore::new();
        let post = saved_day(&store).await;
        send_comment(&store, &ws(), &post.id, "Veyd", "first".into()).await.unwrap();
        send_comment(&store, &ws(), &post.id, "Manasi", "second".into()).await.unwrap();
        send_like(&store, &ws(), &post.id, true).await.unwrap();

        let cards = load_board(&store, &ws()).await.unwrap();
        assert_eq!(cards.len(), 1);
        assert!(cards[0].liked);
        let contents: Vec<&str> = cards[0].comments.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);

        send_like(&store, &ws(), &post.id, false).await.unwrap();
        let reactions = load_reactions(&store, &ws(), &post.id).await;
        assert!(!reactions.liked);
        assert_eq!(reactions.comments.len(), 2);
    }

    #[tokio::test]
    async fn comment_appends_and_clears_draft() {
        let store = MemoryStore::new();
        let post = saved_day(&store).await;
        let mut board = Board {
            cards: load_board(&store, &ws()).await.unwrap(),
            loading: false,
        };
        board.cards[0].draft = " hi ".into();

        let text = comment_text(&board.cards[0].draft).unwrap();
        let row = send_comment(&store, &ws(), &post.id, "Us", text).await.unwrap();
        board.push_comment(row);

        assert_eq!(board.cards[0].comments.len(), 1);
        assert_eq!(board.cards[0].comments[0].content, "hi");
        assert!(board.cards[0].draft.is_empty());
    }

    #[tokio::test]
    async fn cascade_removes_every_row() {
        let store = MemoryStore::new();
        let post = saved_day(&store).await;
        send_comment(&store, &ws(), &post.id, "Veyd", "bye".into()).await.unwrap();
        send_like(&store, &ws(), &post.id, true).await.unwrap();
        assert_eq!(store.counts(), (1, 1, 1, 1, 1));

        let failed = delete_cascade(&store, &post).await;
        assert!(failed.is_empty());
        assert_eq!(store.counts(), (0, 0, 0, 0, 0));
        assert!(load_board(&store, &ws()).await.unwrap().is_empty());
    }

    #[test]
    fn like_is_ignored_until_reactions_load() {
        let mut reactions = Reactions::pending();
        assert_eq!(reactions.toggle_like(), None);
        assert!(!reactions.liked);

        reactions.loading = false;
        assert_eq!(reactions.toggle_like(), Some(true));
    }

    #[tokio::test]
    async fn loaded_reactions_are_ready() {
        let store = MemoryStore::new();
        let post = saved_day(&store).await;
        send_like(&store, &ws(), &post.id, true).await.unwrap();

        let mut reactions = load_reactions(&store, &ws(), &post.id).await;
        assert!(!reactions.loading);
        assert!(reactions.liked);
        assert_eq!(reactions.toggle_like(), Some(false));
    }

    #[test]
    fn reactions_toggle_and_comment() {
        let mut reactions = Reactions {
            draft: "typed".into(),
            ..Reactions::default()
        };
        assert_eq!(reactions.toggle_like(), Some(true));
        reactions.push_comment(Comment {
            id: RowId::Int(3),
            post_id: RowId::Int(1),
            author_name: None,
            content: "typed".into(),
            created_at: None,
        });
        assert!(reactions.draft.is_empty());
        assert_eq!(reactions.comments[0].author(), "Us");
    }
}
