//! In-process store used when no backend is configured, and by tests.
//!
//! Mirrors the PostgREST behavior the app depends on: server-assigned ids and
//! timestamps, upserts on the same conflict keys, and the same orderings.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;

use super::error::Result;
use super::store::TripStore;
use super::types::*;

#[derive(Default)]
struct Tables {
    next_id: i64,
    plans: Vec<PlanUpsert>,
    schedules: Vec<ScheduleRow>,
    blocks: Vec<Block>,
    posts: Vec<(WorkspaceKey, Post)>,
    likes: Vec<NewLike>,
    comments: Vec<Comment>,
}

impl Tables {
    fn next_id(&mut self) -> RowId {
        self.next_id += 1;
        RowId::Int(self.next_id)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> R {
        // A poisoned lock only means another task panicked mid-write; the
        // tables themselves are still usable.
        let mut guard = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    /// Row counts per table, for tests that check cascades
    #[cfg(test)]
    pub fn counts(&self) -> (usize, usize, usize, usize, usize) {
        self.with(|t| {
            (
                t.schedules.len(),
                t.blocks.len(),
                t.posts.len(),
                t.likes.len(),
                t.comments.len(),
            )
        })
    }
}

#[async_trait]
impl TripStore for MemoryStore {
    async fn load_plans(&self, workspace: &WorkspaceKey) -> Result<Vec<PlanRow>> {
        Ok(self.with(|t| {
            t.plans
                .iter()
                .filter(|p| &p.profile_key == workspace)
                .map(|p| PlanRow {
                    direction: p.direction,
                    activity: Some(OneOrMany::Many(p.activity.clone())),
                    vibe: p.vibe.clone(),
                    food: Some(OneOrMany::Many(p.food.clone())),
                    locked: Some(p.locked),
                })
                .collect()
        }))
    }

    async fn upsert_plan(&self, plan: &PlanUpsert) -> Result<()> {
        self.with(|t| {
            match t
                .plans
                .iter_mut()
                .find(|p| p.profile_key == plan.profile_key && p.direction == plan.direction)
            {
                Some(existing) => *existing = plan.clone(),
                None => t.plans.push(plan.clone()),
            }
        });
        Ok(())
    }

    async fn create_schedule(&self, schedule: &NewSchedule) -> Result<ScheduleRow> {
        Ok(self.with(|t| {
            let row = ScheduleRow {
                id: t.next_id(),
                profile_key: schedule.profile_key.clone(),
                direction: schedule.direction,
                day_label: schedule.day_label.clone(),
            };
            t.schedules.push(row.clone());
            row
        }))
    }

    async fn delete_schedule(&self, schedule_id: &RowId) -> Result<()> {
        self.with(|t| t.schedules.retain(|s| &s.id != schedule_id));
        Ok(())
    }

    async fn list_blocks(&self, schedule_id: &RowId) -> Result<Vec<Block>> {
        Ok(self.with(|t| {
            let mut blocks: Vec<Block> = t
                .blocks
                .iter()
                .filter(|b| &b.schedule_id == schedule_id)
                .cloned()
                .collect();
            blocks.sort_by_key(|b| b.start_minutes);
            blocks
        }))
    }

    async fn insert_block(&self, block: &NewBlock) -> Result<Block> {
        Ok(self.with(|t| {
            let row = Block {
                id: t.next_id(),
                schedule_id: block.schedule_id.clone(),
                label: block.label.clone(),
                kind: block.kind,
                day_index: block.day_index,
                start_minutes: block.start_minutes,
                end_minutes: block.end_minutes,
            };
            t.blocks.push(row.clone());
            row
        }))
    }

    async fn update_block_times(&self, block_id: &RowId, times: &BlockTimes) -> Result<()> {
        self.with(|t| {
            if let Some(b) = t.blocks.iter_mut().find(|b| &b.id == block_id) {
                b.start_minutes = times.start_minutes;
                b.end_minutes = times.end_minutes;
            }
        });
        Ok(())
    }

    async fn delete_block(&self, block_id: &RowId) -> Result<()> {
        self.with(|t| t.blocks.retain(|b| &b.id != block_id));
        Ok(())
    }

    async fn delete_blocks_for_schedule(&self, schedule_id: &RowId) -> Result<()> {
        self.with(|t| t.blocks.retain(|b| &b.schedule_id != schedule_id));
        Ok(())
    }

    async fn list_posts(&self, workspace: &WorkspaceKey) -> Result<Vec<Post>> {
        Ok(self.with(|t| {
            // Newest first; posts live in insertion order so reverse it
            t.posts
                .iter()
                .rev()
                .filter(|(ws, _)| ws == workspace)
                .map(|(_, p)| p.clone())
                .collect()
        }))
    }

    async fn upsert_post(&self, post: &PostUpsert) -> Result<()> {
        self.with(|t| {
            let existing = t
                .posts
                .iter_mut()
                .find(|(_, p)| p.schedule_id == post.schedule_id);
            if let Some((_, existing)) = existing {
                existing.direction = post.direction;
                existing.day_label = post.day_label.clone();
                existing.title = Some(post.title.clone());
                existing.author_name = post.author_name.clone();
                return;
            }
            let row = Post {
                id: t.next_id(),
                schedule_id: post.schedule_id.clone(),
                direction: post.direction,
                day_label: post.day_label.clone(),
                title: Some(post.title.clone()),
                note: None,
                author_name: post.author_name.clone(),
                created_at: Some(Utc::now()),
            };
            t.posts.push((post.profile_key.clone(), row));
        });
        Ok(())
    }

    async fn delete_post(&self, post_id: &RowId) -> Result<()> {
        self.with(|t| t.posts.retain(|(_, p)| &p.id != post_id));
        Ok(())
    }

    async fn list_comments(&self, post_ids: &[RowId]) -> Result<Vec<Comment>> {
        Ok(self.with(|t| {
            t.comments
                .iter()
                .filter(|c| post_ids.contains(&c.post_id))
                .cloned()
                .collect()
        }))
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment> {
        Ok(self.with(|t| {
            let row = Comment {
                id: t.next_id(),
                post_id: comment.post_id.clone(),
                author_name: Some(comment.author_name.clone()),
                content: comment.content.clone(),
                created_at: Some(Utc::now()),
            };
            t.comments.push(row.clone());
            row
        }))
    }

    async fn delete_comments_for_post(&self, post_id: &RowId) -> Result<()> {
        self.with(|t| t.comments.retain(|c| &c.post_id != post_id));
        Ok(())
    }

    async fn liked_posts(
        &self,
        workspace: &WorkspaceKey,
        post_ids: &[RowId],
    ) -> Result<Vec<RowId>> {
        Ok(self.with(|t| {
            t.likes
                .iter()
                .filter(|l| &l.profile_key == workspace && post_ids.contains(&l.post_id))
                .map(|l| l.post_id.clone())
                .collect()
        }))
    }

    async fn insert_like(&self, like: &NewLike) -> Result<()> {
        self.with(|t| t.likes.push(like.clone()));
        Ok(())
    }

    async fn delete_like(&self, workspace: &WorkspaceKey, post_id: &RowId) -> Result<()> {
        self.with(|t| t.likes.retain(|l| !(&l.profile_key == workspace && &l.post_id == post_id)));
        Ok(())
    }

    async fn delete_likes_for_post(&self, post_id: &RowId) -> Result<()> {
        self.with(|t| t.likes.retain(|l| &l.post_id != post_id));
        Ok(())
    }
}
