use async_trait::async_trait;

use super::error::Result;
use super::types::*;

/// Everything the app reads from or writes to the backend.
///
/// Workspace-scoped calls take the key explicitly; calls addressed by row id
/// don't need it.
#[async_trait]
pub trait TripStore: Send + Sync {
    // trip_plans
    async fn load_plans(&self, workspace: &WorkspaceKey) -> Result<Vec<PlanRow>>;
    async fn upsert_plan(&self, plan: &PlanUpsert) -> Result<()>;

    // trip_schedules
    async fn create_schedule(&self, schedule: &NewSchedule) -> Result<ScheduleRow>;
    async fn delete_schedule(&self, schedule_id: &RowId) -> Result<()>;

    // trip_schedule_blocks
    async fn list_blocks(&self, schedule_id: &RowId) -> Result<Vec<Block>>;
    async fn insert_block(&self, block: &NewBlock) -> Result<Block>;
    async fn update_block_times(&self, block_id: &RowId, times: &BlockTimes) -> Result<()>;
    async fn delete_block(&self, block_id: &RowId) -> Result<()>;
    async fn delete_blocks_for_schedule(&self, schedule_id: &RowId) -> Result<()>;

    // schedule_posts
    async fn list_posts(&self, workspace: &WorkspaceKey) -> Result<Vec<Post>>;
    async fn upsert_post(&self, post: &PostUpsert) -> Result<()>;
    async fn delete_post(&self, post_id: &RowId) -> Result<()>;

    // schedule_comments
    async fn list_comments(&self, post_ids: &[RowId]) -> Result<Vec<Comment>>;
    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment>;
    async fn delete_comments_for_post(&self, post_id: &RowId) -> Result<()>;

    // schedule_likes
    async fn liked_posts(&self, workspace: &WorkspaceKey, post_ids: &[RowId]) -> Result<Vec<RowId>>;
    async fn insert_like(&self, like: &NewLike) -> Result<()>;
    async fn delete_like(&self, workspace: &WorkspaceKey, post_id: &RowId) -> Result<()>;
    async fn delete_likes_for_post(&self, post_id: &RowId) -> Result<()>;
}
