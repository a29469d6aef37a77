use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;

use super::error::{ApiError, Result};
use super::store::TripStore;
use super::types::*;
use crate::config::Config;

const PLANS: &str = "trip_plans";
const SCHEDULES: &str = "trip_schedules";
const BLOCKS: &str = "trip_schedule_blocks";
const POSTS: &str = "schedule_posts";
const LIKES: &str = "schedule_likes";
const COMMENTS: &str = "schedule_comments";

/// PostgREST query string builder. Values are percent-encoded here so the
/// request URL can be logged exactly as sent.
#[derive(Debug, Default, Clone)]
pub struct Query {
    parts: Vec<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.parts.push(format!("select={}", urlencoding::encode(columns)));
        self
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        let filter = format!("eq.{}", value.to_string());
        self.parts.push(format!("{}={}", column, urlencoding::encode(&filter)));
        self
    }

    pub fn in_list(mut self, column: &str, values: &[RowId]) -> Self {
        let joined = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let filter = format!("in.({})", joined);
        self.parts.push(format!("{}={}", column, urlencoding::encode(&filter)));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let dir = if ascending { "asc" } else { "desc" };
        self.parts.push(format!("order={}.{}", column, dir));
        self
    }

    pub fn on_conflict(mut self, columns: &str) -> Self {
        self.parts.push(format!("on_conflict={}", urlencoding::encode(columns)));
        self
    }

    pub fn to_query_string(&self) -> String {
        self.parts.join("&")
    }
}

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseClient {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .anon_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(ApiError::NotConfigured("anon key"))?;

        if config.supabase_url.trim().is_empty() {
            return Err(ApiError::NotConfigured("project URL"));
        }

        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url: config.rest_url(),
            api_key,
        })
    }

    fn url(&self, table: &str, query: &Query) -> String {
        let qs = query.to_query_string();
        if qs.is_empty() {
            format!("{}/{}", self.base_url, table)
        } else {
            format!("{}/{}?{}", self.base_url, table, qs)
        }
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        tracing::debug!(method = method.as_str(), url, "postgrest request");
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::ACCEPT, "application/json")
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }
        Ok(response)
    }

    async fn get<T: DeserializeOwned>(&self, table: &str, query: Query) -> Result<Vec<T>> {
        let url = self.url(table, &query);
        let response = self.request(reqwest::Method::GET, &url).send().await?;
        let response = Self::check(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Insert one row and return the stored representation
    async fn insert<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        table: &'static str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(table, &Query::new());
        let response = self
            .request(reqwest::Method::POST, &url)
            .header(header::CONTENT_TYPE, "application/json")
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        let response = Self::check(response).await?;
        let bytes = response.bytes().await?;
        let rows: Vec<T> = serde_json::from_slice(&bytes)?;
        rows.into_iter().next().ok_or(ApiError::EmptyResponse(table))
    }

    /// Insert without reading anything back
    async fn insert_minimal<B: serde::Serialize + Sync>(
        &self,
        table: &str,
        query: Query,
        body: &B,
        prefer: &str,
    ) -> Result<()> {
        let url = self.url(table, &query);
        let response = self
            .request(reqwest::Method::POST, &url)
            .header(header::CONTENT_TYPE, "application/json")
            .header("Prefer", prefer)
            .json(body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn patch<B: serde::Serialize + Sync>(
        &self,
        table: &str,
        query: Query,
        body: &B,
    ) -> Result<()> {
        let url = self.url(table, &query);
        let response = self
            .request(reqwest::Method::PATCH, &url)
            .header(header::CONTENT_TYPE, "application/json")
            .header("Prefer", "return=minimal")
            .json(body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, query: Query) -> Result<()> {
        let url = self.url(table, &query);
        let response = self.request(reqwest::Method::DELETE, &url).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl TripStore for SupabaseClient {
    async fn load_plans(&self, workspace: &WorkspaceKey) -> Result<Vec<PlanRow>> {
        self.get(PLANS, Query::new().select("*").eq("profile_key", workspace)).await
    }

    async fn upsert_plan(&self, plan: &PlanUpsert) -> Result<()> {
        let query = Query::new().on_conflict("profile_key,direction");
        self.insert_minimal(PLANS, query, plan, "resolution=merge-duplicates,return=minimal").await
    }

    async fn create_schedule(&self, schedule: &NewSchedule) -> Result<ScheduleRow> {
        self.insert(SCHEDULES, schedule).await
    }

    async fn delete_schedule(&self, schedule_id: &RowId) -> Result<()> {
        self.delete(SCHEDULES, Query::new().eq("id", schedule_id)).await
    }

    async fn list_blocks(&self, schedule_id: &RowId) -> Result<Vec<Block>> {
        let query = Query::new()
            .select("*")
            .eq("schedule_id", schedule_id)
            .order("start_minutes", true);
        self.get(BLOCKS, query).await
    }

    async fn insert_block(&self, block: &NewBlock) -> Result<Block> {
        self.insert(BLOCKS, block).await
    }

    async fn update_block_times(&self, block_id: &RowId, times: &BlockTimes) -> Result<()> {
        self.patch(BLOCKS, Query::new().eq("id", block_id), times).await
    }

    async fn delete_block(&self, block_id: &RowId) -> Result<()> {
        self.delete(BLOCKS, Query::new().eq("id", block_id)).await
    }

    async fn delete_blocks_for_schedule(&self, schedule_id: &RowId) -> Result<()> {
        self.delete(BLOCKS, Query::new().eq("schedule_id", schedule_id)).await
    }

    async fn list_posts(&self, workspace: &WorkspaceKey) -> Result<Vec<Post>> {
        let query = Query::new()
            .select("id,schedule_id,direction,day_label,title,note,author_name,created_at")
            .eq("profile_key", workspace)
            .order("created_at", false);
        self.get(POSTS, query).await
    }

    async fn upsert_post(&self, post: &PostUpsert) -> Result<()> {
        let query = Query::new().on_conflict("schedule_id");
        self.insert_minimal(POSTS, query, post, "resolution=merge-duplicates,return=minimal").await
    }

    async fn delete_post(&self, post_id: &RowId) -> Result<()> {
        self.delete(POSTS, Query::new().eq("id", post_id)).await
    }

    async fn list_comments(&self, post_ids: &[RowId]) -> Result<Vec<Comment>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = Query::new()
            .select("id,post_id,author_name,content,created_at")
            .in_list("post_id", post_ids)
            .order("created_at", true);
        self.get(COMMENTS, query).await
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment> {
        self.insert(COMMENTS, comment).await
    }

    async fn delete_comments_for_post(&self, post_id: &RowId) -> Result<()> {
        self.delete(COMMENTS, Query::new().eq("post_id", post_id)).await
    }

    async fn liked_posts(
        &self,
        workspace: &WorkspaceKey,
        post_ids: &[RowId],
    ) -> Result<Vec<RowId>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = Query::new()
            .select("post_id")
            .in_list("post_id", post_ids)
            .eq("profile_key", workspace);
        let rows: Vec<LikeRow> = self.get(LIKES, query).await?;
        Ok(rows.into_iter().map(|r| r.post_id).collect())
    }

    async fn insert_like(&self, like: &NewLike) -> Result<()> {
        self.insert_minimal(LIKES, Query::new(), like, "return=minimal").await
    }

    async fn delete_like(&self, workspace: &WorkspaceKey, post_id: &RowId) -> Result<()> {
        let query = Query::new().eq("post_id", post_id).eq("profile_key", workspace);
        self.delete(LIKES, query).await
    }

    async fn delete_likes_for_post(&self, post_id: &RowId) -> Result<()> {
        self.delete(LIKES, Query::new().eq("post_id", post_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_encodes_filters() {
        let qs = Query::new()
            .select("*")
            .eq("profile_key", "veyd-and-manasi")
            .order("start_minutes", true)
            .to_query_string();
        assert_eq!(qs, "select=%2A&profile_key=eq.veyd-and-manasi&order=start_minutes.asc");
    }

    #[test]
    fn in_list_joins_ids() {
        let qs = Query::new()
            .in_list("post_id", &[RowId::Int(1), RowId::Int(22)])
            .to_query_string();
        assert_eq!(qs, "post_id=in.%281%2C22%29");
    }

    #[test]
    fn on_conflict_keeps_column_list() {
        let qs = Query::new().on_conflict("profile_key,direction").to_query_string();
        assert_eq!(qs, "on_conflict=profile_key%2Cdirection");
    }

    #[test]
    fn client_requires_credentials() {
        let config = Config::default();
        assert!(matches!(SupabaseClient::new(&config), Err(ApiError::NotConfigured(_))));
    }

    #[test]
    fn urls_hang_off_rest_root() {
        let config = Config {
            supabase_url: "https://abc.supabase.co/".into(),
            anon_key: Some("key".into()),
            ..Config::default()
        };
        let client = SupabaseClient::new(&config).unwrap();
        assert_eq!(
            client.url(BLOCKS, &Query::new().eq("id", RowId::Int(3))),
            "https://abc.supabase.co/rest/v1/trip_schedule_blocks?id=eq.3"
        );
        assert_eq!(
            client.url(LIKES, &Query::new()),
            "https://abc.supabase.co/rest/v1/schedule_likes"
        );
    }
}
