use async_trait::async_trait;
use sqlx::PgPool;

use super::{ServiceError, ServiceResult};
use crate::chart::{build_dataset_within, ChartRow, Dataset, DateLabel, DEFAULT_MAX_DAYS};
use crate::database::models::Activity;
use crate::database::{DatabaseError, Repository};

/// Which entries feed a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartView {
    /// Only the requested activity
    SelfOnly,
    /// The activity together with every activity related to it
    Rating,
}

impl ChartView {
    pub fn from_status_view(status_view: bool) -> Self {
        if status_view {
            ChartView::Rating
        } else {
            ChartView::SelfOnly
        }
    }
}

/// Where chart rows come from
#[async_trait]
pub trait ChartRowSource: Send + Sync {
    /// Entries of the given activities joined to the activity owner
    async fn rows_for_activities(&self, activity_ids: &[i32]) -> Result<Vec<ChartRow>, DatabaseError>;

    /// Ids related to `activity_id`, or `None` when the activity does not exist
    async fn related_activity_ids(&self, activity_id: i32) -> Result<Option<Vec<i32>>, DatabaseError>;
}

pub struct PgChartRowSource {
    pool: PgPool,
    activities: Repository<Activity>,
}

impl PgChartRowSource {
    pub fn new(pool: PgPool) -> Self {
        Self {
            activities: Repository::new("activities", "Activity", pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl ChartRowSource for PgChartRowSource {
    async fn rows_for_activities(&self, activity_ids: &[i32]) -> Result<Vec<ChartRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, ChartRow>(
            "SELECT e.id AS entry_id,
                    u.id AS user_id,
                    u.username AS user_name,
                    e.amount,
                    e.date_added AS date,
                    e.description
             FROM entries e
             JOIN activities a ON a.id = e.activity_id
             JOIN users u ON u.id = a.user_id
             WHERE e.activity_id = ANY($1)
             ORDER BY e.id",
        )
        .bind(activity_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn related_activity_ids(&self, activity_id: i32) -> Result<Option<Vec<i32>>, DatabaseError> {
        if !self.activities.exists(activity_id).await? {
            return Ok(None);
        }

        let related: Vec<(i32,)> = sqlx::query_as(
            "SELECT activity_two_id FROM activity_links WHERE activity_one_id = $1 ORDER BY activity_two_id",
        )
        .bind(activity_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(Some(related.into_iter().map(|(id,)| id).collect()))
    }
}

pub struct ChartService<S> {
    source: S,
    max_days: i64,
}

impl ChartService<PgChartRowSource> {
    pub fn from_pool(pool: PgPool) -> Self {
        Self::new(PgChartRowSource::new(pool))
    }
}

impl<S: ChartRowSource> ChartService<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            max_days: DEFAULT_MAX_DAYS,
        }
    }

    /// Reject datasets whose date axis would exceed `max_days`
    pub fn with_max_days(mut self, max_days: i64) -> Self {
        self.max_days = max_days;
        self
    }

    pub async fn dataset(&self, activity_id: i32, view: ChartView, label: DateLabel) -> ServiceResult<Dataset> {
        let activity_ids = match view {
            ChartView::SelfOnly => vec![activity_id],
            ChartView::Rating => {
                let mut ids = self
                    .source
                    .related_activity_ids(activity_id)
                    .await?
                    .ok_or_else(|| ServiceError::NotFound(format!("Activity {activity_id} not found")))?;
                ids.push(activity_id);
                ids
            }
        };

        let rows = self.source.rows_for_activities(&activity_ids).await?;
        tracing::debug!(
            "Charting {} rows from {} activities ({:?})",
            rows.len(),
            activity_ids.len(),
            view
        );
        Ok(build_dataset_within(&rows, label, self.max_days)?)
    }
}
