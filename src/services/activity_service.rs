use sqlx::PgPool;
use tracing::info;

use super::{ServiceError, ServiceResult};
use crate::database::models::{Activity, ActivityFull, ActivityPatch, ActivityView, NewActivity, RelatedActivity};
use crate::database::Repository;

pub struct ActivityService {
    pool: PgPool,
    activities: Repository<Activity>,
}

impl ActivityService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            activities: Repository::new("activities", "Activity", pool.clone()),
            pool,
        }
    }

    /// Load an activity that `owner_id` may modify: 404 when missing, 403 when foreign
    pub async fn owned(&self, owner_id: i32, id: i32) -> ServiceResult<Activity> {
        let activity = self.activities.select_404(id).await?;
        ensure_owner(&activity, owner_id)?;
        Ok(activity)
    }

    /// New activity owned by `owner_id`, also placed on the owner's profile
    pub async fn create(&self, owner_id: i32, new: NewActivity) -> ServiceResult<ActivityView> {
        let mut tx = self.pool.begin().await?;

        let activity = sqlx::query_as::<_, Activity>(
            "INSERT INTO activities (name, user_id, notification_text, status)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(&new.name)
        .bind(owner_id)
        .bind(&new.notification_text)
        .bind(new.status)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO user_activities (user_id, activity_id) VALUES ($1, $2)")
            .bind(owner_id)
            .bind(activity.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("User {} created activity {} ({})", owner_id, activity.name, activity.id);
        Ok(ActivityView::from(&activity))
    }

    pub async fn get_full(&self, id: i32) -> ServiceResult<ActivityFull> {
        let activity = self.activities.select_404(id).await?;
        Ok(ActivityFull {
            activity: ActivityView::from(&activity),
            related_activities: self.related(id).await?,
        })
    }

    pub async fn related(&self, id: i32) -> ServiceResult<Vec<RelatedActivity>> {
        let related = sqlx::query_as::<_, RelatedActivity>(
            "SELECT a.id, a.name
             FROM activity_links l
             JOIN activities a ON a.id = l.activity_two_id
             WHERE l.activity_one_id = $1
             ORDER BY a.id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(related)
    }

    /// Activities owned by `owner_id`, optionally only those with the given status
    pub async fn list_own(&self, owner_id: i32, status: Option<bool>) -> ServiceResult<Vec<ActivityView>> {
        let activities = sqlx::query_as::<_, Activity>(
            "SELECT * FROM activities
             WHERE user_id = $1 AND ($2::BOOLEAN IS NULL OR status = $2)
             ORDER BY id",
        )
        .bind(owner_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(activities.iter().map(ActivityView::from).collect())
    }

    pub async fn update(&self, owner_id: i32, id: i32, patch: ActivityPatch) -> ServiceResult<ActivityView> {
        let mut activity = self.owned(owner_id, id).await?;
        patch.apply(&mut activity);

        let activity = sqlx::query_as::<_, Activity>(
            "UPDATE activities
             SET name = $1, notification_text = $2, status = $3, updated_at = now()
             WHERE id = $4
             RETURNING *",
        )
        .bind(&activity.name)
        .bind(&activity.notification_text)
        .bind(activity.status)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(ActivityView::from(&activity))
    }

    /// Entries, links and profile rows go with it
    pub async fn delete(&self, owner_id: i32, id: i32) -> ServiceResult<()> {
        self.owned(owner_id, id).await?;
        self.activities.delete_one(id).await?;
        info!("User {} deleted activity {}", owner_id, id);
        Ok(())
    }

    /// Relate two activities in both directions. Only the owner of `id` may link.
    pub async fn link(&self, owner_id: i32, id: i32, related_id: i32) -> ServiceResult<ActivityFull> {
        if id == related_id {
            return Err(ServiceError::BadRequest("An activity cannot be related to itself".into()));
        }
        self.owned(owner_id, id).await?;
        self.activities.select_404(related_id).await?;

        let mut tx = self.pool.begin().await?;
        for (one, two) in [(id, related_id), (related_id, id)] {
            sqlx::query(
                "INSERT INTO activity_links (activity_one_id, activity_two_id)
                 VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(one)
            .bind(two)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        self.get_full(id).await
    }

    pub async fn unlink(&self, owner_id: i32, id: i32, related_id: i32) -> ServiceResult<ActivityFull> {
        self.owned(owner_id, id).await?;

        let removed = sqlx::query(
            "DELETE FROM activity_links
             WHERE (activity_one_id = $1 AND activity_two_id = $2)
                OR (activity_one_id = $2 AND activity_two_id = $1)",
        )
        .bind(id)
        .bind(related_id)
        .execute(&self.pool)
        .await?;

        if removed.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!(
                "Activity {related_id} is not related to activity {id}"
            )));
        }
        self.get_full(id).await
    }
}

pub(crate) fn ensure_owner(activity: &Activity, owner_id: i32) -> ServiceResult<()> {
    if activity.user_id == owner_id {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!("Activity {} belongs to another user", activity.id)))
    }
}
