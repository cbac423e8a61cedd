use std::collections::HashMap;

use serde::Deserialize;
use sqlx::PgPool;
use tracing::{debug, info};

use super::activity_service::ensure_owner;
use super::{ServiceError, ServiceResult};
use crate::chart::{parse_date, DATE_FORMAT};
use crate::database::models::{Activity, Entry, EntryPatch, EntryView, NewEntry};
use crate::database::Repository;

/// Body of the bulk update: `entries[i]` applies to `entry_ids[i]`
#[derive(Debug, Clone, Deserialize)]
pub struct BulkEntryUpdate {
    pub entry_ids: Vec<i32>,
    pub entries: Vec<EntryPatch>,
}

pub struct EntryService {
    pool: PgPool,
    entries: Repository<Entry>,
    activities: Repository<Activity>,
}

impl EntryService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            entries: Repository::new("entries", "Entry", pool.clone()),
            activities: Repository::new("activities", "Activity", pool.clone()),
            pool,
        }
    }

    pub async fn get(&self, id: i32) -> ServiceResult<EntryView> {
        let entry = self.entries.select_404(id).await?;
        Ok(EntryView::from(&entry))
    }

    pub async fn create(&self, owner_id: i32, new: NewEntry) -> ServiceResult<EntryView> {
        let mut created = self.create_many(owner_id, vec![new]).await?;
        created
            .pop()
            .ok_or_else(|| ServiceError::BadRequest("No entry to create".into()))
    }

    /// Insert all entries in one transaction; nothing is written if any is rejected
    pub async fn create_many(&self, owner_id: i32, mut new: Vec<NewEntry>) -> ServiceResult<Vec<EntryView>> {
        for entry in &mut new {
            entry.date_added = normalize_date(&entry.date_added)?;
        }
        let activity_ids: Vec<i32> = new.iter().map(|e| e.activity_id).collect();
        self.ensure_owns_all(owner_id, &activity_ids).await?;

        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(new.len());
        for entry in &new {
            let row = sqlx::query_as::<_, Entry>(
                "INSERT INTO entries (activity_id, amount, description, date_added)
                 VALUES ($1, $2, $3, $4)
                 RETURNING *",
            )
            .bind(entry.activity_id)
            .bind(entry.amount)
            .bind(&entry.description)
            .bind(&entry.date_added)
            .fetch_one(&mut *tx)
            .await?;
            created.push(EntryView::from(&row));
        }
        tx.commit().await?;

        debug!("User {} created {} entries", owner_id, created.len());
        Ok(created)
    }

    pub async fn update(&self, owner_id: i32, id: i32, patch: EntryPatch) -> ServiceResult<EntryView> {
        let bulk = BulkEntryUpdate {
            entry_ids: vec![id],
            entries: vec![patch],
        };
        self.update_many(owner_id, bulk)
            .await?
            .pop()
            .ok_or_else(|| ServiceError::NotFound(format!("Entry {id} not found")))
    }

    /// Apply patches pairwise. Ids without an entry are skipped; a repeated id
    /// accumulates its patches and is returned once.
    pub async fn update_many(&self, owner_id: i32, bulk: BulkEntryUpdate) -> ServiceResult<Vec<EntryView>> {
        if bulk.entry_ids.len() != bulk.entries.len() {
            return Err(ServiceError::BadRequest(format!(
                "entry_ids has {} items but entries has {}",
                bulk.entry_ids.len(),
                bulk.entries.len()
            )));
        }

        let mut existing: HashMap<i32, Entry> = self
            .entries
            .select_ids(&bulk.entry_ids)
            .await?
            .into_iter()
            .map(|entry| (entry.id, entry))
            .collect();
        let stored_activity: HashMap<i32, i32> = existing.iter().map(|(id, e)| (*id, e.activity_id)).collect();

        // Patches for a repeated id stack on the same row, which is written once
        let mut touched = Vec::new();
        for (id, mut patch) in bulk.entry_ids.into_iter().zip(bulk.entries) {
            let Some(entry) = existing.get_mut(&id) else {
                debug!("Skipping update of missing entry {}", id);
                continue;
            };
            if let Some(date) = patch.date_added.take() {
                patch.date_added = Some(normalize_date(&date)?);
            }
            patch.apply(entry);
            if !touched.contains(&id) {
                touched.push(id);
            }
        }
        let updated: Vec<&Entry> = touched.iter().filter_map(|id| existing.get(id)).collect();

        // The entry's current activity and any activity it moves to must both be owned
        let activity_ids: Vec<i32> = updated
            .iter()
            .map(|e| e.activity_id)
            .chain(touched.iter().filter_map(|id| stored_activity.get(id).copied()))
            .collect();
        self.ensure_owns_all(owner_id, &activity_ids).await?;

        let mut tx = self.pool.begin().await?;
        let mut views = Vec::with_capacity(updated.len());
        for entry in updated {
            let row = sqlx::query_as::<_, Entry>(
                "UPDATE entries
                 SET activity_id = $1, amount = $2, description = $3, date_added = $4, updated_at = now()
                 WHERE id = $5
                 RETURNING *",
            )
            .bind(entry.activity_id)
            .bind(entry.amount)
            .bind(&entry.description)
            .bind(&entry.date_added)
            .bind(entry.id)
            .fetch_one(&mut *tx)
            .await?;
            views.push(EntryView::from(&row));
        }
        tx.commit().await?;

        Ok(views)
    }

    pub async fn delete(&self, owner_id: i32, id: i32) -> ServiceResult<()> {
        let entry = self.entries.select_404(id).await?;
        self.ensure_owns_all(owner_id, &[entry.activity_id]).await?;
        self.entries.delete_one(id).await?;
        Ok(())
    }

    /// Delete the listed entries that belong to the owner's activities; returns the removed ids
    pub async fn delete_many(&self, owner_id: i32, ids: &[i32]) -> ServiceResult<Vec<i32>> {
        let deleted: Vec<(i32,)> = sqlx::query_as(
            "DELETE FROM entries e
             USING activities a
             WHERE e.activity_id = a.id AND a.user_id = $1 AND e.id = ANY($2)
             RETURNING e.id",
        )
        .bind(owner_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        info!("User {} deleted {} of {} entries", owner_id, deleted.len(), ids.len());
        Ok(deleted.into_iter().map(|(id,)| id).collect())
    }

    async fn ensure_owns_all(&self, owner_id: i32, activity_ids: &[i32]) -> ServiceResult<()> {
        let mut wanted = activity_ids.to_vec();
        wanted.sort_unstable();
        wanted.dedup();

        let found = self.activities.select_ids(&wanted).await?;
        for id in &wanted {
            match found.iter().find(|a| a.id == *id) {
                Some(activity) => ensure_owner(activity, owner_id)?,
                None => return Err(ServiceError::NotFound(format!("Activity {id} not found"))),
            }
        }
        Ok(())
    }
}

/// Validate a `YYYY-MM-DD` date and return it in canonical form
fn normalize_date(value: &str) -> ServiceResult<String> {
    Ok(parse_date(value)?.format(DATE_FORMAT).to_string())
}
