use sqlx::{self, postgres::PgRow, FromRow, PgPool};

use crate::database::manager::DatabaseError;

/// By-id access shared by every table keyed on a SERIAL `id`
pub struct Repository<T> {
    table_name: &'static str,
    record_name: &'static str,
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(table_name: &'static str, record_name: &'static str, pool: PgPool) -> Self {
        debug_assert!(is_valid_table_name(table_name), "invalid table name {table_name}");
        Self {
            table_name,
            record_name,
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_one(&self, id: i32) -> Result<Option<T>, DatabaseError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", self.table_name);
        let row = sqlx::query_as::<_, T>(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row)
    }

    pub async fn select_404(&self, id: i32) -> Result<T, DatabaseError> {
        self.select_one(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} {} not found", self.record_name, id)))
    }

    pub async fn select_ids(&self, ids: &[i32]) -> Result<Vec<T>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let sql = format!("SELECT * FROM {} WHERE id = ANY($1) ORDER BY id", self.table_name);
        let rows = sqlx::query_as::<_, T>(&sql).bind(ids).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn exists(&self, id: i32) -> Result<bool, DatabaseError> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", self.table_name);
        let (exists,): (bool,) = sqlx::query_as(&sql).bind(id).fetch_one(&self.pool).await?;
        Ok(exists)
    }

    /// Returns whether a row was removed
    pub async fn delete_one(&self, id: i32) -> Result<bool, DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table_name);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Table names are interpolated into SQL, so only lowercase identifiers pass
fn is_valid_table_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| c.is_ascii_lowercase() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_table_names() {
        assert!(is_valid_table_name("entries"));
        assert!(is_valid_table_name("user_friends"));
        assert!(!is_valid_table_name("entries; DROP TABLE users"));
        assert!(!is_valid_table_name("\"users\""));
        assert!(!is_valid_table_name(""));
    }
}
