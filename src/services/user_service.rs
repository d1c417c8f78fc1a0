use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::User;
use crate::database::repository::Repository;
use crate::filter::FilterData;

/// Request body for user create and update; both routes overwrite the same
/// field set.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub description: Option<String>,
}

/// One page of users plus the metadata the paginated listing returns.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPage {
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
    pub data: Vec<User>,
}

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub async fn new() -> Result<Self, DatabaseError> {
        Ok(Self {
            pool: DatabaseManager::pool().await?,
        })
    }

    fn repository(&self) -> Repository<User> {
        Repository::new("users", self.pool.clone())
    }

    pub async fn create(&self, input: UserInput) -> Result<User, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, phone, description) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn list(&self) -> Result<Vec<User>, DatabaseError> {
        self.repository().select_any(FilterData::default()).await
    }

    pub async fn page(&self, page: Option<i64>, limit: Option<i64>) -> Result<UserPage, DatabaseError> {
        let (page, limit, offset) = page_window(page, limit);

        let repository = self.repository();
        let total = repository.count(FilterData::default()).await?;
        let data = repository
            .select_any(FilterData {
                // Stable order so page boundaries don't drift between requests
                order: Some(json!("created_at asc")),
                limit: Some(limit as i32),
                offset: Some(offset as i32),
                ..Default::default()
            })
            .await?;

        Ok(UserPage {
            total,
            page,
            total_pages: total_pages(total, limit),
            data,
        })
    }

    pub async fn update(&self, id: Uuid, input: UserInput) -> Result<User, DatabaseError> {
        // Look up first so a missing id is a 404, not a silent no-op
        self.find_by_id(id).await?;

        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET name = $1, email = $2, phone = $3, description = $4, \
             updated_at = now() WHERE id = $5 RETURNING *",
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.description)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.find_by_id(id).await?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<User, DatabaseError> {
        self.repository()
            .select_404(FilterData {
                where_clause: Some(json!({ "id": id })),
                ..Default::default()
            })
            .await
    }
}

/// Resolve page/limit query values against configured defaults and caps,
/// returning `(page, limit, offset)`.
fn page_window(page: Option<i64>, limit: Option<i64>) -> (i64, i64, i64) {
    let pagination = &crate::config::CONFIG.pagination;
    let page = page.unwrap_or(1).max(1);
    let limit = limit
        .unwrap_or(pagination.default_limit)
        .clamp(1, pagination.max_limit);
    let offset = (page - 1).saturating_mul(limit).min(i32::MAX as i64);
    (page, limit, offset)
}

fn total_pages(total: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_window_defaults() {
        let (page, limit, offset) = page_window(None, None);
        assert_eq!(page, 1);
        assert_eq!(limit, crate::config::CONFIG.pagination.default_limit);
        assert_eq!(offset, 0);
    }

    #[test]
    fn page_window_converts_to_offset() {
        let (page, limit, offset) = page_window(Some(2), Some(5));
        assert_eq!((page, limit, offset), (2, 5, 5));

        let (page, _, offset) = page_window(Some(4), Some(10));
        assert_eq!((page, offset), (4, 30));
    }

    #[test]
    fn page_window_clamps_bad_input() {
        let (page, limit, offset) = page_window(Some(0), Some(-3));
        assert_eq!((page, limit, offset), (1, 1, 0));

        let (_, limit, _) = page_window(Some(1), Some(1_000_000));
        assert_eq!(limit, crate::config::CONFIG.pagination.max_limit);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(12, 5), 3);
        assert_eq!(total_pages(10, 5), 2);
        assert_eq!(total_pages(1, 5), 1);
        assert_eq!(total_pages(0, 5), 0);
    }
}
