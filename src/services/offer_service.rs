use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Offer, OfferWithOwner, User};
use crate::database::repository::Repository;
use crate::filter::FilterData;

/// Request body for offer create and update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferInput {
    pub title: String,
    pub description: String,
    pub category: String,
    pub level: String,
    pub user_id: Uuid,
}

/// Query-string filters accepted by the public listing. The Portuguese
/// parameter names are the documented interface of the legacy API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OfferFilters {
    pub categoria: Option<String>,
    pub nivel: Option<String>,
    pub busca: Option<String>,
}

pub struct OfferService {
    pool: PgPool,
}

impl OfferService {
    pub async fn new() -> Result<Self, DatabaseError> {
        Ok(Self {
            pool: DatabaseManager::pool().await?,
        })
    }

    fn repository(&self) -> Repository<Offer> {
        Repository::new("offers", self.pool.clone())
    }

    fn users(&self) -> Repository<User> {
        Repository::new("users", self.pool.clone())
    }

    pub async fn create(&self, input: OfferInput) -> Result<Offer, DatabaseError> {
        let offer = sqlx::query_as::<_, Offer>(
            "INSERT INTO offers (title, description, category, level, user_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.category)
        .bind(&input.level)
        .bind(input.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(offer)
    }

    pub async fn list(&self, filters: OfferFilters) -> Result<Vec<OfferWithOwner>, DatabaseError> {
        let offers = self
            .repository()
            .select_any(FilterData {
                where_clause: where_from_filters(&filters),
                ..Default::default()
            })
            .await?;

        // Attach owners with one batched lookup instead of a per-row join
        let mut ids: Vec<Uuid> = offers.iter().map(|o| o.user_id).collect();
        ids.sort_unstable();
        ids.dedup();
        let owners = self.users().select_ids(&ids).await?;
        let by_id: HashMap<Uuid, User> = owners.into_iter().map(|u| (u.id, u)).collect();

        Ok(offers
            .into_iter()
            .map(|offer| {
                let user = by_id.get(&offer.user_id).cloned();
                OfferWithOwner { offer, user }
            })
            .collect())
    }

    pub async fn update(&self, id: Uuid, input: OfferInput) -> Result<Offer, DatabaseError> {
        self.find_by_id(id).await?;

        let offer = sqlx::query_as::<_, Offer>(
            "UPDATE offers SET title = $1, description = $2, category = $3, level = $4, \
             user_id = $5, updated_at = now() WHERE id = $6 RETURNING *",
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.category)
        .bind(&input.level)
        .bind(input.user_id)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(offer)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.find_by_id(id).await?;

        sqlx::query("DELETE FROM offers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Offer, DatabaseError> {
        self.repository()
            .select_404(FilterData {
                where_clause: Some(json!({ "id": id })),
                ..Default::default()
            })
            .await
    }
}

/// Build the WHERE conditions for the public listing: equality on category
/// and level, plus an OR-combined case-insensitive substring match over
/// title and description. Empty parameter values count as absent, like the
/// legacy API.
fn where_from_filters(filters: &OfferFilters) -> Option<Value> {
    let mut clauses = serde_json::Map::new();

    if let Some(category) = non_empty(&filters.categoria) {
        clauses.insert("category".to_string(), json!(category));
    }
    if let Some(level) = non_empty(&filters.nivel) {
        clauses.insert("level".to_string(), json!(level));
    }
    if let Some(term) = non_empty(&filters.busca) {
        let pattern = format!("%{}%", escape_like(term));
        clauses.insert(
            "$or".to_string(),
            json!([
                { "title": { "$ilike": pattern } },
                { "description": { "$ilike": pattern } },
            ]),
        );
    }

    if clauses.is_empty() {
        None
    } else {
        Some(Value::Object(clauses))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

// LIKE wildcards in the search term are literal characters to the caller
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}
