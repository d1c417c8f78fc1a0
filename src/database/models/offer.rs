use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::user::User;

/// A knowledge posting owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub level: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Offer with its owning user attached, as returned by the public listing.
/// `user` is None only if the owner row disappeared between the two lookups.
#[derive(Debug, Clone, Serialize)]
pub struct OfferWithOwner {
    #[serde(flatten)]
    pub offer: Offer,
    pub user: Option<User>,
}
