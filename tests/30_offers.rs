mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

// Offer CRUD surface under the legacy /conhecimentos routes: create with an
// owning user, filtered listing with the owner joined, update, delete.
// Requires a running PostgreSQL reachable through DATABASE_URL.

async fn create_owner(base_url: &str, client: &reqwest::Client) -> Result<serde_json::Value> {
    let res = client
        .post(format!("{}/users", base_url))
        .json(&json!({
            "name": "Owner",
            "email": format!("owner-{}@example.com", common::unique_tag()),
            "phone": "11 94444-0000",
            "description": null
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    Ok(res.json::<serde_json::Value>().await?["data"].clone())
}

#[tokio::test]
async fn create_offer_and_list_with_owner_joined() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let owner = create_owner(&server.base_url, &client).await?;
    let owner_id = owner["id"].as_str().expect("owner id");

    let res = client
        .post(format!("{}/conhecimentos", server.base_url))
        .json(&json!({
            "title": format!("Intro to joinery {}", common::unique_tag()),
            "description": "hand tools only",
            "category": "woodworking",
            "level": "basic",
            "userId": owner_id
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED, "unexpected status: {}", res.status());

    let body = res.json::<serde_json::Value>().await?;
    let offer_id = body["data"]["id"].as_str().expect("offer id").to_string();
    assert_eq!(body["data"]["userId"].as_str(), Some(owner_id));

    let list = client
        .get(format!("{}/conhecimentos", server.base_url))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    let data = list["data"].as_array().cloned().unwrap_or_default();
    let listed = data
        .iter()
        .find(|o| o["id"].as_str() == Some(offer_id.as_str()))
        .expect("created offer missing from list");

    // Owner is embedded on each listed offer
    assert_eq!(listed["user"]["id"].as_str(), Some(owner_id));
    assert_eq!(listed["user"]["email"].as_str(), owner["email"].as_str());

    Ok(())
}

#[tokio::test]
async fn category_filter_only_returns_matches() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let owner = create_owner(&server.base_url, &client).await?;
    let owner_id = owner["id"].as_str().expect("owner id");

    // Two offers in two distinct throwaway categories
    let tag = common::unique_tag();
    let category_a = format!("cat-a-{}", tag);
    let category_b = format!("cat-b-{}", tag);

    let mut ids = Vec::new();
    for category in [&category_a, &category_b] {
        let res = client
            .post(format!("{}/conhecimentos", server.base_url))
            .json(&json!({
                "title": "Filter fixture",
                "description": "fixture",
                "category": category,
                "level": "basic",
                "userId": owner_id
            }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body = res.json::<serde_json::Value>().await?;
        ids.push(body["data"]["id"].as_str().expect("id").to_string());
    }

    let list = client
        .get(format!(
            "{}/conhecimentos?categoria={}",
            server.base_url, category_a
        ))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    let data = list["data"].as_array().cloned().unwrap_or_default();

    assert!(!data.is_empty(), "filtered list should contain the fixture");
    for offer in &data {
        assert_eq!(offer["category"].as_str(), Some(category_a.as_str()));
    }
    assert!(data.iter().any(|o| o["id"].as_str() == Some(ids[0].as_str())));
    assert!(data.iter().all(|o| o["id"].as_str() != Some(ids[1].as_str())));

    Ok(())
}

#[tokio::test]
async fn search_matches_title_case_insensitively() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let owner = create_owner(&server.base_url, &client).await?;
    let owner_id = owner["id"].as_str().expect("owner id");

    let marker = format!("Xyzzy{}", common::unique_tag().replace('-', ""));
    let res = client
        .post(format!("{}/conhecimentos", server.base_url))
        .json(&json!({
            "title": format!("Workshop {}", marker),
            "description": "searchable fixture",
            "category": "search",
            "level": "basic",
            "userId": owner_id
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let offer_id = res.json::<serde_json::Value>().await?["data"]["id"]
        .as_str()
        .expect("id")
        .to_string();

    // Query in lowercase; the title marker is mixed case
    let list = client
        .get(format!(
            "{}/conhecimentos?busca={}",
            server.base_url,
            marker.to_lowercase()
        ))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    let data = list["data"].as_array().cloned().unwrap_or_default();
    assert!(
        data.iter().any(|o| o["id"].as_str() == Some(offer_id.as_str())),
        "case-insensitive search missed the fixture: {}",
        list
    );

    Ok(())
}

#[tokio::test]
async fn offer_for_unknown_user_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/conhecimentos", server.base_url))
        .json(&json!({
            "title": "Orphan",
            "description": "no owner",
            "category": "none",
            "level": "basic",
            "userId": common::missing_id()
        }))
        .send()
        .await?;

    assert_eq!(
        res.status(),
        StatusCode::BAD_REQUEST,
        "unknown owner should be rejected"
    );

    Ok(())
}

#[tokio::test]
async fn update_and_delete_offer() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let owner = create_owner(&server.base_url, &client).await?;
    let owner_id = owner["id"].as_str().expect("owner id");

    let created = client
        .post(format!("{}/conhecimentos", server.base_url))
        .json(&json!({
            "title": "Before",
            "description": "first draft",
            "category": "editing",
            "level": "basic",
            "userId": owner_id
        }))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    let id = created["data"]["id"].as_str().expect("id").to_string();

    let updated = client
        .put(format!("{}/conhecimentos/{}", server.base_url, id))
        .json(&json!({
            "title": "After",
            "description": "second draft",
            "category": "editing",
            "level": "advanced",
            "userId": owner_id
        }))
        .send()
        .await?;
    assert_eq!(updated.status(), StatusCode::OK);
    let body = updated.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["title"].as_str(), Some("After"));
    assert_eq!(body["data"]["level"].as_str(), Some("advanced"));

    let deleted = client
        .delete(format!("{}/conhecimentos/{}", server.base_url, id))
        .send()
        .await?;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let missing = client
        .put(format!("{}/conhecimentos/{}", server.base_url, id))
        .json(&json!({
            "title": "Ghost",
            "description": "gone",
            "category": "editing",
            "level": "basic",
            "userId": owner_id
        }))
        .send()
        .await?;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    Ok(())
}
