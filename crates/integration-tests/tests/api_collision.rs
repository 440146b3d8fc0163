mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{TestApp, MAX_PAGE_SIZE};
use domains::ports::Store;
use serde_json::json;

#[tokio::test]
async fn category_filter_narrows_discussions() -> Result<()> {
    let app = TestApp::spawn().await?;
    let reply = app
        .get("/api/collision/discussions?category=methodology", None)
        .await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.data()["total"], 1);
    assert_eq!(reply.ids(), ["1"]);

    let all = app.get("/api/collision/discussions?category=all", None).await?;
    assert_eq!(all.data()["total"], 6);
    Ok(())
}

#[tokio::test]
async fn unknown_category_is_a_bad_request() -> Result<()> {
    let app = TestApp::spawn().await?;
    let reply = app
        .get("/api/collision/discussions?category=gossip", None)
        .await?;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["code"], 400);
    Ok(())
}

#[tokio::test]
async fn popular_meetups_rank_by_interest() -> Result<()> {
    let app = TestApp::spawn().await?;
    let reply = app.get("/api/collision/meetups?sortBy=popular", None).await?;
    let counts: Vec<u64> = reply.data()["list"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|m| m["interestedCount"].as_u64())
        .collect();
    assert_eq!(counts, [42, 28, 15, 12, 8]);
    Ok(())
}

#[tokio::test]
async fn consultations_page_newest_first() -> Result<()> {
    let app = TestApp::spawn().await?;
    let reply = app
        .get("/api/collision/consultations?page=2&pageSize=2", None)
        .await?;
    assert_eq!(reply.ids(), ["c5", "c3"]);
    assert_eq!(reply.data()["total"], 5);
    assert_eq!(reply.data()["page"], 2);
    assert_eq!(reply.data()["pageSize"], 2);
    Ok(())
}

#[tokio::test]
async fn oversized_pages_are_clamped() -> Result<()> {
    let app = TestApp::spawn().await?;
    let reply = app
        .get("/api/collision/consultations?pageSize=5000", None)
        .await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.data()["pageSize"], MAX_PAGE_SIZE);
    assert_eq!(reply.ids().len(), 5);
    Ok(())
}

#[tokio::test]
async fn likes_toggle_per_user() -> Result<()> {
    let app = TestApp::spawn().await?;
    let ada = app.member_token("ada").await?;
    let bob = app.member_token("bob").await?;
    let like = "/api/collision/discussions/1/like";

    let first = app.post(like, Some(&ada), json!({})).await?;
    assert_eq!(first.data(), &json!({ "liked": true, "likeCount": 90 }));
    let other = app.post(like, Some(&bob), json!({})).await?;
    assert_eq!(other.data()["likeCount"], 91);
    let undo = app.post(like, Some(&ada), json!({})).await?;
    assert_eq!(undo.data(), &json!({ "liked": false, "likeCount": 90 }));

    let detail = app.get("/api/collision/discussions/1", Some(&bob)).await?;
    assert_eq!(detail.data()["isLiked"], true);
    let anonymous = app.get("/api/collision/discussions/1", None).await?;
    assert!(anonymous.data().get("isLiked").is_none());
    Ok(())
}

#[tokio::test]
async fn writes_need_a_signed_in_user() -> Result<()> {
    let app = TestApp::spawn().await?;
    let reply = app
        .post("/api/collision/discussions/1/like", None, json!({}))
        .await?;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    let reply = app
        .post(
            "/api/collision/discussions/1/comments",
            None,
            json!({ "content": "hello" }),
        )
        .await?;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn comments_list_top_level_with_replies() -> Result<()> {
    let app = TestApp::spawn().await?;
    let member = app.member_token("ada").await?;
    let created = app
        .post(
            "/api/collision/discussions/1/comments",
            Some(&member),
            json!({ "parentId": "2", "content": "Agreed." }),
        )
        .await?;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.data()["parentId"], "2");
    assert_eq!(created.data()["user"]["name"], "ada");

    let top = app.get("/api/collision/discussions/1/comments", None).await?;
    assert_eq!(top.data()["total"], 3);
    let parent = top.data()["list"]
        .as_array()
        .into_iter()
        .flatten()
        .find(|c| c["id"] == "2")
        .cloned()
        .unwrap_or_default();
    assert_eq!(parent["replyCount"], 2);

    let detail = app.get("/api/collision/discussions/1", None).await?;
    assert_eq!(detail.data()["commentCount"], 24);
    Ok(())
}

#[tokio::test]
async fn strangers_cannot_delete_but_admins_can_and_comments_go_too() -> Result<()> {
    let app = TestApp::spawn().await?;
    let stranger = app.member_token("mallory").await?;
    let reply = app
        .send("DELETE", "/api/collision/discussions/1", Some(&stranger), None)
        .await?;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let admin = app.admin_token().await?;
    let reply = app
        .send("DELETE", "/api/collision/discussions/1", Some(&admin), None)
        .await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(app.backend.comments.list().await?.is_empty());

    let gone = app.get("/api/collision/discussions/1", None).await?;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn meetup_interest_is_per_user() -> Result<()> {
    let app = TestApp::spawn().await?;
    let member = app.member_token("ada").await?;
    let on = app
        .post("/api/collision/meetups/m1/interest", Some(&member), json!({}))
        .await?;
    assert_eq!(on.data()["interested"], true);
    let off = app
        .post("/api/collision/meetups/m1/interest", Some(&member), json!({}))
        .await?;
    assert_eq!(off.data()["interested"], false);
    assert_eq!(
        on.data()["interestedCount"].as_u64().unwrap_or_default(),
        off.data()["interestedCount"].as_u64().unwrap_or_default() + 1
    );
    Ok(())
}

#[tokio::test]
async fn hot_tags_and_stats_are_public() -> Result<()> {
    let app = TestApp::spawn().await?;
    let tags = app.get("/api/collision/hot-tags", None).await?;
    assert_eq!(tags.data()[0], "心理学");

    let stats = app.get("/api/collision/consultation-stats", None).await?;
    assert_eq!(stats.status, StatusCode::OK);
    assert_eq!(stats.data()["totalConsultations"], 5);
    Ok(())
}

#[tokio::test]
async fn numeric_draft_status_stays_out_of_the_public_list() -> Result<()> {
    let app = TestApp::spawn().await?;
    let member = app.member_token("ada").await?;
    let draft = app
        .post(
            "/api/collision/discussions",
            Some(&member),
            json!({
                "title": "Half-formed idea",
                "content": "Still thinking this one through.",
                "category": "share",
                "status": 0
            }),
        )
        .await?;
    assert_eq!(draft.status, StatusCode::OK);
    assert_eq!(draft.data()["status"], 0);

    let public = app.get("/api/collision/discussions", None).await?;
    assert_eq!(public.data()["total"], 6);
    assert_eq!(public.data()["list"][0]["status"], 1);

    let author = draft.data()["user"]["id"].as_str().unwrap_or_default();
    let own = app
        .get(&format!("/api/collision/discussions?userId={author}"), Some(&member))
        .await?;
    assert_eq!(own.data()["total"], 1);

    let named = app
        .post(
            "/api/collision/discussions",
            Some(&member),
            json!({ "title": "t", "content": "c", "category": "share", "status": "draft" }),
        )
        .await?;
    assert_eq!(named.status, StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}
