mod common;

use anyhow::{Context, Result};
use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn draft_topics_cannot_be_completed() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.admin_token().await?;

    let draft = app
        .post("/api/thinking/topic/t4/complete", Some(&admin), json!({}))
        .await?;
    assert_eq!(draft.status, StatusCode::CONFLICT);
    assert_eq!(draft.body["code"], 409);

    let done = app
        .post("/api/thinking/topic/t1/complete", Some(&admin), json!({}))
        .await?;
    assert_eq!(done.status, StatusCode::OK);
    assert_eq!(done.data()["status"], "completed");
    assert!(done.data()["completedAt"].is_string());
    Ok(())
}

#[tokio::test]
async fn topics_are_private_to_their_owner() -> Result<()> {
    let app = TestApp::spawn().await?;
    let member = app.member_token("ada").await?;

    let mine = app.get("/api/thinking/topic/list", Some(&member)).await?;
    assert_eq!(mine.data()["total"], 0);
    let peek = app.get("/api/thinking/topic/t1", Some(&member)).await?;
    assert_eq!(peek.status, StatusCode::FORBIDDEN);

    let created = app
        .post(
            "/api/thinking/topic",
            Some(&member),
            json!({ "title": "换工作还是留下？", "priority": 3 }),
        )
        .await?;
    assert_eq!(created.data()["status"], "in_progress");
    let mine = app.get("/api/thinking/topic/my", Some(&member)).await?;
    assert_eq!(mine.data()["total"], 1);
    Ok(())
}

#[tokio::test]
async fn actions_are_scoped_to_the_caller() -> Result<()> {
    let app = TestApp::spawn().await?;
    let member = app.member_token("ada").await?;
    let admin = app.admin_token().await?;

    let theirs = app.get("/api/action/list", Some(&member)).await?;
    assert_eq!(theirs.data()["total"], 0);
    let all = app.get("/api/action/list", Some(&admin)).await?;
    assert_eq!(all.data()["total"], 4);

    let stats = app.get("/api/action/statistics", Some(&admin)).await?;
    assert_eq!(stats.data()["total"], 4);
    Ok(())
}

#[tokio::test]
async fn full_completion_closes_the_action() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.admin_token().await?;

    let partial = app
        .put("/api/action/act2/completion", Some(&admin), json!({ "completionRate": 30 }))
        .await?;
    assert_eq!(partial.data()["status"], "in_progress");

    let done = app
        .put("/api/action/act2/completion", Some(&admin), json!({ "completionRate": 100 }))
        .await?;
    assert_eq!(done.data()["status"], "completed");
    assert_eq!(done.data()["completionRate"], 100);

    let reopen = app
        .put("/api/action/act2/status", Some(&admin), json!({ "status": "pending" }))
        .await?;
    assert_eq!(reopen.status, StatusCode::CONFLICT);
    let cancel = app
        .post("/api/action/act2/cancel", Some(&admin), json!({}))
        .await?;
    assert_eq!(cancel.status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn follow_ups_are_counted_on_the_action() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.admin_token().await?;

    let note = app
        .post(
            "/api/action/act1/follow-up",
            Some(&admin),
            json!({ "content": "Compared salaries", "progressAfter": 80 }),
        )
        .await?;
    assert_eq!(note.status, StatusCode::OK);
    assert_eq!(note.data()["progressDelta"], 20);

    let action = app.get("/api/action/act1", Some(&admin)).await?;
    assert_eq!(action.data()["followUpCount"], 1);
    assert_eq!(action.data()["completionRate"], 80);

    let log = app.get("/api/action/act1/follow-ups", Some(&admin)).await?;
    assert_eq!(log.data().as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn new_action_under_a_topic_bumps_its_count() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.admin_token().await?;
    let before = app.get("/api/thinking/topic/t1", Some(&admin)).await?;
    let count = before.data()["actionCount"].as_u64().unwrap_or_default();

    let created = app
        .post(
            "/api/action",
            Some(&admin),
            json!({ "title": "约前同事聊一次", "priority": "high", "topicId": "t1" }),
        )
        .await?;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.data()["topicTitle"], before.data()["title"]);
    assert_eq!(created.data()["status"], "pending");

    let after = app.get("/api/thinking/topic/t1", Some(&admin)).await?;
    assert_eq!(after.data()["actionCount"], count + 1);

    let by_topic = app.get("/api/action/by-topic/t1", Some(&admin)).await?;
    let ids: Vec<_> = by_topic
        .data()
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|a| a["id"].as_str())
        .collect();
    assert!(ids.contains(&created.data()["id"].as_str().unwrap_or_default()));
    Ok(())
}

#[tokio::test]
async fn batch_delete_needs_ownership_of_every_id() -> Result<()> {
    let app = TestApp::spawn().await?;
    let member = app.member_token("ada").await?;
    let denied = app
        .send(
            "DELETE",
            "/api/action",
            Some(&member),
            Some(json!({ "ids": ["act1", "act4"] })),
        )
        .await?;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let admin = app.admin_token().await?;
    let removed = app
        .send(
            "DELETE",
            "/api/action",
            Some(&admin),
            Some(json!({ "ids": ["act1", "act4"] })),
        )
        .await?;
    assert_eq!(removed.data(), &json!(2));
    let left = app.get("/api/action/list", Some(&admin)).await?;
    assert_eq!(left.data()["total"], 2);
    Ok(())
}

#[tokio::test]
async fn analyses_version_per_topic_and_model() -> Result<()> {
    let app = TestApp::spawn().await?;
    let owner = app.admin_token().await?;

    let saved = app
        .post(
            "/api/thinking/analysis",
            Some(&owner),
            json!({ "topicId": "t1", "modelId": "2", "content": "{\"options\":[\"接受\"]}" }),
        )
        .await?;
    assert_eq!(saved.status, StatusCode::OK);
    assert_eq!(saved.data()["version"], 3);
    assert_eq!(saved.data()["isCurrent"], true);
    let id = saved.data()["id"].as_str().context("analysis has an id")?.to_owned();

    let history = app
        .get("/api/thinking/analysis/history/t1/2", Some(&owner))
        .await?;
    let versions: Vec<_> = history.data()["versions"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|v| v["version"].as_u64())
        .collect();
    assert_eq!(versions, [3, 2, 1]);

    let reset = app
        .post("/api/thinking/analysis/set-current", Some(&owner), json!({ "id": "an1" }))
        .await?;
    assert_eq!(reset.data()["isCurrent"], true);
    let current = app
        .get("/api/thinking/analysis/current?topicId=t1&modelId=2", Some(&owner))
        .await?;
    assert_eq!(current.data()["id"], "an1");
    let latest = app
        .get("/api/thinking/analysis/latest?topicId=t1", Some(&owner))
        .await?;
    assert_eq!(latest.data()["id"], id.as_str());

    let bad = app
        .post(
            "/api/thinking/analysis",
            Some(&owner),
            json!({ "topicId": "t1", "modelId": "2", "content": "not json" }),
        )
        .await?;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);

    let drafted = app
        .post(
            "/api/action/from-analysis",
            Some(&owner),
            json!({
                "analysisId": id,
                "topicId": "t1",
                "actions": [{ "title": "列出薪资对比" }, { "title": "约前同事聊聊" }]
            }),
        )
        .await?;
    assert_eq!(drafted.status, StatusCode::OK);
    let linked = app
        .get(&format!("/api/action/by-analysis/{id}"), Some(&owner))
        .await?;
    assert_eq!(linked.data().as_array().map(Vec::len), Some(2));

    let member = app.member_token("ada").await?;
    let peek = app
        .get("/api/thinking/analysis/by-topic/t1", Some(&member))
        .await?;
    assert_eq!(peek.status, StatusCode::FORBIDDEN);

    let removed = app
        .send(
            "DELETE",
            "/api/thinking/analysis",
            Some(&owner),
            Some(json!({ "ids": [id] })),
        )
        .await?;
    assert_eq!(removed.data(), &json!(1));
    let topic = app.get("/api/thinking/topic/t1", Some(&owner)).await?;
    assert_eq!(topic.data()["analysisCount"], 2);
    Ok(())
}
