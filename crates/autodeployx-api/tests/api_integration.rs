//! API integration tests.
//!
//! Tests the complete request flow: HTTP → routes → tracker, with stub
//! collaborators standing in for the build server and the registry.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use autodeployx_api::clients::{
    BuildServer, ClientError, ImageRegistry, ImageTag, JenkinsJob, TagListing,
};
use autodeployx_api::config::Config;
use autodeployx_api::server::Server;

// ============================================================================
// Stub Collaborators
// ============================================================================

/// Build server that answers every call successfully.
struct HealthyBuildServer;

#[async_trait]
impl BuildServer for HealthyBuildServer {
    async fn list_jobs(&self) -> Result<Vec<JenkinsJob>, ClientError> {
        Ok(vec![
            JenkinsJob {
                name: "autodeployx-backend".to_string(),
                color: Some("blue".to_string()),
            },
            JenkinsJob {
                name: "autodeployx-frontend".to_string(),
                color: Some("red".to_string()),
            },
        ])
    }

    async fn trigger_job(&self, _job_name: &str) -> Result<(), ClientError> {
        Ok(())
    }

    async fn job_detail(&self, job_name: &str) -> Result<Value, ClientError> {
        Ok(json!({ "name": job_name, "buildable": true }))
    }
}

/// Build server that fails every call, as an unreachable controller would.
struct UnreachableBuildServer;

#[async_trait]
impl BuildServer for UnreachableBuildServer {
    async fn list_jobs(&self) -> Result<Vec<JenkinsJob>, ClientError> {
        Err(ClientError::Transport("connection refused".to_string()))
    }

    async fn trigger_job(&self, _job_name: &str) -> Result<(), ClientError> {
        Err(ClientError::Transport("connection refused".to_string()))
    }

    async fn job_detail(&self, _job_name: &str) -> Result<Value, ClientError> {
        Err(ClientError::Transport("connection refused".to_string()))
    }
}

/// Registry with a fixed tag listing.
struct HealthyRegistry;

#[async_trait]
impl ImageRegistry for HealthyRegistry {
    async fn list_tags(&self) -> Result<TagListing, ClientError> {
        Ok(TagListing {
            count: 12,
            tags: vec![
                ImageTag {
                    name: "latest".to_string(),
                    last_updated: Some("2025-11-01T08:00:00Z".to_string()),
                    full_size: Some(104_857_600),
                },
                ImageTag {
                    name: "v1.4.2".to_string(),
                    last_updated: None,
                    full_size: None,
                },
            ],
        })
    }
}

/// Registry that fails every call.
struct UnreachableRegistry;

#[async_trait]
impl ImageRegistry for UnreachableRegistry {
    async fn list_tags(&self) -> Result<TagListing, ClientError> {
        Err(ClientError::Status(503))
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn test_router() -> Router {
    Server::with_collaborators(
        Config::default(),
        Arc::new(HealthyBuildServer),
        Arc::new(HealthyRegistry),
    )
    .test_router()
}

fn test_router_unreachable() -> Router {
    Server::with_collaborators(
        Config::default(),
        Arc::new(UnreachableBuildServer),
        Arc::new(UnreachableRegistry),
    )
    .test_router()
}

async fn request_json(
    router: &Router,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    let request = match body {
        Some(value) => builder.body(Body::from(serde_json::to_vec(&value)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        // Some extraction-layer rejections (e.g. a closed serde enum refusing an
        // unknown value) reply 422 with a plain-text body rather than JSON; fall
        // back to Null there, mirroring the empty-body case above.
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    Ok((status, value))
}

async fn get_json(router: &Router, path: &str) -> Result<(StatusCode, Value)> {
    request_json(router, Method::GET, path, None).await
}

async fn post_json(router: &Router, path: &str, body: Value) -> Result<(StatusCode, Value)> {
    request_json(router, Method::POST, path, Some(body)).await
}

async fn send_status(router: &Router, body: Value) -> Result<Value> {
    let (status, value) = post_json(router, "/jenkins/status", body).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(value)
}

// ============================================================================
// Health and Plumbing
// ============================================================================

#[tokio::test]
async fn health_reports_the_service_name() -> Result<()> {
    let router = test_router();
    let (status, body) = get_json(&router, "/health").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "AutoDeployX Tracking API");
    assert!(body["timestamp"].is_string());
    Ok(())
}

#[tokio::test]
async fn ready_is_always_ready() -> Result<()> {
    let router = test_router();
    let (status, body) = get_json(&router, "/ready").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);
    Ok(())
}

#[tokio::test]
async fn openapi_document_is_served() -> Result<()> {
    let router = test_router();
    let (status, body) = get_json(&router, "/openapi.json").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/jenkins/status"].is_object());
    Ok(())
}

// ============================================================================
// Status Ingestion
// ============================================================================

#[tokio::test]
async fn status_event_echoes_the_build_record() -> Result<()> {
    let router = test_router();
    let body = send_status(
        &router,
        json!({
            "status": "running",
            "pipeline_name": "autodeployx-backend",
            "build_number": 42,
            "stage": "Build",
            "branch": "main"
        }),
    )
    .await?;

    assert_eq!(body["status"], "received");
    assert_eq!(body["build"]["build_number"], 42);
    assert_eq!(body["build"]["status"], "running");
    assert_eq!(body["build"]["stage"], "Build");
    Ok(())
}

#[tokio::test]
async fn unknown_status_values_are_rejected_before_the_core() -> Result<()> {
    let router = test_router();
    let (status, _) = post_json(&router, "/jenkins/status", json!({"status": "aborted"})).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Nothing was counted.
    let (_, body) = get_json(&router, "/metrics/deployments").await?;
    assert_eq!(body["total"], 0);
    Ok(())
}

#[tokio::test]
async fn running_twice_then_failure_matches_the_counter_contract() -> Result<()> {
    let router = test_router();

    send_status(&router, json!({"status": "running", "build_number": 1})).await?;

    let (_, current) = get_json(&router, "/pipeline/current").await?;
    assert_eq!(current["status"], "running");
    let first_start = current["start_time"].clone();
    assert!(first_start.is_string());

    // A second running event stacks active but leaves start_time alone.
    send_status(&router, json!({"status": "running", "build_number": 1})).await?;
    let (_, current) = get_json(&router, "/pipeline/current").await?;
    assert_eq!(current["start_time"], first_start);

    send_status(&router, json!({"status": "failure", "build_number": 1})).await?;

    let (_, deployments) = get_json(&router, "/metrics/deployments").await?;
    assert_eq!(deployments["total"], 3);
    assert_eq!(deployments["failed"], 1);
    assert_eq!(deployments["success"], 0);

    let (_, rate) = get_json(&router, "/metrics/success-rate").await?;
    assert_eq!(rate["rate"], 0.0);
    assert_eq!(rate["failed"], 1);
    assert_eq!(rate["total"], 1);
    Ok(())
}

#[tokio::test]
async fn success_rate_defaults_to_one_hundred() -> Result<()> {
    let router = test_router();
    let (_, rate) = get_json(&router, "/metrics/success-rate").await?;
    assert_eq!(rate["rate"], 100.0);
    assert_eq!(rate["total"], 0);
    Ok(())
}

// ============================================================================
// Stages and Triggering
// ============================================================================

#[tokio::test]
async fn stage_updates_mutate_known_stages_and_append_new_ones() -> Result<()> {
    let router = test_router();

    let (status, body) = post_json(
        &router,
        "/pipeline/stage",
        json!({"stage_name": "Test", "status": "running"}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"]["name"], "Test");

    let (_, current) = get_json(&router, "/pipeline/current").await?;
    assert_eq!(current["stages"].as_array().unwrap().len(), 5);
    assert_eq!(current["current_stage"], "Test");
    let test_stage = current["stages"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["name"] == "Test")
        .unwrap();
    assert_eq!(test_stage["status"], "running");

    // Unknown stage names append.
    post_json(
        &router,
        "/pipeline/stage",
        json!({"stage_name": "Smoke", "status": "success", "timestamp": "01:02:03"}),
    )
    .await?;
    let (_, current) = get_json(&router, "/pipeline/current").await?;
    let stages = current["stages"].as_array().unwrap();
    assert_eq!(stages.len(), 6);
    assert_eq!(stages[5]["name"], "Smoke");
    assert_eq!(stages[5]["time"], "01:02:03");
    Ok(())
}

#[tokio::test]
async fn trigger_resets_the_run_even_when_the_build_server_is_down() -> Result<()> {
    let router = test_router_unreachable();

    // Dirty the stage list first.
    post_json(
        &router,
        "/pipeline/stage",
        json!({"stage_name": "Extra", "status": "running"}),
    )
    .await?;

    let (status, body) = post_json(&router, "/pipeline/trigger", json!({})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "queued");
    assert_eq!(body["pipeline_name"], "autodeployx-backend");
    assert_eq!(body["branch"], "main");
    assert_eq!(body["build_number"], 1);

    let (_, current) = get_json(&router, "/pipeline/current").await?;
    assert_eq!(current["status"], "running");
    let stages = current["stages"].as_array().unwrap();
    let names: Vec<&str> = stages.iter().map(|s| s["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["Checkout", "Test", "Build", "Push", "Deploy"]);
    assert!(stages.iter().all(|s| s["status"] == "pending"));

    // The active slot was still claimed.
    let (_, pipelines) = get_json(&router, "/metrics/pipelines").await?;
    assert_eq!(pipelines["active"], 1);
    Ok(())
}

#[tokio::test]
async fn trigger_reports_triggered_when_the_build_server_accepts() -> Result<()> {
    let router = test_router();
    let (_, body) = post_json(
        &router,
        "/pipeline/trigger",
        json!({"pipeline_name": "autodeployx-backend", "branch": "develop"}),
    )
    .await?;
    assert_eq!(body["status"], "triggered");
    assert_eq!(body["branch"], "develop");
    Ok(())
}

// ============================================================================
// Logs and Build History
// ============================================================================

#[tokio::test]
async fn recent_logs_cap_the_page_but_report_the_full_count() -> Result<()> {
    let router = test_router();
    for n in 0..25 {
        send_status(&router, json!({"status": "running", "build_number": n})).await?;
    }

    let (_, body) = get_json(&router, "/logs/recent").await?;
    assert_eq!(body["logs"].as_array().unwrap().len(), 20);
    assert_eq!(body["total"], 25);

    let (_, body) = get_json(&router, "/logs/recent?limit=5").await?;
    assert_eq!(body["logs"].as_array().unwrap().len(), 5);
    Ok(())
}

#[tokio::test]
async fn recent_builds_are_most_recent_first() -> Result<()> {
    let router = test_router();
    for n in 1..=12 {
        send_status(&router, json!({"status": "running", "build_number": n})).await?;
    }

    let (_, body) = get_json(&router, "/pipelines/recent").await?;
    let builds = body["builds"].as_array().unwrap();
    assert_eq!(builds.len(), 10);
    assert_eq!(builds[0]["build_number"], 12);
    assert_eq!(builds[9]["build_number"], 3);
    assert_eq!(body["total"], 12);
    Ok(())
}

#[tokio::test]
async fn build_history_reports_the_latest_deployed_version() -> Result<()> {
    let router = test_router();
    send_status(&router, json!({"status": "success", "build_number": 7})).await?;
    send_status(&router, json!({"status": "failure", "build_number": 8})).await?;

    let (_, body) = get_json(&router, "/pipelines/history").await?;
    assert_eq!(body["stats"]["lastDeployedVersion"], "v7");
    let deployed_at = body["stats"]["lastDeployedAt"].as_str().unwrap();
    assert_eq!(deployed_at.len(), 19);
    Ok(())
}

#[tokio::test]
async fn history_stats_report_sentinels_without_a_success() -> Result<()> {
    let router = test_router();
    send_status(&router, json!({"status": "failure"})).await?;

    let (_, stats) = get_json(&router, "/metrics/history-stats").await?;
    assert_eq!(stats["lastDeployedVersion"], "N/A");
    assert_eq!(stats["lastDeployedAt"], "N/A");
    Ok(())
}

// ============================================================================
// Lifecycle Events, Rollouts, and Pods
// ============================================================================

#[tokio::test]
async fn successful_deploy_events_advance_the_cluster_snapshot() -> Result<()> {
    let router = test_router();
    let (status, body) = post_json(
        &router,
        "/deployments/event",
        json!({
            "event_type": "deploy",
            "status": "success",
            "details": {"version": "v1.4.2"}
        }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "recorded");
    assert_eq!(body["log"]["level"], "success");

    let (_, k8s) = get_json(&router, "/kubernetes/status").await?;
    assert_eq!(k8s["cluster"], "autodeployx-cluster");
    assert_eq!(k8s["namespace"], "default");
    assert_eq!(k8s["current_version"], "v1.4.2");
    let history = k8s["rollout_history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["revision"], 1);
    assert_eq!(history[0]["status"], "success");
    Ok(())
}

#[tokio::test]
async fn non_deploy_events_only_feed_the_log() -> Result<()> {
    let router = test_router();
    let (_, body) = post_json(
        &router,
        "/deployments/event",
        json!({"event_type": "test_end", "status": "failed"}),
    )
    .await?;
    assert_eq!(body["log"]["level"], "error");
    assert_eq!(body["log"]["text"], "test_end: failed");

    let (_, k8s) = get_json(&router, "/kubernetes/status").await?;
    assert!(k8s["rollout_history"].as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn rollback_is_accepted_for_unknown_deployments() -> Result<()> {
    let router = test_router();
    let (status, body) = post_json(
        &router,
        "/deployments/rollback",
        json!({"deployment_id": "deploy-unknown"}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "rolling");
    assert_eq!(body["rollout"]["status"], "rolling");
    assert_eq!(body["rollout"]["image"], "deploy-unknown");

    let (_, logs) = get_json(&router, "/logs/recent").await?;
    assert_eq!(logs["logs"][0]["level"], "warning");
    Ok(())
}

#[tokio::test]
async fn pod_lists_are_replaced_wholesale() -> Result<()> {
    let router = test_router();
    let (status, body) = request_json(
        &router,
        Method::PUT,
        "/kubernetes/pods",
        Some(json!([
            {"name": "backend-abc", "status": "Running"},
            {"name": "backend-def", "status": "Pending"}
        ])),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    let (_, _body) = request_json(
        &router,
        Method::PUT,
        "/kubernetes/pods",
        Some(json!([{"name": "backend-xyz", "status": "Running"}])),
    )
    .await?;

    let (_, k8s) = get_json(&router, "/kubernetes/status").await?;
    let pods = k8s["pods"].as_array().unwrap();
    assert_eq!(pods.len(), 1);
    assert_eq!(pods[0]["name"], "backend-xyz");
    Ok(())
}

// ============================================================================
// Collaborator-backed Summaries
// ============================================================================

#[tokio::test]
async fn pipelines_summary_lists_build_server_jobs() -> Result<()> {
    let router = test_router();
    let (_, body) = get_json(&router, "/metrics/pipelines").await?;
    assert_eq!(body["total"], 2);
    assert_eq!(body["jobs"][0]["name"], "autodeployx-backend");
    assert_eq!(body["jobs"][0]["color"], "blue");
    Ok(())
}

#[tokio::test]
async fn pipelines_summary_falls_back_to_tracked_counters() -> Result<()> {
    let router = test_router_unreachable();
    send_status(&router, json!({"status": "running"})).await?;
    send_status(&router, json!({"status": "running"})).await?;

    let (status, body) = get_json(&router, "/metrics/pipelines").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["active"], 2);
    assert!(body["jobs"].as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn image_summary_lists_registry_tags() -> Result<()> {
    let router = test_router();
    let (_, body) = get_json(&router, "/metrics/docker-images").await?;
    assert_eq!(body["count"], 12);
    assert_eq!(body["source"], "DockerHub");
    assert_eq!(body["repository"], "sarika/autodeployx");
    assert_eq!(body["tags"][0], "latest");
    Ok(())
}

#[tokio::test]
async fn image_summary_fallback_preserves_the_repository() -> Result<()> {
    let router = test_router_unreachable();
    let (status, body) = get_json(&router, "/metrics/docker-images").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(body["repository"], "sarika/autodeployx");
    assert!(body["tags"].as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn all_metrics_compose_the_four_summaries() -> Result<()> {
    let router = test_router();
    send_status(&router, json!({"status": "success"})).await?;

    let (_, body) = get_json(&router, "/metrics/all").await?;
    assert_eq!(body["deployments"]["total"], 1);
    assert_eq!(body["pipelines"]["total"], 2);
    assert_eq!(body["docker_images"]["count"], 12);
    assert_eq!(body["success_rate"]["rate"], 100.0);
    assert!(body["timestamp"].is_string());
    Ok(())
}

#[tokio::test]
async fn all_metrics_survive_unreachable_collaborators() -> Result<()> {
    let router = test_router_unreachable();
    let (status, body) = get_json(&router, "/metrics/all").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["docker_images"]["count"], 0);
    assert!(body["pipelines"]["jobs"].as_array().unwrap().is_empty());
    Ok(())
}

// ============================================================================
// Jenkins Passthrough
// ============================================================================

#[tokio::test]
async fn job_detail_passes_the_document_through() -> Result<()> {
    let router = test_router();
    let (status, body) = get_json(&router, "/jenkins/job/autodeployx-backend").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "autodeployx-backend");
    Ok(())
}

#[tokio::test]
async fn job_detail_is_not_found_when_the_build_server_is_unreachable() -> Result<()> {
    let router = test_router_unreachable();
    let (status, body) = get_json(&router, "/jenkins/job/autodeployx-backend").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "JOB_NOT_FOUND");
    Ok(())
}
