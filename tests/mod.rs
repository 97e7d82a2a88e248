mod support;

use std::sync::Arc;
use std::time::Duration;
use approval_client::config::constants::{CMD_APPROVE, CMD_RECONNECT, TIMER_RECONNECT};
use approval_client::enums::connection_event::ConnectionEvent;
use approval_client::enums::connection_status::ConnectionStatus;
use approval_client::enums::http_method::HttpMethod;
use approval_client::enums::notification_type::NotificationType;
use approval_client::enums::priority::Priority;
use approval_client::enums::push_message_type::PushMessageType;
use approval_client::enums::save_outcome::SaveOutcome;
use approval_client::structs::config::config::Config;
use approval_client::structs::content_change::ContentChange;
use approval_client::structs::file_change::FileChange;
use approval_client::structs::line_change::LineChange;
use approval_client::structs::push_message::PushMessage;
use approval_client::ui::console_surface::ConsoleSurface;
use approval_client::workers::client_context::ClientContext;
use chrono::Utc;
use serde_json::json;
use support::{offline_config, page_of, pending_request, settle, PushServer, ScriptedEngine, ScriptedPrompt};

const FILE: &str = "src/billing/invoice.ts";

fn context_with(
    config: Config,
    engine: Arc<ScriptedEngine>,
    push: Arc<PushServer>,
    prompt: Arc<ScriptedPrompt>,
) -> (Arc<ClientContext>, Arc<ConsoleSurface>) {
    let surface = Arc::new(ConsoleSurface::new(true).with_active_file(FILE));
    let context = ClientContext::new(config, engine, push, surface.clone(), prompt).unwrap();
    (context, surface)
}

fn six_edits() -> ContentChange {
    let old: Vec<String> = (1..=6).map(|n| format!("const rate{} = 0.{};", n, n)).collect();
    let new: Vec<String> = (1..=6).map(|n| format!("const rate{} = 0.{}5;", n, n)).collect();
    let old: Vec<&str> = old.iter().map(String::as_str).collect();
    let new: Vec<&str> = new.iter().map(String::as_str).collect();
    ContentChange::new(10, &old, &new)
}

fn created_request(id: &str, changes: &[LineChange]) -> serde_json::Value {
    json!({
        "id": id,
        "title": "Approve 6 change(s) in invoice.ts",
        "priority": "medium",
        "status": "pending",
        "createdAt": Utc::now(),
        "changes": [FileChange::modified(FILE, changes.to_vec())],
    })
}

#[tokio::test(start_paused = true)]
async fn risky_save_is_approved_and_lands_in_todays_history() {
    let engine = ScriptedEngine::new();
    engine.respond(HttpMethod::Post, "/analyze/mutations", json!({ "filePath": FILE, "riskLevel": "low" }));
    let (context, surface) = context_with(offline_config(), engine.clone(), PushServer::new(0), ScriptedPrompt::new(None));

    context.start().await;
    context.connect().await.unwrap();
    context.start_workflow(None).await.unwrap();

    assert_eq!(context.on_content_changed(FILE, &[six_edits()]), 6);
    let buffered = context.workflow.session(FILE).unwrap().changes;
    engine.respond(HttpMethod::Post, "/approvals", created_request("req-42", &buffered));

    let outcome = context.on_save(FILE).await.unwrap();
    assert_eq!(
        outcome,
        SaveOutcome::Submitted {
            request_id: "req-42".to_string(),
            priority: Priority::Medium,
        }
    );
    assert_eq!(engine.last_body(HttpMethod::Post, "/approvals").unwrap()["priority"], "medium");

    settle().await;
    assert!(context.queue.get("req-42").is_some());
    let pending = surface.annotations(FILE);
    assert_eq!(pending.len(), 6);
    assert!(pending.iter().all(|d| d.style_class == "approval-pending"));

    let mut decided = created_request("req-42", &buffered);
    decided["status"] = json!("approved");
    engine.respond(HttpMethod::Get, "/approvals/req-42", decided);
    engine.respond(
        HttpMethod::Get,
        "/approvals/history",
        page_of(json!([{
            "id": "h-1",
            "requestId": "req-42",
            "title": "Approve 6 change(s) in invoice.ts",
            "status": "approved",
            "priority": "medium",
            "filePaths": [FILE],
            "changeCount": 6,
            "createdAt": Utc::now(),
            "completedAt": Utc::now(),
        }])),
    );

    assert_eq!(context.workflow.poll_status().await, 1);
    settle().await;

    let session = context.workflow.session(FILE).unwrap();
    assert!(session.changes.is_empty());
    assert!(!session.pending_approval);
    assert!(context.queue.get("req-42").is_none());
    assert!(surface.annotations(FILE).iter().all(|d| d.style_class == "approval-approved"));

    let groups = context.history.groups();
    assert_eq!(groups[0].label, "Today");
    assert_eq!(groups[0].entries[0].request_id, "req-42");

    context.dispose();
}

#[tokio::test(start_paused = true)]
async fn lost_push_channel_backs_off_then_reports_exhaustion() {
    let engine = ScriptedEngine::new();
    let push = PushServer::new(1);
    let config = Config {
        auto_connect: true,
        ..Config::default()
    };
    let (context, _surface) = context_with(config, engine, push.clone(), ScriptedPrompt::new(None));
    let mut events = context.transport.subscribe_status();

    context.start().await;
    assert!(context.transport.is_connected());

    drop(push.take_end());
    tokio::time::sleep(Duration::from_secs(120)).await;

    let mut delays = Vec::new();
    let mut exhausted = false;
    while let Ok(event) = events.try_recv() {
        match event {
            ConnectionEvent::ReconnectScheduled { delay, .. } => delays.push(delay.as_secs()),
            ConnectionEvent::ReconnectExhausted { attempts } => exhausted = attempts == 5,
            ConnectionEvent::StatusChanged { .. } => {}
        }
    }
    assert_eq!(delays, vec![1, 2, 4, 8, 16]);
    assert!(exhausted);
    assert_eq!(push.attempts(), 6);
    assert_eq!(context.transport.status(), ConnectionStatus::Disconnected);
    assert!(!context.scheduler().is_scheduled(TIMER_RECONNECT));

    let shown: Vec<_> = context
        .notifications
        .history()
        .into_iter()
        .chain(context.notifications.queued())
        .collect();
    let notice = shown.iter().find(|n| n.id == "reconnect-exhausted").unwrap();
    assert_eq!(notice.notification_type, NotificationType::Error);
    assert_eq!(notice.find_action("Retry").unwrap().command, CMD_RECONNECT);
    assert!(shown.iter().any(|n| n.id == "connection-status"));

    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(push.attempts(), 6);

    context.dispose();
    assert_eq!(context.scheduler().active_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn pushed_updates_replace_and_resolve_queue_entries() {
    let engine = ScriptedEngine::new();
    let push = PushServer::new(1);
    let config = Config {
        auto_connect: true,
        approval_notifications: true,
        ..Config::default()
    };
    let (context, _surface) = context_with(config, engine.clone(), push.clone(), ScriptedPrompt::new(None));

    context.start().await;
    let server = push.take_end();
    let history_loads = engine.calls(HttpMethod::Get, "/approvals/history");

    server
        .to_client
        .send(PushMessage::new(PushMessageType::ApprovalRequest, pending_request("r-7", "Rename export", "high")))
        .unwrap();
    settle().await;
    assert_eq!(context.queue.len(), 1);
    assert_eq!(context.queue_tree()[0].id, "priority-high");
    let announced = context
        .notifications
        .history()
        .into_iter()
        .chain(context.notifications.queued())
        .any(|n| n.id == "approval-r-7");
    assert!(announced);

    server
        .to_client
        .send(PushMessage::new(
            PushMessageType::ApprovalUpdate,
            json!({ "request": pending_request("r-7", "Rename export (rebased)", "high") }),
        ))
        .unwrap();
    settle().await;
    assert_eq!(context.queue.len(), 1);
    assert_eq!(context.queue.get("r-7").unwrap().title, "Rename export (rebased)");

    server
        .to_client
        .send(PushMessage::new(
            PushMessageType::ApprovalCompleted,
            json!({ "requestId": "r-7", "status": "approved" }),
        ))
        .unwrap();
    settle().await;
    assert!(context.queue.is_empty());
    assert!(engine.calls(HttpMethod::Get, "/approvals/history") > history_loads);

    // A late update for a decided request must not bring it back.
    server
        .to_client
        .send(PushMessage::new(PushMessageType::ApprovalUpdate, pending_request("r-7", "Rename export", "high")))
        .unwrap();
    settle().await;
    assert!(context.queue.is_empty());

    context.dispose();
}

#[tokio::test(start_paused = true)]
async fn notification_action_runs_the_bound_command() {
    let engine = ScriptedEngine::new();
    engine.respond(HttpMethod::Get, "/approvals/pending", page_of(json!([pending_request("r-1", "Drop column", "high")])));
    engine.respond(
        HttpMethod::Post,
        "/approvals/r-1/approve",
        json!({ "requestId": "r-1", "status": "approved" }),
    );
    let prompt = ScriptedPrompt::new(Some("Approve"));
    let (context, _surface) = context_with(offline_config(), engine.clone(), PushServer::new(0), prompt.clone());

    context.connect().await.unwrap();
    let request = context.queue.get("r-1").unwrap();
    context
        .notifications
        .enqueue(approval_client::services::notification_coordinator::approval_request_notice(&request));

    engine.respond(HttpMethod::Get, "/approvals/pending", support::empty_page());
    let shown = context.notifications.drain_once().await.unwrap();
    settle().await;

    assert_eq!(shown.id, "approval-r-1");
    assert_eq!(shown.find_action("Approve").unwrap().command, CMD_APPROVE);
    assert_eq!(prompt.presented(), vec!["approval-r-1".to_string()]);
    assert_eq!(engine.calls(HttpMethod::Post, "/approvals/r-1/approve"), 1);
    assert!(context.queue.get("r-1").is_none());
}

#[tokio::test(start_paused = true)]
async fn low_risk_save_is_auto_approved_without_a_request() {
    let engine = ScriptedEngine::new();
    engine.respond(HttpMethod::Post, "/analyze/mutations", json!({ "filePath": FILE, "riskLevel": "low" }));
    let (context, surface) = context_with(offline_config(), engine.clone(), PushServer::new(0), ScriptedPrompt::new(None));

    context.start().await;
    context.connect().await.unwrap();
    context.start_workflow(Some(FILE)).await.unwrap();
    context.on_content_changed(FILE, &[ContentChange::new(3, &["let a = 1;"], &["let a = 2;"])]);

    let outcome = context.on_save(FILE).await.unwrap();
    settle().await;

    assert_eq!(outcome, SaveOutcome::AutoApproved { change_count: 1 });
    assert_eq!(engine.calls(HttpMethod::Post, "/approvals"), 0);
    assert!(context.workflow.session(FILE).unwrap().changes.is_empty());
    let decorations = surface.annotations(FILE);
    assert_eq!(decorations.len(), 1);
    assert_eq!(decorations[0].style_class, "approval-auto-approved");

    context.dispose();
}

#[tokio::test(start_paused = true)]
async fn failed_submission_offers_a_retry_and_keeps_the_buffer() {
    let engine = ScriptedEngine::new();
    engine.respond(HttpMethod::Post, "/analyze/mutations", json!({ "filePath": FILE, "riskLevel": "high" }));
    let (context, _surface) = context_with(offline_config(), engine, PushServer::new(0), ScriptedPrompt::new(None));

    context.start().await;
    context.connect().await.unwrap();
    context.start_workflow(Some(FILE)).await.unwrap();
    context.on_content_changed(FILE, &[ContentChange::new(1, &[], &["const limit = 10;"])]);

    assert!(context.on_save(FILE).await.is_err());
    settle().await;

    let session = context.workflow.session(FILE).unwrap();
    assert_eq!(session.changes.len(), 1);
    assert!(!session.pending_approval);

    let retry = context
        .notifications
        .history()
        .into_iter()
        .chain(context.notifications.queued())
        .find(|n| n.id == format!("submit-failed-{}", FILE))
        .unwrap();
    assert_eq!(retry.find_action("Retry").unwrap().args, vec![json!(FILE)]);

    context.dispose();
}

#[tokio::test(start_paused = true)]
async fn dispose_stops_every_timer_and_router() {
    let engine = ScriptedEngine::new();
    let push = PushServer::new(1);
    let config = Config {
        auto_connect: true,
        ..Config::default()
    };
    let (context, _surface) = context_with(config, engine.clone(), push.clone(), ScriptedPrompt::new(None));

    context.start().await;
    assert!(context.scheduler().active_count() > 0);

    context.dispose();
    let pending_loads = engine.calls(HttpMethod::Get, "/approvals/pending");
    tokio::time::sleep(Duration::from_secs(300)).await;

    assert_eq!(context.scheduler().active_count(), 0);
    assert_eq!(context.transport.status(), ConnectionStatus::Disconnected);
    assert_eq!(engine.calls(HttpMethod::Get, "/approvals/pending"), pending_loads);
    assert_eq!(push.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn dispose_during_a_reconnect_attempt_stays_down() {
    let engine = ScriptedEngine::new();
    let push = PushServer::new(2);
    let config = Config {
        auto_connect: true,
        ..Config::default()
    };
    let (context, _surface) = context_with(config, engine.clone(), push.clone(), ScriptedPrompt::new(None));

    context.start().await;
    engine.delay(HttpMethod::Get, "/health", Duration::from_millis(500));
    drop(push.take_end());

    // First reconnect fires after 1s and is still waiting on /health.
    tokio::time::sleep(Duration::from_millis(1_200)).await;
    assert_eq!(context.transport.status(), ConnectionStatus::Connecting);
    context.dispose();
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert_eq!(context.transport.status(), ConnectionStatus::Disconnected);
    assert_eq!(context.scheduler().active_count(), 0);
    assert_eq!(push.attempts(), 1);
}
