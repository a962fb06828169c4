//! End-to-end pipeline over a scripted socket.
//!
//! Frames pushed by the scripted server go through the connection channel,
//! the translator and the bridge, and come out on the context's event bus
//! and, when a cross-context bus exists, in the other context.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;

use server_events::adapters::{ChannelLink, CrossContextEventBus, ScriptedConnector};
use server_events::application::ServerEventsContext;
use server_events::domain::connection::{ConnectionConfig, ConnectionState};
use server_events::domain::events::{
    event_names, ApplicationEventType, ChangeType, DomainEvent, NodePath, PrincipalKind,
    RepositoryEventKind, TaskEventType,
};
use server_events::ports::{handler_fn, EventSubscriber};

fn config() -> ConnectionConfig {
    ConnectionConfig::for_server_events("http://localhost:8080/admin", "event").unwrap()
}

fn setup() -> (ServerEventsContext, ScriptedConnector) {
    let connector = ScriptedConnector::new();
    let context = ServerEventsContext::new(Arc::new(connector.clone()));
    (context, connector)
}

async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

async fn advance(millis: u64) {
    tokio::time::sleep(Duration::from_millis(millis)).await;
    settle().await;
}

/// Collects every event fired under `names` on the context bus.
fn record(context: &ServerEventsContext, names: &[&'static str]) -> Arc<Mutex<Vec<Arc<DomainEvent>>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let bus = context.event_bus();
    for name in names {
        let sink = Arc::clone(&seen);
        bus.on(
            name,
            handler_fn("record", move |event: &Arc<DomainEvent>| {
                sink.lock().unwrap().push(Arc::clone(event));
                Ok(())
            }),
        );
    }
    seen
}

#[tokio::test(start_paused = true)]
async fn socket_url_and_protocols_reach_the_connector() {
    let (context, connector) = setup();
    let channel = context.server_event_channel(config()).unwrap();

    channel.connect();
    connector.wait_for_peer(1).await;

    let requests = connector.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, "ws://localhost:8080/admin/event");
    assert_eq!(requests[0].1, vec!["text".to_string()]);

    context.shutdown();
}

#[tokio::test(start_paused = true)]
async fn rename_becomes_one_content_event_with_new_path() {
    let (context, connector) = setup();
    let seen = record(&context, &event_names::ALL);
    let channel = context.server_event_channel(config()).unwrap();

    channel.connect();
    let peer = connector.wait_for_peer(1).await;
    peer.push(
        json!({
            "type": "node.renamed",
            "data": {"nodes": [{
                "id": "abc", "path": "/content/a", "newPath": "/content/b",
                "branch": "draft", "repo": "com.enonic.cms.default"
            }]}
        })
        .to_string(),
    );
    settle().await;

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    match seen[0].as_ref() {
        DomainEvent::Content(change) => {
            assert_eq!(change.change_type, ChangeType::Rename);
            assert_eq!(change.change_items.len(), 1);
            assert_eq!(change.change_items[0].path, NodePath::new("/a"));
            assert_eq!(change.change_items[0].content_id, "abc");
            assert_eq!(change.new_paths, Some(vec![NodePath::new("/b")]));
        }
        other => panic!("expected a content event, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn each_domain_gets_its_own_event() {
    let (context, connector) = setup();
    let seen = record(&context, &event_names::ALL);
    let channel = context.server_event_channel(config()).unwrap();

    channel.connect();
    let peer = connector.wait_for_peer(1).await;
    peer.push(
        json!({"type": "node.created", "data": {"nodes": [
            {"id": "u1", "path": "/identity/system/users/su", "branch": "master", "repo": "system-repo"}
        ]}})
        .to_string(),
    );
    peer.push(json!({"type": "repository.restored", "data": {"id": "com.enonic.cms.blog"}}).to_string());
    peer.push(
        json!({"type": "application", "data": {
            "eventType": "STOPPED", "applicationKey": "com.acme.app"
        }})
        .to_string(),
    );
    peer.push(
        json!({"type": "task.finished", "data": {
            "id": "t1", "name": "publish", "state": "FINISHED",
            "progress": {"info": "done", "current": 4, "total": 4}
        }})
        .to_string(),
    );
    settle().await;

    let seen = seen.lock().unwrap();
    let names: Vec<&str> = seen.iter().map(|event| event.name()).collect();
    assert_eq!(
        names,
        vec![
            event_names::PRINCIPAL_SERVER_EVENT,
            event_names::REPOSITORY_EVENT,
            event_names::APPLICATION_EVENT,
            event_names::TASK_EVENT,
        ]
    );

    match seen[0].as_ref() {
        DomainEvent::Principal(change) => {
            let key = change.change_items[0].principal_key.as_ref().unwrap();
            assert_eq!(key.kind, PrincipalKind::User);
            assert_eq!(key.to_string(), "user:system:su");
        }
        other => panic!("expected a principal event, got {other:?}"),
    }
    match seen[1].as_ref() {
        DomainEvent::Repository(event) => {
            assert_eq!(event.kind, RepositoryEventKind::Restored);
            assert_eq!(event.change.change_items[0].repository_id, "com.enonic.cms.blog");
        }
        other => panic!("expected a repository event, got {other:?}"),
    }
    match seen[2].as_ref() {
        DomainEvent::Application(event) => {
            assert_eq!(event.event_type, ApplicationEventType::Stopped);
            assert!(!event.event_type.is_running());
        }
        other => panic!("expected an application event, got {other:?}"),
    }
    match seen[3].as_ref() {
        DomainEvent::Task(event) => {
            assert_eq!(event.event_type, TaskEventType::Finished);
            assert_eq!(event.task.progress.percent(), Some(100));
        }
        other => panic!("expected a task event, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn unmatched_and_malformed_frames_stay_off_the_bus() {
    let (context, connector) = setup();
    let seen = record(&context, &event_names::ALL);
    let channel = context.server_event_channel(config()).unwrap();

    let unknown = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&unknown);
    channel.on_unknown_server_event(move |event| {
        sink.lock().unwrap().push(event.event_type().map(str::to_string));
    });
    let malformed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&malformed);
    channel.on_malformed_frame(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    channel.connect();
    let peer = connector.wait_for_peer(1).await;
    peer.push(json!({"type": "node.created", "data": {"nodes": [{"id": "x", "path": "/elsewhere/x"}]}}).to_string());
    peer.push(json!({"type": "cluster.changed", "data": {}}).to_string());
    peer.push("not json at all");
    settle().await;

    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(
        *unknown.lock().unwrap(),
        vec![Some("node.created".to_string()), Some("cluster.changed".to_string())]
    );
    assert_eq!(malformed.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn handler_can_unsubscribe_itself_during_dispatch() {
    let (context, connector) = setup();
    let bus = context.event_bus();
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&calls);
    let handle = Arc::new(Mutex::new(None));
    let own_handle = Arc::clone(&handle);
    let unsubscribe_from = Arc::clone(&bus);
    let subscription = bus.on(
        event_names::APPLICATION_EVENT,
        handler_fn("once", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(handle) = own_handle.lock().unwrap().take() {
                unsubscribe_from.unsubscribe(&handle);
            }
            Ok(())
        }),
    );
    *handle.lock().unwrap() = Some(subscription);

    let channel = context.server_event_channel(config()).unwrap();
    channel.connect();
    let peer = connector.wait_for_peer(1).await;
    let frame = json!({"type": "application", "data": {"eventType": "STARTED", "applicationKey": "a"}}).to_string();
    peer.push(frame.clone());
    peer.push(frame);
    settle().await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn outage_is_reported_once_and_recovery_resumes_delivery() {
    let (context, connector) = setup();
    let seen = record(&context, &[event_names::APPLICATION_EVENT]);
    let channel = context.server_event_channel(config()).unwrap();

    let lost = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&lost);
    channel.on_connection_lost(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let errors = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&errors);
    channel.on_connection_error(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    channel.connect();
    let first = connector.wait_for_peer(1).await;
    settle().await;
    assert_eq!(channel.state(), ConnectionState::Established);

    connector.set_accepting(false);
    first.close();
    settle().await;

    // Two failed attempts at 5s and 10s, the liveness check at 6s.
    advance(10_500).await;
    assert_eq!(channel.state(), ConnectionState::Lost);
    assert_eq!(lost.load(Ordering::SeqCst), 1);
    assert!(errors.load(Ordering::SeqCst) >= 2);

    connector.set_accepting(true);
    advance(5_000).await;
    let second = connector.wait_for_peer(2).await;
    settle().await;
    assert_eq!(channel.state(), ConnectionState::Restored);
    assert_eq!(lost.load(Ordering::SeqCst), 1);

    second.push(json!({"type": "application", "data": {"eventType": "INSTALLED", "applicationKey": "a"}}).to_string());
    settle().await;
    assert_eq!(seen.lock().unwrap().len(), 1);

    context.shutdown();
}

#[tokio::test(start_paused = true)]
async fn events_cross_into_the_other_context() {
    let (context, connector) = setup();
    let (top, frame) = ChannelLink::pair("top", "frame");

    context.cross_context_bus(Arc::new(top.link)).unwrap();

    let other = Arc::new(CrossContextEventBus::<DomainEvent>::new(Arc::new(frame.link)));
    let listener = other.listen(frame.inbox);

    let (sender, mut received) = mpsc::unbounded_channel();
    other.on(
        event_names::TASK_EVENT,
        handler_fn("forward", move |event: &Arc<DomainEvent>| {
            let _ = sender.send(Arc::clone(event));
            Ok(())
        }),
    );

    let local = record(&context, &[event_names::TASK_EVENT]);
    let channel = context.server_event_channel(config()).unwrap();
    channel.connect();
    let peer = connector.wait_for_peer(1).await;
    peer.push(json!({"type": "task.submitted", "data": {"id": "t9", "name": "export"}}).to_string());

    let event = received.recv().await.unwrap();
    match event.as_ref() {
        DomainEvent::Task(task) => {
            assert_eq!(task.event_type, TaskEventType::Submitted);
            assert_eq!(task.task.id, "t9");
        }
        other => panic!("expected a task event, got {other:?}"),
    }
    assert_eq!(local.lock().unwrap().len(), 1);

    context.shutdown();
    listener.abort();
}
