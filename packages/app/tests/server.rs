//! End-to-end tests for the callback server over real HTTP.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sidecar_app::{server, App, BindingEvent, HandlerError, Lifecycle, TopicEvent};
use sidecar_client::ErrorBody;
use sidecar_envelope::{Empty, Envelope, Message, TypeTag};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Add {
    item_id: String,
}

impl Message for Add {
    const TYPE_TAG: TypeTag = TypeTag::from_static("type.test/Add");
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Count {
    total: usize,
}

impl Message for Count {
    const TYPE_TAG: TypeTag = TypeTag::from_static("type.test/Count");
}

#[derive(Default)]
struct Tally {
    items: AtomicUsize,
    events: AtomicUsize,
}

struct Running {
    base: String,
    app: Arc<App<Tally>>,
    http: reqwest::Client,
    stop: Option<oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<std::io::Result<()>>,
}

impl Running {
    async fn shutdown(self) {
        let Running { http, stop, task, .. } = self;
        // Pooled keep-alive connections would otherwise hold the server open.
        drop(http);
        if let Some(stop) = stop {
            let _ = stop.send(());
        }
        task.await.unwrap().unwrap();
    }
}

async fn start() -> Running {
    let mut builder = App::builder(Tally::default());
    builder
        .method("Add", |ctx: sidecar_app::Context<Tally>, _req: Add| async move {
            let total = ctx.state().items.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Count { total })
        })
        .unwrap()
        .method("Explode", |_ctx, _req: Empty| async move {
            Err::<Empty, _>(HandlerError::new("boom"))
        })
        .unwrap();
    builder
        .on_topic("TopicA", |ctx: sidecar_app::Context<Tally>, _event| async move {
            ctx.state().events.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .bind("storage");
    let app = Arc::new(builder.build());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let task = tokio::spawn(server::serve(listener, Arc::clone(&app), async move {
        let _ = stopped.await;
    }));

    Running {
        base: format!("http://{addr}"),
        app,
        http: reqwest::Client::new(),
        stop: Some(stop),
        task,
    }
}

fn add(item: &str) -> Envelope {
    Envelope::pack(&Add {
        item_id: item.to_string(),
    })
    .unwrap()
}

#[tokio::test]
async fn invoke_dispatches_and_returns_envelope() {
    let running = start().await;

    let response = running
        .http
        .post(format!("{}/invoke/Add", running.base))
        .json(&add("abc-123"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let reply: Envelope = response.json().await.unwrap();
    assert_eq!(reply.unpack::<Count>().unwrap(), Count { total: 1 });

    running.shutdown().await;
}

#[tokio::test]
async fn invoke_error_responses() {
    let running = start().await;
    let url = |method: &str| format!("{}/invoke/{method}", running.base);

    let response = running.http.post(url("Missing")).json(&add("x")).send().await.unwrap();
    assert_eq!(response.status(), 404);
    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.error_code, "ERR_UNKNOWN_METHOD");

    let response = running
        .http
        .post(url("Add"))
        .json(&Envelope::pack(&Empty {}).unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.error_code, "ERR_SCHEMA_MISMATCH");

    let response = running
        .http
        .post(url("Add"))
        .body("definitely not an envelope")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.error_code, "ERR_DECODE");

    let response = running
        .http
        .post(url("Explode"))
        .json(&Envelope::pack(&Empty {}).unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);
    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.error_code, "ERR_HANDLER");
    assert!(body.message.contains("boom"));

    running.shutdown().await;
}

#[tokio::test]
async fn subscription_handshake() {
    let running = start().await;
    assert_eq!(running.app.lifecycle(), Lifecycle::Ready);

    let topics: Vec<String> = running
        .http
        .get(format!("{}/dapr/subscribe", running.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(topics, vec!["TopicA"]);
    assert_eq!(running.app.lifecycle(), Lifecycle::Subscribed);

    let bindings: Vec<String> = running
        .http
        .get(format!("{}/dapr/bindings", running.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(bindings, vec!["storage"]);

    running.shutdown().await;
}

#[tokio::test]
async fn event_delivery() {
    let running = start().await;
    let data = Envelope::pack(&Empty {}).unwrap();

    let response = running
        .http
        .post(format!("{}/topics/TopicA", running.base))
        .json(&TopicEvent::new("TopicA", data.clone()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(running.app.state().events.load(Ordering::SeqCst), 1);

    let response = running
        .http
        .post(format!("{}/topics/TopicZ", running.base))
        .json(&TopicEvent::new("TopicZ", data.clone()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.error_code, "ERR_UNKNOWN_TOPIC");

    let response = running
        .http
        .post(format!("{}/bindings/storage", running.base))
        .json(&BindingEvent::new("storage", data.clone()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = running
        .http
        .post(format!("{}/bindings/queue", running.base))
        .json(&BindingEvent::new("queue", data))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    running.shutdown().await;
}

#[tokio::test]
async fn undeclared_event_target_wins_over_malformed_body() {
    let running = start().await;

    for (route, code) in [
        ("topics/TopicZ", "ERR_UNKNOWN_TOPIC"),
        ("bindings/queue", "ERR_UNKNOWN_BINDING"),
    ] {
        let response = running
            .http
            .post(format!("{}/{}", running.base, route))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 404, "{route}");
        let body: ErrorBody = response.json().await.unwrap();
        assert_eq!(body.error_code, code);
    }

    // A declared topic still rejects the same body as undecodable.
    let response = running
        .http
        .post(format!("{}/topics/TopicA", running.base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.error_code, "ERR_DECODE");
    assert_eq!(running.app.state().events.load(Ordering::SeqCst), 0);

    running.shutdown().await;
}

#[tokio::test]
async fn health_and_graceful_shutdown() {
    let running = start().await;

    let response = running
        .http
        .get(format!("{}/healthz", running.base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let app = Arc::clone(&running.app);
    running.shutdown().await;
    assert_eq!(app.lifecycle(), Lifecycle::ShuttingDown);
}
