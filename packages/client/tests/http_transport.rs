use std::time::Duration;

use serde::{Deserialize, Serialize};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sidecar_client::{ClientConfig, ClientError, SidecarClient};
use sidecar_envelope::{Envelope, Message, TypeTag};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderRequest {
    product_id: String,
    amount: i32,
    customer_id: String,
}

impl Message for CreateOrderRequest {
    const TYPE_TAG: TypeTag = TypeTag::from_static("type.test/CreateOrderRequest");
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CreateOrderResponse {
    succeed: bool,
}

impl Message for CreateOrderResponse {
    const TYPE_TAG: TypeTag = TypeTag::from_static("type.test/CreateOrderResponse");
}

fn order() -> CreateOrderRequest {
    CreateOrderRequest {
        product_id: "p1".to_string(),
        amount: 20,
        customer_id: "c1".to_string(),
    }
}

fn client_for(server: &MockServer) -> SidecarClient {
    SidecarClient::connect(ClientConfig::new(&server.uri()).unwrap()).unwrap()
}

#[tokio::test]
async fn test_invoke_round_trip() {
    let server = MockServer::start().await;

    let request_envelope = Envelope::pack(&order()).unwrap();
    let response_envelope = Envelope::pack(&CreateOrderResponse { succeed: true }).unwrap();

    Mock::given(method("POST"))
        .and(path("/v1.0/invoke/OrderService/method/createOrder"))
        .and(header("content-type", "application/json"))
        .and(body_json(&request_envelope))
        .respond_with(ResponseTemplate::new(200).set_body_json(&response_envelope))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response: CreateOrderResponse = client
        .invoke("OrderService", "createOrder", &order())
        .await
        .unwrap();

    assert!(response.succeed);
}

#[tokio::test]
async fn test_invoke_remote_error_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1.0/invoke/OrderService/method/createOrder"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "errorCode": "ERR_UNKNOWN_METHOD",
            "message": "no method createOrder"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .invoke::<_, CreateOrderResponse>("OrderService", "createOrder", &order())
        .await
        .unwrap_err();

    match err {
        ClientError::Remote {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 404);
            assert_eq!(code, "ERR_UNKNOWN_METHOD");
            assert_eq!(message, "no method createOrder");
        }
        other => panic!("expected remote error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invoke_remote_error_plain_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream gone"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .invoke::<_, CreateOrderResponse>("OrderService", "createOrder", &order())
        .await
        .unwrap_err();

    match err {
        ClientError::Remote {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 502);
            assert_eq!(code, "Bad Gateway");
            assert_eq!(message, "upstream gone");
        }
        other => panic!("expected remote error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invoke_malformed_response_is_codec_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not an envelope"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .invoke::<_, CreateOrderResponse>("OrderService", "createOrder", &order())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Codec(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_publish_posts_envelope() {
    let server = MockServer::start().await;

    let event = Envelope::pack(&order()).unwrap();

    Mock::given(method("POST"))
        .and(path("/v1.0/publish/Storage.Reduce"))
        .and(body_json(&event))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .publish("Storage.Reduce", &order())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_publish_through_named_pubsub() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1.0/publish/pubsub/Storage.Reduce"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::new(&server.uri()).unwrap().with_pubsub("pubsub");
    SidecarClient::connect(config)
        .unwrap()
        .publish("Storage.Reduce", &order())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_timeout_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(Envelope::pack(&CreateOrderResponse { succeed: true }).unwrap())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = ClientConfig::new(&server.uri())
        .unwrap()
        .with_timeout(Duration::from_millis(100));
    let err = SidecarClient::connect(config)
        .unwrap()
        .invoke::<_, CreateOrderResponse>("OrderService", "createOrder", &order())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Timeout(_)), "got {:?}", err);
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_unreachable_proxy_is_transport_error() {
    // Grab a free port, then close it so nothing is listening.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let config = ClientConfig::from_host_port("127.0.0.1", port)
        .unwrap()
        .with_timeout(Duration::from_secs(2));
    let client = SidecarClient::connect(config).unwrap();

    let err = client
        .invoke::<_, CreateOrderResponse>("OrderService", "createOrder", &order())
        .await
        .unwrap_err();
    assert!(err.is_transport(), "got {:?}", err);

    assert!(client.health().await.unwrap_err().is_transport());
}

#[tokio::test]
async fn test_truncated_error_body_is_transport_error() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // A proxy that promises a 64-byte error body and hangs up after a few.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let proxy = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket
            .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 64\r\n\r\n{\"err")
            .await
            .unwrap();
        let _ = socket.shutdown().await;
    });

    let config = ClientConfig::from_host_port("127.0.0.1", port)
        .unwrap()
        .with_timeout(Duration::from_secs(2));
    let err = SidecarClient::connect(config)
        .unwrap()
        .health()
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Transport { .. }), "got {:?}", err);
    proxy.await.unwrap();
}

#[tokio::test]
async fn test_health() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1.0/healthz"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    client_for(&server).health().await.unwrap();
}
