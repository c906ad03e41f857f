//! Mocked API server for exercising `Apis` without a cluster.

use http::{Request, Response, StatusCode};
use k8s_openapi::api::core::v1::{Container, Pod, PodSpec};
use kube::{api::ObjectMeta, client::Body, Client};
use serde_json::{json, Value};

use super::Apis;

type ApiServerHandle = tower_test::mock::Handle<Request<Body>, Response<Body>>;

pub struct ApiServerVerifier(ApiServerHandle);

/// Create a mocked client together with the handle answering its requests.
pub fn testcontext(namespace: &str) -> (Apis, ApiServerVerifier) {
    let (mock_service, handle) = tower_test::mock::pair::<Request<Body>, Response<Body>>();
    let client = Client::new(mock_service, namespace);
    (
        Apis::namespaced(&client, namespace),
        ApiServerVerifier(handle),
    )
}

impl ApiServerVerifier {
    /// Waits for the next request, checks it with `check` and answers with
    /// `status` and `body`.
    pub async fn expect(
        &mut self,
        status: StatusCode,
        body: Value,
        check: impl FnOnce(&Request<Body>),
    ) {
        let (request, send) = self.0.next_request().await.expect("service not called");
        check(&request);
        let response = serde_json::to_vec(&body).unwrap();
        send.send_response(
            Response::builder()
                .status(status)
                .body(Body::from(response))
                .unwrap(),
        );
    }
}

fn pod(name: &str, phase: &str) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": { "name": name, "namespace": "tools" },
        "spec": { "containers": [{ "name": "tunnel", "image": "alpine/socat" }] },
        "status": { "phase": phase }
    })
}

fn not_found(name: &str) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Status",
        "status": "Failure",
        "message": format!("pods \"{}\" not found", name),
        "reason": "NotFound",
        "code": 404
    })
}

#[tokio::test]
async fn pod_events_filters_by_involved_object() {
    let (apis, mut server) = testcontext("tools");
    let server = tokio::spawn(async move {
        server
            .expect(
                StatusCode::OK,
                json!({
                    "apiVersion": "v1",
                    "kind": "EventList",
                    "metadata": {},
                    "items": [{
                        "metadata": { "name": "tunnel-pod-abc123.1" },
                        "involvedObject": { "kind": "Pod", "name": "tunnel-pod-abc123" },
                        "type": "Warning",
                        "reason": "Failed",
                        "message": "Back-off pulling image"
                    }]
                }),
                |request| {
                    assert_eq!(request.method(), http::Method::GET);
                    let uri = request.uri().to_string();
                    assert!(uri.starts_with("/api/v1/namespaces/tools/events?"));
                    assert!(uri.contains(
                        "fieldSelector=involvedObject.name%3Dtunnel-pod-abc123%2CinvolvedObject.kind%3DPod"
                    ));
                },
            )
            .await;
    });

    let events = apis.pod_events("tunnel-pod-abc123").await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].reason.as_deref(), Some("Failed"));
    server.await.unwrap();
}

#[tokio::test]
async fn pod_create_get_delete() {
    let (apis, mut server) = testcontext("tools");
    let server = tokio::spawn(async move {
        server
            .expect(StatusCode::CREATED, pod("tunnel-pod-zz9zz9", "Pending"), |request| {
                assert_eq!(request.method(), http::Method::POST);
                assert_eq!(request.uri().path(), "/api/v1/namespaces/tools/pods");
            })
            .await;
        server
            .expect(StatusCode::OK, pod("tunnel-pod-zz9zz9", "Running"), |request| {
                assert_eq!(request.method(), http::Method::GET);
                assert_eq!(
                    request.uri().path(),
                    "/api/v1/namespaces/tools/pods/tunnel-pod-zz9zz9"
                );
            })
            .await;
        server
            .expect(StatusCode::OK, pod("tunnel-pod-zz9zz9", "Running"), |request| {
                assert_eq!(request.method(), http::Method::DELETE);
                assert_eq!(
                    request.uri().path(),
                    "/api/v1/namespaces/tools/pods/tunnel-pod-zz9zz9"
                );
            })
            .await;
    });

    let spec = Pod {
        metadata: ObjectMeta {
            name: Some("tunnel-pod-zz9zz9".into()),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers: vec![Container {
                name: "tunnel".into(),
                ..Default::default()
            }],
            ..Default::default()
        }),
        ..Default::default()
    };
    let created = apis.create_pod(&spec).await.unwrap();
    assert_eq!(created.metadata.name.as_deref(), Some("tunnel-pod-zz9zz9"));

    let fetched = apis.get_pod("tunnel-pod-zz9zz9").await.unwrap();
    assert!(crate::kube_types::pod_is_running(&fetched));

    apis.delete_pod("tunnel-pod-zz9zz9").await.unwrap();
    server.await.unwrap();
}

#[tokio::test]
async fn get_missing_pod_is_api_error() {
    let (apis, mut server) = testcontext("tools");
    let server = tokio::spawn(async move {
        server
            .expect(StatusCode::NOT_FOUND, not_found("gone"), |_| {})
            .await;
    });

    match apis.get_pod("gone").await {
        Err(kube::Error::Api(response)) => {
            assert_eq!(response.code, 404);
            assert_eq!(response.reason, "NotFound");
        }
        other => panic!("expected api error, got {:?}", other),
    }
    server.await.unwrap();
}
