use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use http::{Request, Response, StatusCode};
use kube::client::Body;
use serde_json::json;

use kube_unused::{Inventory, ScanError};

/// A client whose API server answers every list with an empty list, except for
/// the paths ending in `forbidden_suffix`, which get a 403.
fn fake_client(forbidden_suffix: &'static str, seen: Arc<Mutex<Vec<String>>>) -> kube::Client {
    let service = tower::service_fn(move |request: Request<Body>| {
        let seen = seen.clone();
        async move {
            let path = request.uri().path().to_string();
            seen.lock().unwrap().push(path.clone());

            let (status, body) = if path.ends_with(forbidden_suffix) {
                (
                    StatusCode::FORBIDDEN,
                    json!({
                        "apiVersion": "v1",
                        "kind": "Status",
                        "metadata": {},
                        "status": "Failure",
                        "message": "ingresses.networking.k8s.io is forbidden",
                        "reason": "Forbidden",
                        "code": 403
                    }),
                )
            } else {
                (
                    StatusCode::OK,
                    json!({
                        "apiVersion": "v1",
                        "kind": "List",
                        "metadata": { "resourceVersion": "1" },
                        "items": []
                    }),
                )
            };

            let response = Response::builder()
                .status(status)
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap();
            Ok::<_, Infallible>(response)
        }
    });
    kube::Client::new(service, "default")
}

#[tokio::test]
async fn test_unreachable_api_server_aborts_on_first_list() {
    let config = kube::Config::new("http://127.0.0.1:1".parse().unwrap());
    let kube_client = kube::Client::try_from(config).unwrap();

    let err = Inventory::fetch(kube_client).await.unwrap_err();

    assert!(matches!(err, ScanError::Api { kind: "pods", .. }), "{:?}", err);
}

#[tokio::test]
async fn test_forbidden_ingress_list_aborts_fetch() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let kube_client = fake_client("/ingresses", seen.clone());

    let result = Inventory::fetch(kube_client).await;

    match result {
        Err(ScanError::Api {
            kind: "ingresses",
            source: kube::Error::Api(status),
        }) => assert_eq!(status.code, 403),
        other => panic!("expected the ingress list to fail, got {:?}", other),
    }
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            "/api/v1/pods",
            "/api/v1/secrets",
            "/api/v1/configmaps",
            "/apis/networking.k8s.io/v1/ingresses",
        ]
    );
}

#[tokio::test]
async fn test_fetch_lists_all_four_kinds() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let kube_client = fake_client("/nothing-is-forbidden", seen.clone());

    let inventory = Inventory::fetch(kube_client).await.unwrap();

    assert!(inventory.pods.is_empty());
    assert!(inventory.ingresses.is_empty());
    assert_eq!(seen.lock().unwrap().len(), 4);
}
