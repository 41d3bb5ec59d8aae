pub mod errors;
pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::adapters::http::state::HttpState;

pub fn router(state: HttpState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/predict", post(routes::predict))
        .route("/predict/best", post(routes::predict_best))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::tests::{png_bytes, service};
    use crate::domain::detection::Detection;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    const BOUNDARY: &str = "XRAYBOUNDARY";

    fn app(detections: Vec<Detection>) -> Router {
        app_with_limit(detections, 8 * 1024 * 1024)
    }

    fn app_with_limit(detections: Vec<Detection>, max_upload_bytes: usize) -> Router {
        let state = HttpState { analysis: Arc::new(service(detections)) };
        router(state, max_upload_bytes)
    }

    async fn detail(resp: axum::response::Response) -> String {
        json_body(resp).await["detail"]
            .as_str()
            .expect("error body must carry `detail`")
            .to_string()
    }

    fn upload(uri: &str, field: &str, payload: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"xray.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(resp: axum::response::Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_lists_classes() {
        let resp = app(vec![])
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = json_body(resp).await;
        assert_eq!(json["model_loaded"], true);
        assert_eq!(json["num_classes"], 7);
        assert_eq!(json["classes"][2], "forearm fracture");
        assert_eq!(json["model_type"], "stub");
    }

    #[tokio::test]
    async fn predict_returns_findings_caption_and_image() {
        let dets = vec![Detection::new([10.0, 10.0, 50.0, 50.0], 2, 0.87)];
        let resp = app(dets)
            .oneshot(upload("/predict?threshold=0.5", "file", &png_bytes(100, 100)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = json_body(resp).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["detections"], 1);
        assert_eq!(json["findings"][0]["type"], "forearm fracture");
        assert_eq!(json["findings"][0]["confidence"], 87.0);
        assert_eq!(json["findings"][0]["box"], serde_json::json!([10.0, 10.0, 50.0, 50.0]));
        assert!(json["caption"]
            .as_str()
            .unwrap()
            .starts_with("Detected 1 potential fracture(s): forearm fracture (87.0% confidence)."));
        assert!(json["image_base64"].as_str().unwrap().starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn predict_defaults_threshold_to_half() {
        let dets = vec![Detection::new([10.0, 10.0, 50.0, 50.0], 2, 0.5)];
        let resp = app(dets)
            .oneshot(upload("/predict", "file", &png_bytes(64, 64)))
            .await
            .unwrap();
        let json = json_body(resp).await;
        assert_eq!(json["detections"], 0);
        assert_eq!(json["findings"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn predict_best_reports_top_class() {
        let dets = vec![
            Detection::new([0.0, 0.0, 20.0, 20.0], 5, 0.7),
            Detection::new([30.0, 30.0, 60.0, 60.0], 3, 0.7),
        ];
        let resp = app(dets)
            .oneshot(upload("/predict/best", "file", &png_bytes(80, 80)))
            .await
            .unwrap();
        let json = json_body(resp).await;
        assert_eq!(json["detected_class"], "shoulder fracture");
        assert_eq!(json["finding"]["confidence"], 70.0);
    }

    #[tokio::test]
    async fn out_of_range_threshold_is_bad_request() {
        let resp = app(vec![])
            .oneshot(upload("/predict?threshold=1.5", "file", &png_bytes(8, 8)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(resp).await["detail"].as_str().unwrap().contains("threshold"));
    }

    #[tokio::test]
    async fn missing_file_field_is_bad_request() {
        let resp = app(vec![])
            .oneshot(upload("/predict", "image", &png_bytes(8, 8)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn undecodable_image_is_bad_request() {
        let resp = app(vec![])
            .oneshot(upload("/predict", "file", b"GIF89a-but-not-really"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn provider_contract_violation_is_bad_gateway() {
        let dets = vec![Detection::new([40.0, 10.0, 10.0, 50.0], 1, 0.9)];
        let resp = app(dets)
            .oneshot(upload("/predict", "file", &png_bytes(64, 64)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn unparsable_threshold_is_bad_request_with_detail() {
        let resp = app(vec![])
            .oneshot(upload("/predict?threshold=abc", "file", &png_bytes(8, 8)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(detail(resp).await.contains("query"));
    }

    #[tokio::test]
    async fn non_multipart_body_is_bad_request_with_detail() {
        let req = Request::builder()
            .method("POST")
            .uri("/predict/best")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"file": "xray.png"}"#))
            .unwrap();
        let resp = app(vec![]).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(!detail(resp).await.is_empty());
    }

    #[tokio::test]
    async fn oversize_upload_is_payload_too_large() {
        let resp = app_with_limit(vec![], 1024)
            .oneshot(upload("/predict", "file", &vec![0u8; 4096]))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(detail(resp).await.contains("multipart"));
    }
}
