use axum_pos_api::routes::health::health_check;

#[tokio::test]
async fn health_check_reports_service_and_version() {
    let response = health_check().await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
    assert_eq!(data.service, "axum-pos-api");
    assert!(!data.version.is_empty());
}
