// API Integration Tests
//
// Drive the router end to end against an in-memory SQLite catalog.
// Run with: cargo test --test api_integration_tests

#[cfg(feature = "server")]
mod api_tests {
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use hvac_sizing::{
        create_router, default_catalog, insert_equipment, setup_database, AppState, AreaBounds,
        MatchPolicy, MissingFieldPolicy,
    };
    use rusqlite::Connection;
    use serde_json::Value;
    use tower::ServiceExt; // for oneshot

    // Helper: router over a seeded in-memory database
    fn create_test_app(policy: MatchPolicy) -> Router {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        insert_equipment(&conn, &default_catalog()).unwrap();

        create_router(AppState::new(conn, policy, AreaBounds::default()))
    }

    // Helper: parse JSON response
    async fn json_response(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        serde_json::from_slice(&body).expect("Failed to parse JSON")
    }

    fn post_calculate(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/calculate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_test_app(MatchPolicy::new());
        let response = app.oneshot(get("/api/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_response(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_calculate_returns_band() {
        let app = create_test_app(MatchPolicy::new());
        let response = app
            .oneshot(post_calculate(
                r#"{"square_footage": 2400, "current_system": "gas furnace", "home_age": "1985"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["square_footage"], 2400);
        assert_eq!(body["min_btu"], 48000);
        assert_eq!(body["max_btu"], 72000);
        assert_eq!(body["min_tons"], 4.0);
        assert_eq!(body["max_tons"], 6.0);
        assert!(body["lead_id"].is_string());
    }

    #[tokio::test]
    async fn test_calculate_rejects_out_of_range_area() {
        let app = create_test_app(MatchPolicy::new());
        let response = app
            .oneshot(post_calculate(r#"{"square_footage": 100}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_response(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_calculate_rejects_malformed_body() {
        let app = create_test_app(MatchPolicy::new());
        let response = app
            .oneshot(post_calculate(r#"{"square_footage": "big"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_response(response).await["error"], "Invalid request body");
    }

    #[tokio::test]
    async fn test_calculate_then_systems() {
        let app = create_test_app(MatchPolicy::new());

        let response = app
            .clone()
            .oneshot(post_calculate(r#"{"square_footage": 1500}"#))
            .await
            .unwrap();
        let calc = json_response(response).await;
        let lead_id = calc["lead_id"].as_str().unwrap().to_string();
        let min_btu = calc["min_btu"].as_u64().unwrap();
        let max_btu = calc["max_btu"].as_u64().unwrap();

        let response = app
            .oneshot(get(&format!("/api/systems/{}", lead_id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["lead_id"], lead_id.as_str());

        let systems = body["systems"].as_array().unwrap();
        assert!(!systems.is_empty());

        let mut previous_price = 0.0;
        for system in systems {
            let btu = system["condenser"]["btu"].as_u64().unwrap();
            assert!(btu >= min_btu && btu <= max_btu);

            let total = system["total_price"].as_f64().unwrap();
            assert!(total >= previous_price, "systems sorted by price");
            previous_price = total;

            assert!(system["condenser"]["model"].as_str().unwrap().ends_with(" ton"));
            assert!(system["coil"]["model"].as_str().unwrap().ends_with("Coil"));
            assert!(system["coil"].get("efficiency").is_none());
            assert_eq!(system["cabinet_width"], 21.0);
        }
    }

    #[tokio::test]
    async fn test_unknown_lead_is_404() {
        let app = create_test_app(MatchPolicy::new());
        let response = app
            .oneshot(get(&format!("/api/systems/{}", uuid::Uuid::new_v4())))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_response(response).await["error"], "Lead not found");
    }

    #[tokio::test]
    async fn test_malformed_lead_id_is_400() {
        let app = create_test_app(MatchPolicy::new());
        let response = app.oneshot(get("/api/systems/not-a-uuid")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_response(response).await["error"], "Invalid lead ID");
    }

    #[tokio::test]
    async fn test_no_match_is_empty_success() {
        // 10,000 sq ft needs 17+ tons; the largest condenser is 5 tons
        let app = create_test_app(MatchPolicy::new().with_missing_fields(MissingFieldPolicy::Exclude));

        let response = app
            .clone()
            .oneshot(post_calculate(r#"{"square_footage": 10000}"#))
            .await
            .unwrap();
        let lead_id = json_response(response).await["lead_id"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app
            .oneshot(get(&format!("/api/systems/{}", lead_id)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_response(response).await;
        assert_eq!(body["systems"].as_array().unwrap().len(), 0);
    }
}
