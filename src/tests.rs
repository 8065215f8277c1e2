#[cfg(test)]
mod integration_tests {
    use crate::schemas::{ApiResponse, ErrorResponse};
    use crate::test_utils::test_utils::{setup_test_app, TestAccounts};
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use axum_test::{TestRequest, TestServer};
    use serde_json::json;

    trait WithAccount {
        fn with_account(self, account_id: i32) -> Self;
    }

    impl WithAccount for TestRequest {
        fn with_account(self, account_id: i32) -> Self {
            self.add_header(
                HeaderName::from_static("x-account-id"),
                HeaderValue::from_str(&account_id.to_string()).unwrap(),
            )
        }
    }

    async fn setup() -> (TestServer, TestAccounts) {
        let (app, accounts) = setup_test_app().await;
        (TestServer::new(app).unwrap(), accounts)
    }

    async fn report_incident(
        server: &TestServer,
        reporter: i32,
        title: &str,
        category: &str,
    ) -> i64 {
        let response = server
            .post("/api/v1/incidents")
            .with_account(reporter)
            .json(&json!({
                "title": title,
                "description": "Something happened near the market.",
                "category": category,
                "location": "Market St"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert!(body.success);
        body.data["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let (server, _) = setup().await;

        let response = server.get("/health").await;
        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_register_account() {
        let (server, _) = setup().await;

        let response = server
            .post("/api/v1/accounts")
            .json(&json!({
                "username": "newcomer",
                "contact_number": "0700111222",
                "location": "Kibera"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let body: ApiResponse<serde_json::Value> = response.json();
        assert!(body.success);
        assert_eq!(body.data["username"], "newcomer");
        assert_eq!(body.data["role"], "resident");
        assert_eq!(body.data["is_superuser"], false);
        assert!(body.data["account_id"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_register_duplicate_username_rejected() {
        let (server, _) = setup().await;

        let response = server
            .post("/api/v1/accounts")
            .json(&json!({ "username": "wanjiku" }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "VALIDATION_ERROR");
        assert!(!body.success);
    }

    #[tokio::test]
    async fn test_register_bad_phone_rejected() {
        let (server, _) = setup().await;

        for bad in ["12345", "07123456789", "07123A5678"] {
            let response = server
                .post("/api/v1/accounts")
                .json(&json!({ "username": "phoney", "contact_number": bad }))
                .await;
            response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[tokio::test]
    async fn test_missing_auth_header_rejected() {
        let (server, _) = setup().await;

        let response = server.get("/api/v1/incidents").await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn test_unknown_account_rejected() {
        let (server, _) = setup().await;

        let response = server.get("/api/v1/incidents").with_account(9999).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_profile_visibility() {
        let (server, accounts) = setup().await;

        // The holder sees their own profile.
        let response = server
            .get(&format!("/api/v1/accounts/{}/profile", accounts.resident))
            .with_account(accounts.resident)
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["username"], "wanjiku");

        // Another resident does not.
        let response = server
            .get(&format!("/api/v1/accounts/{}/profile", accounts.resident))
            .with_account(accounts.resident2)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        // An admin does.
        let response = server
            .get(&format!("/api/v1/accounts/{}/profile", accounts.resident))
            .with_account(accounts.admin)
            .await;
        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_update_own_profile() {
        let (server, accounts) = setup().await;

        let response = server
            .put(&format!("/api/v1/accounts/{}/profile", accounts.resident))
            .with_account(accounts.resident)
            .json(&json!({ "contact_number": "0799888777", "location": "Mathare" }))
            .await;
        response.assert_status(StatusCode::OK);

        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["contact_number"], "0799888777");
        assert_eq!(body.data["location"], "Mathare");

        // Bad phone number is rejected.
        let response = server
            .put(&format!("/api/v1/accounts/{}/profile", accounts.resident))
            .with_account(accounts.resident)
            .json(&json!({ "contact_number": "123" }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_role_assignment_rules() {
        let (server, accounts) = setup().await;

        // A resident cannot assign roles.
        let response = server
            .put(&format!("/api/v1/accounts/{}/role", accounts.resident2))
            .with_account(accounts.resident)
            .json(&json!({ "role": "officer" }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        // An admin can promote someone else.
        let response = server
            .put(&format!("/api/v1/accounts/{}/role", accounts.resident2))
            .with_account(accounts.admin)
            .json(&json!({ "role": "officer" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["role"], "officer");

        // An admin never changes their own role.
        let response = server
            .put(&format!("/api/v1/accounts/{}/role", accounts.admin))
            .with_account(accounts.admin)
            .json(&json!({ "role": "resident" }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        // A superuser can, even on themselves.
        let response = server
            .put(&format!("/api/v1/accounts/{}/role", accounts.root))
            .with_account(accounts.root)
            .json(&json!({ "role": "chief" }))
            .await;
        response.assert_status(StatusCode::OK);

        // Unknown roles are rejected.
        let response = server
            .put(&format!("/api/v1/accounts/{}/role", accounts.resident2))
            .with_account(accounts.admin)
            .json(&json!({ "role": "warlord" }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_only_residents_can_report() {
        let (server, accounts) = setup().await;

        report_incident(&server, accounts.resident, "Stolen bike", "other").await;

        for actor in [
            accounts.authority,
            accounts.officer,
            accounts.chief,
            accounts.admin,
        ] {
            let response = server
                .post("/api/v1/incidents")
                .with_account(actor)
                .json(&json!({
                    "title": "Not a resident report",
                    "description": "Should be rejected.",
                    "category": "other"
                }))
                .await;
            response.assert_status(StatusCode::FORBIDDEN);
            let body: ErrorResponse = response.json();
            assert_eq!(body.code, "NOT_AUTHORIZED");
        }
    }

    #[tokio::test]
    async fn test_report_validation() {
        let (server, accounts) = setup().await;

        // Unknown category.
        let response = server
            .post("/api/v1/incidents")
            .with_account(accounts.resident)
            .json(&json!({
                "title": "Weird",
                "description": "x",
                "category": "alien_invasion"
            }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        // Title too long.
        let response = server
            .post("/api/v1/incidents")
            .with_account(accounts.resident)
            .json(&json!({
                "title": "t".repeat(201),
                "description": "x",
                "category": "other"
            }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_resident_listing_scoped_and_ordered() {
        let (server, accounts) = setup().await;

        let first = report_incident(&server, accounts.resident, "First", "other").await;
        let second = report_incident(&server, accounts.resident, "Second", "disturbance").await;
        report_incident(&server, accounts.resident2, "Someone else's", "other").await;

        let response = server
            .get("/api/v1/incidents")
            .with_account(accounts.resident)
            .await;
        response.assert_status(StatusCode::OK);

        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 2);
        // Most recent first.
        assert_eq!(body.data[0]["id"].as_i64().unwrap(), second);
        assert_eq!(body.data[1]["id"].as_i64().unwrap(), first);

        // Officers see everything.
        let response = server
            .get("/api/v1/incidents")
            .with_account(accounts.officer)
            .await;
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 3);
    }

    #[tokio::test]
    async fn test_listing_status_filter() {
        let (server, accounts) = setup().await;

        let incident = report_incident(&server, accounts.resident, "Pending one", "other").await;
        let resolved = report_incident(&server, accounts.resident, "To resolve", "other").await;
        server
            .post(&format!("/api/v1/incidents/{resolved}/resolve"))
            .with_account(accounts.officer)
            .await
            .assert_status(StatusCode::OK);

        let response = server
            .get("/api/v1/incidents")
            .add_query_param("status", "pending")
            .with_account(accounts.officer)
            .await;
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0]["id"].as_i64().unwrap(), incident);

        // Unknown filter values are rejected, not ignored.
        let response = server
            .get("/api/v1/incidents")
            .add_query_param("status", "bogus")
            .with_account(accounts.officer)
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_get_incident_visibility() {
        let (server, accounts) = setup().await;

        let incident = report_incident(&server, accounts.resident, "Private", "other").await;

        let response = server
            .get(&format!("/api/v1/incidents/{incident}"))
            .with_account(accounts.resident2)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let response = server
            .get(&format!("/api/v1/incidents/{incident}"))
            .with_account(accounts.chief)
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .get("/api/v1/incidents/424242")
            .with_account(accounts.chief)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_edit_rules() {
        let (server, accounts) = setup().await;

        let incident = report_incident(&server, accounts.resident, "Typo in titel", "other").await;

        // The reporter can fix their pending report.
        let response = server
            .put(&format!("/api/v1/incidents/{incident}"))
            .with_account(accounts.resident)
            .json(&json!({ "title": "Typo in title" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["title"], "Typo in title");
        assert_eq!(body.data["description"], "Something happened near the market.");

        // Someone else's resident account cannot.
        let response = server
            .put(&format!("/api/v1/incidents/{incident}"))
            .with_account(accounts.resident2)
            .json(&json!({ "title": "Hijacked" }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        // Once the report leaves pending, the reporter loses edit too.
        server
            .post(&format!("/api/v1/incidents/{incident}/confirm"))
            .with_account(accounts.officer)
            .json(&json!({ "response_notes": null }))
            .await
            .assert_status(StatusCode::OK);

        let response = server
            .put(&format!("/api/v1/incidents/{incident}"))
            .with_account(accounts.resident)
            .json(&json!({ "title": "Too late" }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_status_update_rules() {
        let (server, accounts) = setup().await;

        let incident = report_incident(&server, accounts.resident, "Noise", "disturbance").await;

        // Residents cannot drive the status.
        let response = server
            .post(&format!("/api/v1/incidents/{incident}/status"))
            .with_account(accounts.resident)
            .json(&json!({ "status": "resolved" }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        // Unknown status values are rejected.
        let response = server
            .post(&format!("/api/v1/incidents/{incident}/status"))
            .with_account(accounts.officer)
            .json(&json!({ "status": "escalated" }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        // Officers can, and a move into resolved records the response time.
        let response = server
            .post(&format!("/api/v1/incidents/{incident}/status"))
            .with_account(accounts.officer)
            .json(&json!({ "status": "resolved" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["status"], "resolved");
        assert!(body.data["response_time_secs"].as_i64().unwrap() >= 0);

        // Backward moves are allowed.
        let response = server
            .post(&format!("/api/v1/incidents/{incident}/status"))
            .with_account(accounts.admin)
            .json(&json!({ "status": "pending" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["status"], "pending");
    }

    #[tokio::test]
    async fn test_confirm_rules() {
        let (server, accounts) = setup().await;

        let incident = report_incident(&server, accounts.resident, "Break-in", "emergency").await;

        // Only officers confirm; chiefs and admins do not.
        for actor in [accounts.resident, accounts.chief, accounts.admin, accounts.root] {
            let response = server
                .post(&format!("/api/v1/incidents/{incident}/confirm"))
                .with_account(actor)
                .json(&json!({ "response_notes": "nope" }))
                .await;
            response.assert_status(StatusCode::FORBIDDEN);
        }

        let response = server
            .post(&format!("/api/v1/incidents/{incident}/confirm"))
            .with_account(accounts.officer)
            .json(&json!({ "response_notes": "dispatched patrol" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["status"], "confirmed");
        assert_eq!(
            body.data["confirmed_by_id"].as_i64().unwrap(),
            accounts.officer as i64
        );
        assert_eq!(body.data["response_notes"], "dispatched patrol");

        // Confirming a non-pending incident is a state conflict.
        let response = server
            .post(&format!("/api/v1/incidents/{incident}/confirm"))
            .with_account(accounts.officer)
            .json(&json!({ "response_notes": "again" }))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let error: ErrorResponse = response.json();
        assert_eq!(error.code, "INVALID_STATE");

        // A resolved incident can no longer be confirmed either.
        let resolved =
            report_incident(&server, accounts.resident, "Already handled", "other").await;
        server
            .post(&format!("/api/v1/incidents/{resolved}/resolve"))
            .with_account(accounts.officer)
            .await
            .assert_status(StatusCode::OK);
        let response = server
            .post(&format!("/api/v1/incidents/{resolved}/confirm"))
            .with_account(accounts.officer)
            .json(&json!({ "response_notes": "too late" }))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let error: ErrorResponse = response.json();
        assert_eq!(error.code, "INVALID_STATE");
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let (server, accounts) = setup().await;

        let incident = report_incident(&server, accounts.resident, "Flood", "emergency").await;

        let response = server
            .post(&format!("/api/v1/incidents/{incident}/resolve"))
            .with_account(accounts.officer)
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["status"], "resolved");

        // A second resolve succeeds without changing anything.
        let response = server
            .post(&format!("/api/v1/incidents/{incident}/resolve"))
            .with_account(accounts.officer)
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["status"], "resolved");
    }

    #[tokio::test]
    async fn test_delete_rules() {
        let (server, accounts) = setup().await;

        // The reporter can delete their own pending report.
        let incident = report_incident(&server, accounts.resident, "Oops", "other").await;
        let response = server
            .delete(&format!("/api/v1/incidents/{incident}"))
            .with_account(accounts.resident)
            .await;
        response.assert_status(StatusCode::OK);
        server
            .get(&format!("/api/v1/incidents/{incident}"))
            .with_account(accounts.officer)
            .await
            .assert_status(StatusCode::NOT_FOUND);

        // Another resident cannot.
        let incident = report_incident(&server, accounts.resident, "Mine", "other").await;
        let response = server
            .delete(&format!("/api/v1/incidents/{incident}"))
            .with_account(accounts.resident2)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        // Once confirmed, the reporter is denied outright.
        server
            .post(&format!("/api/v1/incidents/{incident}/confirm"))
            .with_account(accounts.officer)
            .json(&json!({ "response_notes": null }))
            .await
            .assert_status(StatusCode::OK);
        let response = server
            .delete(&format!("/api/v1/incidents/{incident}"))
            .with_account(accounts.resident)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        // An admin passes the policy but hits the state rule.
        let response = server
            .delete(&format!("/api/v1/incidents/{incident}"))
            .with_account(accounts.admin)
            .await;
        response.assert_status(StatusCode::CONFLICT);

        // An admin can delete someone else's pending report.
        let incident = report_incident(&server, accounts.resident2, "Spam", "other").await;
        let response = server
            .delete(&format!("/api/v1/incidents/{incident}"))
            .with_account(accounts.admin)
            .await;
        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_statistics_access_and_counts() {
        let (server, accounts) = setup().await;

        // Residents and officers do not see the aggregate view.
        for actor in [accounts.resident, accounts.authority, accounts.officer] {
            server
                .get("/api/v1/incidents/statistics")
                .with_account(actor)
                .await
                .assert_status(StatusCode::FORBIDDEN);
        }

        let incident = report_incident(&server, accounts.resident, "Fire", "emergency").await;
        report_incident(&server, accounts.resident2, "Loiterers", "suspicious_activity").await;

        server
            .post(&format!("/api/v1/incidents/{incident}/confirm"))
            .with_account(accounts.officer)
            .json(&json!({ "response_notes": "dispatched patrol" }))
            .await
            .assert_status(StatusCode::OK);
        server
            .post(&format!("/api/v1/incidents/{incident}/status"))
            .with_account(accounts.admin)
            .json(&json!({ "status": "resolved" }))
            .await
            .assert_status(StatusCode::OK);

        let response = server
            .get("/api/v1/incidents/statistics")
            .with_account(accounts.chief)
            .await;
        response.assert_status(StatusCode::OK);

        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["total"].as_u64().unwrap(), 2);
        assert_eq!(body.data["solved"].as_u64().unwrap(), 1);
        assert_eq!(body.data["unsolved"].as_u64().unwrap(), 1);

        let by_category = body.data["by_category"].as_array().unwrap();
        assert_eq!(by_category.len(), 2);
        // Ordered by category name.
        assert_eq!(by_category[0]["category"], "emergency");
        assert_eq!(by_category[0]["total"].as_u64().unwrap(), 1);
        assert_eq!(by_category[0]["resolved"].as_u64().unwrap(), 1);
        assert_eq!(by_category[0]["pending"].as_u64().unwrap(), 0);
        assert_eq!(by_category[0]["in_progress"].as_u64().unwrap(), 0);
        assert_eq!(by_category[1]["category"], "suspicious_activity");
        assert_eq!(by_category[1]["pending"].as_u64().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_statistics_reflect_mutations_immediately() {
        let (server, accounts) = setup().await;

        let response = server
            .get("/api/v1/incidents/statistics")
            .with_account(accounts.chief)
            .await;
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["total"].as_u64().unwrap(), 0);

        report_incident(&server, accounts.resident, "New one", "other").await;

        let response = server
            .get("/api/v1/incidents/statistics")
            .with_account(accounts.chief)
            .await;
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["total"].as_u64().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_media_upload() {
        let (server, accounts) = setup().await;

        let incident = report_incident(&server, accounts.resident, "Vandalism", "other").await;

        let response = server
            .post(&format!("/api/v1/incidents/{incident}/media/image"))
            .with_account(accounts.resident)
            .content_type("image/png")
            .bytes(axum::body::Bytes::from_static(b"not really a png"))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        let reference = body.data["media"]["image"].as_str().unwrap();
        assert!(reference.starts_with("incident_images/"));
        assert!(reference.ends_with(".png"));

        // Empty payloads are rejected.
        let response = server
            .post(&format!("/api/v1/incidents/{incident}/media/video"))
            .with_account(accounts.resident)
            .content_type("video/mp4")
            .bytes(axum::body::Bytes::new())
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        // Unknown media kinds are rejected.
        let response = server
            .post(&format!("/api/v1/incidents/{incident}/media/hologram"))
            .with_account(accounts.resident)
            .content_type("application/octet-stream")
            .bytes(axum::body::Bytes::from_static(b"payload"))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        // Only the reporter (while pending) or privileged roles attach media.
        let response = server
            .post(&format!("/api/v1/incidents/{incident}/media/image"))
            .with_account(accounts.resident2)
            .content_type("image/png")
            .bytes(axum::body::Bytes::from_static(b"intruder"))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_export_incident() {
        let (server, accounts) = setup().await;

        let incident = report_incident(&server, accounts.resident, "Power line down", "emergency").await;

        let response = server
            .get(&format!("/api/v1/incidents/{incident}/export"))
            .with_account(accounts.resident)
            .await;
        response.assert_status(StatusCode::OK);

        let disposition = response.header("content-disposition");
        assert_eq!(
            disposition.to_str().unwrap(),
            format!("attachment; filename=incident_{incident}.txt")
        );

        let text = response.text();
        assert!(text.contains("Incident Report: Power line down"));
        assert!(text.contains("Reporter: wanjiku"));
        assert!(text.contains("Category: emergency"));
        assert!(text.contains("Status: pending"));

        // Scoped like any other read: a foreign resident is denied.
        let response = server
            .get(&format!("/api/v1/incidents/{incident}/export"))
            .with_account(accounts.resident2)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }
}
