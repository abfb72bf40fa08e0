//! Platform API Integration Tests
//!
//! Drives the assembled `/api` router over in-memory stores.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use sb_config::AppConfig;
use sb_platform::auth::Argon2Config;
use sb_platform::{api_router, PlatformServices, Role, User};

struct TestApp {
    router: Router,
    services: PlatformServices,
}

struct Session {
    token: String,
    user_id: String,
}

impl TestApp {
    fn new() -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "integration-test-secret".to_string();
        let services = PlatformServices::in_memory(&config, Argon2Config::testing()).unwrap();
        let (router, _openapi) = api_router(&services);
        Self { router, services }
    }

    async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.send_raw(method, uri, token, body.map(|b| b.to_string())).await
    }

    async fn login(&self, username: &str, password: &str) -> Session {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        let token = body["token"].as_str().unwrap().to_string();

        let (_, profile) = self.send(Method::GET, "/api/auth/profile", Some(&token), None).await;
        Session {
            token,
            user_id: profile["_id"].as_str().unwrap().to_string(),
        }
    }

    async fn volunteer(&self, username: &str) -> Session {
        let (status, _) = self
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({ "username": username, "password": "secret123" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        self.login(username, "secret123").await
    }

    /// Organizer accounts cannot self-register by default, so they are
    /// written to the store directly.
    async fn organizer(&self, username: &str) -> Session {
        let hash = self.services.password_service.hash_password("organizer-pw").unwrap();
        self.services
            .user_repo
            .insert(&User::new(username, hash, Role::Organizer))
            .await
            .unwrap();
        self.login(username, "organizer-pw").await
    }

    async fn create_shift(&self, organizer: &Session, location: &str, task: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/admin/shifts/create",
                Some(&organizer.token),
                Some(json!({
                    "date": "2024-10-20",
                    "time": "09:00-12:00",
                    "location": location,
                    "task": task
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
        body["shift"]["_id"].as_str().unwrap().to_string()
    }

    async fn apply(&self, session: &Session, shift_id: &str) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/api/shifts/apply",
            Some(&session.token),
            Some(json!({ "shiftId": shift_id })),
        )
        .await
    }
}

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_register_login_and_profile() {
        let app = TestApp::new();

        let (status, body) = app
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({ "username": "vera", "password": "secret123" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "User registered successfully");

        let (status, body) = app
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "username": "vera", "password": "secret123" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "volunteer");
        let token = body["token"].as_str().unwrap();

        let claims = app.services.auth_service.validate_token(token).unwrap();
        assert_eq!(claims.role, Role::Volunteer);

        let (status, profile) = app.send(Method::GET, "/api/auth/profile", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["username"], "vera");
        assert_eq!(profile["_id"], claims.user_id.as_str());
        assert!(profile.get("password").is_none());
        assert!(profile.get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let app = TestApp::new();
        app.volunteer("vera").await;

        let (status, body) = app
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({ "username": "vera", "password": "another1" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "User already exists");
    }

    #[tokio::test]
    async fn test_privileged_self_registration_forbidden() {
        let app = TestApp::new();
        let (status, _) = app
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({ "username": "boss", "password": "secret123", "role": "admin" })),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let app = TestApp::new();
        app.volunteer("vera").await;

        for (username, password) in [("vera", "wrong-password"), ("nobody", "secret123")] {
            let (status, body) = app
                .send(
                    Method::POST,
                    "/api/auth/login",
                    None,
                    Some(json!({ "username": username, "password": password })),
                )
                .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "INVALID_CREDENTIALS");
            assert_eq!(body["message"], "Invalid credentials");
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_validation_error() {
        let app = TestApp::new();
        let (status, body) = app
            .send_raw(Method::POST, "/api/auth/login", None, Some("{not json".to_string()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_missing_or_invalid_token() {
        let app = TestApp::new();

        let (status, body) = app.send(Method::GET, "/api/shifts", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "UNAUTHORIZED");

        let (status, _) = app.send(Method::GET, "/api/shifts", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_update_profile() {
        let app = TestApp::new();
        let vera = app.volunteer("vera").await;

        let (status, body) = app
            .send(
                Method::PUT,
                "/api/auth/profile",
                Some(&vera.token),
                Some(json!({ "name": "Vera Muster", "contact": "+41 79 000 00 00" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Vera Muster");
        assert_eq!(body["contact"], "+41 79 000 00 00");
        assert_eq!(body["email"], "");
        assert_eq!(body["role"], "volunteer");
    }
}

mod shift_lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_sihlcity_scenario() {
        let app = TestApp::new();
        let organizer = app.organizer("olga").await;
        let vera = app.volunteer("vera").await;

        let shift_id = app.create_shift(&organizer, "Sihlcity", "Cinemasupport").await;

        let (status, body) = app.apply(&vera, &shift_id).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Shift application successful.");

        let (status, body) = app
            .send(
                Method::POST,
                &format!("/api/admin/shifts/{}/approve/{}", shift_id, vera.user_id),
                Some(&organizer.token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["shift"]["assignedUsers"], json!([vera.user_id]));
        assert_eq!(body["shift"]["appliedUsers"], json!([]));

        let complete_uri = format!("/api/admin/shifts/{}/complete", shift_id);
        let (status, body) = app.send(Method::POST, &complete_uri, Some(&organizer.token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["shift"]["completed"], true);

        // Completing again is a no-op
        let (status, body) = app.send(Method::POST, &complete_uri, Some(&organizer.token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["shift"]["completed"], true);

        let (status, stats) = app
            .send(Method::GET, "/api/admin/statistics", Some(&organizer.token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["totalVolunteers"], 1);
        assert_eq!(stats["completedShifts"], 1);
        assert_eq!(stats["averageRating"], 4.5);
        assert_eq!(stats["topVolunteers"][0]["volunteerId"], vera.user_id.as_str());
        assert_eq!(stats["topVolunteers"][0]["hoursWorked"], 4);
        assert_eq!(stats["hoursByTask"]["Cinemasupport"], 4);

        let (_, completed) = app.send(Method::GET, "/api/shifts/completed", Some(&vera.token), None).await;
        assert_eq!(completed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_apply_twice_conflicts() {
        let app = TestApp::new();
        let organizer = app.organizer("olga").await;
        let vera = app.volunteer("vera").await;
        let shift_id = app.create_shift(&organizer, "Frauenbadi", "Bar").await;

        app.apply(&vera, &shift_id).await;
        let (status, body) = app.apply(&vera, &shift_id).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "You have already applied for this shift.");

        let (_, shifts) = app.send(Method::GET, "/api/shifts", Some(&vera.token), None).await;
        assert_eq!(shifts[0]["appliedUsers"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_approve_without_application_is_invalid_state() {
        let app = TestApp::new();
        let organizer = app.organizer("olga").await;
        let vera = app.volunteer("vera").await;
        let shift_id = app.create_shift(&organizer, "Festivalcentre", "Information Desk").await;

        let (status, body) = app
            .send(
                Method::POST,
                &format!("/api/admin/shifts/{}/approve/{}", shift_id, vera.user_id),
                Some(&organizer.token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_STATE");
    }

    #[tokio::test]
    async fn test_approve_twice_is_invalid_state() {
        let app = TestApp::new();
        let organizer = app.organizer("olga").await;
        let vera = app.volunteer("vera").await;
        let shift_id = app.create_shift(&organizer, "Sihlcity", "Cinemasupport").await;
        app.apply(&vera, &shift_id).await;

        let approve_uri = format!("/api/admin/shifts/{}/approve/{}", shift_id, vera.user_id);
        let (status, _) = app.send(Method::POST, &approve_uri, Some(&organizer.token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = app.send(Method::POST, &approve_uri, Some(&organizer.token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_STATE");
    }

    #[tokio::test]
    async fn test_deny_and_direct_assign() {
        let app = TestApp::new();
        let organizer = app.organizer("olga").await;
        let vera = app.volunteer("vera").await;
        let otto = app.volunteer("otto").await;
        let shift_id = app.create_shift(&organizer, "City Center", "Registration Desk").await;

        app.apply(&vera, &shift_id).await;
        let (status, body) = app
            .send(
                Method::POST,
                &format!("/api/admin/shifts/{}/deny/{}", shift_id, vera.user_id),
                Some(&organizer.token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["shift"]["appliedUsers"], json!([]));

        let assign_uri = format!("/api/admin/shifts/{}/assign/{}", shift_id, otto.user_id);
        let (status, body) = app.send(Method::POST, &assign_uri, Some(&organizer.token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["shift"]["assignedUsers"], json!([otto.user_id]));

        let (status, _) = app.send(Method::POST, &assign_uri, Some(&organizer.token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, assigned) = app.send(Method::GET, "/api/shifts/assigned", Some(&otto.token), None).await;
        assert_eq!(assigned.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_own_assignment() {
        let app = TestApp::new();
        let organizer = app.organizer("olga").await;
        let vera = app.volunteer("vera").await;
        let shift_id = app.create_shift(&organizer, "Community Hall", "Event Support").await;

        app.send(
            Method::POST,
            &format!("/api/admin/shifts/{}/assign/{}", shift_id, vera.user_id),
            Some(&organizer.token),
            None,
        )
        .await;

        let cancel_uri = format!("/api/shifts/{}/cancel", shift_id);
        for _ in 0..2 {
            let (status, _) = app.send(Method::POST, &cancel_uri, Some(&vera.token), None).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, assigned) = app.send(Method::GET, "/api/shifts/assigned", Some(&vera.token), None).await;
        assert_eq!(assigned, json!([]));

        let (status, _) = app
            .send(Method::POST, "/api/shifts/000000000000000000000000/cancel", Some(&vera.token), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_deleted_shift_is_gone() {
        let app = TestApp::new();
        let organizer = app.organizer("olga").await;
        let vera = app.volunteer("vera").await;
        let shift_id = app.create_shift(&organizer, "Sihlcity", "Cinemasupport").await;

        let delete_uri = format!("/api/admin/shifts/{}", shift_id);
        let (status, body) = app.send(Method::DELETE, &delete_uri, Some(&organizer.token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Shift deleted successfully");

        let (_, shifts) = app.send(Method::GET, "/api/shifts", Some(&vera.token), None).await;
        assert_eq!(shifts, json!([]));

        let (status, body) = app.apply(&vera, &shift_id).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Shift not found");

        let (status, _) = app.send(Method::DELETE, &delete_uri, Some(&organizer.token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_requires_all_fields() {
        let app = TestApp::new();
        let organizer = app.organizer("olga").await;

        let (status, body) = app
            .send(
                Method::POST,
                "/api/admin/shifts/create",
                Some(&organizer.token),
                Some(json!({ "date": "2024-10-20", "time": "09:00-12:00", "location": "Sihlcity" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "All fields (date, time, location, task) are required");
    }

    #[tokio::test]
    async fn test_admin_listing_resolves_members() {
        let app = TestApp::new();
        let organizer = app.organizer("olga").await;
        let vera = app.volunteer("vera").await;
        let shift_id = app.create_shift(&organizer, "Frauenbadi", "Bar").await;
        app.apply(&vera, &shift_id).await;

        let (status, shifts) = app
            .send(Method::GET, "/api/admin/shifts", Some(&organizer.token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let applicant = &shifts[0]["appliedUsers"][0];
        assert_eq!(applicant["username"], "vera");
        assert_eq!(applicant["_id"], vera.user_id.as_str());
        assert!(applicant.get("password").is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_applicants_are_all_recorded() {
        let app = TestApp::new();
        let organizer = app.organizer("olga").await;
        let shift_id = app.create_shift(&organizer, "Sihlcity", "Cinemasupport").await;

        let mut volunteers = Vec::new();
        for i in 0..4 {
            volunteers.push(app.volunteer(&format!("volunteer{}", i)).await);
        }

        let requests = volunteers.iter().map(|v| app.apply(v, &shift_id));
        for (status, _) in futures::future::join_all(requests).await {
            assert_eq!(status, StatusCode::OK);
        }

        let (_, shifts) = app.send(Method::GET, "/api/shifts", Some(&organizer.token), None).await;
        assert_eq!(shifts[0]["appliedUsers"].as_array().unwrap().len(), 4);
    }
}

mod authorization_tests {
    use super::*;

    #[tokio::test]
    async fn test_volunteer_is_forbidden_on_admin_routes() {
        let app = TestApp::new();
        let vera = app.volunteer("vera").await;
        let id = "000000000000000000000000";

        let routes = [
            (Method::GET, "/api/admin/volunteers".to_string()),
            (Method::DELETE, format!("/api/admin/volunteers/{}", id)),
            (Method::GET, "/api/admin/shifts".to_string()),
            (Method::DELETE, format!("/api/admin/shifts/{}", id)),
            (Method::POST, format!("/api/admin/shifts/{}/assign/{}", id, id)),
            (Method::POST, format!("/api/admin/shifts/{}/approve/{}", id, id)),
            (Method::POST, format!("/api/admin/shifts/{}/deny/{}", id, id)),
            (Method::POST, format!("/api/admin/shifts/{}/complete", id)),
            (Method::GET, "/api/admin/statistics".to_string()),
        ];

        for (method, uri) in routes {
            let (status, body) = app.send(method.clone(), &uri, Some(&vera.token), None).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{} {}", method, uri);
            assert_eq!(body["error"], "FORBIDDEN");
        }
    }

    #[tokio::test]
    async fn test_forbidden_before_body_is_parsed() {
        let app = TestApp::new();
        let vera = app.volunteer("vera").await;

        let (status, _) = app
            .send_raw(
                Method::POST,
                "/api/admin/shifts/create",
                Some(&vera.token),
                Some("{broken".to_string()),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_volunteer_admin() {
        let app = TestApp::new();
        let organizer = app.organizer("olga").await;
        let vera = app.volunteer("vera").await;
        app.volunteer("otto").await;

        let (status, volunteers) = app
            .send(Method::GET, "/api/admin/volunteers", Some(&organizer.token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = volunteers
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["username"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["vera", "otto"]);

        // Organizer accounts are not removable here
        let (status, _) = app
            .send(
                Method::DELETE,
                &format!("/api/admin/volunteers/{}", organizer.user_id),
                Some(&organizer.token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let delete_uri = format!("/api/admin/volunteers/{}", vera.user_id);
        let (status, _) = app.send(Method::DELETE, &delete_uri, Some(&organizer.token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = app.send(Method::DELETE, &delete_uri, Some(&organizer.token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Volunteer not found");

        // Token outlives the account
        let (status, _) = app.send(Method::GET, "/api/auth/profile", Some(&vera.token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
