//! HTTP routing table.

use axum::{
    Router,
    response::Redirect,
    routing::{get, post, put},
};
use eventgate_platform_access::Screen;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AppState};
use crate::{api, pages};

/// Builds the application router.
///
/// `/`, unknown paths and page loads of action-only paths redirect to the
/// login screen.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Screens
        .route("/", get(default_screen))
        .route("/login", get(pages::login))
        .route("/register", get(pages::register))
        .route("/home", get(pages::home))
        .route("/admin-home", get(pages::admin_home))
        .route("/create-event", get(pages::create_event))
        .route("/participant-home", get(pages::participant_home))
        .route(
            "/events/{id}",
            get(pages::event_details).delete(api::delete_event),
        )
        // Actions
        .route("/auth/login", post(auth::login).get(default_screen))
        .route("/auth/register", post(auth::register).get(default_screen))
        .route("/auth/logout", post(auth::logout).get(default_screen))
        .route("/events", post(api::create_event).get(default_screen))
        .route("/events/{id}/join", post(api::join_event).get(default_screen))
        .route("/events/{id}/leave", post(api::leave_event).get(default_screen))
        .route(
            "/profile/display-name",
            put(api::update_display_name).get(default_screen),
        )
        .fallback(default_screen)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn default_screen() -> Redirect {
    Redirect::to(Screen::DEFAULT.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode, header},
        response::Response,
    };
    use chrono::Duration;
    use eventgate_booking::InMemoryEventStore;
    use eventgate_core::UserId;
    use eventgate_platform_access::{
        Session, SessionStore,
        memory::{InMemoryIdentityProvider, InMemoryProfileStore, InMemorySessionStore},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        sessions: Arc<InMemorySessionStore>,
    }

    impl TestApp {
        fn new() -> Self {
            let profiles = Arc::new(InMemoryProfileStore::new());
            let sessions = Arc::new(InMemorySessionStore::new());
            let state = AppState::new(
                Arc::new(InMemoryIdentityProvider::new()),
                profiles.clone(),
                profiles,
                Arc::new(InMemoryEventStore::new()),
                sessions.clone(),
                SessionConfig {
                    secure_cookies: false,
                    ..SessionConfig::default()
                },
            );
            Self {
                router: router(Arc::new(state)),
                sessions,
            }
        }

        async fn send(
            &self,
            method: Method,
            uri: &str,
            cookie: Option<&str>,
            body: Option<Value>,
        ) -> Response {
            let mut request = Request::builder().method(method).uri(uri);
            if let Some(cookie) = cookie {
                request = request.header(header::COOKIE, cookie);
            }
            let request = match body {
                Some(body) => request
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string())),
                None => request.body(Body::empty()),
            }
            .expect("request");
            self.router.clone().oneshot(request).await.expect("response")
        }

        async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
            self.send(Method::GET, uri, cookie, None).await
        }

        async fn register(&self, email: &str, role: &str) {
            let response = self
                .send(
                    Method::POST,
                    "/auth/register",
                    None,
                    Some(json!({ "email": email, "password": "secret1", "role": role })),
                )
                .await;
            assert_eq!(location(&response), Some("/login"));
        }

        /// Signs in and returns the `Cookie` header value for the session.
        async fn login(&self, email: &str) -> String {
            let response = self
                .send(
                    Method::POST,
                    "/auth/login",
                    None,
                    Some(json!({ "email": email, "password": "secret1" })),
                )
                .await;
            assert_eq!(location(&response), Some("/home"));
            let set_cookie = response
                .headers()
                .get(header::SET_COOKIE)
                .and_then(|v| v.to_str().ok())
                .expect("session cookie");
            set_cookie
                .split(';')
                .next()
                .expect("cookie pair")
                .to_string()
        }

        async fn user(&self, email: &str, role: &str) -> String {
            self.register(email, role).await;
            self.login(email).await
        }

        async fn create_event(&self, admin: &str, capacity: u32) -> String {
            let response = self
                .send(
                    Method::POST,
                    "/events",
                    Some(admin),
                    Some(json!({
                        "name": "Choir practice",
                        "description": "Open rehearsal",
                        "starts_at": "2030-05-01T18:00:00Z",
                        "location": "St Mary's hall",
                        "capacity": capacity
                    })),
                )
                .await;
            assert_eq!(response.status(), StatusCode::CREATED);
            body(response).await["id"]
                .as_str()
                .expect("event id")
                .to_string()
        }
    }

    fn location(response: &Response) -> Option<&str> {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    async fn body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn root_and_unknown_paths_redirect_to_login() {
        let app = TestApp::new();
        for uri in ["/", "/no-such-page", "/events/a/b/c"] {
            let response = app.get(uri, None).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(location(&response), Some("/login"), "{uri}");
        }
    }

    #[tokio::test]
    async fn action_paths_are_not_screens() {
        let app = TestApp::new();
        let admin = app.user("admin@example.com", "admin").await;
        let event_id = app.create_event(&admin, 2).await;
        let join = format!("/events/{event_id}/join");
        let leave = format!("/events/{event_id}/leave");
        for uri in [
            "/events",
            join.as_str(),
            leave.as_str(),
            "/auth/login",
            "/auth/logout",
            "/profile/display-name",
        ] {
            for cookie in [None, Some(admin.as_str())] {
                let response = app.get(uri, cookie).await;
                assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
                assert_eq!(location(&response), Some("/login"), "{uri}");
            }
        }
    }

    #[tokio::test]
    async fn protected_screens_redirect_guests_to_login() {
        let app = TestApp::new();
        for uri in [
            "/home",
            "/admin-home",
            "/create-event",
            "/participant-home",
            "/events/evt_01ARZ3NDEKTSV4RRFFQ69G5FAV",
        ] {
            assert_eq!(location(&app.get(uri, None).await), Some("/login"), "{uri}");
        }

        let response = app.get("/login", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await["screen"], "login");
    }

    #[tokio::test]
    async fn admin_is_kept_on_admin_screens() {
        let app = TestApp::new();
        let admin = app.user("admin@example.com", "admin").await;

        assert_eq!(
            location(&app.get("/home", Some(&admin)).await),
            Some("/admin-home")
        );
        let response = app.get("/admin-home", Some(&admin)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let view = body(response).await;
        assert_eq!(view["screen"], "admin-home");
        assert_eq!(view["user"]["role"], "admin");

        for uri in ["/participant-home", "/login", "/register"] {
            assert_eq!(
                location(&app.get(uri, Some(&admin)).await),
                Some("/admin-home"),
                "{uri}"
            );
        }
    }

    #[tokio::test]
    async fn participant_is_kept_off_admin_screens() {
        let app = TestApp::new();
        let participant = app.user("pat@example.com", "participant").await;

        for uri in ["/admin-home", "/create-event", "/home"] {
            assert_eq!(
                location(&app.get(uri, Some(&participant)).await),
                Some("/participant-home"),
                "{uri}"
            );
        }
        let response = app
            .send(
                Method::POST,
                "/events",
                Some(&participant),
                Some(json!({
                    "name": "Sneaky",
                    "description": "Not allowed",
                    "starts_at": "2030-05-01T18:00:00Z",
                    "location": "Nowhere",
                    "capacity": 5
                })),
            )
            .await;
        assert_eq!(location(&response), Some("/participant-home"));
    }

    #[tokio::test]
    async fn join_and_leave_keep_counts_in_step() {
        let app = TestApp::new();
        let admin = app.user("admin@example.com", "admin").await;
        let participant = app.user("pat@example.com", "participant").await;
        let id = app.create_event(&admin, 2).await;

        let join = format!("/events/{id}/join");
        let leave = format!("/events/{id}/leave");

        let response = app.send(Method::POST, &join, Some(&participant), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let event = body(response).await;
        assert_eq!(event["participant_count"], 1);
        assert_eq!(event["joined"], true);

        let response = app.send(Method::POST, &join, Some(&participant), None).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let notification = body(response).await;
        assert_eq!(notification["level"], "warning");
        assert_eq!(notification["message"], "You have already joined this event");

        let view = body(app.get(&format!("/events/{id}"), Some(&admin)).await).await;
        assert_eq!(view["events"][0]["participant_count"], 1);
        assert_eq!(view["participants"].as_array().map(Vec::len), Some(1));

        let response = app.send(Method::POST, &leave, Some(&participant), None).await;
        assert_eq!(body(response).await["participant_count"], 0);

        let response = app.send(Method::POST, &leave, Some(&participant), None).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body(response).await["message"], "You have not joined this event");
    }

    #[tokio::test]
    async fn full_event_rejects_join() {
        let app = TestApp::new();
        let admin = app.user("admin@example.com", "admin").await;
        let first = app.user("a@example.com", "participant").await;
        let second = app.user("b@example.com", "participant").await;
        let id = app.create_event(&admin, 1).await;
        let join = format!("/events/{id}/join");

        let response = app.send(Method::POST, &join, Some(&first), None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.send(Method::POST, &join, Some(&second), None).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body(response).await["message"], "This event is full");

        let home = body(app.get("/participant-home", Some(&second)).await).await;
        assert_eq!(home["events"][0]["participant_count"], 1);
        assert_eq!(home["events"][0]["joined"], false);
    }

    #[tokio::test]
    async fn admin_deletes_event() {
        let app = TestApp::new();
        let admin = app.user("admin@example.com", "admin").await;
        let id = app.create_event(&admin, 3).await;
        let uri = format!("/events/{id}");

        let response = app.send(Method::DELETE, &uri, Some(&admin), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await["level"], "success");

        let response = app.get(&uri, Some(&admin)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_draft_is_a_warning() {
        let app = TestApp::new();
        let admin = app.user("admin@example.com", "admin").await;
        let response = app
            .send(
                Method::POST,
                "/events",
                Some(&admin),
                Some(json!({
                    "name": "  ",
                    "description": "Missing a name",
                    "starts_at": "2030-05-01T18:00:00Z",
                    "location": "Hall",
                    "capacity": 5
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body(response).await["level"], "warning");
    }

    #[tokio::test]
    async fn bad_credentials_show_fixed_message() {
        let app = TestApp::new();
        app.register("pat@example.com", "participant").await;

        let response = app
            .send(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({ "email": "pat@example.com", "password": "wrong-pw" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let notification = body(response).await;
        assert_eq!(notification["level"], "error");
        assert_eq!(notification["message"], "Incorrect email or password");

        let response = app
            .send(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({ "email": "pat@example.com", "password": "secret1" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            body(response).await["message"],
            "This email address is already in use"
        );
    }

    #[tokio::test]
    async fn logout_ends_the_session() {
        let app = TestApp::new();
        let participant = app.user("pat@example.com", "participant").await;

        let response = app
            .send(Method::POST, "/auth/logout", Some(&participant), None)
            .await;
        assert_eq!(location(&response), Some("/login"));

        assert_eq!(
            location(&app.get("/participant-home", Some(&participant)).await),
            Some("/login")
        );
    }

    #[tokio::test]
    async fn expired_session_is_rejected_and_deleted() {
        let app = TestApp::new();
        app.register("pat@example.com", "participant").await;
        let expired = Session::new(
            UserId::new("someone"),
            "pat@example.com".to_string(),
            Duration::seconds(-1),
        );
        app.sessions.create_session(&expired).await.expect("create");
        let cookie = format!("session={}", expired.id());

        assert_eq!(
            location(&app.get("/participant-home", Some(&cookie)).await),
            Some("/login")
        );
        assert!(
            app.sessions
                .find_session(expired.id())
                .await
                .expect("find")
                .is_none()
        );
    }

    #[tokio::test]
    async fn display_name_is_validated() {
        let app = TestApp::new();
        let participant = app.user("pat@example.com", "participant").await;

        let response = app
            .send(
                Method::PUT,
                "/profile/display-name",
                Some(&participant),
                Some(json!({ "display_name": "Pat" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let home = body(app.get("/participant-home", Some(&participant)).await).await;
        assert_eq!(home["user"]["display_name"], "Pat");

        let response = app
            .send(
                Method::PUT,
                "/profile/display-name",
                Some(&participant),
                Some(json!({ "display_name": "P" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
