#[cfg(test)]
mod integration_tests {
    use crate::handlers::auth::{LoginForm, RegisterForm};
    use crate::handlers::reviews::{ReviewForm, REVIEW_SUBMITTED_MESSAGE};
    use crate::schemas::{ApiResponse, ErrorResponse, MessageResponse};
    use crate::session::SESSION_COOKIE;
    use crate::test_utils::test_utils::{
        create_admin, create_cafe, create_customer, create_dish, create_review,
        session_header, setup_test_app, setup_test_app_with_state, TEST_PASSWORD,
    };
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use model::entities::cafe;
    use model::entities::review::{self, ReviewStatus};
    use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};
    use serde_json::json;

    fn review_form(star: i32, content: &str) -> ReviewForm {
        ReviewForm {
            star,
            content: content.to_string(),
        }
    }

    async fn close_cafe(db: &DatabaseConnection, cafe: cafe::Model) {
        let mut active: cafe::ActiveModel = cafe.into();
        active.status = Set(cafe::CafeStatus::Closed);
        active.update(db).await.expect("Failed to close cafe");
    }

    fn rendered_reviews(html: &str) -> usize {
        html.matches("<li class=\"review\">").count()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "connected");
    }

    #[tokio::test]
    async fn test_unknown_cafe_renders_not_found_page() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        for cafe_id in [0, 1, 42, -7] {
            let response = server.get(&format!("/cafes/{}", cafe_id)).await;
            response.assert_status(StatusCode::NOT_FOUND);
            assert!(response.text().contains("Cafe not found"));
        }
    }

    #[tokio::test]
    async fn test_detail_page_shows_menu_and_approved_reviews_only() {
        let (app, state) = setup_test_app_with_state().await;
        let server = TestServer::new(app).unwrap();

        let alice = create_customer(&state, "Alice", "alice@example.com").await;
        let cafe = create_cafe(&state.db, "Kissa").await;
        create_dish(&state.db, cafe.id, "Latte", 45000).await;
        create_dish(&state.db, cafe.id, "Cheesecake", 52000).await;
        create_review(&state.db, cafe.id, alice.id, 5, ReviewStatus::Approved, 2).await;
        create_review(&state.db, cafe.id, alice.id, 1, ReviewStatus::Pending, 3).await;
        create_review(&state.db, cafe.id, alice.id, 2, ReviewStatus::Rejected, 4).await;

        let response = server.get(&format!("/cafes/{}", cafe.id)).await;

        response.assert_status(StatusCode::OK);
        let html = response.text();
        assert!(html.contains("Kissa"));
        assert!(html.contains("Kissa street 1"));
        assert!(html.contains("Latte"));
        assert!(html.contains("450.00"));
        assert!(html.contains("Cheesecake"));
        assert!(html.contains("5 star review on day 2"));
        assert!(!html.contains("1 star review on day 3"));
        assert!(!html.contains("2 star review on day 4"));
        assert_eq!(rendered_reviews(&html), 1);
        // Anonymous visitors get a login hint instead of the form
        assert!(html.contains("login-hint"));
        assert!(!html.contains("review-form"));
    }

    #[tokio::test]
    async fn test_detail_page_without_dishes_and_with_login() {
        let (app, state) = setup_test_app_with_state().await;
        let server = TestServer::new(app).unwrap();

        create_customer(&state, "Alice", "alice@example.com").await;
        let cafe = create_cafe(&state.db, "Empty").await;
        let (name, value) = session_header(&state, "alice@example.com").await;

        let response = server
            .get(&format!("/cafes/{}", cafe.id))
            .add_header(name, value)
            .await;

        response.assert_status(StatusCode::OK);
        let html = response.text();
        assert!(html.contains("No dishes listed"));
        assert!(html.contains("No reviews yet"));
        assert!(html.contains("review-form"));
    }

    #[tokio::test]
    async fn test_star_filter_with_paging() {
        let (app, state) = setup_test_app_with_state().await;
        let server = TestServer::new(app).unwrap();

        let alice = create_customer(&state, "Alice", "alice@example.com").await;
        let cafe = create_cafe(&state.db, "Kissa").await;
        for day in 2..=4 {
            create_review(&state.db, cafe.id, alice.id, 5, ReviewStatus::Approved, day).await;
        }
        create_review(&state.db, cafe.id, alice.id, 3, ReviewStatus::Approved, 5).await;
        create_review(&state.db, cafe.id, alice.id, 5, ReviewStatus::Pending, 6).await;

        let first = server
            .get(&format!("/cafes/{}/reviews-fragment?star=5&size=2&page=0", cafe.id))
            .await;
        first.assert_status(StatusCode::OK);
        let first = first.text();
        assert_eq!(rendered_reviews(&first), 2);
        assert!(first.contains("data-total=\"3\""));
        assert!(first.contains("5 star review on day 4"));
        assert!(first.contains("5 star review on day 3"));

        let second = server
            .get(&format!("/cafes/{}/reviews-fragment?star=5&size=2&page=1", cafe.id))
            .await
            .text();
        assert_eq!(rendered_reviews(&second), 1);
        assert!(second.contains("5 star review on day 2"));
        assert!(!second.contains("3 star review"));

        // No star filter returns every approved review
        let all = server
            .get(&format!("/cafes/{}/reviews-fragment?size=10", cafe.id))
            .await
            .text();
        assert_eq!(rendered_reviews(&all), 4);
        assert!(all.contains("3 star review on day 5"));

        // The "All" option of the filter form sends an empty star
        let empty_star = server.get(&format!("/cafes/{}?star=", cafe.id)).await;
        empty_star.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_pages_cover_reviews_without_overlap() {
        let (app, state) = setup_test_app_with_state().await;
        let server = TestServer::new(app).unwrap();

        let alice = create_customer(&state, "Alice", "alice@example.com").await;
        let cafe = create_cafe(&state.db, "Kissa").await;
        for day in 1..=7 {
            create_review(&state.db, cafe.id, alice.id, 4, ReviewStatus::Approved, day).await;
        }

        // Newest first: day 7 down to day 1
        let expected: Vec<String> = (1..=7)
            .rev()
            .map(|day| format!("4 star review on day {}", day))
            .collect();

        for (page_index, chunk) in expected.chunks(3).enumerate() {
            let html = server
                .get(&format!(
                    "/cafes/{}/reviews-fragment?size=3&page={}",
                    cafe.id, page_index
                ))
                .await
                .text();
            assert_eq!(rendered_reviews(&html), chunk.len());
            for content in &expected {
                assert_eq!(html.contains(content.as_str()), chunk.contains(content));
            }
        }
    }

    #[tokio::test]
    async fn test_invalid_page_parameters_render_error_page() {
        let (app, state) = setup_test_app_with_state().await;
        let server = TestServer::new(app).unwrap();
        let cafe = create_cafe(&state.db, "Kissa").await;

        let detail = format!("/cafes/{}", cafe.id);
        let fragment = format!("/cafes/{}/reviews-fragment", cafe.id);
        for path in [&detail, &fragment] {
            for query in ["star=6", "star=0", "size=0", "size=101", "page=10001", "page=abc", "star=x"] {
                let response = server.get(&format!("{}?{}", path, query)).await;
                response.assert_status(StatusCode::BAD_REQUEST);
                let content_type = response.header("content-type");
                assert!(content_type.to_str().unwrap().starts_with("text/html"), "{}", query);
                let html = response.text();
                assert!(html.contains("400 Bad Request"), "{}", query);
                assert!(html.contains("The page parameters are not valid"));
            }
        }

        let response = server.get("/cafes/latte").await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.text().contains("Cafe not found"));

        server
            .get("/cafes?size=500")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cafe_list_shows_open_cafes() {
        let (app, state) = setup_test_app_with_state().await;
        let server = TestServer::new(app).unwrap();
        let alice = create_customer(&state, "Alice", "alice@example.com").await;
        let kissa = create_cafe(&state.db, "Kissa").await;
        create_cafe(&state.db, "Beans").await;
        let kaffe = create_cafe(&state.db, "Kaffe").await;
        close_cafe(&state.db, kaffe).await;
        create_review(&state.db, kissa.id, alice.id, 4, ReviewStatus::Approved, 2).await;

        for path in ["/", "/cafes"] {
            let response = server.get(path).await;
            response.assert_status(StatusCode::OK);
            let html = response.text();
            assert!(html.contains(&format!("href=\"/cafes/{}\"", kissa.id)));
            assert!(html.contains("Beans"));
            assert!(!html.contains("Kaffe"));
            assert!(html.contains("4.0 (1)"));
        }

        let html = server.get("/cafes?q=kiss").await.text();
        assert!(html.contains("Kissa"));
        assert!(!html.contains("Beans"));

        let html = server.get("/cafes?q=%25").await.text();
        assert!(html.contains("No cafes found"));
    }

    #[tokio::test]
    async fn test_login_and_register_pages() {
        let (app, state) = setup_test_app_with_state().await;
        let server = TestServer::new(app).unwrap();
        let cafe = create_cafe(&state.db, "Kissa").await;

        let detail = server.get(&format!("/cafes/{}", cafe.id)).await.text();
        let login_link = format!("/login?next=/cafes/{}", cafe.id);
        assert!(detail.contains(&login_link));
        assert!(detail.contains("/assets/app.js"));

        let response = server.get(&login_link).await;
        response.assert_status(StatusCode::OK);
        let html = response.text();
        assert!(html.contains("action=\"/login\""));
        assert!(html.contains(&format!("data-next=\"/cafes/{}\"", cafe.id)));

        let html = server.get("/login?next=https://evil.example").await.text();
        assert!(html.contains("data-next=\"/\""));

        let response = server.get("/register").await;
        response.assert_status(StatusCode::OK);
        assert!(response.text().contains("name=\"password\""));

        let response = server.get("/assets/app.js").await;
        response.assert_status(StatusCode::OK);
        assert!(response
            .header("content-type")
            .to_str()
            .unwrap()
            .starts_with("text/javascript"));
        assert!(response.text().contains("data-target"));
    }

    #[tokio::test]
    async fn test_post_review_requires_login() {
        let (app, state) = setup_test_app_with_state().await;
        let server = TestServer::new(app).unwrap();
        let cafe = create_cafe(&state.db, "Kissa").await;

        let response = server
            .post(&format!("/cafes/{}/reviews", cafe.id))
            .form(&review_form(5, "Lovely"))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "NOT_AUTHENTICATED");
        assert!(!body.success);
        assert_eq!(review::Entity::find().count(&state.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_post_review_with_unknown_principal() {
        let (app, state) = setup_test_app_with_state().await;
        let server = TestServer::new(app).unwrap();
        let cafe = create_cafe(&state.db, "Kissa").await;
        let (name, value) = session_header(&state, "ghost@example.com").await;

        let response = server
            .post(&format!("/cafes/{}/reviews", cafe.id))
            .add_header(name, value)
            .form(&review_form(5, "Lovely"))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "USER_NOT_FOUND");
        assert_eq!(review::Entity::find().count(&state.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_posted_review_waits_for_approval() {
        let (app, state) = setup_test_app_with_state().await;
        let server = TestServer::new(app).unwrap();
        create_customer(&state, "Alice", "alice@example.com").await;
        create_admin(&state, "Root", "root@example.com").await;
        let cafe = create_cafe(&state.db, "Kissa").await;
        let (name, value) = session_header(&state, "alice@example.com").await;

        let response = server
            .post(&format!("/cafes/{}/reviews", cafe.id))
            .add_header(name, value)
            .form(&review_form(4, "  Quiet and cosy  "))
            .await;

        response.assert_status(StatusCode::OK);
        let body: MessageResponse = response.json();
        assert_eq!(body.message, REVIEW_SUBMITTED_MESSAGE);

        let stored = review::Entity::find().all(&state.db).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, ReviewStatus::Pending);
        assert_eq!(stored[0].content, "Quiet and cosy");

        let fragment = server
            .get(&format!("/cafes/{}/reviews-fragment", cafe.id))
            .await
            .text();
        assert!(!fragment.contains("Quiet and cosy"));

        let (name, value) = session_header(&state, "root@example.com").await;
        server
            .put(&format!("/admin/api/reviews/{}/status?status=approved", stored[0].id))
            .add_header(name, value)
            .await
            .assert_status(StatusCode::OK);

        let fragment = server
            .get(&format!("/cafes/{}/reviews-fragment", cafe.id))
            .await
            .text();
        assert!(fragment.contains("Quiet and cosy"));
    }

    #[tokio::test]
    async fn test_post_review_validation_and_unknown_cafe() {
        let (app, state) = setup_test_app_with_state().await;
        let server = TestServer::new(app).unwrap();
        create_customer(&state, "Alice", "alice@example.com").await;
        let cafe = create_cafe(&state.db, "Kissa").await;

        for form in [review_form(0, "Bad"), review_form(6, "Bad"), review_form(3, "   ")] {
            let (name, value) = session_header(&state, "alice@example.com").await;
            let response = server
                .post(&format!("/cafes/{}/reviews", cafe.id))
                .add_header(name, value)
                .form(&form)
                .await;
            response.assert_status(StatusCode::BAD_REQUEST);
            let body: ErrorResponse = response.json();
            assert_eq!(body.code, "VALIDATION_ERROR");
        }

        let (name, value) = session_header(&state, "alice@example.com").await;
        let response = server
            .post("/cafes/9999/reviews")
            .add_header(name, value)
            .form(&review_form(5, "Where am I"))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        assert_eq!(review::Entity::find().count(&state.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_register_login_logout_flow() {
        let (app, state) = setup_test_app_with_state().await;
        let server = TestServer::new(app).unwrap();
        let cafe = create_cafe(&state.db, "Kissa").await;

        let register = RegisterForm {
            name: "Alice".to_string(),
            email: "Alice@Example.com".to_string(),
            password: TEST_PASSWORD.to_string(),
        };
        let response = server.post("/register").form(&register).await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert!(body.success);
        assert_eq!(body.data["email"], "alice@example.com");
        assert_eq!(body.data["role"], "customer");

        server
            .post("/register")
            .form(&register)
            .await
            .assert_status(StatusCode::CONFLICT);

        let bad_email = RegisterForm {
            email: "not-an-email".to_string(),
            ..register
        };
        server
            .post("/register")
            .form(&bad_email)
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let wrong = LoginForm {
            email: "alice@example.com".to_string(),
            password: "wrong-password".to_string(),
        };
        let response = server.post("/login").form(&wrong).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "INVALID_CREDENTIALS");

        let login = LoginForm {
            email: "alice@example.com".to_string(),
            password: TEST_PASSWORD.to_string(),
        };
        let response = server.post("/login").form(&login).await;
        response.assert_status(StatusCode::OK);
        let session = response.cookie(SESSION_COOKIE);
        assert_eq!(session.http_only(), Some(true));

        server
            .post(&format!("/cafes/{}/reviews", cafe.id))
            .add_cookie(session.clone())
            .form(&review_form(5, "Logged in review"))
            .await
            .assert_status(StatusCode::OK);

        server
            .post("/logout")
            .add_cookie(session.clone())
            .await
            .assert_status(StatusCode::OK);

        // The old cookie no longer maps to a session
        server
            .post(&format!("/cafes/{}/reviews", cafe.id))
            .add_cookie(session)
            .form(&review_form(5, "After logout"))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        assert_eq!(review::Entity::find().count(&state.db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upload_requires_admin() {
        let (app, state) = setup_test_app_with_state().await;
        let server = TestServer::new(app).unwrap();
        create_customer(&state, "Alice", "alice@example.com").await;

        let form = || {
            MultipartForm::new().add_part(
                "file",
                Part::bytes(b"image".to_vec()).file_name("latte.png"),
            )
        };

        let response = server.post("/api/upload").multipart(form()).await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let (name, value) = session_header(&state, "alice@example.com").await;
        let response = server
            .post("/api/upload")
            .add_header(name, value)
            .multipart(form())
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "FORBIDDEN");

        assert!(!state.uploads.root().exists());
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_file() {
        let (app, state) = setup_test_app_with_state().await;
        let server = TestServer::new(app).unwrap();
        create_admin(&state, "Root", "root@example.com").await;
        let (name, value) = session_header(&state, "root@example.com").await;

        let form = MultipartForm::new()
            .add_part("file", Part::bytes(Vec::new()).file_name("empty.png"));
        let response = server
            .post("/api/upload")
            .add_header(name, value)
            .multipart(form)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(!state.uploads.root().exists());
    }

    #[tokio::test]
    async fn test_upload_stores_identical_bytes() {
        let (app, state) = setup_test_app_with_state().await;
        let server = TestServer::new(app).unwrap();
        create_admin(&state, "Root", "root@example.com").await;
        let (name, value) = session_header(&state, "root@example.com").await;
        let bytes = b"\x89PNG not really an image".to_vec();

        let form = MultipartForm::new()
            .add_text("caption", "ignored")
            .add_part(
                "file",
                Part::bytes(bytes.clone())
                    .file_name("latte.png")
                    .mime_type("image/png"),
            );
        let response = server
            .post("/api/upload")
            .add_header(name, value)
            .multipart(form)
            .await;

        response.assert_status(StatusCode::OK);
        let stored_name = response.text();
        assert_ne!(stored_name, "latte.png");
        assert!(stored_name.ends_with("_latte.png"));

        let written = tokio::fs::read(state.uploads.root().join(&stored_name))
            .await
            .unwrap();
        assert_eq!(written, bytes);

        // Stored images are served back under /images
        let served = server.get(&format!("/images/{}", stored_name)).await;
        served.assert_status(StatusCode::OK);
        assert_eq!(served.as_bytes().to_vec(), bytes);

        let _ = tokio::fs::remove_dir_all(state.uploads.root()).await;
    }

    #[tokio::test]
    async fn test_moderation_requires_admin() {
        let (app, state) = setup_test_app_with_state().await;
        let server = TestServer::new(app).unwrap();
        create_customer(&state, "Alice", "alice@example.com").await;

        server
            .get("/admin/api/reviews")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        let (name, value) = session_header(&state, "alice@example.com").await;
        server
            .post("/admin/api/reviews/approve-all")
            .add_header(name, value)
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_moderation_endpoints() {
        let (app, state) = setup_test_app_with_state().await;
        let server = TestServer::new(app).unwrap();
        let alice = create_customer(&state, "Alice", "alice@example.com").await;
        let bob = create_customer(&state, "Bob", "bob@example.com").await;
        create_admin(&state, "Root", "root@example.com").await;
        let cafe = create_cafe(&state.db, "Kissa").await;
        let first = create_review(&state.db, cafe.id, alice.id, 5, ReviewStatus::Pending, 2).await;
        create_review(&state.db, cafe.id, bob.id, 3, ReviewStatus::Pending, 3).await;
        create_review(&state.db, cafe.id, bob.id, 1, ReviewStatus::Rejected, 4).await;
        let (name, value) = session_header(&state, "root@example.com").await;
        let admin = |request: axum_test::TestRequest| request.add_header(name.clone(), value.clone());

        let response = admin(server.get("/admin/api/reviews?status=pending&keyword=bob")).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["total_count"], 1);
        assert_eq!(body.data["items"][0]["author_name"], "Bob");

        let response = admin(server.get(&format!("/admin/api/reviews/{}", first.id))).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["author_email"], "alice@example.com");
        assert_eq!(body.data["status"], "pending");

        admin(server.put(&format!("/admin/api/reviews/{}/status?status=published", first.id)))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let response = admin(server.get("/admin/api/reviews/counts")).await;
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["pending"], 2);
        assert_eq!(body.data["rejected"], 1);

        let response = admin(server.post("/admin/api/reviews/approve-all")).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["approved"], 2);

        admin(server.delete(&format!("/admin/api/reviews/{}", first.id)))
            .await
            .assert_status(StatusCode::OK);
        admin(server.delete(&format!("/admin/api/reviews/{}", first.id)))
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let response = admin(server.get("/admin/api/reviews/counts")).await;
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["approved"], 1);
        assert_eq!(body.data["pending"], 0);
    }

    #[tokio::test]
    async fn test_moderation_keyword_wildcards_are_literal() {
        let (app, state) = setup_test_app_with_state().await;
        let server = TestServer::new(app).unwrap();
        let alice = create_customer(&state, "Alice", "alice@example.com").await;
        create_admin(&state, "Root", "root@example.com").await;
        let cafe = create_cafe(&state.db, "Kissa").await;
        create_review(&state.db, cafe.id, alice.id, 5, ReviewStatus::Approved, 2).await;
        let (name, value) = session_header(&state, "root@example.com").await;

        for keyword in ["%25", "_"] {
            let response = server
                .get(&format!("/admin/api/reviews?keyword={}", keyword))
                .add_header(name.clone(), value.clone())
                .await;
            response.assert_status(StatusCode::OK);
            let body: ApiResponse<serde_json::Value> = response.json();
            assert_eq!(body.data["total_count"], 0, "{}", keyword);
        }
    }

    #[tokio::test]
    async fn test_admin_cafe_management() {
        let (app, state) = setup_test_app_with_state().await;
        let server = TestServer::new(app).unwrap();
        create_customer(&state, "Alice", "alice@example.com").await;
        create_admin(&state, "Root", "root@example.com").await;
        let (name, value) = session_header(&state, "root@example.com").await;
        let admin = |request: axum_test::TestRequest| request.add_header(name.clone(), value.clone());

        let new_cafe = json!({
            "name": "Kissa",
            "address": "1 Bean street",
            "image": "front.jpg",
            "opening_hours": "08:00-20:00",
            "dishes": [
                { "name": "Latte", "price": "4.50" },
                { "name": "Scone", "price": 3.2, "description": "Warm" }
            ]
        });

        server
            .post("/admin/api/cafes")
            .json(&new_cafe)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        let (customer, customer_value) = session_header(&state, "alice@example.com").await;
        server
            .post("/admin/api/cafes")
            .add_header(customer, customer_value)
            .json(&new_cafe)
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let response = admin(server.post("/admin/api/cafes")).json(&new_cafe).await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        let cafe_id = body.data["cafe"]["id"].as_i64().unwrap();
        assert_eq!(body.data["cafe"]["status"], "opening");
        assert_eq!(body.data["dishes"].as_array().unwrap().len(), 2);
        let latte_id = body.data["dishes"][0]["id"].as_i64().unwrap();

        // The new cafe is public right away
        let detail = server.get(&format!("/cafes/{}", cafe_id)).await;
        detail.assert_status(StatusCode::OK);
        assert!(detail.text().contains("4.50"));

        let response = admin(server.put(&format!("/admin/api/dishes/{}", latte_id)))
            .json(&json!({ "name": "Oat latte", "price": "5.00" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["name"], "Oat latte");

        admin(server.put(&format!("/admin/api/dishes/{}", latte_id)))
            .json(&json!({ "name": "Oat latte", "price": "-1" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let response = admin(server.put(&format!("/admin/api/cafes/{}", cafe_id)))
            .json(&json!({
                "name": "Kissa",
                "address": "2 Bean street",
                "status": "closed",
                "dishes": [ { "id": latte_id, "name": "Oat latte", "price": "5.00" } ]
            }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["cafe"]["address"], "2 Bean street");
        assert_eq!(body.data["dishes"].as_array().unwrap().len(), 1);

        let response = admin(server.get("/admin/api/cafes?status=closed&keyword=kis")).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["total_count"], 1);
        admin(server.get("/admin/api/cafes?status=sleeping"))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        // Closed cafes leave the public listing
        assert!(server.get("/").await.text().contains("No cafes found"));

        let response = admin(server.get(&format!("/admin/api/cafes/{}", cafe_id))).await;
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["cafe"]["status"], "closed");

        admin(server.delete(&format!("/admin/api/cafes/{}", cafe_id)))
            .await
            .assert_status(StatusCode::OK);
        admin(server.get(&format!("/admin/api/cafes/{}", cafe_id)))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        admin(server.get(&format!("/admin/api/dishes/{}", latte_id)))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_user_management_and_bans() {
        let (app, state) = setup_test_app_with_state().await;
        let server = TestServer::new(app).unwrap();
        let alice = create_customer(&state, "Alice", "alice@example.com").await;
        let root = create_admin(&state, "Root", "root@example.com").await;
        let cafe = create_cafe(&state.db, "Kissa").await;
        let (name, value) = session_header(&state, "root@example.com").await;
        let admin = |request: axum_test::TestRequest| request.add_header(name.clone(), value.clone());

        let response = admin(server.get("/admin/api/users?roleType=admin")).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["total_count"], 1);
        assert_eq!(body.data["items"][0]["email"], "root@example.com");
        assert!(body.data["items"][0].get("password").is_none());

        let response = admin(server.put(&format!("/admin/api/users/{}/status?status=banned", alice.id))).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["status"], "banned");

        admin(server.put(&format!("/admin/api/users/{}/status?status=banned", root.id)))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        // A live session of the banned user stops working
        let (alice_name, alice_value) = session_header(&state, "alice@example.com").await;
        let response = server
            .post(&format!("/cafes/{}/reviews", cafe.id))
            .add_header(alice_name, alice_value)
            .form(&review_form(5, "Banned review"))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "ACCOUNT_BANNED");

        let login = LoginForm {
            email: "alice@example.com".to_string(),
            password: TEST_PASSWORD.to_string(),
        };
        let response = server.post("/login").form(&login).await;
        response.assert_status(StatusCode::FORBIDDEN);

        let response = admin(server.get("/admin/api/users?status=banned")).await;
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["total_count"], 1);

        admin(server.put(&format!("/admin/api/users/{}/status?status=active", alice.id)))
            .await
            .assert_status(StatusCode::OK);
        server.post("/login").form(&login).await.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_profile_update() {
        let (app, state) = setup_test_app_with_state().await;
        let server = TestServer::new(app).unwrap();
        create_customer(&state, "Alice", "alice@example.com").await;

        server.get("/api/profile").await.assert_status(StatusCode::UNAUTHORIZED);

        let (name, value) = session_header(&state, "alice@example.com").await;
        let response = server
            .put("/api/profile")
            .add_header(name.clone(), value.clone())
            .json(&json!({ "name": "Alice Liddell", "dob": "1990-04-01" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["name"], "Alice Liddell");
        assert_eq!(body.data["dob"], "1990-04-01");

        let response = server
            .put("/api/profile")
            .add_header(name.clone(), value.clone())
            .json(&json!({ "dob": "2999-01-01" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server.get("/api/profile").add_header(name, value).await;
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["name"], "Alice Liddell");
        assert_eq!(body.data["role"], "customer");
    }
}
