use crate::{
    api::{attendance, employee, leave_request},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::governor::clock::QuantaInstant;
use actix_governor::governor::middleware::NoOpMiddleware;
use actix_governor::{Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor};
use actix_web::{middleware::from_fn, web};

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(
        requests_per_min: u32,
    ) -> GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap()
    }

    let login_limiter = build_limiter(config.rate_login_per_min);
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(Governor::new(&login_limiter))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/logout")
                    .wrap(Governor::new(&login_limiter))
                    .route(web::post().to(handlers::logout)),
            )
            .service(web::resource("/session").route(web::get().to(handlers::current_session)))
            .service(
                web::resource("/change-password")
                    .wrap(Governor::new(&login_limiter))
                    .route(web::post().to(handlers::change_password)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            // authentication
            .wrap(Governor::new(&protected_limiter)) // rate limiting
            .service(
                web::scope("/employee")
                    // /employee
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employee/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::get().to(employee::get_employee)),
                    ),
            )
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // /leave/{id}
                    .service(
                        web::resource("/{id}").route(web::get().to(leave_request::get_leave)),
                    )
                    // /leave/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    // /leave/{id}/reject
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(web::resource("").route(web::get().to(attendance::list_attendance)))
                    // /attendance/check-in
                    .service(
                        web::resource("/check-in").route(web::post().to(attendance::check_in)),
                    )
                    // /attendance/check-out
                    .service(
                        web::resource("/check-out").route(web::put().to(attendance::check_out)),
                    )
                    // /attendance/status
                    .service(
                        web::resource("/status")
                            .route(web::get().to(attendance::attendance_status)),
                    ),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::store::Stores;
    use actix_web::web::Data;
    use actix_web::{App, test};
    use chrono::Utc;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn test_config() -> Config {
        Config {
            server_addr: "127.0.0.1:0".to_string(),
            data_dir: "data".to_string(),
            seed_admin_password: "admin123".to_string(),
            default_company: "Company Name".to_string(),
            rate_login_per_min: 60,
            rate_protected_per_min: 1000,
            api_prefix: "/api".to_string(),
        }
    }

    fn seeded_stores() -> Stores {
        let stores = Stores::new(Arc::new(MemoryStorage::default()));
        stores
            .identity
            .ensure_default_admin("admin123", "Company Name", Utc::now())
            .unwrap();
        stores
    }

    // The governor key extractor needs a peer address on every request.
    fn with_peer(req: test::TestRequest) -> test::TestRequest {
        req.peer_addr("127.0.0.1:8080".parse().unwrap())
    }

    macro_rules! test_app {
        () => {
            test::init_service(
                App::new()
                    .app_data(Data::new(seeded_stores()))
                    .configure(|cfg| configure(cfg, test_config())),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn login_rejects_bad_credentials() {
        let app = test_app!();

        let req = with_peer(test::TestRequest::post().uri("/auth/login"))
            .set_json(json!({"identifier": "ADMIN001", "password": "wrong"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn protected_scope_requires_a_session() {
        let app = test_app!();

        let req = with_peer(test::TestRequest::get().uri("/api/employee")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn full_admin_flow() {
        let app = test_app!();

        // Login as the seed admin, by email and case-insensitively.
        let req = with_peer(test::TestRequest::post().uri("/auth/login"))
            .set_json(json!({"identifier": "ADMIN@company.com", "password": "admin123"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["account"]["login_id"], "ADMIN001");

        // Directory holds the admin.
        let req = with_peer(test::TestRequest::get().uri("/api/employee")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["total"], 1);

        // Create an employee; the login ID is generated.
        let req = with_peer(test::TestRequest::post().uri("/api/employee"))
            .set_json(json!({
                "first_name": "John",
                "last_name": "Doe",
                "email": "flow.john@ems.test",
                "password": "jd-secret",
                "company_name": "Odoo"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let created: Value = test::read_body_json(resp).await;
        let employee_id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["login_id"].as_str().unwrap().len(), 17);

        // Duplicate email is a conflict.
        let req = with_peer(test::TestRequest::post().uri("/api/employee"))
            .set_json(json!({
                "first_name": "Jane",
                "last_name": "Doe",
                "email": "FLOW.JOHN@ems.test",
                "password": "other"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 409);

        // Check in, verify status, reject a second check-in, check out.
        let req =
            with_peer(test::TestRequest::post().uri("/api/attendance/check-in")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let req = with_peer(test::TestRequest::get().uri("/api/attendance/status")).to_request();
        let resp = test::call_service(&app, req).await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["checked_in"], true);

        let req =
            with_peer(test::TestRequest::post().uri("/api/attendance/check-in")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let req =
            with_peer(test::TestRequest::put().uri("/api/attendance/check-out")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let req = with_peer(test::TestRequest::get().uri("/api/attendance")).to_request();
        let resp = test::call_service(&app, req).await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["status"], "Checked Out");

        // Submit a leave request and approve it.
        let req = with_peer(test::TestRequest::post().uri("/api/leave"))
            .set_json(json!({
                "start_date": "2025-11-01",
                "end_date": "2025-11-03",
                "leave_type": "sick-leave",
                "reason": "flu"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let leave: Value = test::read_body_json(resp).await;
        assert_eq!(leave["days"], 3);
        let leave_id = leave["id"].as_i64().unwrap();

        let req = with_peer(
            test::TestRequest::put().uri(&format!("/api/leave/{leave_id}/approve")),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let req = with_peer(test::TestRequest::get().uri("/api/leave")).to_request();
        let resp = test::call_service(&app, req).await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"][0]["status"], "approved");

        // Re-deciding is rejected.
        let req = with_peer(
            test::TestRequest::put().uri(&format!("/api/leave/{leave_id}/reject")),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        // Unknown request id is a 404.
        let req =
            with_peer(test::TestRequest::put().uri("/api/leave/4242/approve")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);

        // The created employee profile is readable.
        let req = with_peer(
            test::TestRequest::get().uri(&format!("/api/employee/{employee_id}")),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        // Logout closes the session for the protected scope.
        let req = with_peer(test::TestRequest::post().uri("/auth/logout")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 204);

        let req = with_peer(test::TestRequest::get().uri("/api/employee")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }
}
