mod assignment;
mod capture;
mod config;
mod db;
mod error;
mod handlers;
mod leaderboard;
mod logging;
mod models;
mod review_queue;
mod services;
mod validation;

use capture::FixedClassifier;
use config::ServerConfig;
use db::Db;
use error::AppError;
use handlers::{AppState, VOLUNTEER_HEADER};
use ntex::web;
use ntex_cors::Cors;
use std::sync::Arc;

#[ntex::main]
async fn main() -> std::io::Result<()> {
    let config = ServerConfig::from_env();
    logging::init(&config.log_filter);

    let addr = config.bind_addr();
    let seeded = config.seed;
    let state = build_state(config).map_err(|e| std::io::Error::other(e.to_string()))?;

    tracing::info!(%addr, seeded, "T-COAST server starting");

    web::HttpServer::new(move || {
        let origin = state.config.cors_origin.clone();
        web::App::new()
            .state(state.clone())
            .wrap(
                Cors::new()
                    .allowed_origin(&origin)
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec!["Content-Type", VOLUNTEER_HEADER])
                    .max_age(3600)
                    .finish(),
            )
            .configure(routes)
            .default_service(web::route().to(not_found))
    })
    .bind(addr)?
    .run()
    .await
}

fn build_state(config: ServerConfig) -> Result<Arc<AppState>, AppError> {
    let db = if config.seed {
        Db::open_seeded()?
    } else {
        Db::open_in_memory()?
    };
    let classifier = FixedClassifier::default().with_latency(config.classify_delay);
    Ok(Arc::new(AppState {
        db,
        config,
        classifier: Box::new(classifier),
    }))
}

fn routes(cfg: &mut web::ServiceConfig) {
    use handlers::{
        accounts, dashboard, hotspots, notifications, reports, schedules, settings, tasks,
        volunteers,
    };

    cfg.route("/api/health", web::get().to(health))
        // Registration
        .route("/api/register", web::post().to(accounts::register_volunteer))
        .route("/api/coordinator-register", web::post().to(accounts::register_coordinator))
        // Volunteer
        .route("/api/volunteer", web::get().to(dashboard::volunteer_dashboard))
        .route("/api/volunteer/report/capture", web::post().to(reports::capture))
        .route("/api/volunteer/report/{session}", web::get().to(reports::get_session))
        .route("/api/volunteer/report/{session}/retake", web::post().to(reports::retake))
        .route("/api/volunteer/report/{session}/submit", web::post().to(reports::submit))
        .route("/api/volunteer/reports", web::get().to(reports::history))
        .route("/api/volunteer/reports/{id}", web::delete().to(reports::delete_report))
        .route("/api/volunteer/reports/{id}/photo", web::get().to(reports::photo))
        .route("/api/volunteer/profile", web::get().to(volunteers::profile))
        .service(
            web::resource("/api/volunteer/settings")
                .route(web::get().to(settings::volunteer_settings))
                .route(web::put().to(settings::update_volunteer_settings)),
        )
        .route("/api/volunteer/task/{id}", web::get().to(tasks::details))
        .route("/api/volunteer/task/{id}/complete", web::post().to(tasks::complete))
        .route("/api/volunteer/history", web::get().to(tasks::history))
        .service(
            web::resource("/api/volunteer/history/{log_id}")
                .route(web::put().to(tasks::edit_log))
                .route(web::delete().to(tasks::delete_log)),
        )
        .route("/api/volunteer/leaderboard", web::get().to(handlers::leaderboard::volunteer_leaderboard))
        .route("/api/volunteer/notifications", web::get().to(notifications::list_notifications))
        .route("/api/volunteer/notifications/read-all", web::post().to(notifications::mark_all_read))
        .route("/api/volunteer/notifications/{id}/read", web::post().to(notifications::mark_read))
        .route("/api/volunteer/notifications/{id}", web::delete().to(notifications::delete_notification))
        // Coordinator
        .route("/api/coordinator", web::get().to(dashboard::coordinator_dashboard))
        .route("/api/coordinator/hotspots", web::get().to(hotspots::list_hotspots))
        .route("/api/coordinator/reports", web::get().to(reports::review_queue))
        .route("/api/coordinator/reports/verify", web::post().to(reports::verify))
        .route("/api/coordinator/reports/reject", web::post().to(reports::reject))
        .route("/api/coordinator/reports/triage", web::post().to(reports::triage))
        .route("/api/coordinator/tasks", web::get().to(tasks::review_queue))
        .route("/api/coordinator/tasks/triage", web::post().to(tasks::triage))
        .route("/api/coordinator/tasks/{id}/verify", web::post().to(tasks::verify))
        .route("/api/coordinator/tasks/{id}/reject", web::post().to(tasks::reject))
        .service(
            web::resource("/api/coordinator/schedules")
                .route(web::get().to(schedules::list_schedules))
                .route(web::post().to(schedules::create_schedule)),
        )
        .service(
            web::resource("/api/coordinator/schedules/{id}")
                .route(web::put().to(schedules::update_schedule))
                .route(web::delete().to(schedules::delete_schedule)),
        )
        .route(
            "/api/coordinator/schedules/{id}/volunteers/{volunteer_id}",
            web::post().to(schedules::toggle_volunteer),
        )
        .route("/api/coordinator/schedules/{id}/auto-assign", web::post().to(schedules::auto_assign))
        .route("/api/coordinator/volunteers", web::get().to(volunteers::list_volunteers))
        .route(
            "/api/coordinator/volunteers/{volunteer_id}/history",
            web::get().to(volunteers::volunteer_history),
        )
        .route("/api/coordinator/registrations", web::get().to(accounts::list_registrations))
        .route(
            "/api/coordinator/registrations/{id}/approve",
            web::post().to(accounts::approve_registration),
        )
        .route(
            "/api/coordinator/registrations/{id}/reject",
            web::post().to(accounts::reject_registration),
        )
        .route("/api/coordinator/leaderboard", web::get().to(handlers::leaderboard::coordinator_leaderboard))
        .route(
            "/api/coordinator/leaderboard/{volunteer_id}/reward",
            web::post().to(handlers::leaderboard::send_reward),
        )
        .service(
            web::resource("/api/coordinator/settings")
                .route(web::get().to(settings::coordinator_settings))
                .route(web::put().to(settings::update_coordinator_settings)),
        );
}

async fn health() -> web::HttpResponse {
    web::HttpResponse::Ok().json(&serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn not_found() -> web::HttpResponse {
    web::HttpResponse::NotFound().json(&serde_json::json!({ "error": "Not found" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ntex::http::StatusCode;
    use ntex::web::test;
    use serde_json::{json, Value};
    use std::time::Duration;

    fn test_state() -> Arc<AppState> {
        let config = ServerConfig {
            classify_delay: Duration::ZERO,
            ..ServerConfig::default()
        };
        build_state(config).unwrap()
    }

    async fn read_json(resp: web::WebResponse) -> Value {
        serde_json::from_slice(&test::read_body(resp).await).unwrap()
    }

    macro_rules! app {
        () => {
            test::init_service(
                web::App::new()
                    .state(test_state())
                    .configure(routes)
                    .default_service(web::route().to(not_found)),
            )
            .await
        };
    }

    #[test]
    fn test_unseeded_state_is_empty() {
        let config = ServerConfig {
            seed: false,
            ..ServerConfig::default()
        };
        let state = build_state(config).unwrap();
        let volunteers = services::volunteers::list(&state.db, &Default::default()).unwrap();
        assert!(volunteers.is_empty());
    }

    #[test]
    fn test_classifier_latency_follows_config() {
        use capture::Classifier;
        let config = ServerConfig {
            classify_delay: Duration::from_millis(1500),
            ..ServerConfig::default()
        };
        let state = build_state(config).unwrap();
        assert_eq!(state.classifier.latency(), Duration::from_millis(1500));
    }

    #[ntex::test]
    async fn test_health_and_catch_all() {
        let app = app!();
        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = read_json(resp).await;
        assert_eq!(body["status"], "ok");

        let resp = test::call_service(&app, test::TestRequest::get().uri("/nowhere").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = read_json(resp).await;
        assert_eq!(body["error"], "Not found");
    }

    #[ntex::test]
    async fn test_identity_header() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/volunteer/profile")
            .header(VOLUNTEER_HEADER, "v2")
            .to_request();
        let body: Value = read_json(test::call_service(&app, req).await).await;
        assert_eq!(body["name"], "Fatimah Zahra");
        assert_eq!(body["stats"]["rank"], 1);

        let req = test::TestRequest::get().uri("/api/volunteer/profile").to_request();
        let body: Value = read_json(test::call_service(&app, req).await).await;
        assert_eq!(body["id"], "v1");

        let req = test::TestRequest::get()
            .uri("/api/volunteer")
            .header(VOLUNTEER_HEADER, "v42")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[ntex::test]
    async fn test_capture_and_submit_report() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/api/volunteer/report/capture")
            .set_json(&json!({ "latitude": 5.31, "longitude": 103.13, "location": "Seberang Takir" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let session: Value = read_json(resp).await;
        assert_eq!(session["step"], "confirm");
        assert_eq!(session["classification"]["debris_type"], "Plastic");
        assert_eq!(session["classification"]["confidence"], 87);
        let id = session["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri(&format!("/api/volunteer/report/{}/submit", id))
            .set_json(&json!({ "quantity": "medium" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let result: Value = read_json(resp).await;
        assert_eq!(result["xp_awarded"], 10);
        assert_eq!(result["report"]["status"], "pending");

        let req = test::TestRequest::post()
            .uri(&format!("/api/volunteer/report/{}/retake", id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[ntex::test]
    async fn test_retake_at_camera_conflicts() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/api/volunteer/report/capture")
            .set_json(&json!({ "latitude": 5.31, "longitude": 103.13 }))
            .to_request();
        let session: Value = read_json(test::call_service(&app, req).await).await;
        let id = session["id"].as_str().unwrap().to_string();
        let retake = || {
            test::TestRequest::post()
                .uri(&format!("/api/volunteer/report/{}/retake", id))
                .to_request()
        };
        let resp = test::call_service(&app, retake()).await;
        let body: Value = read_json(resp).await;
        assert_eq!(body["step"], "camera");
        let resp = test::call_service(&app, retake()).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[ntex::test]
    async fn test_report_queue_bulk_verify() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/coordinator/reports?active=r2&direction=next")
            .to_request();
        let view: Value = read_json(test::call_service(&app, req).await).await;
        assert_eq!(view["active_id"], "r3");
        assert_eq!(view["pending_count"], 5);

        let req = test::TestRequest::post()
            .uri("/api/coordinator/reports/verify")
            .set_json(&json!({ "ids": ["r1", "r2", "r3"], "active": "r3" }))
            .to_request();
        let view: Value = read_json(test::call_service(&app, req).await).await;
        assert_eq!(view["pending_count"], 2);
        assert_eq!(view["active_id"], "r5");
        assert_eq!(view["message"], "3 reports verified");
    }

    #[ntex::test]
    async fn test_task_decision_twice_conflicts() {
        let app = app!();
        let verify = || {
            test::TestRequest::post()
                .uri("/api/coordinator/tasks/l1/verify")
                .to_request()
        };
        assert_eq!(test::call_service(&app, verify()).await.status(), StatusCode::OK);
        let resp = test::call_service(&app, verify()).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = read_json(resp).await;
        assert_eq!(body["error"], "Task log has already been verified");
    }

    #[ntex::test]
    async fn test_registration_flow() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/api/register")
            .set_json(&json!({
                "name": "Aisyah",
                "email": "aisyah@email.com",
                "password": "short",
                "confirm_password": "short",
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let approve = || {
            test::TestRequest::post()
                .uri("/api/coordinator/registrations/c2/approve")
                .to_request()
        };
        assert_eq!(test::call_service(&app, approve()).await.status(), StatusCode::OK);
        assert_eq!(test::call_service(&app, approve()).await.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::get()
            .uri("/api/coordinator/registrations?status=pending")
            .to_request();
        let list: Value = read_json(test::call_service(&app, req).await).await;
        assert_eq!(list.as_array().map(Vec::len), Some(1));
    }

    #[ntex::test]
    async fn test_schedule_lifecycle() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/api/coordinator/schedules")
            .set_json(&json!({
                "location": "Pantai Teluk Lipat",
                "scheduled_at": "2030-03-01T08:00",
                "debris_target_type": "Fishing Gear",
                "required_volunteers": 2,
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = read_json(resp).await;
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["understaffed"], true);

        let req = test::TestRequest::post()
            .uri(&format!("/api/coordinator/schedules/{}/auto-assign", id))
            .to_request();
        let result: Value = read_json(test::call_service(&app, req).await).await;
        assert_eq!(result["assigned"], json!(["v5", "v2"]));

        let req = test::TestRequest::post()
            .uri(&format!("/api/coordinator/schedules/{}/volunteers/v5", id))
            .to_request();
        let toggled: Value = read_json(test::call_service(&app, req).await).await;
        assert_eq!(toggled["assigned"], false);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/coordinator/schedules/{}", id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
    }

    #[ntex::test]
    async fn test_task_completion_requires_photo() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/api/volunteer/task/s1/complete")
            .set_json(&json!({ "collected_weight": 12.0, "photos": [] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/volunteer/task/s1/complete")
            .set_json(&json!({ "collected_weight": 12.0, "photos": ["/uploads/a.jpg"] }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    #[ntex::test]
    async fn test_settings_round_trip() {
        let app = app!();
        let req = test::TestRequest::put()
            .uri("/api/coordinator/settings")
            .set_json(&json!({ "auto_assign": true }))
            .to_request();
        let body: Value = read_json(test::call_service(&app, req).await).await;
        assert_eq!(body["auto_assign"], true);

        let req = test::TestRequest::get().uri("/api/volunteer/settings").to_request();
        let body: Value = read_json(test::call_service(&app, req).await).await;
        assert_eq!(body["auto_assign"], false);
        assert_eq!(body["language"], "en");
    }

    #[ntex::test]
    async fn test_notifications_and_hotspots() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/api/volunteer/notifications/read-all")
            .to_request();
        let body: Value = read_json(test::call_service(&app, req).await).await;
        assert_eq!(body["updated"], 2);

        let req = test::TestRequest::get()
            .uri("/api/coordinator/hotspots?debris_types=Plastic&min_reports=10")
            .to_request();
        let body: Value = read_json(test::call_service(&app, req).await).await;
        assert_eq!(body.as_array().map(Vec::len), Some(2));
    }
}
