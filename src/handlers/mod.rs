mod admin;
mod ai;
mod auth;
mod exams;
mod pages;
mod planner;
mod progress;
mod reports;

use actix_web::web;

/// Registers every route of the service. Shared by the binary and the
/// integration tests so both run the same router.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(pages::serve_homepage))
        .route("/health", web::get().to(pages::health_check))
        .route("/schema.sql", web::get().to(pages::schema_sql))
        .route("/auth/login", web::post().to(auth::login))
        .route("/auth/register", web::post().to(auth::register))
        .service(
            web::resource("/users/{id}")
                .route(web::get().to(auth::get_user))
                .route(web::put().to(auth::update_profile)),
        )
        .route("/syllabus", web::get().to(progress::get_syllabus))
        .route("/students/{id}/progress", web::get().to(progress::get_progress))
        .route(
            "/students/{id}/progress/{topic}/status",
            web::put().to(progress::set_status),
        )
        .route(
            "/students/{id}/progress/{topic}/exercises/{exercise}",
            web::put().to(progress::set_counter),
        )
        .route(
            "/students/{id}/progress/{topic}/exercises/{exercise}/adjust",
            web::post().to(progress::adjust_counter),
        )
        .route("/tests", web::get().to(exams::list_tests))
        .route("/students/{id}/sessions", web::post().to(exams::begin_session))
        .route("/sessions/{sid}", web::get().to(exams::get_session))
        .route("/sessions/{sid}/answer", web::post().to(exams::answer))
        .route("/sessions/{sid}/clear", web::post().to(exams::clear))
        .route("/sessions/{sid}/navigate", web::post().to(exams::navigate))
        .route("/sessions/{sid}/submit", web::post().to(exams::submit))
        .route("/sessions/{sid}/review", web::get().to(exams::review))
        .route("/students/{id}/attempts", web::get().to(exams::list_attempts))
        .route("/students/{id}/analytics", web::get().to(reports::student_analytics))
        .service(
            web::resource("/students/{id}/timetable")
                .route(web::get().to(planner::get_timetable))
                .route(web::put().to(planner::save_timetable)),
        )
        .route(
            "/students/{id}/timetable/preview",
            web::post().to(planner::preview_timetable),
        )
        .service(
            web::resource("/students/{id}/focus")
                .route(web::get().to(planner::get_focus))
                .route(web::post().to(planner::start_focus)),
        )
        .route("/students/{id}/focus/{action}", web::post().to(planner::focus_action))
        .route("/students/{id}/study-sessions", web::get().to(planner::study_sessions))
        .route("/parents/{id}/dashboard", web::get().to(reports::parent_dashboard))
        .route("/notifications", web::get().to(reports::list_notifications))
        .route("/assistant/motivation", web::post().to(ai::motivation))
        .route("/assistant/tip", web::post().to(ai::study_tip))
        .route("/assistant/ask", web::post().to(ai::ask))
        .service(
            web::scope("/admin")
                .route("/overview", web::get().to(reports::admin_overview))
                .service(
                    web::resource("/users")
                        .route(web::get().to(admin::list_users))
                        .route(web::post().to(admin::create_user)),
                )
                .service(
                    web::resource("/users/{id}")
                        .route(web::put().to(admin::update_user))
                        .route(web::delete().to(admin::delete_user)),
                )
                .service(
                    web::resource("/questions")
                        .route(web::get().to(admin::list_questions))
                        .route(web::post().to(admin::create_question)),
                )
                .route("/questions/import", web::post().to(admin::import_questions))
                .service(
                    web::resource("/questions/{id}")
                        .route(web::put().to(admin::update_question))
                        .route(web::delete().to(admin::delete_question)),
                )
                .service(
                    web::resource("/tests")
                        .route(web::get().to(admin::list_tests))
                        .route(web::post().to(admin::create_test)),
                )
                .service(
                    web::resource("/tests/{id}")
                        .route(web::put().to(admin::update_test))
                        .route(web::delete().to(admin::delete_test)),
                )
                .route("/attempts/export", web::get().to(admin::export_attempts))
                .route("/notifications", web::post().to(admin::create_notification))
                .route(
                    "/notifications/{id}",
                    web::delete().to(admin::delete_notification),
                ),
        );
}
