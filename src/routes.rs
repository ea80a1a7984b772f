use crate::{
    api::{employee, holiday, leave_request},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(web::resource("/user").route(web::get().to(employee::current_user)))
            .service(
                web::scope("/leave")
                    // /leave/apply
                    .service(
                        web::resource("/apply")
                            .route(web::post().to(leave_request::apply_leave)),
                    )
                    // /leave/types
                    .service(
                        web::resource("/types").route(web::get().to(leave_request::leave_types)),
                    )
                    // /leave/history
                    .service(
                        web::resource("/history")
                            .route(web::get().to(leave_request::leave_history)),
                    )
                    // /leave/manager-history
                    .service(
                        web::resource("/manager-history")
                            .route(web::get().to(leave_request::manager_history)),
                    )
                    // /leave/manager/report
                    .service(
                        web::resource("/manager/report")
                            .route(web::get().to(leave_request::manager_report)),
                    )
                    // /leave/employee/report
                    .service(
                        web::resource("/employee/report")
                            .route(web::get().to(leave_request::employee_report)),
                    )
                    // /leave/requests
                    .service(
                        web::resource("/requests")
                            .route(web::get().to(leave_request::pending_requests)),
                    )
                    // /leave/requests/{id}
                    .service(
                        web::resource("/requests/{id}")
                            .route(web::patch().to(leave_request::decide_leave)),
                    )
                    // /leave/requests/{id}/cancel
                    .service(
                        web::resource("/requests/{id}/cancel")
                            .route(web::put().to(leave_request::cancel_leave)),
                    ),
            )
            .service(
                web::scope("/employees")
                    // /employees/subordinates
                    .service(
                        web::resource("/subordinates")
                            .route(web::get().to(employee::list_subordinates)),
                    )
                    // /employees/{id}/manager
                    .service(
                        web::resource("/{id}/manager")
                            .route(web::put().to(employee::assign_manager)),
                    ),
            )
            .service(
                web::scope("/holidays")
                    // /holidays
                    .service(
                        web::resource("")
                            .route(web::get().to(holiday::list_holidays))
                            .route(web::post().to(holiday::create_holiday)),
                    ),
            ),
    );
}
