use crate::{
    api::{
        attendance, dashboard, device, division, employee, monitor, office, on_leave,
        unknown_serial,
    },
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter config
    fn build_conf(requests_per_min: u32) -> GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware> {
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

    let login_conf = build_conf(config.rate_login_per_min);
    let register_conf = build_conf(config.rate_register_per_min);
    let refresh_conf = build_conf(config.rate_refresh_per_min);
    let monitor_conf = build_conf(config.rate_monitor_per_min);
    let protected_conf = build_conf(config.rate_protected_per_min);

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(Governor::new(&login_conf))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(Governor::new(&register_conf))
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(Governor::new(&refresh_conf))
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(Governor::new(&login_conf))
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // The broker relay authenticates with its subscription, not a JWT, so
    // /monitor stays outside the auth scope behind its own limiter.
    cfg.service(
        web::resource("/monitor")
            .wrap(Governor::new(&monitor_conf))
            .route(web::get().to(monitor::get_monitor))
            .route(web::post().to(monitor::post_monitor)),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(Governor::new(&protected_conf)) // rate limiting
            .service(handlers::protected)
            .service(
                web::scope("/attendances")
                    .service(
                        web::resource("")
                            .route(web::post().to(attendance::record_scan))
                            .route(web::get().to(attendance::list_attendances)),
                    )
                    .service(
                        web::resource("/replay").route(web::post().to(attendance::replay_scan)),
                    )
                    .service(
                        web::resource("/rank").route(web::get().to(attendance::rank_attendance)),
                    )
                    .service(
                        web::resource("/report/individual")
                            .route(web::get().to(attendance::individual_report)),
                    )
                    .service(
                        web::resource("/today/{employee_id}")
                            .route(web::get().to(attendance::today_attendance)),
                    )
                    .service(
                        web::resource("/{id}").route(web::get().to(attendance::get_attendance)),
                    ),
            )
            .service(
                web::scope("/employees")
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    .service(
                        web::resource("/supervised")
                            .route(web::get().to(employee::supervised_employees)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::get().to(employee::get_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/offices")
                    .service(
                        web::resource("")
                            .route(web::post().to(office::create_office))
                            .route(web::get().to(office::list_offices)),
                    )
                    .service(
                        web::resource("/{id}/divisions")
                            .route(web::get().to(division::divisions_by_office)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(office::update_office))
                            .route(web::get().to(office::get_office))
                            .route(web::delete().to(office::delete_office)),
                    ),
            )
            .service(
                web::scope("/divisions")
                    .service(
                        web::resource("")
                            .route(web::post().to(division::create_division))
                            .route(web::get().to(division::list_divisions)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(division::update_division))
                            .route(web::get().to(division::get_division))
                            .route(web::delete().to(division::delete_division)),
                    ),
            )
            .service(
                web::scope("/devices")
                    .service(
                        web::resource("")
                            .route(web::post().to(device::create_device))
                            .route(web::get().to(device::list_devices)),
                    )
                    .service(
                        web::resource("/{device_code}")
                            .route(web::put().to(device::update_device))
                            .route(web::get().to(device::get_device))
                            .route(web::delete().to(device::delete_device)),
                    ),
            )
            .service(
                web::scope("/on-leave")
                    .service(
                        web::resource("")
                            .route(web::post().to(on_leave::create_leave))
                            .route(web::get().to(on_leave::list_leaves)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(on_leave::get_leave))
                            .route(web::delete().to(on_leave::delete_leave)),
                    ),
            )
            .service(
                web::scope("/unknown-serials")
                    .service(
                        web::resource("").route(web::get().to(unknown_serial::list_unknown_serials)),
                    )
                    .service(
                        web::resource("/by-serial/{serial_id}")
                            .route(web::get().to(unknown_serial::get_unknown_serial)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(unknown_serial::update_unknown_serial))
                            .route(web::delete().to(unknown_serial::delete_unknown_serial)),
                    ),
            )
            .service(
                web::scope("/dashboard")
                    .service(web::resource("").route(web::get().to(dashboard::summary)))
                    .service(web::resource("/chart").route(web::get().to(dashboard::chart))),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)
//
// SCAN EVENT
//  └─ broker → POST /monitor → gateway → engine → ack
