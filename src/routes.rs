use crate::{
    api::{attendance, badge, chantier, client, conge, devis, employee, facture, lead, paie, stats},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

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

    // Public: auth
    cfg.service(
        web::scope("/auth").service(
            web::resource("/login")
                .wrap(build_limiter(config.rate_login_per_min))
                .route(web::post().to(handlers::login)),
        ),
    );

    // Public: the badge kiosk. No credentials, rate limited per IP.
    cfg.service(
        web::scope("/api/badge")
            .service(
                web::resource("/check")
                    .wrap(build_limiter(config.rate_badge_per_min))
                    .route(web::post().to(badge::badge_check)),
            )
            .service(web::resource("/stream").route(web::get().to(badge::badge_stream))),
    );

    // Protected back office
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(build_limiter(config.rate_protected_per_min))
            .service(
                web::resource("/register").route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/pointages").route(web::get().to(attendance::list_pointages)),
            )
            .service(
                web::scope("/employes")
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employe))
                            .route(web::get().to(employee::list_employes)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(employee::update_employe))
                            .route(web::get().to(employee::get_employe))
                            .route(web::delete().to(employee::deactivate_employe)),
                    ),
            )
            .service(
                web::scope("/clients")
                    .service(
                        web::resource("")
                            .route(web::post().to(client::create_client))
                            .route(web::get().to(client::list_clients)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(client::update_client))
                            .route(web::delete().to(client::deactivate_client)),
                    ),
            )
            .service(
                web::scope("/chantiers")
                    .service(
                        web::resource("")
                            .route(web::post().to(chantier::create_chantier))
                            .route(web::get().to(chantier::list_chantiers)),
                    )
                    .service(
                        web::resource("/{id}").route(web::put().to(chantier::update_chantier)),
                    ),
            )
            .service(
                web::scope("/devis").service(
                    web::resource("")
                        .route(web::post().to(devis::create_devis))
                        .route(web::get().to(devis::list_devis)),
                ),
            )
            .service(
                web::scope("/factures").service(
                    web::resource("")
                        .route(web::post().to(facture::create_facture))
                        .route(web::get().to(facture::list_factures)),
                ),
            )
            .service(
                web::scope("/leads")
                    .service(
                        web::resource("")
                            .route(web::post().to(lead::create_lead))
                            .route(web::get().to(lead::list_leads)),
                    )
                    .service(web::resource("/{id}").route(web::put().to(lead::update_lead))),
            )
            .service(
                web::scope("/conges")
                    .service(
                        web::resource("")
                            .route(web::get().to(conge::list_conges))
                            .route(web::post().to(conge::create_conge)),
                    )
                    .service(
                        web::resource("/{id}/approve").route(web::put().to(conge::approve_conge)),
                    )
                    .service(
                        web::resource("/{id}/reject").route(web::put().to(conge::reject_conge)),
                    ),
            )
            .service(
                web::scope("/paie")
                    .service(
                        web::resource("")
                            .route(web::post().to(paie::create_fiche_paie))
                            .route(web::get().to(paie::list_fiches_paie)),
                    )
                    .service(web::resource("/{id}").route(web::get().to(paie::get_fiche_paie))),
            )
            .service(
                web::resource("/stats/dashboard").route(web::get().to(stats::get_dashboard_stats)),
            ),
    );
}
