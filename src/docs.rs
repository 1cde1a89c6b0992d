use crate::api::attendance::{Absent, PointageJour, PointageJourResponse};
use crate::api::badge::{BadgeCheckRequest, BadgeCheckResponse, BadgeEmployee};
use crate::api::chantier::CreateChantier;
use crate::api::client::CreateClient;
use crate::api::conge::{
    CongeFilter, CongeListResponse, CongeResponse, CreateConge, DecisionConge, TypeConge,
};
use crate::api::devis::CreateDevis;
use crate::api::employee::CreateEmploye;
use crate::api::facture::CreateFacture;
use crate::api::lead::CreateLead;
use crate::api::paie::{
    CreateFichePaie, FichePaieListResponse, FichePaieQuery, FichePaieResponse,
};
use crate::badge::ledger::BadgeSlot;
use crate::badge::notify::BadgeNotification;
use crate::model::chantier::Chantier;
use crate::model::client::Client;
use crate::model::devis::Devis;
use crate::model::employee::Employe;
use crate::model::facture::Facture;
use crate::model::lead::Lead;
use crate::utils::stats_cache::DashboardStats;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Globibat Back Office API",
        version = "1.0.0",
        description = r#"
## Globibat — gestion d'entreprise de construction

Back office for a construction company: CRM (clients, chantiers, devis,
factures, leads), employee directory, HR (congés, paie) and the employee
badge time-clock.

### Badge
`POST /api/badge/check` is the public kiosk endpoint: an employee types a
matricule, the system records the next daily checkpoint (arrival, midday
break, afternoon return, evening departure), flags lateness and computes
worked hours at the end of the day. `GET /api/badge/stream` pushes live
badge events to the dashboard as Server-Sent Events.

### Sécurité
Back-office endpoints require a JWT bearer token from `/auth/login`.
The badge endpoints are public by design (kiosks have no credentials)
and are rate limited per IP instead.
"#,
    ),
    paths(
        crate::api::badge::badge_check,
        crate::api::badge::badge_stream,
        crate::api::attendance::list_pointages,

        crate::api::employee::create_employe,
        crate::api::employee::get_employe,
        crate::api::employee::list_employes,
        crate::api::employee::update_employe,
        crate::api::employee::deactivate_employe,

        crate::api::client::create_client,
        crate::api::client::list_clients,
        crate::api::client::update_client,
        crate::api::client::deactivate_client,

        crate::api::chantier::create_chantier,
        crate::api::chantier::list_chantiers,
        crate::api::chantier::update_chantier,

        crate::api::devis::create_devis,
        crate::api::devis::list_devis,

        crate::api::facture::create_facture,
        crate::api::facture::list_factures,

        crate::api::lead::create_lead,
        crate::api::lead::list_leads,
        crate::api::lead::update_lead,

        crate::api::conge::list_conges,
        crate::api::conge::create_conge,
        crate::api::conge::approve_conge,
        crate::api::conge::reject_conge,

        crate::api::paie::create_fiche_paie,
        crate::api::paie::list_fiches_paie,
        crate::api::paie::get_fiche_paie,

        crate::api::stats::get_dashboard_stats
    ),
    components(
        schemas(
            BadgeSlot,
            BadgeCheckRequest,
            BadgeCheckResponse,
            BadgeEmployee,
            BadgeNotification,
            PointageJour,
            PointageJourResponse,
            Absent,
            Employe,
            CreateEmploye,
            Client,
            CreateClient,
            Chantier,
            CreateChantier,
            Devis,
            CreateDevis,
            Facture,
            CreateFacture,
            Lead,
            CreateLead,
            TypeConge,
            CreateConge,
            CongeFilter,
            CongeResponse,
            CongeListResponse,
            DecisionConge,
            CreateFichePaie,
            FichePaieResponse,
            FichePaieQuery,
            FichePaieListResponse,
            DashboardStats
        )
    ),
    tags(
        (name = "Badge", description = "Employee time-clock"),
        (name = "Employes", description = "Employee directory"),
        (name = "CRM", description = "Clients, chantiers, devis, factures, leads"),
        (name = "RH", description = "Congés and paie"),
        (name = "Stats", description = "Dashboard counters"),
    )
)]
pub struct ApiDoc;
