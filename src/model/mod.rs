pub mod attendance;
pub mod chantier;
pub mod client;
pub mod devis;
pub mod employee;
pub mod facture;
pub mod lead;
pub mod role;
