pub mod attendance;
pub mod badge;
pub mod chantier;
pub mod client;
pub mod conge;
pub mod devis;
pub mod employee;
pub mod facture;
pub mod lead;
pub mod paie;
pub mod stats;
