use chrono::NaiveTime;
use dotenvy::dotenv;
use std::env;

use crate::badge::ledger::Thresholds;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_badge_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    /// Arrivals strictly after these times of day are flagged late.
    pub seuil_retard_matin: NaiveTime,
    pub seuil_retard_apres_midi: NaiveTime,

    /// Badge broadcast channel; None disables the live stream.
    pub badge_stream_capacity: Option<usize>,
}

fn parse_time(var: &str, default: &str) -> NaiveTime {
    let raw = env::var(var).unwrap_or_else(|_| default.to_string());
    NaiveTime::parse_from_str(&raw, "%H:%M")
        .unwrap_or_else(|_| panic!("{} must be HH:MM, got {:?}", var, raw))
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            access_token_ttl: env::var("ACCESS_TOKEN_TTL")
                .unwrap_or_else(|_| "43200".to_string()) // 12h, back-office day
                .parse()
                .unwrap(),

            rate_login_per_min: env::var("RATE_LOGIN_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_badge_per_min: env::var("RATE_BADGE_PER_MIN")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .unwrap(),
            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            seuil_retard_matin: parse_time("SEUIL_RETARD_MATIN", "09:00"),
            seuil_retard_apres_midi: parse_time("SEUIL_RETARD_APRES_MIDI", "14:00"),

            badge_stream_capacity: match env::var("BADGE_STREAM_CAPACITY")
                .unwrap_or_else(|_| "64".to_string())
                .parse::<usize>()
                .unwrap()
            {
                0 => None,
                n => Some(n),
            },
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            matin: self.seuil_retard_matin,
            apres_midi: self.seuil_retard_apres_midi,
        }
    }
}
