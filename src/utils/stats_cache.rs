use anyhow::Result;
use moka::future::Cache;
use once_cell::sync::Lazy;
use serde::Serialize;
use sqlx::MySqlPool;
use std::time::Duration;
use utoipa::ToSchema;

/// Dashboard counters are recomputed at most once per TTL window; every
/// widget on the back-office home polls them.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardStats {
    pub employes_actifs: i64,
    pub clients_actifs: i64,
    pub chantiers_en_cours: i64,
    pub leads_nouveaux: i64,
    pub factures_impayees: i64,
    /// Paid revenue (TTC) since the first of the current month.
    pub ca_mois: f64,
}

static STATS_CACHE: Lazy<Cache<&'static str, DashboardStats>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(1)
        .time_to_live(Duration::from_secs(30))
        .build()
});

const KEY: &str = "dashboard";

async fn count(pool: &MySqlPool, sql: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(sql).fetch_one(pool).await
}

async fn fetch_stats(pool: &MySqlPool) -> Result<DashboardStats, sqlx::Error> {
    let employes_actifs =
        count(pool, "SELECT COUNT(*) FROM employes WHERE actif = TRUE").await?;
    let clients_actifs = count(pool, "SELECT COUNT(*) FROM clients WHERE actif = TRUE").await?;
    let chantiers_en_cours =
        count(pool, "SELECT COUNT(*) FROM chantiers WHERE statut = 'en_cours'").await?;
    let leads_nouveaux = count(pool, "SELECT COUNT(*) FROM leads WHERE statut = 'nouveau'").await?;
    let factures_impayees = count(
        pool,
        "SELECT COUNT(*) FROM factures WHERE statut IN ('envoyee', 'retard')",
    )
    .await?;

    let ca_mois = sqlx::query_scalar::<_, Option<f64>>(
        r#"
        SELECT SUM(montant_ttc)
        FROM factures
        WHERE statut = 'payee'
          AND date_facture >= DATE_FORMAT(CURDATE(), '%Y-%m-01')
        "#,
    )
    .fetch_one(pool)
    .await?
    .unwrap_or(0.0);

    Ok(DashboardStats {
        employes_actifs,
        clients_actifs,
        chantiers_en_cours,
        leads_nouveaux,
        factures_impayees,
        ca_mois,
    })
}

/// Cached dashboard counters; recomputed on miss or expiry.
pub async fn dashboard_stats(pool: &MySqlPool) -> Result<DashboardStats, sqlx::Error> {
    if let Some(stats) = STATS_CACHE.get(KEY).await {
        return Ok(stats);
    }

    let stats = fetch_stats(pool).await?;
    STATS_CACHE.insert(KEY, stats.clone()).await;
    Ok(stats)
}

/// Prime the cache at startup so the first dashboard load is warm.
pub async fn warmup_stats_cache(pool: &MySqlPool) -> Result<()> {
    let stats = fetch_stats(pool).await?;
    STATS_CACHE.insert(KEY, stats).await;
    tracing::info!("Dashboard stats cache warmed up");
    Ok(())
}
