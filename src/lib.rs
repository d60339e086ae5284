//! Client core for the VectorKPI dashboard.
//!
//! The backend stores every KPI update as a new immutable version record and
//! does no most-recent filtering, so reconciliation is entirely the client's
//! job: this crate normalizes the raw records, collapses them to the current
//! value per metric name, rebuilds historical series for charting, and owns
//! the snapshot the dashboard screens query. It also carries the typed REST
//! services (auth, KPIs, inventory) those screens call.

mod api;
mod auth;
mod errors;
mod inventory;
mod kpi;
mod models;
mod normalize;
mod reconcile;
mod repository;

pub use api::{endpoints, ApiClient, TokenStore};
pub use auth::{AuthApi, AuthService, HttpAuthApi};
pub use errors::{AppError, AppResult};
pub use inventory::{HttpInventoryApi, InventoryApi, InventoryService};
pub use kpi::{HttpKpiApi, KpiApi, KpiService};
pub use models::{
    Category, CategoryCreate, ClientConfig, DeleteFailure, DeleteReport, InventoryOverview,
    KpiCategory, KpiCreate, KpiFilters, KpiListResponse, KpiRecord, KpiTrend, Product,
    ProductCreate, RawKpi, Token, Transaction, TransactionCreate, TransactionType, User,
};
pub use normalize::{normalize_kpi, normalize_kpi_at, parse_timestamp, progress_for};
pub use reconcile::{
    build_series, filter_by_category, select_current_per_name, SeriesPoint, Versioned,
};
pub use repository::KpiRepository;

/// Installs the fmt subscriber with `RUST_LOG`-style filtering. Safe to call
/// more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
