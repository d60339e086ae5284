//! Snapshot-owning repository over the KPI version collection. Screens used
//! to re-fetch and re-filter ad-hoc arrays on every focus; here the fetched
//! collection lives in one place as an immutable snapshot, and every view is
//! a pure query over that snapshot. Refreshing swaps the whole snapshot;
//! readers holding the previous `Arc` keep a consistent view.

use crate::errors::AppResult;
use crate::kpi::KpiApi;
use crate::models::{KpiCategory, KpiFilters, KpiRecord};
use crate::normalize::normalize_kpi;
use crate::reconcile::{build_series, filter_by_category, select_current_per_name, SeriesPoint};
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct KpiRepository<A: KpiApi> {
    api: A,
    snapshot: RwLock<Arc<Vec<KpiRecord>>>,
}

impl<A: KpiApi> KpiRepository<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            snapshot: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Re-fetches the full version collection and replaces the snapshot.
    /// Returns the number of version records now held. On failure the
    /// previous snapshot stays in place.
    pub async fn refresh(&self) -> AppResult<usize> {
        let response = self.api.list_kpis(&KpiFilters::default()).await?;
        let records: Vec<KpiRecord> = response.results.iter().map(normalize_kpi).collect();
        let count = records.len();
        *self.snapshot.write().await = Arc::new(records);
        tracing::debug!(count, "kpi snapshot refreshed");
        Ok(count)
    }

    pub async fn snapshot(&self) -> Arc<Vec<KpiRecord>> {
        self.snapshot.read().await.clone()
    }

    /// Dashboard view: the current version of every distinct metric name.
    pub async fn current_per_name(&self) -> Vec<KpiRecord> {
        select_current_per_name(&self.snapshot().await)
    }

    /// Chart view: the chronological series for one metric name.
    pub async fn series(&self, name: &str) -> Vec<SeriesPoint> {
        build_series(&self.snapshot().await, name)
    }

    /// Category-detail view: current-per-name within one category.
    pub async fn by_category(&self, category: KpiCategory) -> Vec<KpiRecord> {
        filter_by_category(&self.snapshot().await, category)
    }

    /// Dashboard view scoped to one owner.
    pub async fn for_owner(&self, owner_id: i64) -> Vec<KpiRecord> {
        let snapshot = self.snapshot().await;
        let owned: Vec<KpiRecord> = snapshot
            .iter()
            .filter(|record| record.owner_id == Some(owner_id))
            .cloned()
            .collect();
        select_current_per_name(&owned)
    }
}
