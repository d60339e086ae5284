use crate::api::{endpoints, ApiClient};
use crate::errors::AppResult;
use crate::models::{
    DeleteFailure, DeleteReport, KpiCreate, KpiFilters, KpiListResponse, KpiRecord, KpiTrend,
    RawKpi,
};
use crate::normalize::normalize_kpi;
use crate::reconcile::{build_series, SeriesPoint};

/// The KPI endpoints the service layer needs. Kept as a trait so tests can
/// script responses and failures without a live backend; [`HttpKpiApi`] is
/// the production implementation.
#[allow(async_fn_in_trait)]
pub trait KpiApi: Send + Sync {
    async fn list_kpis(&self, filters: &KpiFilters) -> AppResult<KpiListResponse>;
    async fn get_kpi(&self, id: i64) -> AppResult<RawKpi>;
    async fn create_kpi(&self, payload: &KpiCreate) -> AppResult<RawKpi>;
    async fn delete_kpi(&self, id: i64) -> AppResult<()>;
}

#[derive(Clone)]
pub struct HttpKpiApi {
    client: ApiClient,
}

impl HttpKpiApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl KpiApi for HttpKpiApi {
    async fn list_kpis(&self, filters: &KpiFilters) -> AppResult<KpiListResponse> {
        self.client
            .get_json(endpoints::KPIS, &filters.query())
            .await
    }

    async fn get_kpi(&self, id: i64) -> AppResult<RawKpi> {
        let path = format!("{}/{}", endpoints::KPIS, id);
        self.client.get_json(&path, &[]).await
    }

    async fn create_kpi(&self, payload: &KpiCreate) -> AppResult<RawKpi> {
        self.client.post_json(endpoints::KPIS, payload).await
    }

    async fn delete_kpi(&self, id: i64) -> AppResult<()> {
        let path = format!("{}/{}", endpoints::KPIS, id);
        self.client.delete(&path).await
    }
}

pub struct KpiService<A: KpiApi> {
    api: A,
}

impl<A: KpiApi> KpiService<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Fetches and normalizes all visible version records. The backend does
    /// no most-recent filtering; callers reconcile with
    /// [`crate::reconcile::select_current_per_name`] or go through
    /// [`crate::repository::KpiRepository`].
    pub async fn list(&self, filters: &KpiFilters) -> AppResult<Vec<KpiRecord>> {
        let response = self.api.list_kpis(filters).await?;
        Ok(response.results.iter().map(normalize_kpi).collect())
    }

    pub async fn detail(&self, id: i64) -> AppResult<KpiRecord> {
        let raw = self.api.get_kpi(id).await?;
        Ok(normalize_kpi(&raw))
    }

    pub async fn create(&self, payload: &KpiCreate) -> AppResult<KpiRecord> {
        let raw = self.api.create_kpi(payload).await?;
        tracing::debug!(kpi_id = raw.id, name = %raw.name, "kpi version created");
        Ok(normalize_kpi(&raw))
    }

    /// Publishes a new value for an existing metric. An update is never an
    /// in-place mutation: it is a brand-new version record carrying the same
    /// name and category, with the backend assigning a fresh `last_updated`.
    pub async fn record_version(
        &self,
        base: &KpiRecord,
        value: f64,
        trend: Option<KpiTrend>,
    ) -> AppResult<KpiRecord> {
        let payload = KpiCreate {
            name: base.name.clone(),
            description: base.description.clone(),
            value,
            target: base.target,
            unit: base.unit.clone(),
            category: base.category,
            trend: Some(trend.unwrap_or(base.trend)),
            owner_id: base.owner_id,
        };
        self.create(&payload).await
    }

    /// Full chronological series for one metric name, rebuilt from the flat
    /// version collection.
    pub async fn history(&self, name: &str) -> AppResult<Vec<SeriesPoint>> {
        let records = self.list(&KpiFilters::default()).await?;
        Ok(build_series(&records, name))
    }

    /// Deletes every version record sharing `name`, one DELETE per id. Not
    /// atomic: later ids are still attempted after a failure and there is no
    /// rollback, so the report lists exactly which ids went through. Only a
    /// failure of the initial listing aborts the whole operation.
    pub async fn delete_all_versions(&self, name: &str) -> AppResult<DeleteReport> {
        let response = self.api.list_kpis(&KpiFilters::default()).await?;
        let ids: Vec<i64> = response
            .results
            .iter()
            .filter(|record| record.name == name)
            .map(|record| record.id)
            .collect();

        let mut report = DeleteReport::default();
        for id in ids {
            match self.api.delete_kpi(id).await {
                Ok(()) => report.succeeded.push(id),
                Err(err) => {
                    tracing::warn!(kpi_id = id, name, error = %err, "version delete failed");
                    report.failed.push(DeleteFailure {
                        id,
                        error: err.to_string(),
                    });
                }
            }
        }

        tracing::debug!(
            name,
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "delete-all-versions finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::{KpiApi, KpiService};
    use crate::errors::{AppError, AppResult};
    use crate::models::{KpiCategory, KpiCreate, KpiFilters, KpiListResponse, RawKpi};
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct ScriptedApi {
        records: Vec<RawKpi>,
        failing_deletes: HashSet<i64>,
        delete_calls: Mutex<Vec<i64>>,
        created: Mutex<Vec<KpiCreate>>,
    }

    impl ScriptedApi {
        fn new(records: Vec<RawKpi>) -> Self {
            Self {
                records,
                failing_deletes: HashSet::new(),
                delete_calls: Mutex::new(Vec::new()),
                created: Mutex::new(Vec::new()),
            }
        }
    }

    impl KpiApi for ScriptedApi {
        async fn list_kpis(&self, _filters: &KpiFilters) -> AppResult<KpiListResponse> {
            Ok(KpiListResponse {
                count: self.records.len() as i64,
                results: self.records.clone(),
            })
        }

        async fn get_kpi(&self, id: i64) -> AppResult<RawKpi> {
            self.records
                .iter()
                .find(|record| record.id == id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("KPI {id}")))
        }

        async fn create_kpi(&self, payload: &KpiCreate) -> AppResult<RawKpi> {
            self.created.lock().expect("created lock").push(payload.clone());
            Ok(RawKpi {
                id: 99,
                name: payload.name.clone(),
                description: payload.description.clone(),
                value: Some(json!(payload.value)),
                target: payload.target.map(|target| json!(target)),
                unit: payload.unit.clone(),
                trend: payload.trend,
                category: payload.category,
                owner_id: payload.owner_id,
                last_updated: Some("2024-06-01T00:00:00Z".to_string()),
                created_at: Some("2024-01-01T00:00:00Z".to_string()),
            })
        }

        async fn delete_kpi(&self, id: i64) -> AppResult<()> {
            self.delete_calls.lock().expect("delete lock").push(id);
            if self.failing_deletes.contains(&id) {
                return Err(AppError::Api {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(())
        }
    }

    fn raw(id: i64, name: &str, value: f64, last_updated: &str) -> RawKpi {
        RawKpi {
            id,
            name: name.to_string(),
            description: None,
            value: Some(json!(value)),
            target: None,
            unit: "%".to_string(),
            trend: None,
            category: KpiCategory::Production,
            owner_id: None,
            last_updated: Some(last_updated.to_string()),
            created_at: Some("2024-01-01".to_string()),
        }
    }

    fn uptime_fixture() -> Vec<RawKpi> {
        vec![
            raw(1, "Uptime", 90.0, "2024-01-01"),
            raw(2, "Uptime", 95.0, "2024-02-01"),
            raw(3, "Downtime", 5.0, "2024-01-15"),
        ]
    }

    #[tokio::test]
    async fn delete_all_versions_issues_one_call_per_version() {
        let api = ScriptedApi::new(uptime_fixture());
        let service = KpiService::new(api);

        let report = service.delete_all_versions("Uptime").await.expect("report");
        assert_eq!(report.succeeded, vec![1, 2]);
        assert!(report.failed.is_empty());
        assert!(report.is_complete());
        assert_eq!(
            *service.api.delete_calls.lock().expect("delete lock"),
            vec![1, 2]
        );
    }

    #[tokio::test]
    async fn delete_all_versions_reports_partial_failure() {
        let mut api = ScriptedApi::new(uptime_fixture());
        api.failing_deletes.insert(2);
        let service = KpiService::new(api);

        let report = service.delete_all_versions("Uptime").await.expect("report");
        assert_eq!(report.succeeded, vec![1]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].id, 2);
        assert!(!report.is_complete());
        // Both deletes were still attempted.
        assert_eq!(
            *service.api.delete_calls.lock().expect("delete lock"),
            vec![1, 2]
        );
    }

    #[tokio::test]
    async fn record_version_reuses_name_and_category() {
        let api = ScriptedApi::new(uptime_fixture());
        let service = KpiService::new(api);
        let base = service.detail(2).await.expect("base record");

        let next = service
            .record_version(&base, 97.5, None)
            .await
            .expect("new version");
        assert_eq!(next.name, "Uptime");
        assert_eq!(next.value, 97.5);

        let created = service.api.created.lock().expect("created lock");
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].name, "Uptime");
        assert_eq!(created[0].category, KpiCategory::Production);
    }

    #[tokio::test]
    async fn history_reconstructs_the_chronological_series() {
        let api = ScriptedApi::new(uptime_fixture());
        let service = KpiService::new(api);

        let series = service.history("Uptime").await.expect("series");
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].value, 90.0);
        assert_eq!(series[1].value, 95.0);
    }
}
