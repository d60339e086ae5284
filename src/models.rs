use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiTrend {
    Up,
    Down,
    Stable,
}

impl KpiTrend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Stable => "stable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiCategory {
    Drilling,
    Production,
    Logistics,
    Security,
    Financial,
}

impl KpiCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Drilling => "drilling",
            Self::Production => "production",
            Self::Logistics => "logistics",
            Self::Security => "security",
            Self::Financial => "financial",
        }
    }
}

/// A KPI version record exactly as the backend may hand it over. Every update
/// to a named metric lands as a new record of this shape, never an in-place
/// mutation; `value`/`target` may arrive as numbers or strings and the
/// timestamps may be missing or malformed, so the loose fields here are only
/// promoted to [`KpiRecord`] through the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawKpi {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub target: Option<serde_json::Value>,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub trend: Option<KpiTrend>,
    pub category: KpiCategory,
    #[serde(default)]
    pub owner_id: Option<i64>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Canonical, fully-typed KPI version record. For a fixed `name` the record
/// with the maximum `last_updated` is the current value; the full set sharing
/// a `name`, ordered by `last_updated`, is that metric's historical series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiRecord {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub value: f64,
    pub target: Option<f64>,
    pub unit: String,
    pub trend: KpiTrend,
    pub category: KpiCategory,
    pub owner_id: Option<i64>,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// Derived percent toward `target`, capped at 100; 0 when there is no
    /// positive target.
    pub progress: i64,
}

impl From<KpiRecord> for RawKpi {
    fn from(record: KpiRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            value: serde_json::Number::from_f64(record.value).map(serde_json::Value::Number),
            target: record
                .target
                .and_then(serde_json::Number::from_f64)
                .map(serde_json::Value::Number),
            unit: record.unit,
            trend: Some(record.trend),
            category: record.category,
            owner_id: record.owner_id,
            last_updated: Some(record.last_updated.to_rfc3339()),
            created_at: Some(record.created_at.to_rfc3339()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiListResponse {
    pub count: i64,
    pub results: Vec<RawKpi>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiCreate {
    pub name: String,
    pub description: Option<String>,
    pub value: f64,
    pub target: Option<f64>,
    pub unit: String,
    pub category: KpiCategory,
    pub trend: Option<KpiTrend>,
    pub owner_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KpiFilters {
    pub category: Option<KpiCategory>,
    pub trend: Option<KpiTrend>,
    pub owner_id: Option<i64>,
}

impl KpiFilters {
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(category) = self.category {
            params.push(("category", category.as_str().to_string()));
        }
        if let Some(trend) = self.trend {
            params.push(("trend", trend.as_str().to_string()));
        }
        if let Some(owner_id) = self.owner_id {
            params.push(("owner_id", owner_id.to_string()));
        }
        params
    }
}

/// Outcome of a multi-step delete. The operation is not atomic: every id is
/// attempted regardless of earlier failures and each failure is reported next
/// to the ids that did go through.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeleteReport {
    pub succeeded: Vec<i64>,
    pub failed: Vec<DeleteFailure>,
}

impl DeleteReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteFailure {
    pub id: i64,
    pub error: String,
}

// ─── Inventory ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: i64,
    pub sku: Option<String>,
    pub category_id: Option<i64>,
    pub owner_id: i64,
    pub category: Option<Category>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: i64,
    pub sku: Option<String>,
    pub category_id: i64,
    pub owner_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    In,
    Out,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<i64>,
    pub product: Option<Product>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionCreate {
    pub product_id: i64,
    pub quantity: i64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub reason: Option<String>,
}

/// Joint result of the concurrent category + product fetch used by the
/// inventory landing view.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryOverview {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
}

// ─── Auth ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ─── Client configuration ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/v1".to_string(),
            timeout_seconds: 10,
        }
    }
}
