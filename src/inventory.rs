use crate::api::{endpoints, ApiClient};
use crate::errors::AppResult;
use crate::models::{
    Category, CategoryCreate, InventoryOverview, Product, ProductCreate, Transaction,
    TransactionCreate,
};

/// The inventory endpoints behind a seam so tests can script them;
/// [`HttpInventoryApi`] is the production implementation.
#[allow(async_fn_in_trait)]
pub trait InventoryApi: Send + Sync {
    async fn list_categories(&self) -> AppResult<Vec<Category>>;
    async fn create_category(&self, payload: &CategoryCreate) -> AppResult<Category>;
    async fn list_products(&self, category_id: Option<i64>) -> AppResult<Vec<Product>>;
    async fn get_product(&self, id: i64) -> AppResult<Product>;
    async fn create_product(&self, payload: &ProductCreate) -> AppResult<Product>;
    async fn list_transactions(&self, product_id: Option<i64>) -> AppResult<Vec<Transaction>>;
    async fn create_transaction(&self, payload: &TransactionCreate) -> AppResult<Transaction>;
}

#[derive(Clone)]
pub struct HttpInventoryApi {
    client: ApiClient,
}

impl HttpInventoryApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl InventoryApi for HttpInventoryApi {
    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.client
            .get_json(endpoints::INVENTORY_CATEGORIES, &[])
            .await
    }

    async fn create_category(&self, payload: &CategoryCreate) -> AppResult<Category> {
        self.client
            .post_json(endpoints::INVENTORY_CATEGORIES, payload)
            .await
    }

    async fn list_products(&self, category_id: Option<i64>) -> AppResult<Vec<Product>> {
        let mut query = Vec::new();
        if let Some(category_id) = category_id {
            query.push(("category_id", category_id.to_string()));
        }
        self.client
            .get_json(endpoints::INVENTORY_PRODUCTS, &query)
            .await
    }

    async fn get_product(&self, id: i64) -> AppResult<Product> {
        let path = format!("{}/{}", endpoints::INVENTORY_PRODUCTS, id);
        self.client.get_json(&path, &[]).await
    }

    async fn create_product(&self, payload: &ProductCreate) -> AppResult<Product> {
        self.client
            .post_json(endpoints::INVENTORY_PRODUCTS, payload)
            .await
    }

    async fn list_transactions(&self, product_id: Option<i64>) -> AppResult<Vec<Transaction>> {
        let mut query = Vec::new();
        if let Some(product_id) = product_id {
            query.push(("product_id", product_id.to_string()));
        }
        self.client
            .get_json(endpoints::INVENTORY_TRANSACTIONS, &query)
            .await
    }

    async fn create_transaction(&self, payload: &TransactionCreate) -> AppResult<Transaction> {
        self.client
            .post_json(endpoints::INVENTORY_TRANSACTIONS, payload)
            .await
    }
}

/// Thin CRUD wrappers for the inventory module. No reconciliation here: these
/// are plain resources with referential relations (a category has products, a
/// product has transactions).
#[derive(Clone)]
pub struct InventoryService<A: InventoryApi> {
    api: A,
}

impl InventoryService<HttpInventoryApi> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            api: HttpInventoryApi::new(client),
        }
    }
}

impl<A: InventoryApi> InventoryService<A> {
    pub fn with_api(api: A) -> Self {
        Self { api }
    }

    pub async fn categories(&self) -> AppResult<Vec<Category>> {
        self.api.list_categories().await
    }

    pub async fn create_category(&self, payload: &CategoryCreate) -> AppResult<Category> {
        self.api.create_category(payload).await
    }

    pub async fn products(&self, category_id: Option<i64>) -> AppResult<Vec<Product>> {
        self.api.list_products(category_id).await
    }

    pub async fn product_detail(&self, id: i64) -> AppResult<Product> {
        self.api.get_product(id).await
    }

    pub async fn create_product(&self, payload: &ProductCreate) -> AppResult<Product> {
        self.api.create_product(payload).await
    }

    pub async fn transactions(&self, product_id: Option<i64>) -> AppResult<Vec<Transaction>> {
        self.api.list_transactions(product_id).await
    }

    pub async fn create_transaction(&self, payload: &TransactionCreate) -> AppResult<Transaction> {
        self.api.create_transaction(payload).await
    }

    /// Landing-view fetch: categories and products in parallel. The two
    /// requests are independent and independently awaited; either failure
    /// fails the overview as a whole.
    pub async fn overview(&self) -> AppResult<InventoryOverview> {
        let (categories, products) =
            tokio::join!(self.api.list_categories(), self.api.list_products(None));
        Ok(InventoryOverview {
            categories: categories?,
            products: products?,
        })
    }
}
