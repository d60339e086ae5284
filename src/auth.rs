use crate::api::{endpoints, ApiClient, TokenStore};
use crate::errors::AppResult;
use crate::models::{Token, User};

/// The auth endpoints behind a seam so tests can script them; [`HttpAuthApi`]
/// is the production implementation.
#[allow(async_fn_in_trait)]
pub trait AuthApi: Send + Sync {
    async fn request_token(&self, username: &str, password: &str) -> AppResult<Token>;
    async fn fetch_current_user(&self) -> AppResult<User>;
}

#[derive(Clone)]
pub struct HttpAuthApi {
    client: ApiClient,
}

impl HttpAuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl AuthApi for HttpAuthApi {
    async fn request_token(&self, username: &str, password: &str) -> AppResult<Token> {
        self.client
            .post_form(
                endpoints::AUTH_TOKEN,
                &[("username", username), ("password", password)],
            )
            .await
    }

    async fn fetch_current_user(&self) -> AppResult<User> {
        self.client.get_json(endpoints::USERS_ME, &[]).await
    }
}

/// Login/logout against the OAuth2 password endpoint. On success the bearer
/// token lands in the shared [`TokenStore`], so every later call through the
/// same client is authenticated.
#[derive(Clone)]
pub struct AuthService<A: AuthApi> {
    api: A,
    tokens: TokenStore,
}

impl AuthService<HttpAuthApi> {
    pub fn new(client: ApiClient) -> Self {
        let tokens = client.tokens();
        Self {
            api: HttpAuthApi::new(client),
            tokens,
        }
    }
}

impl<A: AuthApi> AuthService<A> {
    pub fn with_api(api: A, tokens: TokenStore) -> Self {
        Self { api, tokens }
    }

    pub async fn login(&self, username: &str, password: &str) -> AppResult<Token> {
        let token = self.api.request_token(username, password).await?;
        self.tokens.set(token.access_token.clone()).await;
        tracing::debug!(username, "login succeeded");
        Ok(token)
    }

    pub async fn logout(&self) {
        self.tokens.clear().await;
    }

    pub async fn current_user(&self) -> AppResult<User> {
        self.api.fetch_current_user().await
    }
}
