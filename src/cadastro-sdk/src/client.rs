use crate::SdkError;

/// HTTP client for the Cadastro Admin API
pub struct CadastroClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl CadastroClient {
    /// Create a new client pointing at the given base URL. Without a
    /// token, requests are sent unauthenticated and fail server-side.
    pub fn new(base_url: &str) -> Self {
        Self::with_token(base_url, None)
    }

    /// Create a new client with an optional stored bearer token
    pub fn with_token(base_url: &str, token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            http: reqwest::Client::new(),
        }
    }

    /// Replace the bearer token used for subsequent requests
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        let builder = self.http.request(method, url);
        // An absent token omits the header entirely; the server answers 401
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a GET request and deserialize the response
    pub(crate) async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, SdkError> {
        let resp = self.request(reqwest::Method::GET, path).send().await?;
        handle_response(resp).await
    }

    /// Send a GET request with query parameters and deserialize the response
    pub(crate) async fn get_with_query<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SdkError> {
        let resp = self
            .request(reqwest::Method::GET, path)
            .query(query)
            .send()
            .await?;
        handle_response(resp).await
    }

    /// Send a POST request with a JSON body and deserialize the response
    pub(crate) async fn post<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, SdkError> {
        let resp = self
            .request(reqwest::Method::POST, path)
            .json(body)
            .send()
            .await?;
        handle_response(resp).await
    }

    /// Send a POST request and return the raw response bytes (downloads)
    pub(crate) async fn post_binary<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Vec<u8>, SdkError> {
        let resp = self
            .request(reqwest::Method::POST, path)
            .json(body)
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(resp.bytes().await?.to_vec())
        } else {
            Err(error_from_response(resp).await)
        }
    }

    /// Send a PUT request with a JSON body and deserialize the response
    pub(crate) async fn put<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, SdkError> {
        let resp = self
            .request(reqwest::Method::PUT, path)
            .json(body)
            .send()
            .await?;
        handle_response(resp).await
    }

    /// Send a DELETE request, expecting no response body
    pub(crate) async fn delete(&self, path: &str) -> Result<(), SdkError> {
        let resp = self.request(reqwest::Method::DELETE, path).send().await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(resp).await)
        }
    }
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, SdkError> {
    if resp.status().is_success() {
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    } else {
        Err(error_from_response(resp).await)
    }
}

async fn error_from_response(resp: reqwest::Response) -> SdkError {
    let status = resp.status().as_u16();
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<cadastro_api::ApiError>(&text)
        .map(|e| e.message)
        .unwrap_or(text);
    SdkError::Api { status, message }
}
