use crate::{CadastroClient, SdkError};
use cadastro_api::{
    ClientResponse, ClientSearchFilters, CreateClientRequest, ExportRequest, LoginRequest,
    PaginatedClientsResponse, TokenResponse, UpdateClientRequest, UserResponse,
};

impl CadastroClient {
    // ── Auth operations ────────────────────────────────────────────

    /// Obtain an access token for the given credentials
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, SdkError> {
        self.post(
            "/api/v1/auth/login",
            &LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            },
        )
        .await
    }

    /// Return the account behind the stored token
    pub async fn me(&self) -> Result<UserResponse, SdkError> {
        self.get("/api/v1/auth/me").await
    }

    // ── Client record operations ───────────────────────────────────

    /// Search clients; unset filters are omitted from the query string
    pub async fn search_clients(
        &self,
        filters: &ClientSearchFilters,
        page: Option<u32>,
        size: Option<u32>,
    ) -> Result<PaginatedClientsResponse, SdkError> {
        let mut query: Vec<(&str, String)> = Vec::new();

        let mut push_filter = |name: &'static str, value: &Option<String>| {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                query.push((name, value.to_string()));
            }
        };
        push_filter("cpf", &filters.cpf);
        push_filter("nome", &filters.nome);
        push_filter("cidade", &filters.cidade);
        push_filter("uf", &filters.uf);

        if let Some(ativo) = filters.ativo {
            query.push(("ativo", ativo.to_string()));
        }
        if let Some(page) = page {
            query.push(("page", page.to_string()));
        }
        if let Some(size) = size {
            query.push(("size", size.to_string()));
        }

        self.get_with_query("/api/v1/clients/search", &query).await
    }

    /// Fetch a single client by id
    pub async fn get_client(&self, id: i64) -> Result<ClientResponse, SdkError> {
        self.get(&format!("/api/v1/clients/{id}")).await
    }

    /// Register a new client
    pub async fn create_client(
        &self,
        req: CreateClientRequest,
    ) -> Result<ClientResponse, SdkError> {
        self.post("/api/v1/clients", &req).await
    }

    /// Update a client
    pub async fn update_client(
        &self,
        id: i64,
        req: UpdateClientRequest,
    ) -> Result<ClientResponse, SdkError> {
        self.put(&format!("/api/v1/clients/{id}"), &req).await
    }

    /// Soft-delete a client
    pub async fn delete_client(&self, id: i64) -> Result<(), SdkError> {
        self.delete(&format!("/api/v1/clients/{id}")).await
    }

    /// Export the filtered record set; returns the file bytes
    pub async fn export_clients(&self, req: &ExportRequest) -> Result<Vec<u8>, SdkError> {
        self.post_binary("/api/v1/clients/export", req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadastro_api::ExportFormat;
    use mockito::Matcher;

    fn client_json(id: i64) -> String {
        format!(
            r#"{{
                "id_cliente": {id},
                "cpf": "529.982.247-25",
                "nome_completo": "Ana de Souza",
                "data_nascimento": "1990-05-17",
                "sexo": "F",
                "nome_mae": null,
                "nome_pai": null,
                "email": null,
                "telefone": null,
                "celular": null,
                "cep": null,
                "endereco": null,
                "numero": null,
                "complemento": null,
                "bairro": null,
                "cidade": "São Paulo",
                "uf": "SP",
                "ativo": true,
                "created_at": "2024-03-01T14:30:00Z",
                "updated_at": null
            }}"#
        )
    }

    #[tokio::test]
    async fn test_get_client_sends_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/clients/7")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_body(client_json(7))
            .create_async()
            .await;

        let client = CadastroClient::with_token(&server.url(), Some("test-token".to_string()));
        let record = client.get_client(7).await.unwrap();

        assert_eq!(record.id_cliente, 7);
        assert_eq!(record.nome_completo, "Ana de Souza");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_token_omits_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/clients/7")
            .match_header("authorization", Matcher::Missing)
            .with_status(401)
            .with_body(r#"{"error": "authentication_error", "message": "Missing Authorization header"}"#)
            .create_async()
            .await;

        let client = CadastroClient::new(&server.url());
        let err = client.get_client(7).await.unwrap_err();

        match err {
            SdkError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Missing Authorization header");
            }
            other => panic!("expected API error, got {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_serializes_exactly_the_set_filters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/clients/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("nome".into(), "ana".into()),
                Matcher::UrlEncoded("uf".into(), "SP".into()),
                Matcher::UrlEncoded("ativo".into(), "true".into()),
                Matcher::UrlEncoded("page".into(), "2".into()),
                Matcher::UrlEncoded("size".into(), "10".into()),
            ]))
            .with_status(200)
            .with_body(format!(
                r#"{{"items": [{}], "total": 11, "page": 2, "size": 10, "pages": 2}}"#,
                client_json(1)
            ))
            .create_async()
            .await;

        let client = CadastroClient::with_token(&server.url(), Some("tok".to_string()));
        let filters = ClientSearchFilters {
            nome: Some("ana".to_string()),
            uf: Some("SP".to_string()),
            ativo: Some(true),
            // Empty strings are dropped, not sent as empty params
            cpf: Some(String::new()),
            ..Default::default()
        };
        let page = client
            .search_clients(&filters, Some(2), Some(10))
            .await
            .unwrap();

        assert_eq!(page.total, 11);
        assert_eq!(page.page, 2);
        assert_eq!(page.items.len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_login_roundtrip() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/auth/login")
            .match_body(Matcher::JsonString(
                r#"{"email": "op@cadastro.local", "password": "Secret123"}"#.to_string(),
            ))
            .with_status(200)
            .with_body(r#"{"access_token": "abc.def", "token_type": "bearer"}"#)
            .create_async()
            .await;

        let client = CadastroClient::new(&server.url());
        let token = client.login("op@cadastro.local", "Secret123").await.unwrap();

        assert_eq!(token.access_token, "abc.def");
        assert_eq!(token.token_type, "bearer");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_export_carries_format_and_filters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/clients/export")
            .match_body(Matcher::JsonString(
                r#"{"format": "csv", "filters": {"uf": "SP", "ativo": true}}"#.to_string(),
            ))
            .with_status(200)
            .with_body("ID;CPF\n")
            .create_async()
            .await;

        let client = CadastroClient::with_token(&server.url(), Some("tok".to_string()));
        let request = ExportRequest {
            format: ExportFormat::Csv,
            filters: ClientSearchFilters {
                uf: Some("SP".to_string()),
                ativo: Some(true),
                ..Default::default()
            },
        };
        let bytes = client.export_clients(&request).await.unwrap();

        assert_eq!(bytes, b"ID;CPF\n");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_client_maps_404() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/api/v1/clients/99")
            .with_status(404)
            .with_body(r#"{"error": "not_found", "message": "Client not found"}"#)
            .create_async()
            .await;

        let client = CadastroClient::with_token(&server.url(), Some("tok".to_string()));
        let err = client.delete_client(99).await.unwrap_err();

        match err {
            SdkError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Client not found");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }
}
