//! End-to-end tests: the real router served over a loopback listener
//! with an in-memory SQLite store, driven through the SDK.

use cadastro_api::{
    ClientSearchFilters, CreateClientRequest, ExportFormat, ExportRequest, UpdateClientRequest,
};
use cadastro_sdk::{CadastroClient, SdkError};
use common::config::{Configuration, DatabaseConfig};
use common::service_bootstrap::ServiceBootstrap;
use server::{AppState, create_router};

async fn spawn_server() -> String {
    let config = Configuration {
        database: DatabaseConfig::in_memory(),
        ..Default::default()
    };

    let bootstrap = ServiceBootstrap::new(config.clone()).await.unwrap();
    bootstrap.seed_admin_user().await.unwrap();

    let state = AppState::new(bootstrap.store().clone(), config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });

    format!("http://{addr}")
}

async fn logged_in_client(base_url: &str) -> CadastroClient {
    let client = CadastroClient::new(base_url);
    let token = client
        .login("admin@cadastro.local", "admin")
        .await
        .unwrap()
        .access_token;
    CadastroClient::with_token(base_url, Some(token))
}

fn sample_request(cpf: &str, nome: &str, cidade: &str) -> CreateClientRequest {
    CreateClientRequest {
        cpf: cpf.to_string(),
        nome_completo: nome.to_string(),
        data_nascimento: None,
        sexo: Some("F".to_string()),
        nome_mae: None,
        nome_pai: None,
        email: None,
        telefone: None,
        celular: None,
        cep: None,
        endereco: None,
        numero: None,
        complemento: None,
        bairro: None,
        cidade: Some(cidade.to_string()),
        uf: Some("SP".to_string()),
        ativo: true,
    }
}

#[tokio::test]
async fn test_requests_without_token_fail_server_side() {
    let base_url = spawn_server().await;
    let client = CadastroClient::new(&base_url);

    let err = client.get_client(1).await.unwrap_err();
    match err {
        SdkError::Api { status, .. } => assert_eq!(status, 401),
        other => panic!("expected 401 API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let base_url = spawn_server().await;
    let client = CadastroClient::new(&base_url);

    let err = client
        .login("admin@cadastro.local", "wrong")
        .await
        .unwrap_err();
    match err {
        SdkError::Api { status, .. } => assert_eq!(status, 401),
        other => panic!("expected 401 API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_me_returns_seeded_admin() {
    let base_url = spawn_server().await;
    let client = logged_in_client(&base_url).await;

    let me = client.me().await.unwrap();
    assert_eq!(me.email, "admin@cadastro.local");
    assert!(me.is_admin);
    assert!(me.is_active);
}

#[tokio::test]
async fn test_unfiltered_search_returns_first_page_at_default_size() {
    let base_url = spawn_server().await;
    let client = logged_in_client(&base_url).await;

    client
        .create_client(sample_request("529.982.247-25", "Ana de Souza", "São Paulo"))
        .await
        .unwrap();
    client
        .create_client(sample_request("853.513.468-93", "Carlos Pereira", "Campinas"))
        .await
        .unwrap();

    let page = client
        .search_clients(&ClientSearchFilters::default(), None, None)
        .await
        .unwrap();

    assert_eq!(page.page, 1);
    assert_eq!(page.size, 50);
    assert_eq!(page.total, 2);
    assert_eq!(page.pages, 1);
    assert_eq!(page.items.len(), 2);
}

#[tokio::test]
async fn test_crud_flow_and_active_filter() {
    let base_url = spawn_server().await;
    let client = logged_in_client(&base_url).await;

    let created = client
        .create_client(sample_request("529.982.247-25", "Ana de Souza", "São Paulo"))
        .await
        .unwrap();
    assert_eq!(created.cpf, "529.982.247-25");

    // Duplicate CPF is rejected
    let err = client
        .create_client(sample_request("52998224725", "Outra Ana", "Santos"))
        .await
        .unwrap_err();
    match err {
        SdkError::Api { status, message } => {
            assert_eq!(status, 400);
            assert!(message.contains("CPF"));
        }
        other => panic!("expected API error, got {other:?}"),
    }

    // A search by name sees the fresh record (cache was invalidated)
    let filters = ClientSearchFilters {
        nome: Some("ana".to_string()),
        ativo: Some(true),
        ..Default::default()
    };
    let page = client.search_clients(&filters, None, None).await.unwrap();
    assert_eq!(page.total, 1);

    // Update is partial
    let updated = client
        .update_client(
            created.id_cliente,
            UpdateClientRequest {
                cidade: Some("Recife".to_string()),
                uf: Some("pe".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.cidade.as_deref(), Some("Recife"));
    assert_eq!(updated.uf.as_deref(), Some("PE"));
    assert_eq!(updated.nome_completo, "Ana de Souza");

    // Fetch sees the update, not a stale cached record
    let fetched = client.get_client(created.id_cliente).await.unwrap();
    assert_eq!(fetched.cidade.as_deref(), Some("Recife"));

    // Soft delete drops it from active-only searches
    client.delete_client(created.id_cliente).await.unwrap();
    let fetched = client.get_client(created.id_cliente).await.unwrap();
    assert!(!fetched.ativo);

    let page = client.search_clients(&filters, None, None).await.unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn test_get_missing_client_is_404() {
    let base_url = spawn_server().await;
    let client = logged_in_client(&base_url).await;

    let err = client.get_client(999).await.unwrap_err();
    match err {
        SdkError::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Client not found");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_export_formats_and_magic_bytes() {
    let base_url = spawn_server().await;
    let client = logged_in_client(&base_url).await;

    client
        .create_client(sample_request("529.982.247-25", "Ana de Souza", "São Paulo"))
        .await
        .unwrap();

    let request = |format| ExportRequest {
        format,
        filters: ClientSearchFilters {
            ativo: Some(true),
            ..Default::default()
        },
    };

    let csv = client.export_clients(&request(ExportFormat::Csv)).await.unwrap();
    assert_eq!(&csv[..3], &[0xEF, 0xBB, 0xBF]);
    assert!(String::from_utf8_lossy(&csv).contains("529.982.247-25"));

    let xlsx = client
        .export_clients(&request(ExportFormat::Excel))
        .await
        .unwrap();
    assert_eq!(&xlsx[..2], b"PK");

    let pdf = client.export_clients(&request(ExportFormat::Pdf)).await.unwrap();
    assert_eq!(&pdf[..5], b"%PDF-");
}

#[tokio::test]
async fn test_export_with_no_matches_is_404() {
    let base_url = spawn_server().await;
    let client = logged_in_client(&base_url).await;

    let err = client
        .export_clients(&ExportRequest {
            format: ExportFormat::Csv,
            filters: ClientSearchFilters {
                nome: Some("ninguém".to_string()),
                ..Default::default()
            },
        })
        .await
        .unwrap_err();

    match err {
        SdkError::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "No clients found for export");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_search_validates_pagination_bounds() {
    let base_url = spawn_server().await;
    let client = logged_in_client(&base_url).await;

    let err = client
        .search_clients(&ClientSearchFilters::default(), None, Some(500))
        .await
        .unwrap_err();
    match err {
        SdkError::Api { status, .. } => assert_eq!(status, 400),
        other => panic!("expected API error, got {other:?}"),
    }
}
