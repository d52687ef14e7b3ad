use super::{error_response, internal_error};
use crate::cache::ResponseCache;
use crate::{ServerState, export};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use cadastro_api::{
    ApiError, ClientResponse, ClientSearchFilters, CreateClientRequest, ExportFormat,
    PaginatedClientsResponse, UpdateClientRequest,
};
use common::cpf::{format_cpf, validate_cpf};
use common::store::{ClientChanges, ClientFilters, ClientRecord, NewClient};
use serde::Deserialize;

pub fn router<S: ServerState>() -> Router<S> {
    Router::new()
        .route("/api/v1/clients/search", get(search_clients::<S>))
        .route("/api/v1/clients/export", post(export_clients::<S>))
        .route("/api/v1/clients", post(create_client::<S>))
        .route("/api/v1/clients/:client_id", get(get_client_details::<S>))
        .route("/api/v1/clients/:client_id", put(update_client::<S>))
        .route("/api/v1/clients/:client_id", delete(delete_client::<S>))
}

fn client_record_to_response(record: ClientRecord) -> ClientResponse {
    ClientResponse {
        id_cliente: record.id_cliente,
        cpf: record.cpf,
        nome_completo: record.nome_completo,
        data_nascimento: record.data_nascimento,
        sexo: record.sexo,
        nome_mae: record.nome_mae,
        nome_pai: record.nome_pai,
        email: record.email,
        telefone: record.telefone,
        celular: record.celular,
        cep: record.cep,
        endereco: record.endereco,
        numero: record.numero,
        complemento: record.complemento,
        bairro: record.bairro,
        cidade: record.cidade,
        uf: record.uf,
        ativo: record.ativo,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

fn to_store_filters(filters: &ClientSearchFilters) -> ClientFilters {
    ClientFilters {
        id_cliente: filters.id_cliente,
        cpf: filters.cpf.clone(),
        nome: filters.nome.clone(),
        cidade: filters.cidade.clone(),
        uf: filters.uf.clone(),
        ativo: filters.ativo,
    }
}

fn validate_sexo(sexo: Option<&str>) -> Result<(), String> {
    match sexo {
        None | Some("M") | Some("F") => Ok(()),
        Some(other) => Err(format!("Sexo must be 'M' or 'F', got '{other}'")),
    }
}

fn validate_uf(uf: Option<&str>) -> Result<(), String> {
    match uf {
        None => Ok(()),
        Some(value) if value.len() == 2 && value.chars().all(|c| c.is_ascii_alphabetic()) => Ok(()),
        Some(other) => Err(format!("UF must be a two-letter state code, got '{other}'")),
    }
}

fn validate_nome(nome: &str) -> Result<(), String> {
    if nome.trim().chars().count() < 3 {
        return Err("Full name must have at least 3 characters".to_string());
    }
    Ok(())
}

// ── Search ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub cpf: Option<String>,
    pub nome: Option<String>,
    pub cidade: Option<String>,
    pub uf: Option<String>,
    pub ativo: Option<bool>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

/// Search clients with filters and pagination
#[utoipa::path(
    get,
    path = "/api/v1/clients/search",
    tag = "clients",
    responses(
        (status = 200, description = "One page of matching clients", body = PaginatedClientsResponse),
        (status = 400, description = "Invalid pagination parameters", body = ApiError),
    )
)]
pub async fn search_clients<S: ServerState>(
    State(state): State<S>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let pagination = &state.config().pagination;
    let page = params.page.unwrap_or(1);
    let size = params.size.unwrap_or(pagination.default_page_size);

    if page < 1 {
        return error_response(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "Page must be at least 1",
        );
    }
    if size < 1 || size > pagination.max_page_size {
        return error_response(
            StatusCode::BAD_REQUEST,
            "validation_error",
            format!(
                "Page size must be between 1 and {}",
                pagination.max_page_size
            ),
        );
    }

    let filters = ClientFilters {
        id_cliente: None,
        cpf: params.cpf,
        nome: params.nome,
        cidade: params.cidade,
        uf: params.uf,
        ativo: params.ativo,
    };

    let cache_key = ResponseCache::search_key(&filters, page, size);
    if let Some(cached) = state.cache().get_search(&cache_key).await {
        return (StatusCode::OK, Json(cached)).into_response();
    }

    match state.store().search_clients(&filters, page, size).await {
        Ok((records, total)) => {
            let pages = total.div_ceil(size as u64) as u32;
            let response = PaginatedClientsResponse {
                items: records.into_iter().map(client_record_to_response).collect(),
                total,
                page,
                size,
                pages,
            };
            state.cache().put_search(cache_key, response.clone()).await;
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => internal_error(e),
    }
}

// ── Single record ───────────────────────────────────────────────────────

/// Fetch a single client by id
#[utoipa::path(
    get,
    path = "/api/v1/clients/{client_id}",
    tag = "clients",
    responses(
        (status = 200, description = "The client record", body = ClientResponse),
        (status = 404, description = "No such client", body = ApiError),
    )
)]
pub async fn get_client_details<S: ServerState>(
    State(state): State<S>,
    Path(client_id): Path<i64>,
) -> impl IntoResponse {
    if let Some(cached) = state.cache().get_client(client_id).await {
        return (StatusCode::OK, Json(cached)).into_response();
    }

    match state.store().get_client(client_id).await {
        Ok(Some(record)) => {
            let response = client_record_to_response(record);
            state.cache().put_client(response.clone()).await;
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(None) => error_response(StatusCode::NOT_FOUND, "not_found", "Client not found"),
        Err(e) => internal_error(e),
    }
}

// ── Mutations ───────────────────────────────────────────────────────────

/// Register a new client
#[utoipa::path(
    post,
    path = "/api/v1/clients",
    tag = "clients",
    request_body = CreateClientRequest,
    responses(
        (status = 201, description = "Client created", body = ClientResponse),
        (status = 400, description = "Validation error or duplicate CPF", body = ApiError),
    )
)]
pub async fn create_client<S: ServerState>(
    State(state): State<S>,
    Json(request): Json<CreateClientRequest>,
) -> impl IntoResponse {
    if !validate_cpf(&request.cpf) {
        return error_response(StatusCode::BAD_REQUEST, "validation_error", "Invalid CPF");
    }
    if let Err(msg) = validate_nome(&request.nome_completo) {
        return error_response(StatusCode::BAD_REQUEST, "validation_error", msg);
    }
    if let Err(msg) = validate_sexo(request.sexo.as_deref()) {
        return error_response(StatusCode::BAD_REQUEST, "validation_error", msg);
    }
    if let Err(msg) = validate_uf(request.uf.as_deref()) {
        return error_response(StatusCode::BAD_REQUEST, "validation_error", msg);
    }

    let cpf = format_cpf(&request.cpf);
    match state.store().cpf_exists(&cpf).await {
        Ok(true) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "CPF already registered",
            );
        }
        Ok(false) => {}
        Err(e) => return internal_error(e),
    }

    let new_client = NewClient {
        cpf,
        nome_completo: request.nome_completo,
        data_nascimento: request.data_nascimento,
        sexo: request.sexo,
        nome_mae: request.nome_mae,
        nome_pai: request.nome_pai,
        email: request.email,
        telefone: request.telefone,
        celular: request.celular,
        cep: request.cep,
        endereco: request.endereco,
        numero: request.numero,
        complemento: request.complemento,
        bairro: request.bairro,
        cidade: request.cidade,
        uf: request.uf.map(|uf| uf.to_uppercase()),
        ativo: request.ativo,
    };

    match state.store().insert_client(&new_client).await {
        Ok(record) => {
            state.cache().invalidate_searches();
            (
                StatusCode::CREATED,
                Json(client_record_to_response(record)),
            )
                .into_response()
        }
        Err(e) => internal_error(e),
    }
}

/// Update an existing client
#[utoipa::path(
    put,
    path = "/api/v1/clients/{client_id}",
    tag = "clients",
    request_body = UpdateClientRequest,
    responses(
        (status = 200, description = "Updated client record", body = ClientResponse),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 404, description = "No such client", body = ApiError),
    )
)]
pub async fn update_client<S: ServerState>(
    State(state): State<S>,
    Path(client_id): Path<i64>,
    Json(request): Json<UpdateClientRequest>,
) -> impl IntoResponse {
    if let Some(nome) = &request.nome_completo {
        if let Err(msg) = validate_nome(nome) {
            return error_response(StatusCode::BAD_REQUEST, "validation_error", msg);
        }
    }
    if let Err(msg) = validate_sexo(request.sexo.as_deref()) {
        return error_response(StatusCode::BAD_REQUEST, "validation_error", msg);
    }
    if let Err(msg) = validate_uf(request.uf.as_deref()) {
        return error_response(StatusCode::BAD_REQUEST, "validation_error", msg);
    }

    let changes = ClientChanges {
        nome_completo: request.nome_completo,
        data_nascimento: request.data_nascimento,
        sexo: request.sexo,
        nome_mae: request.nome_mae,
        nome_pai: request.nome_pai,
        email: request.email,
        telefone: request.telefone,
        celular: request.celular,
        cep: request.cep,
        endereco: request.endereco,
        numero: request.numero,
        complemento: request.complemento,
        bairro: request.bairro,
        cidade: request.cidade,
        uf: request.uf,
        ativo: request.ativo,
    };

    match state.store().update_client(client_id, &changes).await {
        Ok(Some(record)) => {
            state.cache().invalidate_client(client_id).await;
            state.cache().invalidate_searches();
            (StatusCode::OK, Json(client_record_to_response(record))).into_response()
        }
        Ok(None) => error_response(StatusCode::NOT_FOUND, "not_found", "Client not found"),
        Err(e) => internal_error(e),
    }
}

/// Soft-delete a client (clears the active flag)
#[utoipa::path(
    delete,
    path = "/api/v1/clients/{client_id}",
    tag = "clients",
    responses(
        (status = 204, description = "Client deactivated"),
        (status = 404, description = "No such client", body = ApiError),
    )
)]
pub async fn delete_client<S: ServerState>(
    State(state): State<S>,
    Path(client_id): Path<i64>,
) -> impl IntoResponse {
    match state.store().deactivate_client(client_id).await {
        Ok(true) => {
            state.cache().invalidate_client(client_id).await;
            state.cache().invalidate_searches();
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => error_response(StatusCode::NOT_FOUND, "not_found", "Client not found"),
        Err(e) => internal_error(e),
    }
}

// ── Export ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExportBody {
    /// Requested format name; parsed so unknown values are a 400, not a
    /// deserialization failure
    pub format: String,
    #[serde(default)]
    pub filters: ClientSearchFilters,
}

/// Export the filtered record set as a downloadable file
#[utoipa::path(
    post,
    path = "/api/v1/clients/export",
    tag = "clients",
    responses(
        (status = 200, description = "The rendered file as a binary download"),
        (status = 400, description = "Unknown export format", body = ApiError),
        (status = 404, description = "No records matched the filters", body = ApiError),
    )
)]
pub async fn export_clients<S: ServerState>(
    State(state): State<S>,
    Json(request): Json<ExportBody>,
) -> impl IntoResponse {
    let format: ExportFormat = match request.format.parse() {
        Ok(format) => format,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, "validation_error", msg),
    };

    let filters = to_store_filters(&request.filters);
    let max_records = state.config().export.max_records;

    let records = match state.store().find_clients(&filters, max_records).await {
        Ok(records) => records,
        Err(e) => return internal_error(e),
    };

    if records.is_empty() {
        return error_response(
            StatusCode::NOT_FOUND,
            "not_found",
            "No clients found for export",
        );
    }

    let responses: Vec<ClientResponse> = records.into_iter().map(client_record_to_response).collect();

    match export::render(format, &responses) {
        Ok(bytes) => {
            let filename = format!("clientes_export.{}", format.extension());
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, format.media_type().to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename={filename}"),
                    ),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) => {
            log::error!("Export rendering failed: {e}");
            internal_error(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_validate_sexo() {
        assert!(validate_sexo(None).is_ok());
        assert!(validate_sexo(Some("M")).is_ok());
        assert!(validate_sexo(Some("F")).is_ok());
        assert!(validate_sexo(Some("X")).is_err());
    }

    #[test]
    fn test_validate_uf() {
        assert!(validate_uf(None).is_ok());
        assert!(validate_uf(Some("SP")).is_ok());
        assert!(validate_uf(Some("sp")).is_ok());
        assert!(validate_uf(Some("S")).is_err());
        assert!(validate_uf(Some("S1")).is_err());
        assert!(validate_uf(Some("SPX")).is_err());
    }

    #[test]
    fn test_validate_nome() {
        assert!(validate_nome("Ana").is_ok());
        assert!(validate_nome("  Al  ").is_err());
        assert!(validate_nome("").is_err());
    }

    #[test]
    fn test_record_to_response_preserves_fields() {
        let record = ClientRecord {
            id_cliente: 9,
            cpf: "529.982.247-25".to_string(),
            nome_completo: "Ana de Souza".to_string(),
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
            cidade: Some("Recife".to_string()),
            uf: Some("PE".to_string()),
            ativo: true,
            created_at: Utc::now(),
            updated_at: None,
        };
        let response = client_record_to_response(record);
        assert_eq!(response.id_cliente, 9);
        assert_eq!(response.cidade.as_deref(), Some("Recife"));
        assert!(response.ativo);
    }

    #[test]
    fn test_to_store_filters_carries_id() {
        let filters = ClientSearchFilters {
            id_cliente: Some(12),
            ativo: Some(true),
            ..Default::default()
        };
        let store_filters = to_store_filters(&filters);
        assert_eq!(store_filters.id_cliente, Some(12));
        assert_eq!(store_filters.ativo, Some(true));
    }
}
