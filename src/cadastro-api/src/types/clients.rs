use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A client record as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ClientResponse {
    /// Record identifier
    pub id_cliente: i64,
    /// CPF, stored masked (`NNN.NNN.NNN-NN`)
    pub cpf: String,
    /// Full name
    pub nome_completo: String,
    /// Birth date
    pub data_nascimento: Option<NaiveDate>,
    /// Sex code (`M`/`F`)
    pub sexo: Option<String>,
    /// Mother's name
    pub nome_mae: Option<String>,
    /// Father's name
    pub nome_pai: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// Landline phone
    pub telefone: Option<String>,
    /// Mobile phone
    pub celular: Option<String>,
    /// Postal code
    pub cep: Option<String>,
    /// Street address
    pub endereco: Option<String>,
    /// Street number
    pub numero: Option<String>,
    /// Address complement
    pub complemento: Option<String>,
    /// Neighborhood
    pub bairro: Option<String>,
    /// City
    pub cidade: Option<String>,
    /// State code, two uppercase letters
    pub uf: Option<String>,
    /// Active flag; cleared by soft delete
    pub ativo: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

/// Request body for registering a new client
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateClientRequest {
    /// CPF, masked or unmasked; validated before storage
    pub cpf: String,
    /// Full name, at least three characters
    pub nome_completo: String,
    pub data_nascimento: Option<NaiveDate>,
    /// Sex code (`M`/`F`)
    pub sexo: Option<String>,
    pub nome_mae: Option<String>,
    pub nome_pai: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub celular: Option<String>,
    pub cep: Option<String>,
    pub endereco: Option<String>,
    pub numero: Option<String>,
    pub complemento: Option<String>,
    pub bairro: Option<String>,
    pub cidade: Option<String>,
    pub uf: Option<String>,
    /// Active flag, defaults to true
    #[serde(default = "default_true")]
    pub ativo: bool,
}

/// Request body for updating a client; unset fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateClientRequest {
    pub nome_completo: Option<String>,
    pub data_nascimento: Option<NaiveDate>,
    pub sexo: Option<String>,
    pub nome_mae: Option<String>,
    pub nome_pai: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub celular: Option<String>,
    pub cep: Option<String>,
    pub endereco: Option<String>,
    pub numero: Option<String>,
    pub complemento: Option<String>,
    pub bairro: Option<String>,
    pub cidade: Option<String>,
    pub uf: Option<String>,
    pub ativo: Option<bool>,
}

/// Filters accepted by search and export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ClientSearchFilters {
    /// Exact record id (single-record export)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_cliente: Option<i64>,
    /// Substring match on the CPF digits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    /// Case-insensitive substring match on the full name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    /// Case-insensitive substring match on the city
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidade: Option<String>,
    /// Exact state code match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uf: Option<String>,
    /// Filter on the active flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ativo: Option<bool>,
}

/// One page of search results
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedClientsResponse {
    /// Records on this page
    pub items: Vec<ClientResponse>,
    /// Total number of matching records
    pub total: u64,
    /// 1-based page number
    pub page: u32,
    /// Page size
    pub size: u32,
    /// Total number of pages
    pub pages: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_defaults_ativo() {
        let json = r#"{"cpf": "529.982.247-25", "nome_completo": "Ana de Souza"}"#;
        let req: CreateClientRequest = serde_json::from_str(json).unwrap();
        assert!(req.ativo);
        assert!(req.cidade.is_none());
    }

    #[test]
    fn test_update_request_partial() {
        let json = r#"{"nome_completo": "Ana B. Lima", "ativo": false}"#;
        let req: UpdateClientRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.nome_completo.as_deref(), Some("Ana B. Lima"));
        assert_eq!(req.ativo, Some(false));
        assert!(req.uf.is_none());
    }

    #[test]
    fn test_filters_skip_unset_fields() {
        let filters = ClientSearchFilters {
            nome: Some("ana".to_string()),
            ativo: Some(true),
            ..Default::default()
        };
        let json = serde_json::to_string(&filters).unwrap();
        assert_eq!(json, r#"{"nome":"ana","ativo":true}"#);
    }

    #[test]
    fn test_paginated_response_serde_roundtrip() {
        let resp = PaginatedClientsResponse {
            items: vec![],
            total: 42,
            page: 2,
            size: 10,
            pages: 5,
        };
        let json = serde_json::to_string(&resp).unwrap();
        let deserialized: PaginatedClientsResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.total, 42);
        assert_eq!(deserialized.pages, 5);
    }
}
