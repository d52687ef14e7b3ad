//! In-process response cache
//!
//! Search pages and single records are cached under TTLs from
//! configuration. Every mutation invalidates the touched record and the
//! whole search cache, so a stale page never outlives an edit.

use cadastro_api::{ClientResponse, PaginatedClientsResponse};
use common::config::CacheConfig;
use common::store::ClientFilters;
use moka::future::Cache;

#[derive(Clone)]
pub struct ResponseCache {
    clients: Cache<i64, ClientResponse>,
    searches: Cache<String, PaginatedClientsResponse>,
}

impl ResponseCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            clients: Cache::builder()
                .max_capacity(config.max_entries)
                .time_to_live(config.record_ttl)
                .build(),
            searches: Cache::builder()
                .max_capacity(config.max_entries)
                .time_to_live(config.search_ttl)
                .build(),
        }
    }

    /// Canonical cache key for a search request. Filter values are
    /// trimmed and lowercased so equivalent requests share an entry.
    pub fn search_key(filters: &ClientFilters, page: u32, size: u32) -> String {
        let norm = |v: &Option<String>| {
            v.as_deref()
                .map(|s| s.trim().to_lowercase())
                .unwrap_or_default()
        };
        let ativo = filters
            .ativo
            .map(|a| a.to_string())
            .unwrap_or_default();
        format!(
            "search:cpf={}|nome={}|cidade={}|uf={}|ativo={}|page={}|size={}",
            norm(&filters.cpf),
            norm(&filters.nome),
            norm(&filters.cidade),
            norm(&filters.uf),
            ativo,
            page,
            size
        )
    }

    pub async fn get_client(&self, id: i64) -> Option<ClientResponse> {
        self.clients.get(&id).await
    }

    pub async fn put_client(&self, response: ClientResponse) {
        self.clients.insert(response.id_cliente, response).await;
    }

    pub async fn invalidate_client(&self, id: i64) {
        self.clients.invalidate(&id).await;
    }

    pub async fn get_search(&self, key: &str) -> Option<PaginatedClientsResponse> {
        self.searches.get(key).await
    }

    pub async fn put_search(&self, key: String, response: PaginatedClientsResponse) {
        self.searches.insert(key, response).await;
    }

    /// Drop every cached search page
    pub fn invalidate_searches(&self) {
        self.searches.invalidate_all();
    }
}
