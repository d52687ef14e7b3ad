use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, query};

use crate::cpf::strip_cpf;

/// A client (customer) record as stored in the `clientes` table
#[derive(Debug, Clone, PartialEq)]
pub struct ClientRecord {
    pub id_cliente: i64,
    pub cpf: String,
    pub nome_completo: String,
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
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields for a new client record
#[derive(Debug, Clone, Default)]
pub struct NewClient {
    pub cpf: String,
    pub nome_completo: String,
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
    pub ativo: bool,
}

/// Partial update of a client record; unset fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct ClientChanges {
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

/// Search filters over client records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientFilters {
    /// Exact id match (single-record export)
    pub id_cliente: Option<i64>,
    /// Substring match on the stored CPF digits
    pub cpf: Option<String>,
    /// Case-insensitive substring match on the full name
    pub nome: Option<String>,
    /// Case-insensitive substring match on the city
    pub cidade: Option<String>,
    /// Exact match on the state code (uppercased)
    pub uf: Option<String>,
    /// Filter on the active flag
    pub ativo: Option<bool>,
}

/// An operator account in the `users` table
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub hashed_password: String,
    pub full_name: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new operator account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub hashed_password: String,
    pub full_name: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Copy)]
enum Placeholder {
    /// SQLite positional `?`
    Question,
    /// PostgreSQL numbered `$n`
    Dollar,
}

fn placeholder(style: Placeholder, n: usize) -> String {
    match style {
        Placeholder::Question => "?".to_string(),
        Placeholder::Dollar => format!("${n}"),
    }
}

struct SqlFilter {
    clauses: Vec<String>,
    binds: Vec<String>,
}

impl SqlFilter {
    fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }
}

/// Translate filters into SQL conditions. String values are bound;
/// integers and booleans are rendered as literals.
fn build_filter(filters: &ClientFilters, style: Placeholder) -> SqlFilter {
    let mut clauses = Vec::new();
    let mut binds: Vec<String> = Vec::new();

    if let Some(id) = filters.id_cliente {
        clauses.push(format!("id_cliente = {id}"));
    }

    if let Some(cpf) = filters.cpf.as_deref().filter(|s| !s.is_empty()) {
        binds.push(format!("%{}%", strip_cpf(cpf)));
        let ph = placeholder(style, binds.len());
        // CPF is stored masked; compare against the bare digits
        clauses.push(format!(
            "replace(replace(cpf, '.', ''), '-', '') LIKE {ph}"
        ));
    }

    if let Some(nome) = filters.nome.as_deref().filter(|s| !s.is_empty()) {
        binds.push(format!("%{}%", nome.to_lowercase()));
        let ph = placeholder(style, binds.len());
        clauses.push(format!("lower(nome_completo) LIKE {ph}"));
    }

    if let Some(cidade) = filters.cidade.as_deref().filter(|s| !s.is_empty()) {
        binds.push(format!("%{}%", cidade.to_lowercase()));
        let ph = placeholder(style, binds.len());
        clauses.push(format!("lower(cidade) LIKE {ph}"));
    }

    if let Some(uf) = filters.uf.as_deref().filter(|s| !s.is_empty()) {
        binds.push(uf.to_uppercase());
        let ph = placeholder(style, binds.len());
        clauses.push(format!("uf = {ph}"));
    }

    if let Some(ativo) = filters.ativo {
        clauses.push(format!("ativo = {}", if ativo { "TRUE" } else { "FALSE" }));
    }

    SqlFilter { clauses, binds }
}

fn decode_err(column: &str, source: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(source),
    }
}

fn parse_date(column: &str, value: Option<String>) -> Result<Option<NaiveDate>, sqlx::Error> {
    value
        .map(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| decode_err(column, e)))
        .transpose()
}

fn parse_timestamp(column: &str, value: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| decode_err(column, e))
}

fn map_client_sqlite(row: &SqliteRow) -> Result<ClientRecord, sqlx::Error> {
    let created_at: String = row.try_get("created_at")?;
    let updated_at: Option<String> = row.try_get("updated_at")?;
    Ok(ClientRecord {
        id_cliente: row.try_get("id_cliente")?,
        cpf: row.try_get("cpf")?,
        nome_completo: row.try_get("nome_completo")?,
        data_nascimento: parse_date("data_nascimento", row.try_get("data_nascimento")?)?,
        sexo: row.try_get("sexo")?,
        nome_mae: row.try_get("nome_mae")?,
        nome_pai: row.try_get("nome_pai")?,
        email: row.try_get("email")?,
        telefone: row.try_get("telefone")?,
        celular: row.try_get("celular")?,
        cep: row.try_get("cep")?,
        endereco: row.try_get("endereco")?,
        numero: row.try_get("numero")?,
        complemento: row.try_get("complemento")?,
        bairro: row.try_get("bairro")?,
        cidade: row.try_get("cidade")?,
        uf: row.try_get("uf")?,
        ativo: row.try_get("ativo")?,
        created_at: parse_timestamp("created_at", &created_at)?,
        updated_at: updated_at
            .map(|s| parse_timestamp("updated_at", &s))
            .transpose()?,
    })
}

fn map_client_pg(row: &PgRow) -> Result<ClientRecord, sqlx::Error> {
    Ok(ClientRecord {
        id_cliente: row.try_get("id_cliente")?,
        cpf: row.try_get("cpf")?,
        nome_completo: row.try_get("nome_completo")?,
        data_nascimento: row.try_get("data_nascimento")?,
        sexo: row.try_get("sexo")?,
        nome_mae: row.try_get("nome_mae")?,
        nome_pai: row.try_get("nome_pai")?,
        email: row.try_get("email")?,
        telefone: row.try_get("telefone")?,
        celular: row.try_get("celular")?,
        cep: row.try_get("cep")?,
        endereco: row.try_get("endereco")?,
        numero: row.try_get("numero")?,
        complemento: row.try_get("complemento")?,
        bairro: row.try_get("bairro")?,
        cidade: row.try_get("cidade")?,
        uf: row.try_get("uf")?,
        ativo: row.try_get("ativo")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn map_user_sqlite(row: &SqliteRow) -> Result<UserRecord, sqlx::Error> {
    let created_at: String = row.try_get("created_at")?;
    Ok(UserRecord {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        hashed_password: row.try_get("hashed_password")?,
        full_name: row.try_get("full_name")?,
        is_active: row.try_get("is_active")?,
        is_admin: row.try_get("is_admin")?,
        created_at: parse_timestamp("created_at", &created_at)?,
    })
}

fn map_user_pg(row: &PgRow) -> Result<UserRecord, sqlx::Error> {
    Ok(UserRecord {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        hashed_password: row.try_get("hashed_password")?,
        full_name: row.try_get("full_name")?,
        is_active: row.try_get("is_active")?,
        is_admin: row.try_get("is_admin")?,
        created_at: row.try_get("created_at")?,
    })
}

/// ClientStore provides an interface to the records database
/// (PostgreSQL or SQLite, selected by DSN prefix).
#[derive(Clone)]
pub enum ClientStore {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

impl ClientStore {
    /// Create a new store and initialize the schema.
    pub async fn new(dsn: &str) -> Result<Self, sqlx::Error> {
        log::info!("Connecting to records database with DSN: {dsn}");

        let store = if dsn.starts_with("sqlite:") {
            if dsn.contains(":memory:") {
                // A pooled in-memory SQLite database exists per connection;
                // pin the pool to a single long-lived one.
                let pool = SqlitePoolOptions::new()
                    .max_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect(dsn)
                    .await?;
                ClientStore::Sqlite(pool)
            } else {
                // Add mode=rwc to create the database file if it doesn't exist
                let dsn_with_create = if dsn.contains('?') {
                    if dsn.contains("mode=") {
                        dsn.to_string()
                    } else {
                        format!("{dsn}&mode=rwc")
                    }
                } else {
                    format!("{dsn}?mode=rwc")
                };

                let pool = SqlitePool::connect(&dsn_with_create).await.map_err(|e| {
                    log::error!(
                        "Failed to connect to SQLite database with DSN '{dsn_with_create}': {e}"
                    );
                    e
                })?;
                ClientStore::Sqlite(pool)
            }
        } else {
            let pool = PgPool::connect(dsn).await.map_err(|e| {
                log::error!("Failed to connect to PostgreSQL database with DSN '{dsn}': {e}");
                e
            })?;
            ClientStore::Postgres(pool)
        };

        store.init().await.map_err(|e| {
            log::error!("Failed to initialize records schema: {e}");
            e
        })?;
        Ok(store)
    }

    /// Initialize tables if they do not exist.
    async fn init(&self) -> Result<(), sqlx::Error> {
        match self {
            ClientStore::Sqlite(pool) => {
                let create_clientes = r#"
                CREATE TABLE IF NOT EXISTS clientes (
                    id_cliente INTEGER PRIMARY KEY AUTOINCREMENT,
                    cpf TEXT NOT NULL UNIQUE,
                    nome_completo TEXT NOT NULL,
                    data_nascimento TEXT,
                    sexo TEXT,
                    nome_mae TEXT,
                    nome_pai TEXT,
                    email TEXT,
                    telefone TEXT,
                    celular TEXT,
                    cep TEXT,
                    endereco TEXT,
                    numero TEXT,
                    complemento TEXT,
                    bairro TEXT,
                    cidade TEXT,
                    uf TEXT,
                    ativo INTEGER NOT NULL DEFAULT 1,
                    created_at TEXT NOT NULL,
                    updated_at TEXT
                )"#;
                query(create_clientes).execute(pool).await?;

                query("CREATE INDEX IF NOT EXISTS idx_clientes_nome ON clientes (nome_completo)")
                    .execute(pool)
                    .await?;
                query("CREATE INDEX IF NOT EXISTS idx_clientes_cidade ON clientes (cidade)")
                    .execute(pool)
                    .await?;

                let create_users = r#"
                CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    email TEXT NOT NULL UNIQUE,
                    hashed_password TEXT NOT NULL,
                    full_name TEXT NOT NULL,
                    is_active INTEGER NOT NULL DEFAULT 1,
                    is_admin INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL
                )"#;
                query(create_users).execute(pool).await?;
            }
            ClientStore::Postgres(pool) => {
                let create_clientes = r#"
                CREATE TABLE IF NOT EXISTS clientes (
                    id_cliente BIGSERIAL PRIMARY KEY,
                    cpf VARCHAR(14) NOT NULL UNIQUE,
                    nome_completo VARCHAR(255) NOT NULL,
                    data_nascimento DATE,
                    sexo VARCHAR(1),
                    nome_mae VARCHAR(255),
                    nome_pai VARCHAR(255),
                    email VARCHAR(255),
                    telefone VARCHAR(20),
                    celular VARCHAR(20),
                    cep VARCHAR(9),
                    endereco VARCHAR(255),
                    numero VARCHAR(10),
                    complemento VARCHAR(255),
                    bairro VARCHAR(100),
                    cidade VARCHAR(100),
                    uf VARCHAR(2),
                    ativo BOOLEAN NOT NULL DEFAULT TRUE,
                    created_at TIMESTAMPTZ NOT NULL,
                    updated_at TIMESTAMPTZ
                )"#;
                query(create_clientes).execute(pool).await?;

                query("CREATE INDEX IF NOT EXISTS idx_clientes_nome ON clientes (nome_completo)")
                    .execute(pool)
                    .await?;
                query("CREATE INDEX IF NOT EXISTS idx_clientes_cidade ON clientes (cidade)")
                    .execute(pool)
                    .await?;

                let create_users = r#"
                CREATE TABLE IF NOT EXISTS users (
                    id BIGSERIAL PRIMARY KEY,
                    email VARCHAR(255) NOT NULL UNIQUE,
                    hashed_password VARCHAR(255) NOT NULL,
                    full_name VARCHAR(255) NOT NULL,
                    is_active BOOLEAN NOT NULL DEFAULT TRUE,
                    is_admin BOOLEAN NOT NULL DEFAULT FALSE,
                    created_at TIMESTAMPTZ NOT NULL
                )"#;
                query(create_users).execute(pool).await?;
            }
        }

        Ok(())
    }

    /// Check database connectivity.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        match self {
            ClientStore::Sqlite(pool) => {
                query("SELECT 1").execute(pool).await?;
            }
            ClientStore::Postgres(pool) => {
                query("SELECT 1").execute(pool).await?;
            }
        }
        Ok(())
    }

    /// Search clients with filters and pagination. Returns the page of
    /// records and the total match count. `page` is 1-based.
    pub async fn search_clients(
        &self,
        filters: &ClientFilters,
        page: u32,
        size: u32,
    ) -> Result<(Vec<ClientRecord>, u64), sqlx::Error> {
        let offset = (page as u64).saturating_sub(1) * size as u64;
        match self {
            ClientStore::Sqlite(pool) => {
                let filter = build_filter(filters, Placeholder::Question);
                let where_sql = filter.where_clause();

                let count_sql = format!("SELECT COUNT(*) FROM clientes{where_sql}");
                let mut count_query = query(&count_sql);
                for bind in &filter.binds {
                    count_query = count_query.bind(bind);
                }
                let total: i64 = count_query.fetch_one(pool).await?.try_get(0)?;

                let select_sql = format!(
                    "SELECT * FROM clientes{where_sql} ORDER BY id_cliente LIMIT {size} OFFSET {offset}"
                );
                let mut select_query = query(&select_sql);
                for bind in &filter.binds {
                    select_query = select_query.bind(bind);
                }
                let rows = select_query.fetch_all(pool).await?;
                let items = rows
                    .iter()
                    .map(map_client_sqlite)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((items, total as u64))
            }
            ClientStore::Postgres(pool) => {
                let filter = build_filter(filters, Placeholder::Dollar);
                let where_sql = filter.where_clause();

                let count_sql = format!("SELECT COUNT(*) FROM clientes{where_sql}");
                let mut count_query = query(&count_sql);
                for bind in &filter.binds {
                    count_query = count_query.bind(bind);
                }
                let total: i64 = count_query.fetch_one(pool).await?.try_get(0)?;

                let select_sql = format!(
                    "SELECT * FROM clientes{where_sql} ORDER BY id_cliente LIMIT {size} OFFSET {offset}"
                );
                let mut select_query = query(&select_sql);
                for bind in &filter.binds {
                    select_query = select_query.bind(bind);
                }
                let rows = select_query.fetch_all(pool).await?;
                let items = rows
                    .iter()
                    .map(map_client_pg)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((items, total as u64))
            }
        }
    }

    /// Fetch all clients matching the filters, up to `limit` records.
    pub async fn find_clients(
        &self,
        filters: &ClientFilters,
        limit: u32,
    ) -> Result<Vec<ClientRecord>, sqlx::Error> {
        match self {
            ClientStore::Sqlite(pool) => {
                let filter = build_filter(filters, Placeholder::Question);
                let sql = format!(
                    "SELECT * FROM clientes{} ORDER BY id_cliente LIMIT {limit}",
                    filter.where_clause()
                );
                let mut q = query(&sql);
                for bind in &filter.binds {
                    q = q.bind(bind);
                }
                let rows = q.fetch_all(pool).await?;
                rows.iter().map(map_client_sqlite).collect()
            }
            ClientStore::Postgres(pool) => {
                let filter = build_filter(filters, Placeholder::Dollar);
                let sql = format!(
                    "SELECT * FROM clientes{} ORDER BY id_cliente LIMIT {limit}",
                    filter.where_clause()
                );
                let mut q = query(&sql);
                for bind in &filter.binds {
                    q = q.bind(bind);
                }
                let rows = q.fetch_all(pool).await?;
                rows.iter().map(map_client_pg).collect()
            }
        }
    }

    /// Fetch a single client by id.
    pub async fn get_client(&self, id: i64) -> Result<Option<ClientRecord>, sqlx::Error> {
        match self {
            ClientStore::Sqlite(pool) => {
                let row = query("SELECT * FROM clientes WHERE id_cliente = ?")
                    .bind(id)
                    .fetch_optional(pool)
                    .await?;
                row.as_ref().map(map_client_sqlite).transpose()
            }
            ClientStore::Postgres(pool) => {
                let row = query("SELECT * FROM clientes WHERE id_cliente = $1")
                    .bind(id)
                    .fetch_optional(pool)
                    .await?;
                row.as_ref().map(map_client_pg).transpose()
            }
        }
    }

    /// Check whether a CPF (stored masked) is already registered.
    pub async fn cpf_exists(&self, cpf: &str) -> Result<bool, sqlx::Error> {
        match self {
            ClientStore::Sqlite(pool) => {
                let count: i64 = query("SELECT COUNT(*) FROM clientes WHERE cpf = ?")
                    .bind(cpf)
                    .fetch_one(pool)
                    .await?
                    .try_get(0)?;
                Ok(count > 0)
            }
            ClientStore::Postgres(pool) => {
                let count: i64 = query("SELECT COUNT(*) FROM clientes WHERE cpf = $1")
                    .bind(cpf)
                    .fetch_one(pool)
                    .await?
                    .try_get(0)?;
                Ok(count > 0)
            }
        }
    }

    /// Insert a new client and return the stored record.
    pub async fn insert_client(&self, client: &NewClient) -> Result<ClientRecord, sqlx::Error> {
        let now = Utc::now();
        let id = match self {
            ClientStore::Sqlite(pool) => {
                let sql = r#"
                INSERT INTO clientes (
                    cpf, nome_completo, data_nascimento, sexo, nome_mae, nome_pai,
                    email, telefone, celular, cep, endereco, numero, complemento,
                    bairro, cidade, uf, ativo, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#;
                let result = query(sql)
                    .bind(&client.cpf)
                    .bind(&client.nome_completo)
                    .bind(client.data_nascimento.map(|d| d.to_string()))
                    .bind(&client.sexo)
                    .bind(&client.nome_mae)
                    .bind(&client.nome_pai)
                    .bind(&client.email)
                    .bind(&client.telefone)
                    .bind(&client.celular)
                    .bind(&client.cep)
                    .bind(&client.endereco)
                    .bind(&client.numero)
                    .bind(&client.complemento)
                    .bind(&client.bairro)
                    .bind(&client.cidade)
                    .bind(&client.uf)
                    .bind(client.ativo)
                    .bind(now.to_rfc3339())
                    .execute(pool)
                    .await?;
                result.last_insert_rowid()
            }
            ClientStore::Postgres(pool) => {
                let sql = r#"
                INSERT INTO clientes (
                    cpf, nome_completo, data_nascimento, sexo, nome_mae, nome_pai,
                    email, telefone, celular, cep, endereco, numero, complemento,
                    bairro, cidade, uf, ativo, created_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
                RETURNING id_cliente"#;
                let row = query(sql)
                    .bind(&client.cpf)
                    .bind(&client.nome_completo)
                    .bind(client.data_nascimento)
                    .bind(&client.sexo)
                    .bind(&client.nome_mae)
                    .bind(&client.nome_pai)
                    .bind(&client.email)
                    .bind(&client.telefone)
                    .bind(&client.celular)
                    .bind(&client.cep)
                    .bind(&client.endereco)
                    .bind(&client.numero)
                    .bind(&client.complemento)
                    .bind(&client.bairro)
                    .bind(&client.cidade)
                    .bind(&client.uf)
                    .bind(client.ativo)
                    .bind(now)
                    .fetch_one(pool)
                    .await?;
                row.try_get::<i64, _>(0)?
            }
        };

        self.get_client(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Apply a partial update to a client. Returns the updated record,
    /// or `None` when the id does not exist.
    pub async fn update_client(
        &self,
        id: i64,
        changes: &ClientChanges,
    ) -> Result<Option<ClientRecord>, sqlx::Error> {
        let style = match self {
            ClientStore::Sqlite(_) => Placeholder::Question,
            ClientStore::Postgres(_) => Placeholder::Dollar,
        };

        let mut sets: Vec<String> = Vec::new();
        let mut binds: Vec<String> = Vec::new();

        {
            let mut set_str = |column: &str, value: String| {
                binds.push(value);
                let ph = placeholder(style, binds.len());
                sets.push(format!("{column} = {ph}"));
            };

            if let Some(v) = &changes.nome_completo {
                set_str("nome_completo", v.clone());
            }
            if let Some(v) = &changes.sexo {
                set_str("sexo", v.clone());
            }
            if let Some(v) = &changes.nome_mae {
                set_str("nome_mae", v.clone());
            }
            if let Some(v) = &changes.nome_pai {
                set_str("nome_pai", v.clone());
            }
            if let Some(v) = &changes.email {
                set_str("email", v.clone());
            }
            if let Some(v) = &changes.telefone {
                set_str("telefone", v.clone());
            }
            if let Some(v) = &changes.celular {
                set_str("celular", v.clone());
            }
            if let Some(v) = &changes.cep {
                set_str("cep", v.clone());
            }
            if let Some(v) = &changes.endereco {
                set_str("endereco", v.clone());
            }
            if let Some(v) = &changes.numero {
                set_str("numero", v.clone());
            }
            if let Some(v) = &changes.complemento {
                set_str("complemento", v.clone());
            }
            if let Some(v) = &changes.bairro {
                set_str("bairro", v.clone());
            }
            if let Some(v) = &changes.cidade {
                set_str("cidade", v.clone());
            }
            if let Some(v) = &changes.uf {
                set_str("uf", v.to_uppercase());
            }
        }

        if let Some(date) = changes.data_nascimento {
            binds.push(date.to_string());
            let ph = placeholder(style, binds.len());
            match style {
                Placeholder::Question => sets.push(format!("data_nascimento = {ph}")),
                Placeholder::Dollar => sets.push(format!("data_nascimento = CAST({ph} AS date)")),
            }
        }

        if let Some(ativo) = changes.ativo {
            sets.push(format!("ativo = {}", if ativo { "TRUE" } else { "FALSE" }));
        }

        if sets.is_empty() {
            return self.get_client(id).await;
        }

        match style {
            Placeholder::Question => {
                binds.push(Utc::now().to_rfc3339());
                let ph = placeholder(style, binds.len());
                sets.push(format!("updated_at = {ph}"));
            }
            Placeholder::Dollar => sets.push("updated_at = NOW()".to_string()),
        }

        let sql = format!(
            "UPDATE clientes SET {} WHERE id_cliente = {id}",
            sets.join(", ")
        );

        let affected = match self {
            ClientStore::Sqlite(pool) => {
                let mut q = query(&sql);
                for bind in &binds {
                    q = q.bind(bind);
                }
                q.execute(pool).await?.rows_affected()
            }
            ClientStore::Postgres(pool) => {
                let mut q = query(&sql);
                for bind in &binds {
                    q = q.bind(bind);
                }
                q.execute(pool).await?.rows_affected()
            }
        };

        if affected == 0 {
            return Ok(None);
        }
        self.get_client(id).await
    }

    /// Soft-delete a client by clearing the active flag. Returns whether
    /// a record was affected.
    pub async fn deactivate_client(&self, id: i64) -> Result<bool, sqlx::Error> {
        let changes = ClientChanges {
            ativo: Some(false),
            ..Default::default()
        };
        Ok(self.update_client(id, &changes).await?.is_some())
    }

    /// Look up an operator account by email.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, sqlx::Error> {
        match self {
            ClientStore::Sqlite(pool) => {
                let row = query("SELECT * FROM users WHERE email = ?")
                    .bind(email)
                    .fetch_optional(pool)
                    .await?;
                row.as_ref().map(map_user_sqlite).transpose()
            }
            ClientStore::Postgres(pool) => {
                let row = query("SELECT * FROM users WHERE email = $1")
                    .bind(email)
                    .fetch_optional(pool)
                    .await?;
                row.as_ref().map(map_user_pg).transpose()
            }
        }
    }

    /// Look up an operator account by id.
    pub async fn find_user_by_id(&self, id: i64) -> Result<Option<UserRecord>, sqlx::Error> {
        match self {
            ClientStore::Sqlite(pool) => {
                let row = query("SELECT * FROM users WHERE id = ?")
                    .bind(id)
                    .fetch_optional(pool)
                    .await?;
                row.as_ref().map(map_user_sqlite).transpose()
            }
            ClientStore::Postgres(pool) => {
                let row = query("SELECT * FROM users WHERE id = $1")
                    .bind(id)
                    .fetch_optional(pool)
                    .await?;
                row.as_ref().map(map_user_pg).transpose()
            }
        }
    }

    /// Insert a new operator account and return it.
    pub async fn insert_user(&self, user: &NewUser) -> Result<UserRecord, sqlx::Error> {
        let now = Utc::now();
        match self {
            ClientStore::Sqlite(pool) => {
                query(
                    "INSERT INTO users (email, hashed_password, full_name, is_active, is_admin, created_at) \
                     VALUES (?, ?, ?, TRUE, ?, ?)",
                )
                .bind(&user.email)
                .bind(&user.hashed_password)
                .bind(&user.full_name)
                .bind(user.is_admin)
                .bind(now.to_rfc3339())
                .execute(pool)
                .await?;
            }
            ClientStore::Postgres(pool) => {
                query(
                    "INSERT INTO users (email, hashed_password, full_name, is_active, is_admin, created_at) \
                     VALUES ($1, $2, $3, TRUE, $4, $5)",
                )
                .bind(&user.email)
                .bind(&user.hashed_password)
                .bind(&user.full_name)
                .bind(user.is_admin)
                .bind(now)
                .execute(pool)
                .await?;
            }
        }

        self.find_user_by_email(&user.email)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }
}
