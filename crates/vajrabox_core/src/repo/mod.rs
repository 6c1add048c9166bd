//! Repository layer: persistence contracts and the SQLite entity store.
//!
//! # Responsibility
//! - Define one use-case oriented contract per catalog entity.
//! - Keep SQL, constraint mapping and transactions inside the store.
//!
//! # Invariants
//! - Multi-statement writes run inside one `BEGIN IMMEDIATE` transaction.
//! - Unique and protected-reference violations surface as semantic errors,
//!   not raw SQLite failures.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::slug::{self, SlugRequest};
use crate::model::validation::ValidationError;
use crate::model::EntityId;
use rusqlite::{Connection, ErrorCode, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod category_repo;
pub(crate) mod filter;
pub mod gemstone_repo;
pub mod metal_type_repo;
pub mod product_gemstone_repo;
pub mod product_image_repo;
pub mod product_repo;
pub mod product_variant_repo;

use category_repo::CategoryRepository;
use gemstone_repo::GemstoneRepository;
use metal_type_repo::MetalTypeRepository;
use product_gemstone_repo::ProductGemstoneRepository;
use product_image_repo::ProductImageRepository;
use product_repo::ProductRepository;
use product_variant_repo::ProductVariantRepository;

const REQUIRED_TABLES: &[&str] = &[
    "categories",
    "metal_types",
    "gemstones",
    "products",
    "product_gemstones",
    "product_images",
    "product_variants",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for catalog persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Write rejected by a field-level rule or unique constraint.
    Validation(ValidationError),
    Db(DbError),
    /// Target row of an update/delete does not exist.
    NotFound { entity: &'static str, key: String },
    /// Delete blocked because other rows still reference the target.
    Protected {
        entity: &'static str,
        id: EntityId,
        referenced_by: &'static str,
        count: u64,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, key } => write!(f, "{entity} not found: {key}"),
            Self::Protected {
                entity,
                id,
                referenced_by,
                count,
            } => write!(
                f,
                "cannot delete {entity} {id}: still referenced by {count} {referenced_by} row(s)"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "catalog store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "catalog store requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted catalog data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Every entity contract at once; what the product façade needs.
pub trait CatalogRepository:
    CategoryRepository
    + MetalTypeRepository
    + GemstoneRepository
    + ProductRepository
    + ProductGemstoneRepository
    + ProductImageRepository
    + ProductVariantRepository
{
}

impl<T> CatalogRepository for T where
    T: CategoryRepository
        + MetalTypeRepository
        + GemstoneRepository
        + ProductRepository
        + ProductGemstoneRepository
        + ProductImageRepository
        + ProductVariantRepository
{
}

/// SQLite-backed catalog store handle.
///
/// Constructed explicitly from a migrated connection and passed to services;
/// copying the handle shares the same connection.
#[derive(Debug, Clone, Copy)]
pub struct SqliteCatalogStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalogStore<'conn> {
    /// Wraps a connection after checking its schema is fully migrated and
    /// registers the SQL functions search relies on.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_catalog_connection_ready(conn)?;
        filter::register_search_functions(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn conn(&self) -> &'conn Connection {
        self.conn
    }

    /// Starts a write transaction that takes the database lock up front.
    pub(crate) fn begin_immediate(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

/// Unique constraint → field mapping used when translating write failures.
pub(crate) struct UniqueField<'a> {
    /// Column as SQLite names it in the error, e.g. `products.slug`.
    pub column: &'static str,
    pub field: &'static str,
    pub value: &'a str,
}

/// Foreign key written with a row: referenced table, API field and target id.
pub(crate) struct ReferenceField {
    pub table: &'static str,
    pub field: &'static str,
    pub id: EntityId,
}

/// Translates a failed write into a semantic error.
///
/// Unique violations on a listed column become `Validation(Duplicate)`.
/// Foreign key violations become `Validation(UnknownReference)` for the first
/// listed reference whose target is gone; SQLite does not name the failing
/// key, so `conn` is used to look the targets up. Anything else stays a
/// storage error.
pub(crate) fn map_write_error(
    conn: &Connection,
    err: rusqlite::Error,
    unique: &[UniqueField<'_>],
    references: &[ReferenceField],
) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, message) = &err {
        if failure.code == ErrorCode::ConstraintViolation {
            match failure.extended_code {
                rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE => {
                    let hit = message.as_deref().and_then(|message| {
                        unique
                            .iter()
                            .find(|candidate| message.contains(candidate.column))
                    });
                    if let Some(hit) = hit {
                        return RepoError::Validation(ValidationError::Duplicate {
                            field: hit.field,
                            value: hit.value.to_string(),
                        });
                    }
                }
                rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    for reference in references {
                        match row_exists(conn, reference.table, reference.id) {
                            Ok(true) => {}
                            Ok(false) => {
                                return RepoError::Validation(ValidationError::UnknownReference {
                                    field: reference.field,
                                    id: reference.id,
                                });
                            }
                            Err(lookup) => return lookup,
                        }
                    }
                }
                _ => {}
            }
        }
    }
    err.into()
}

fn row_exists(conn: &Connection, table: &'static str, id: EntityId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1);"),
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Resolves the slug to store for a new row of `table`.
pub(crate) fn resolve_slug(
    conn: &Connection,
    table: &'static str,
    request: &SlugRequest,
    max_chars: usize,
) -> RepoResult<String> {
    match request {
        SlugRequest::Explicit(value) => {
            if slug_taken(conn, table, value)? {
                return Err(RepoError::Validation(ValidationError::Duplicate {
                    field: "slug",
                    value: value.clone(),
                }));
            }
            Ok(value.clone())
        }
        SlugRequest::Derived(base) => {
            slug::first_free(base, max_chars, |candidate| slug_taken(conn, table, candidate))
        }
    }
}

fn slug_taken(conn: &Connection, table: &'static str, slug: &str) -> RepoResult<bool> {
    let taken: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE slug = ?1);"),
        [slug],
        |row| row.get(0),
    )?;
    Ok(taken == 1)
}

/// Counts rows of `table` whose `column` equals `id`.
pub(crate) fn count_references(
    conn: &Connection,
    table: &'static str,
    column: &'static str,
    id: EntityId,
) -> RepoResult<u64> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE {column} = ?1;"),
        [id],
        |row| row.get(0),
    )?;
    u64::try_from(count)
        .map_err(|_| RepoError::InvalidData(format!("negative count from {table}.{column}")))
}

pub(crate) fn not_found(entity: &'static str, id: EntityId) -> RepoError {
    RepoError::NotFound {
        entity,
        key: id.to_string(),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

/// Reads a 0/1 flag column, rejecting anything else.
pub(crate) fn parse_flag(row: &Row<'_>, table: &str, column: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in {table}.{column}"
        ))),
    }
}

fn ensure_catalog_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &table in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
