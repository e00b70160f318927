//! Quell SQL - dialect-aware query serialization
//!
//! This crate renders the query model from `quell-core` to SQL text plus an
//! ordered binding list ready for prepared-statement execution.
//!
//! # Architecture
//!
//! The crate follows a pipeline architecture:
//! 1. **Builder** - accumulates clauses into query metadata
//! 2. **Dialect profile** - feature flags plus an operator template catalog
//! 3. **Serializer** - walks the expression tree and emits SQL + bindings
//!
//! Each stage can be customized per dialect: a profile is a plain value,
//! so a custom dialect is a customized copy of a built-in one.
//!
//! ```rust,ignore
//! use quell_sql::{handle, SqlTemplates};
//!
//! let templates = SqlTemplates::generic();
//! let out = handle(&employee_id.count(), &templates)?;
//! assert_eq!(out.sql, "count(EMPLOYEE.ID)");
//! ```

pub mod builder;
pub mod dialects;
pub mod serializer;
pub mod templates;

pub use builder::{except, from, intersect, table, union, union_all, QueryBuilder};
pub use dialects::{DialectType, FunctionWrap, LimitStyle, QuoteStyle, SqlTemplates};
pub use serializer::{Binding, Serialized, Serializer};
pub use templates::{precedence, Template, TemplateElement};

use quell_core::{Error, Expression, QueryMetadata, Result};

/// Serialize a query for prepared-statement execution.
///
/// The metadata must carry a projection (or a set operation); an empty
/// projection is a malformed query here. Use [`QueryBuilder::to_sql`] for
/// the lenient debug rendering.
pub fn serialize(metadata: &QueryMetadata, templates: &SqlTemplates) -> Result<Serialized> {
    if metadata.projection().is_empty() && metadata.set_op().is_none() {
        return Err(Error::malformed("empty projection"));
    }
    tracing::debug!("serializing query");
    let mut serializer = Serializer::new(templates);
    serializer.serialize(metadata, false)?;
    Ok(serializer.finish())
}

/// Serialize the counting form of a query (`count(*)` projection, paging
/// modifiers dropped).
pub fn serialize_count(metadata: &QueryMetadata, templates: &SqlTemplates) -> Result<Serialized> {
    tracing::debug!("serializing count query");
    let mut serializer = Serializer::new(templates);
    serializer.serialize(metadata, true)?;
    Ok(serializer.finish())
}

/// Serialize one standalone expression.
pub fn handle(expression: &Expression, templates: &SqlTemplates) -> Result<Serialized> {
    let mut serializer = Serializer::new(templates);
    serializer.handle(expression)?;
    Ok(serializer.finish())
}
