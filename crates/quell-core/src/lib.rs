//! Quell Core - typed query model and result grouping
//!
//! This crate provides the dialect-independent half of quell: the
//! expression AST, the query metadata record, the bound-value model, row
//! tuples, and the streaming group transformer.
//!
//! # Architecture
//!
//! The library splits query handling into two passive layers and one
//! active one:
//! 1. **Expressions** - immutable trees describing projections and predicates
//! 2. **Metadata** - the record of one query's clauses, populated by builders
//! 3. **Group transformer** - folds executed result rows into nested aggregates
//!
//! SQL rendering lives in the companion `quell-sql` crate.

pub mod error;
pub mod expressions;
pub mod group;
pub mod metadata;
pub mod tuple;
pub mod value;

pub use error::{Error, Result};
pub use expressions::{
    AliasExpr, Constant, Expression, ExprType, Op, Operation, Param, Path, SubQueryExpr,
    TemplateExpr, TemplatePart,
};
pub use group::{Group, GroupBy, GroupSpec, GroupValue, Groups};
pub use metadata::{
    FlagPosition, Join, JoinType, NullHandling, Order, OrderSpecifier, QueryFlag, QueryMetadata,
    QueryModifiers, SetOperation, SetOpKind,
};
pub use tuple::{CloseableRows, Row, VecRows};
pub use value::Value;
