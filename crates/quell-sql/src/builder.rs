//! Fluent query builder.
//!
//! A thin ergonomic surface that accumulates clauses into a
//! [`QueryMetadata`] record. The builder performs the same structural
//! validation as the metadata mutators; the first violation is recorded
//! and surfaced from [`QueryBuilder::build`] (or
//! [`QueryBuilder::to_sql`]), so call chains stay fluent.
//!
//! # Examples
//!
//! ```rust,ignore
//! use quell_sql::builder::{from, table};
//! use quell_core::ExprType;
//!
//! let survey = table("SURVEY", "SURVEY");
//! let name = survey.column("NAME", ExprType::Str);
//!
//! let metadata = from(survey)
//!     .where_(name.is_not_null())
//!     .select([name.clone()])
//!     .build()?;
//! ```

use crate::dialects::SqlTemplates;
use crate::serializer::Serializer;
use quell_core::{
    Error, Expression, FlagPosition, JoinType, OrderSpecifier, Param, Path, QueryFlag,
    QueryMetadata, Result, SetOpKind, Value,
};

/// Create an entity root path for a relation, bound to a variable name.
pub fn table(relation: impl Into<String>, variable: impl Into<String>) -> Path {
    Path::table(relation, variable)
}

/// Start a query from the given source.
pub fn from(target: impl Into<Expression>) -> QueryBuilder {
    QueryBuilder::new().from(target)
}

/// Combine queries with UNION.
pub fn union(operands: Vec<QueryMetadata>) -> QueryBuilder {
    QueryBuilder::new().set_op(SetOpKind::Union, operands)
}

/// Combine queries with UNION ALL.
pub fn union_all(operands: Vec<QueryMetadata>) -> QueryBuilder {
    QueryBuilder::new().set_op(SetOpKind::UnionAll, operands)
}

/// Combine queries with INTERSECT.
pub fn intersect(operands: Vec<QueryMetadata>) -> QueryBuilder {
    QueryBuilder::new().set_op(SetOpKind::Intersect, operands)
}

/// Combine queries with EXCEPT.
pub fn except(operands: Vec<QueryMetadata>) -> QueryBuilder {
    QueryBuilder::new().set_op(SetOpKind::Except, operands)
}

/// Accumulates clauses into a [`QueryMetadata`].
#[derive(Debug, Default)]
pub struct QueryBuilder {
    metadata: QueryMetadata,
    error: Option<Error>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn try_mutate(mut self, mutate: impl FnOnce(&mut QueryMetadata) -> Result<()>) -> Self {
        if self.error.is_none() {
            if let Err(e) = mutate(&mut self.metadata) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Add a FROM source.
    pub fn from(self, target: impl Into<Expression>) -> Self {
        let target = target.into();
        self.try_mutate(|md| md.add_join(JoinType::Default, target))
    }

    /// Add a plain JOIN.
    pub fn join(self, target: impl Into<Expression>) -> Self {
        let target = target.into();
        self.try_mutate(|md| md.add_join(JoinType::Join, target))
    }

    pub fn inner_join(self, target: impl Into<Expression>) -> Self {
        let target = target.into();
        self.try_mutate(|md| md.add_join(JoinType::Inner, target))
    }

    pub fn left_join(self, target: impl Into<Expression>) -> Self {
        let target = target.into();
        self.try_mutate(|md| md.add_join(JoinType::Left, target))
    }

    pub fn right_join(self, target: impl Into<Expression>) -> Self {
        let target = target.into();
        self.try_mutate(|md| md.add_join(JoinType::Right, target))
    }

    pub fn full_join(self, target: impl Into<Expression>) -> Self {
        let target = target.into();
        self.try_mutate(|md| md.add_join(JoinType::Full, target))
    }

    pub fn cross_join(self, target: impl Into<Expression>) -> Self {
        let target = target.into();
        self.try_mutate(|md| md.add_join(JoinType::Cross, target))
    }

    /// Attach an ON condition to the most recent join.
    pub fn on(self, condition: Expression) -> Self {
        self.try_mutate(|md| md.add_join_condition(condition))
    }

    /// And-combine a predicate into the WHERE clause.
    pub fn where_(self, predicate: Expression) -> Self {
        self.try_mutate(|md| {
            md.add_where(predicate);
            Ok(())
        })
    }

    pub fn group_by(self, exprs: impl IntoIterator<Item = Expression>) -> Self {
        self.try_mutate(|md| {
            for expr in exprs {
                md.add_group_by(expr);
            }
            Ok(())
        })
    }

    /// And-combine a predicate into the HAVING clause.
    pub fn having(self, predicate: Expression) -> Self {
        self.try_mutate(|md| {
            md.add_having(predicate);
            Ok(())
        })
    }

    pub fn order_by(self, specs: impl IntoIterator<Item = OrderSpecifier>) -> Self {
        self.try_mutate(|md| {
            for spec in specs {
                md.add_order(spec);
            }
            Ok(())
        })
    }

    pub fn limit(self, limit: u64) -> Self {
        self.try_mutate(|md| md.set_limit(limit))
    }

    pub fn offset(self, offset: u64) -> Self {
        self.try_mutate(|md| md.set_offset(offset))
    }

    pub fn distinct(self) -> Self {
        self.try_mutate(|md| {
            md.set_distinct(true);
            Ok(())
        })
    }

    /// Mark the query as expecting a single result row.
    pub fn unique(self) -> Self {
        self.try_mutate(|md| {
            md.set_unique(true);
            Ok(())
        })
    }

    /// Add a named CTE rendered in the WITH prelude.
    pub fn with(self, name: impl Into<String>, sub: QueryMetadata) -> Self {
        let name = name.into();
        self.try_mutate(move |md| {
            let alias = Expression::from(Path::variable(name, quell_core::ExprType::Entity));
            md.add_flag(QueryFlag {
                position: FlagPosition::With,
                flag: Expression::template(
                    "{0} as {1}",
                    vec![alias, Expression::subquery(sub)],
                    quell_core::ExprType::Unknown,
                ),
            });
            Ok(())
        })
    }

    /// Attach a custom fragment at a fixed position.
    pub fn add_flag(self, position: FlagPosition, flag: Expression) -> Self {
        self.try_mutate(|md| {
            md.add_flag(QueryFlag { position, flag });
            Ok(())
        })
    }

    /// Bind a value to a named param marker.
    pub fn set(self, param: Param, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.try_mutate(|md| {
            md.set_param(param, value);
            Ok(())
        })
    }

    /// Append projection expressions.
    pub fn select(self, exprs: impl IntoIterator<Item = Expression>) -> Self {
        self.try_mutate(|md| {
            for expr in exprs {
                md.add_projection(expr);
            }
            Ok(())
        })
    }

    fn set_op(self, kind: SetOpKind, operands: Vec<QueryMetadata>) -> Self {
        self.try_mutate(|md| md.set_set_op(kind, operands))
    }

    /// Finish building. The first structural violation recorded during the
    /// chain is returned here.
    pub fn build(self) -> Result<QueryMetadata> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.metadata),
        }
    }

    /// Render the accumulated query for the given dialect without requiring
    /// a projection, mirroring the serializer's debug form.
    pub fn to_sql(&self, templates: &SqlTemplates) -> Result<String> {
        if let Some(e) = &self.error {
            return Err(e.clone());
        }
        let mut serializer = Serializer::new(templates);
        serializer.serialize(&self.metadata, false)?;
        Ok(serializer.finish().sql)
    }
}
