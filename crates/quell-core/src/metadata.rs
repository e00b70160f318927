//! Query metadata.
//!
//! [`QueryMetadata`] is the passive record describing one query's clauses:
//! projection, joins, filters, grouping, ordering, modifiers, flags, and
//! bound params. Builders populate it; the serializer consumes it. The
//! record owns its clause lists exclusively and performs only structural
//! validation (duplicate join targets, zero limits); semantic validation
//! against a schema is out of scope.

use crate::error::{Error, Result};
use crate::expressions::{Expression, Param};
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Join kinds.
///
/// `Default` is a comma-separated FROM entry; `Join` is the bare `join`
/// keyword. `Default` and `Cross` carry no condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinType {
    Default,
    Join,
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinType {
    /// Whether this join kind takes an ON condition.
    pub fn takes_condition(&self) -> bool {
        !matches!(self, JoinType::Default | JoinType::Cross)
    }
}

/// One FROM/JOIN entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Join {
    pub kind: JoinType,
    pub target: Expression,
    pub condition: Option<Expression>,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    Asc,
    Desc,
}

/// Explicit null placement in an ORDER BY item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullHandling {
    NullsFirst,
    NullsLast,
}

/// One ORDER BY item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderSpecifier {
    pub target: Expression,
    pub order: Order,
    pub nulls: Option<NullHandling>,
}

impl OrderSpecifier {
    pub fn asc(target: Expression) -> Self {
        OrderSpecifier {
            target,
            order: Order::Asc,
            nulls: None,
        }
    }

    pub fn desc(target: Expression) -> Self {
        OrderSpecifier {
            target,
            order: Order::Desc,
            nulls: None,
        }
    }

    pub fn nulls_first(mut self) -> Self {
        self.nulls = Some(NullHandling::NullsFirst);
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls = Some(NullHandling::NullsLast);
        self
    }
}

impl Expression {
    /// Ascending order over this expression.
    pub fn asc(&self) -> OrderSpecifier {
        OrderSpecifier::asc(self.clone())
    }

    /// Descending order over this expression.
    pub fn desc(&self) -> OrderSpecifier {
        OrderSpecifier::desc(self.clone())
    }
}

/// Where a custom SQL fragment is spliced into the serialized query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagPosition {
    /// The WITH/CTE prelude before the SELECT keyword
    With,
    /// Immediately before the projection list
    Start,
    AfterProjection,
    BeforeFilters,
    AfterFilters,
    BeforeOrder,
    End,
}

/// A custom fragment attached to query metadata at a fixed position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryFlag {
    pub position: FlagPosition,
    pub flag: Expression,
}

/// Paging modifiers. Zero is not a valid limit or offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryModifiers {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl QueryModifiers {
    pub fn is_restricting(&self) -> bool {
        self.limit.is_some() || self.offset.is_some()
    }
}

/// Set-operation kinds combining whole queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetOpKind {
    Union,
    UnionAll,
    Intersect,
    Except,
}

/// A set operation over child query metadatas.
///
/// A metadata carrying a set operation has no projection or joins of its
/// own; its order-by and modifiers apply to the combined result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SetOperation {
    pub kind: SetOpKind,
    pub operands: Vec<QueryMetadata>,
}

/// The passive record describing one query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryMetadata {
    projection: Vec<Expression>,
    joins: Vec<Join>,
    where_clause: Option<Expression>,
    group_by: Vec<Expression>,
    having: Option<Expression>,
    order_by: Vec<OrderSpecifier>,
    modifiers: QueryModifiers,
    distinct: bool,
    unique: bool,
    flags: Vec<QueryFlag>,
    params: Vec<(Param, Value)>,
    set_op: Option<SetOperation>,
}

impl QueryMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_projection(&mut self, expr: Expression) {
        self.projection.push(expr);
    }

    /// Append a join. A target already joined in this metadata is rejected.
    pub fn add_join(&mut self, kind: JoinType, target: Expression) -> Result<()> {
        if self.joins.iter().any(|j| j.target == target) {
            return Err(Error::malformed(format!(
                "{} is already used as a join target",
                target
            )));
        }
        self.joins.push(Join {
            kind,
            target,
            condition: None,
        });
        Ok(())
    }

    /// Attach an ON condition to the most recent join.
    pub fn add_join_condition(&mut self, condition: Expression) -> Result<()> {
        match self.joins.last_mut() {
            Some(join) if join.kind.takes_condition() => {
                join.condition = Some(match join.condition.take() {
                    Some(existing) => existing.and(condition),
                    None => condition,
                });
                Ok(())
            }
            Some(join) => Err(Error::malformed(format!(
                "{:?} join does not take a condition",
                join.kind
            ))),
            None => Err(Error::malformed("no join to attach a condition to")),
        }
    }

    /// And-combine a predicate into the WHERE clause.
    pub fn add_where(&mut self, predicate: Expression) {
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
    }

    pub fn add_group_by(&mut self, expr: Expression) {
        self.group_by.push(expr);
    }

    /// And-combine a predicate into the HAVING clause.
    pub fn add_having(&mut self, predicate: Expression) {
        self.having = Some(match self.having.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
    }

    pub fn add_order(&mut self, spec: OrderSpecifier) {
        self.order_by.push(spec);
    }

    pub fn set_limit(&mut self, limit: u64) -> Result<()> {
        if limit == 0 {
            return Err(Error::malformed("limit must be positive"));
        }
        self.modifiers.limit = Some(limit);
        Ok(())
    }

    pub fn set_offset(&mut self, offset: u64) -> Result<()> {
        if offset == 0 {
            return Err(Error::malformed("offset must be positive"));
        }
        self.modifiers.offset = Some(offset);
        Ok(())
    }

    pub fn set_distinct(&mut self, distinct: bool) {
        self.distinct = distinct;
    }

    pub fn set_unique(&mut self, unique: bool) {
        self.unique = unique;
    }

    /// Attach a custom fragment; duplicates are ignored.
    pub fn add_flag(&mut self, flag: QueryFlag) {
        if !self.flags.contains(&flag) {
            self.flags.push(flag);
        }
    }

    /// Bind a value to a named param marker, replacing any previous binding.
    pub fn set_param(&mut self, param: Param, value: Value) {
        if let Some(slot) = self.params.iter_mut().find(|(p, _)| *p == param) {
            slot.1 = value;
        } else {
            self.params.push((param, value));
        }
    }

    /// Turn this metadata into a set operation over `operands`.
    pub fn set_set_op(&mut self, kind: SetOpKind, operands: Vec<QueryMetadata>) -> Result<()> {
        if operands.len() < 2 {
            return Err(Error::malformed(
                "set operations require at least two operands",
            ));
        }
        if !self.projection.is_empty() || !self.joins.is_empty() {
            return Err(Error::malformed(
                "set operation metadata cannot carry its own projection or joins",
            ));
        }
        self.set_op = Some(SetOperation { kind, operands });
        Ok(())
    }

    pub fn projection(&self) -> &[Expression] {
        &self.projection
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn where_clause(&self) -> Option<&Expression> {
        self.where_clause.as_ref()
    }

    pub fn group_by(&self) -> &[Expression] {
        &self.group_by
    }

    pub fn having(&self) -> Option<&Expression> {
        self.having.as_ref()
    }

    pub fn order_by(&self) -> &[OrderSpecifier] {
        &self.order_by
    }

    pub fn modifiers(&self) -> QueryModifiers {
        self.modifiers
    }

    pub fn clear_modifiers(&mut self) {
        self.modifiers = QueryModifiers::default();
    }

    pub fn clear_order_by(&mut self) {
        self.order_by.clear();
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn flags(&self) -> &[QueryFlag] {
        &self.flags
    }

    /// Flags attached at the given position, in attachment order.
    pub fn flags_at(&self, position: FlagPosition) -> impl Iterator<Item = &QueryFlag> {
        self.flags.iter().filter(move |f| f.position == position)
    }

    pub fn params(&self) -> &[(Param, Value)] {
        &self.params
    }

    pub fn set_op(&self) -> Option<&SetOperation> {
        self.set_op.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expressions::{ExprType, Path};

    #[test]
    fn duplicate_join_target_is_rejected() {
        let survey = Expression::from(Path::table("SURVEY", "SURVEY"));
        let mut md = QueryMetadata::new();
        md.add_join(JoinType::Default, survey.clone()).unwrap();
        let err = md.add_join(JoinType::Full, survey).unwrap_err();
        assert!(matches!(err, Error::MalformedQuery(_)));
    }

    #[test]
    fn where_predicates_and_combine() {
        let s = Path::table("SURVEY", "s");
        let name = s.column("NAME", ExprType::Str);
        let mut md = QueryMetadata::new();
        md.add_where(name.is_not_null());
        md.add_where(name.eq(Expression::string("x")));
        let combined = md.where_clause().unwrap();
        assert_eq!(combined, &name.is_not_null().and(name.eq(Expression::string("x"))));
    }

    #[test]
    fn zero_limit_is_rejected() {
        let mut md = QueryMetadata::new();
        assert!(md.set_limit(0).is_err());
        assert!(md.set_limit(10).is_ok());
    }

    #[test]
    fn cross_join_takes_no_condition() {
        let survey = Expression::from(Path::table("SURVEY", "SURVEY"));
        let mut md = QueryMetadata::new();
        md.add_join(JoinType::Cross, survey).unwrap();
        let err = md
            .add_join_condition(Expression::constant(true, ExprType::Bool))
            .unwrap_err();
        assert!(matches!(err, Error::MalformedQuery(_)));
    }

    #[test]
    fn flags_deduplicate() {
        let mut md = QueryMetadata::new();
        let flag = QueryFlag {
            position: FlagPosition::End,
            flag: Expression::template("for update", Vec::new(), ExprType::Unknown),
        };
        md.add_flag(flag.clone());
        md.add_flag(flag);
        assert_eq!(md.flags().len(), 1);
    }
}
