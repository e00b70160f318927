//! Query expression AST.
//!
//! This module defines the expression node types used to describe query
//! projections, predicates, and sources. The design is an enum-based AST:
//! the central type is [`Expression`], a tagged enum with one variant per
//! node kind, with inner structs carrying each variant's fields. Larger
//! payloads are boxed to keep the enum size small.
//!
//! # Variant Groups
//!
//! | Group | Variants | Purpose |
//! |---|---|---|
//! | **References** | `Path` | Qualified column and table references |
//! | **Bindings** | `Constant`, `Param` | Values bound as prepared-statement parameters |
//! | **Applications** | `Operation` | An operator applied to child expressions |
//! | **Fragments** | `Template` | Verbatim SQL interleaved with argument holes |
//! | **Nesting** | `SubQuery`, `Alias` | Nested query metadata and aliased expressions |
//!
//! Every node carries a declared result type ([`ExprType`]) fixed at
//! construction. Trees are immutable plain values: they are `Clone`, carry
//! no interior mutability, and are freely shareable across threads.
//!
//! # Constructing Expressions
//!
//! Leaf constructors and fluent operator methods build trees without manual
//! struct assembly:
//!
//! ```rust,ignore
//! use quell_core::expressions::{ExprType, Path};
//!
//! let survey = Path::table("SURVEY", "s1");
//! let name = survey.column("NAME", ExprType::Str);
//! let predicate = name.starts_with("X").and(name.is_not_null());
//! ```

use crate::error::{Error, Result};
use crate::metadata::QueryMetadata;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared result type of an expression.
///
/// The original model's phantom type parameters are erased to these tags;
/// boundary checks validate where the tags meet runtime values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprType {
    Bool,
    Int,
    Double,
    Str,
    Bytes,
    Date,
    Time,
    Timestamp,
    /// A relational entity (table) reference
    Entity,
    /// A multi-column tuple, e.g. a list projection or row comparison
    Tuple,
    Unknown,
}

/// The closed operator set.
///
/// Operators are stable identities; how each one renders is owned by the
/// dialect's template catalog, not by the operator itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    // Logical
    And,
    Or,
    Not,
    // Comparison
    Eq,
    Ne,
    EqIc,
    Lt,
    Gt,
    Loe,
    Goe,
    // Arithmetic
    Add,
    Sub,
    Mult,
    Div,
    Mod,
    Negate,
    // String
    Concat,
    Lower,
    Upper,
    Trim,
    Like,
    StartsWith,
    StartsWithIc,
    EndsWith,
    EndsWithIc,
    StringContains,
    StringContainsIc,
    // Null tests
    IsNull,
    IsNotNull,
    // Membership
    In,
    NotIn,
    Between,
    // Misc
    Coalesce,
    List,
    Exists,
    // Aggregates
    Count,
    CountDistinct,
    CountAll,
    Sum,
    Avg,
    Min,
    Max,
    BoolAny,
    BoolAll,
}

impl Op {
    /// Number of child expressions the operator takes, or `None` for
    /// variadic operators.
    pub fn arity(&self) -> Option<usize> {
        use Op::*;
        match self {
            List | Coalesce => None,
            CountAll => Some(0),
            Not | Negate | Lower | Upper | Trim | IsNull | IsNotNull | Exists | Count
            | CountDistinct | Sum | Avg | Min | Max | BoolAny | BoolAll => Some(1),
            Between => Some(3),
            _ => Some(2),
        }
    }

    /// Whether the operator is an aggregate function.
    ///
    /// Aggregates may not be nested inside each other.
    pub fn is_aggregate(&self) -> bool {
        use Op::*;
        matches!(
            self,
            Count | CountDistinct | CountAll | Sum | Avg | Min | Max | BoolAny | BoolAll
        )
    }

    /// Stable name used in error messages.
    pub fn name(&self) -> &'static str {
        use Op::*;
        match self {
            And => "and",
            Or => "or",
            Not => "not",
            Eq => "eq",
            Ne => "ne",
            EqIc => "eq_ignore_case",
            Lt => "lt",
            Gt => "gt",
            Loe => "loe",
            Goe => "goe",
            Add => "add",
            Sub => "sub",
            Mult => "mult",
            Div => "div",
            Mod => "mod",
            Negate => "negate",
            Concat => "concat",
            Lower => "lower",
            Upper => "upper",
            Trim => "trim",
            Like => "like",
            StartsWith => "starts_with",
            StartsWithIc => "starts_with_ignore_case",
            EndsWith => "ends_with",
            EndsWithIc => "ends_with_ignore_case",
            StringContains => "contains",
            StringContainsIc => "contains_ignore_case",
            IsNull => "is_null",
            IsNotNull => "is_not_null",
            In => "in",
            NotIn => "not_in",
            Between => "between",
            Coalesce => "coalesce",
            List => "list",
            Exists => "exists",
            Count => "count",
            CountDistinct => "count_distinct",
            CountAll => "count_all",
            Sum => "sum",
            Avg => "avg",
            Min => "min",
            Max => "max",
            BoolAny => "bool_any",
            BoolAll => "bool_all",
        }
    }
}

/// A qualified column or table reference.
///
/// `segments` is non-empty: the first segment is the variable (`s1`,
/// `SURVEY`), the rest are member accesses (`NAME`). `relation` is set on
/// entity roots and names the underlying table, so a root renders as
/// `<relation> <variable>` in FROM/JOIN position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    pub segments: Vec<String>,
    pub relation: Option<String>,
    pub ty: ExprType,
}

impl Path {
    /// Create an entity root path for a relation, bound to a variable name.
    pub fn table(relation: impl Into<String>, variable: impl Into<String>) -> Self {
        Path {
            segments: vec![variable.into()],
            relation: Some(relation.into()),
            ty: ExprType::Entity,
        }
    }

    /// Create a bare variable path with no relation attached.
    pub fn variable(name: impl Into<String>, ty: ExprType) -> Self {
        Path {
            segments: vec![name.into()],
            relation: None,
            ty,
        }
    }

    /// Derive a member path under this one (e.g. `s1.NAME`).
    pub fn column(&self, name: impl Into<String>, ty: ExprType) -> Expression {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Expression::Path(Path {
            segments,
            relation: None,
            ty,
        })
    }

    /// The variable this path is rooted at.
    pub fn root(&self) -> &str {
        &self.segments[0]
    }
}

impl From<Path> for Expression {
    fn from(p: Path) -> Self {
        Expression::Path(p)
    }
}

impl From<&str> for Expression {
    fn from(s: &str) -> Self {
        Expression::string(s)
    }
}

impl From<String> for Expression {
    fn from(s: String) -> Self {
        Expression::string(s)
    }
}

impl From<i64> for Expression {
    fn from(n: i64) -> Self {
        Expression::number(n)
    }
}

/// A literal bound as a prepared-statement parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constant {
    pub value: Value,
    pub ty: ExprType,
}

/// A named bind marker, distinct from [`Constant`].
///
/// Markers are recorded in the serialized binding list and resolved against
/// `QueryMetadata::params` before execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: ExprType,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: ExprType) -> Self {
        Param {
            name: name.into(),
            ty,
        }
    }
}

/// An operator applied to child expressions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operation {
    pub op: Op,
    pub ty: ExprType,
    pub args: Vec<Expression>,
}

/// One element of a [`TemplateExpr`]: verbatim text or an argument hole.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplatePart {
    Static(String),
    Arg(usize),
}

/// A verbatim SQL fragment interleaved with argument holes.
///
/// Used for constructs the operator algebra does not model, e.g.
/// table-valued function calls in FROM position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateExpr {
    pub parts: Vec<TemplatePart>,
    pub args: Vec<Expression>,
    pub ty: ExprType,
}

/// A nested query used in expression position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubQueryExpr {
    pub metadata: QueryMetadata,
}

/// An aliased expression (`expr as name`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AliasExpr {
    pub this: Expression,
    pub alias: String,
}

/// A node in the query expression tree.
///
/// See the module-level docs for the variant groups. Equality and hashing
/// are structural, keyed by variant and children, so equal trees serialize
/// to equal output under the same dialect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    Path(Path),
    Constant(Constant),
    Param(Param),
    Operation(Box<Operation>),
    Template(Box<TemplateExpr>),
    SubQuery(Box<SubQueryExpr>),
    Alias(Box<AliasExpr>),
}

impl Expression {
    /// Create a constant expression from any value convertible to [`Value`].
    pub fn constant(value: impl Into<Value>, ty: ExprType) -> Self {
        Expression::Constant(Constant {
            value: value.into(),
            ty,
        })
    }

    /// Create a string constant.
    pub fn string(s: impl Into<String>) -> Self {
        Expression::constant(s.into(), ExprType::Str)
    }

    /// Create an integer constant.
    pub fn number(n: i64) -> Self {
        Expression::constant(n, ExprType::Int)
    }

    /// Create a named bind marker.
    pub fn param(name: impl Into<String>, ty: ExprType) -> Self {
        Expression::Param(Param::new(name, ty))
    }

    /// Create a verbatim SQL template. `pattern` uses `{0}`-style holes
    /// referencing `args` by index; text with no holes is emitted as-is.
    pub fn template(pattern: &str, args: Vec<Expression>, ty: ExprType) -> Self {
        Expression::Template(Box::new(TemplateExpr {
            parts: parse_template_parts(pattern),
            args,
            ty,
        }))
    }

    /// Wrap query metadata as a subquery expression.
    pub fn subquery(metadata: QueryMetadata) -> Self {
        Expression::SubQuery(Box::new(SubQueryExpr { metadata }))
    }

    /// The `*` projection.
    pub fn star() -> Self {
        Expression::Path(Path::variable("*", ExprType::Tuple))
    }

    /// Whether this node is the bare `*` projection.
    pub fn is_star(&self) -> bool {
        matches!(self, Expression::Path(p) if p.relation.is_none() && p.segments == ["*"])
    }

    /// Wrap this expression in an alias (`expr as name`).
    pub fn alias(self, name: impl Into<String>) -> Self {
        Expression::Alias(Box::new(AliasExpr {
            this: self,
            alias: name.into(),
        }))
    }

    /// Checked operation constructor: validates the operator's arity.
    pub fn operation(op: Op, ty: ExprType, args: Vec<Expression>) -> Result<Self> {
        if let Some(arity) = op.arity() {
            if args.len() != arity {
                return Err(Error::malformed(format!(
                    "operator {} takes {} arguments, got {}",
                    op.name(),
                    arity,
                    args.len()
                )));
            }
        }
        Ok(Self::op(op, ty, args))
    }

    // Arity is statically correct at every internal call site.
    fn op(op: Op, ty: ExprType, args: Vec<Expression>) -> Self {
        Expression::Operation(Box::new(Operation { op, ty, args }))
    }

    /// Declared result type of this node.
    pub fn ty(&self) -> ExprType {
        match self {
            Expression::Path(p) => p.ty,
            Expression::Constant(c) => c.ty,
            Expression::Param(p) => p.ty,
            Expression::Operation(o) => o.ty,
            Expression::Template(t) => t.ty,
            Expression::SubQuery(s) => match s.metadata.projection() {
                [single] => single.ty(),
                _ => ExprType::Tuple,
            },
            Expression::Alias(a) => a.this.ty(),
        }
    }

    /// Ordered child expressions of this node.
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Path(_) | Expression::Constant(_) | Expression::Param(_) => Vec::new(),
            Expression::Operation(o) => o.args.iter().collect(),
            Expression::Template(t) => t.args.iter().collect(),
            Expression::SubQuery(s) => s.metadata.projection().iter().collect(),
            Expression::Alias(a) => vec![&a.this],
        }
    }

    /// Whether this node is an aggregate operation.
    pub fn is_aggregate(&self) -> bool {
        match self {
            Expression::Operation(o) => o.op.is_aggregate(),
            Expression::Alias(a) => a.this.is_aggregate(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Fluent operator methods
// ---------------------------------------------------------------------------

impl Expression {
    pub fn eq(&self, other: impl Into<Expression>) -> Expression {
        Self::op(Op::Eq, ExprType::Bool, vec![self.clone(), other.into()])
    }

    pub fn ne(&self, other: impl Into<Expression>) -> Expression {
        Self::op(Op::Ne, ExprType::Bool, vec![self.clone(), other.into()])
    }

    pub fn eq_ignore_case(&self, other: impl Into<Expression>) -> Expression {
        Self::op(Op::EqIc, ExprType::Bool, vec![self.clone(), other.into()])
    }

    pub fn lt(&self, other: impl Into<Expression>) -> Expression {
        Self::op(Op::Lt, ExprType::Bool, vec![self.clone(), other.into()])
    }

    pub fn gt(&self, other: impl Into<Expression>) -> Expression {
        Self::op(Op::Gt, ExprType::Bool, vec![self.clone(), other.into()])
    }

    pub fn loe(&self, other: impl Into<Expression>) -> Expression {
        Self::op(Op::Loe, ExprType::Bool, vec![self.clone(), other.into()])
    }

    pub fn goe(&self, other: impl Into<Expression>) -> Expression {
        Self::op(Op::Goe, ExprType::Bool, vec![self.clone(), other.into()])
    }

    pub fn and(&self, other: impl Into<Expression>) -> Expression {
        Self::op(Op::And, ExprType::Bool, vec![self.clone(), other.into()])
    }

    pub fn or(&self, other: impl Into<Expression>) -> Expression {
        Self::op(Op::Or, ExprType::Bool, vec![self.clone(), other.into()])
    }

    pub fn not(&self) -> Expression {
        Self::op(Op::Not, ExprType::Bool, vec![self.clone()])
    }

    pub fn add(&self, other: impl Into<Expression>) -> Expression {
        Self::op(Op::Add, self.ty(), vec![self.clone(), other.into()])
    }

    pub fn sub(&self, other: impl Into<Expression>) -> Expression {
        Self::op(Op::Sub, self.ty(), vec![self.clone(), other.into()])
    }

    pub fn mult(&self, other: impl Into<Expression>) -> Expression {
        Self::op(Op::Mult, self.ty(), vec![self.clone(), other.into()])
    }

    pub fn div(&self, other: impl Into<Expression>) -> Expression {
        Self::op(Op::Div, self.ty(), vec![self.clone(), other.into()])
    }

    pub fn modulo(&self, other: impl Into<Expression>) -> Expression {
        Self::op(Op::Mod, self.ty(), vec![self.clone(), other.into()])
    }

    pub fn negate(&self) -> Expression {
        Self::op(Op::Negate, self.ty(), vec![self.clone()])
    }

    pub fn concat(&self, other: impl Into<Expression>) -> Expression {
        Self::op(Op::Concat, ExprType::Str, vec![self.clone(), other.into()])
    }

    pub fn lower(&self) -> Expression {
        Self::op(Op::Lower, ExprType::Str, vec![self.clone()])
    }

    pub fn upper(&self) -> Expression {
        Self::op(Op::Upper, ExprType::Str, vec![self.clone()])
    }

    pub fn trim(&self) -> Expression {
        Self::op(Op::Trim, ExprType::Str, vec![self.clone()])
    }

    pub fn like(&self, pattern: impl Into<Expression>) -> Expression {
        Self::op(Op::Like, ExprType::Bool, vec![self.clone(), pattern.into()])
    }

    pub fn starts_with(&self, prefix: impl Into<Expression>) -> Expression {
        Self::op(
            Op::StartsWith,
            ExprType::Bool,
            vec![self.clone(), prefix.into()],
        )
    }

    pub fn starts_with_ignore_case(&self, prefix: impl Into<Expression>) -> Expression {
        Self::op(
            Op::StartsWithIc,
            ExprType::Bool,
            vec![self.clone(), prefix.into()],
        )
    }

    pub fn ends_with(&self, suffix: impl Into<Expression>) -> Expression {
        Self::op(
            Op::EndsWith,
            ExprType::Bool,
            vec![self.clone(), suffix.into()],
        )
    }

    pub fn ends_with_ignore_case(&self, suffix: impl Into<Expression>) -> Expression {
        Self::op(
            Op::EndsWithIc,
            ExprType::Bool,
            vec![self.clone(), suffix.into()],
        )
    }

    pub fn contains_str(&self, infix: impl Into<Expression>) -> Expression {
        Self::op(
            Op::StringContains,
            ExprType::Bool,
            vec![self.clone(), infix.into()],
        )
    }

    pub fn contains_str_ignore_case(&self, infix: impl Into<Expression>) -> Expression {
        Self::op(
            Op::StringContainsIc,
            ExprType::Bool,
            vec![self.clone(), infix.into()],
        )
    }

    pub fn is_null(&self) -> Expression {
        Self::op(Op::IsNull, ExprType::Bool, vec![self.clone()])
    }

    pub fn is_not_null(&self) -> Expression {
        Self::op(Op::IsNotNull, ExprType::Bool, vec![self.clone()])
    }

    /// Membership in a constant collection. The collection is expanded into
    /// a placeholder list at serialization time; empty collections are
    /// rejected there.
    pub fn in_list(&self, values: Vec<Value>) -> Expression {
        let rhs = Expression::constant(Value::List(values), ExprType::Tuple);
        Self::op(Op::In, ExprType::Bool, vec![self.clone(), rhs])
    }

    pub fn not_in_list(&self, values: Vec<Value>) -> Expression {
        let rhs = Expression::constant(Value::List(values), ExprType::Tuple);
        Self::op(Op::NotIn, ExprType::Bool, vec![self.clone(), rhs])
    }

    /// Membership in a subquery's result.
    pub fn in_query(&self, metadata: QueryMetadata) -> Expression {
        Self::op(
            Op::In,
            ExprType::Bool,
            vec![self.clone(), Expression::subquery(metadata)],
        )
    }

    pub fn between(
        &self,
        low: impl Into<Expression>,
        high: impl Into<Expression>,
    ) -> Expression {
        Self::op(
            Op::Between,
            ExprType::Bool,
            vec![self.clone(), low.into(), high.into()],
        )
    }

    pub fn count(&self) -> Expression {
        Self::op(Op::Count, ExprType::Int, vec![self.clone()])
    }

    pub fn count_distinct(&self) -> Expression {
        Self::op(Op::CountDistinct, ExprType::Int, vec![self.clone()])
    }

    pub fn sum(&self) -> Expression {
        Self::op(Op::Sum, self.ty(), vec![self.clone()])
    }

    pub fn avg(&self) -> Expression {
        Self::op(Op::Avg, ExprType::Double, vec![self.clone()])
    }

    pub fn min(&self) -> Expression {
        Self::op(Op::Min, self.ty(), vec![self.clone()])
    }

    pub fn max(&self) -> Expression {
        Self::op(Op::Max, self.ty(), vec![self.clone()])
    }

    /// The `count(*)` aggregate.
    pub fn count_all() -> Expression {
        Self::op(Op::CountAll, ExprType::Int, Vec::new())
    }

    /// Boolean ANY quantifier over a predicate (`some(...)` in SQL form).
    pub fn bool_any(predicate: Expression) -> Expression {
        Self::op(Op::BoolAny, ExprType::Bool, vec![predicate])
    }

    /// Boolean ALL quantifier over a predicate.
    pub fn bool_all(predicate: Expression) -> Expression {
        Self::op(Op::BoolAll, ExprType::Bool, vec![predicate])
    }

    /// An ordered expression tuple (`a, b, c`), e.g. the left side of a
    /// row-wise IN comparison.
    pub fn tuple(items: Vec<Expression>) -> Expression {
        Self::op(Op::List, ExprType::Tuple, items)
    }

    /// `coalesce(a, b, ...)` over the given alternatives.
    pub fn coalesce(items: Vec<Expression>) -> Expression {
        let ty = items.first().map(|e| e.ty()).unwrap_or(ExprType::Unknown);
        let list = Self::op(Op::List, ExprType::Tuple, items);
        Self::op(Op::Coalesce, ty, vec![list])
    }

    /// An EXISTS predicate over a subquery.
    pub fn exists(metadata: QueryMetadata) -> Expression {
        Self::op(
            Op::Exists,
            ExprType::Bool,
            vec![Expression::subquery(metadata)],
        )
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Debug display only; SQL generation lives in the serializer.
        match self {
            Expression::Path(p) => write!(f, "{}", p.segments.join(".")),
            Expression::Constant(c) => write!(f, "{}", c.value),
            Expression::Param(p) => write!(f, "#{}", p.name),
            Expression::Operation(o) => write!(f, "{}(..)", o.op.name()),
            Expression::Template(_) => write!(f, "template(..)"),
            Expression::SubQuery(_) => write!(f, "(subquery)"),
            Expression::Alias(a) => write!(f, "{} as {}", a.this, a.alias),
        }
    }
}

fn parse_template_parts(pattern: &str) -> Vec<TemplatePart> {
    let mut parts = Vec::new();
    let mut text = String::new();
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '{' {
            let mut digits = String::new();
            while let Some(d) = chars.peek().copied() {
                if d.is_ascii_digit() {
                    digits.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            if !digits.is_empty() && chars.peek() == Some(&'}') {
                chars.next();
                if !text.is_empty() {
                    parts.push(TemplatePart::Static(std::mem::take(&mut text)));
                }
                // The pattern is caller-supplied and short; an out-of-range
                // index simply renders nothing for that hole.
                parts.push(TemplatePart::Arg(digits.parse().unwrap_or(0)));
                continue;
            }
            // Unrecognized hole syntax stays literal
            text.push('{');
            text.push_str(&digits);
        } else {
            text.push(c);
        }
    }
    if !text.is_empty() {
        parts.push(TemplatePart::Static(text));
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_equality_and_hash() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let s1 = Path::table("SURVEY", "s1");
        let a = s1.column("NAME", ExprType::Str).eq(Expression::string("x"));
        let b = s1.column("NAME", ExprType::Str).eq(Expression::string("x"));
        assert_eq!(a, b);

        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn operation_arity_is_enforced() {
        let err = Expression::operation(Op::Eq, ExprType::Bool, vec![Expression::number(1)]);
        assert!(matches!(err, Err(crate::error::Error::MalformedQuery(_))));
    }

    #[test]
    fn template_pattern_parsing() {
        let t = Expression::template(
            "fn({0}, {1})",
            vec![Expression::number(1), Expression::number(2)],
            ExprType::Unknown,
        );
        match t {
            Expression::Template(t) => {
                assert_eq!(
                    t.parts,
                    vec![
                        TemplatePart::Static("fn(".into()),
                        TemplatePart::Arg(0),
                        TemplatePart::Static(", ".into()),
                        TemplatePart::Arg(1),
                        TemplatePart::Static(")".into()),
                    ]
                );
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn subquery_type_follows_projection() {
        let mut md = QueryMetadata::new();
        let s = Path::table("SURVEY", "SURVEY");
        md.add_projection(s.column("ID", ExprType::Int));
        assert_eq!(Expression::subquery(md).ty(), ExprType::Int);
    }
}
