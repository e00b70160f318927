//! Dialect profiles.
//!
//! A dialect is a value, not a type hierarchy: [`SqlTemplates`] is a
//! profile record of feature flags plus an operator override map, and each
//! supported dialect is a constructor that customizes the generic profile.
//! The merged template catalog is built once at construction and cached on
//! the profile.

mod derby;
mod generic;
mod h2;
mod mysql;
mod oracle;
mod postgres;
mod sqlserver;

use crate::templates::{build_catalog, like_pattern, Template};
use quell_core::{Error, JoinType, Op, Result, SetOpKind};
use std::collections::{HashMap, HashSet};

/// The supported target dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialectType {
    Generic,
    MySQL,
    PostgreSQL,
    Oracle,
    SQLServer,
    Derby,
    H2,
}

/// Identifier quoting styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    None,
    DoubleQuote,
    Backtick,
    Bracket,
}

/// Paging syntax shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitStyle {
    /// `limit n` / `offset k`
    LimitOffset,
    /// `offset k rows fetch next n rows only`
    OffsetFetch,
    /// `top n` prefix before the projection
    Top,
}

/// Wrapping applied to table-valued function targets in FROM/JOIN position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionWrap {
    None,
    /// `table(fn())`
    Table,
}

/// One dialect's serialization rules: feature flags plus operator
/// template overrides layered on the defaults.
#[derive(Debug, Clone)]
pub struct SqlTemplates {
    pub placeholder: String,
    pub quote_style: QuoteStyle,
    pub limit_style: LimitStyle,
    /// Whether `nulls first` / `nulls last` may be emitted in ORDER BY
    pub nulls_ordering: bool,
    pub function_wrap: FunctionWrap,
    /// Whether counting a distinct or multi-column projection requires a
    /// wrapping subquery
    pub count_via_subquery: bool,
    /// Whether a boolean expression may appear directly in the projection;
    /// when false, boolean projections are wrapped in CASE WHEN ... END
    pub select_boolean_literals: bool,
    pub parenthesize_set_operands: bool,
    /// Upper bound on the arity of an expanded IN-list constant
    pub max_in_list: Option<usize>,
    separator: String,
    like_escape: char,
    overrides: HashMap<Op, String>,
    unsupported: HashSet<Op>,
    catalog: HashMap<Op, Template>,
}

impl Default for SqlTemplates {
    fn default() -> Self {
        Self::generic()
    }
}

impl SqlTemplates {
    /// The generic ANSI profile every dialect starts from.
    pub fn generic() -> Self {
        let overrides = HashMap::new();
        let catalog = build_catalog('\\', &overrides);
        SqlTemplates {
            placeholder: "?".to_string(),
            quote_style: QuoteStyle::None,
            limit_style: LimitStyle::LimitOffset,
            nulls_ordering: true,
            function_wrap: FunctionWrap::None,
            count_via_subquery: false,
            select_boolean_literals: true,
            parenthesize_set_operands: false,
            max_in_list: None,
            separator: "\n".to_string(),
            like_escape: '\\',
            overrides,
            unsupported: HashSet::new(),
            catalog,
        }
    }

    /// The profile for a named dialect.
    pub fn new(dialect: DialectType) -> Self {
        match dialect {
            DialectType::Generic => generic::templates(),
            DialectType::MySQL => mysql::templates(),
            DialectType::PostgreSQL => postgres::templates(),
            DialectType::Oracle => oracle::templates(),
            DialectType::SQLServer => sqlserver::templates(),
            DialectType::Derby => derby::templates(),
            DialectType::H2 => h2::templates(),
        }
    }

    /// The cached template for an operator.
    pub fn template(&self, op: Op) -> Result<&Template> {
        if self.unsupported.contains(&op) {
            return Err(Error::unsupported_operator(op.name()));
        }
        self.catalog
            .get(&op)
            .ok_or_else(|| Error::unsupported_operator(op.name()))
    }

    /// Replace an operator's pattern.
    pub fn override_op(&mut self, op: Op, pattern: &str) {
        self.overrides.insert(op, pattern.to_string());
        self.catalog.insert(op, Template::parse(pattern));
    }

    /// Mark an operator as unavailable in this dialect.
    pub fn mark_unsupported(&mut self, op: Op) {
        self.unsupported.insert(op);
    }

    /// The LIKE-pattern escape character.
    pub fn like_escape(&self) -> char {
        self.like_escape
    }

    /// Change the LIKE escape character, rebuilding the LIKE template
    /// unless an explicit override shadows it.
    pub fn set_like_escape(&mut self, escape: char) {
        self.like_escape = escape;
        if !self.overrides.contains_key(&Op::Like) {
            self.catalog
                .insert(Op::Like, Template::parse(&like_pattern(escape)));
        }
    }

    /// The clause separator (`\n` unless collapsed).
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Collapse clause separators to a single space.
    pub fn new_line_to_single_space(&mut self) {
        self.separator = " ".to_string();
    }

    /// Quote an identifier segment per the profile's quoting style.
    pub fn quote(&self, ident: &str) -> String {
        if ident == "*" {
            return ident.to_string();
        }
        match self.quote_style {
            QuoteStyle::None => ident.to_string(),
            QuoteStyle::DoubleQuote => format!("\"{}\"", ident),
            QuoteStyle::Backtick => format!("`{}`", ident),
            QuoteStyle::Bracket => format!("[{}]", ident),
        }
    }

    /// The SQL keyword for a join kind. `Default` joins are rendered as
    /// comma-separated FROM entries, not through a keyword.
    pub fn join_keyword(kind: JoinType) -> &'static str {
        match kind {
            JoinType::Default => ",",
            JoinType::Join => "join",
            JoinType::Inner => "inner join",
            JoinType::Left => "left join",
            JoinType::Right => "right join",
            JoinType::Full => "full join",
            JoinType::Cross => "cross join",
        }
    }

    /// The SQL keyword combining set-operation operands.
    pub fn set_op_keyword(kind: SetOpKind) -> &'static str {
        match kind {
            SetOpKind::Union => "union",
            SetOpKind::UnionAll => "union all",
            SetOpKind::Intersect => "intersect",
            SetOpKind::Except => "except",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_replaces_default_pattern() {
        let mut t = SqlTemplates::generic();
        t.override_op(Op::Concat, "concat({0}, {1})");
        let elements = t.template(Op::Concat).unwrap().elements();
        assert_eq!(elements.len(), 5, "concat(, {{0}}, comma, {{1}}, close");
    }

    #[test]
    fn unsupported_operator_is_an_error() {
        let mut t = SqlTemplates::generic();
        t.mark_unsupported(Op::BoolAll);
        assert!(matches!(
            t.template(Op::BoolAll),
            Err(Error::UnsupportedOperator(_))
        ));
    }

    #[test]
    fn quoting_styles() {
        let mut t = SqlTemplates::generic();
        assert_eq!(t.quote("NAME"), "NAME");
        t.quote_style = QuoteStyle::Backtick;
        assert_eq!(t.quote("NAME"), "`NAME`");
        assert_eq!(t.quote("*"), "*");
    }
}
