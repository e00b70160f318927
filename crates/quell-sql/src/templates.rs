//! Operator rendering templates.
//!
//! A [`Template`] is a parsed pattern string with positional holes, e.g.
//! `{0} = {1}` or `count(distinct {0})`. Parsing happens once per
//! (dialect, operator) when a profile is constructed; the serializer then
//! walks the cached element list.
//!
//! Hole syntax:
//! - `{0}` renders the argument through the serializer (constants become
//!   placeholders)
//! - `{0s}` renders a constant argument inline as literal text, bypassing
//!   parameter binding
//!
//! Parenthesization is driven by [`precedence`]: when a rendered argument
//! is itself an operation whose precedence is strictly greater (looser)
//! than the surrounding operator's, it is wrapped in parentheses.
//! Operators with precedence `-1` (functions, aggregates) never
//! parenthesize their arguments; their patterns carry any parentheses
//! they need.

use once_cell::sync::Lazy;
use quell_core::Op;
use std::collections::HashMap;

/// One element of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateElement {
    Static(String),
    /// Render the argument at this index through the serializer
    Arg(usize),
    /// Render a constant argument inline as literal text
    AsString(usize),
}

/// A parsed operator template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    elements: Vec<TemplateElement>,
}

impl Template {
    /// Parse a pattern string. Unrecognized hole syntax is kept as literal
    /// text.
    pub fn parse(pattern: &str) -> Template {
        let mut elements = Vec::new();
        let mut text = String::new();
        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '{' {
                text.push(c);
                continue;
            }
            let mut digits = String::new();
            while let Some(d) = chars.peek().copied() {
                if d.is_ascii_digit() {
                    digits.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            let as_string = chars.peek() == Some(&'s');
            if as_string {
                chars.next();
            }
            if !digits.is_empty() && chars.peek() == Some(&'}') {
                chars.next();
                if !text.is_empty() {
                    elements.push(TemplateElement::Static(std::mem::take(&mut text)));
                }
                let index = digits.parse().unwrap_or(0);
                elements.push(if as_string {
                    TemplateElement::AsString(index)
                } else {
                    TemplateElement::Arg(index)
                });
            } else {
                text.push('{');
                text.push_str(&digits);
                if as_string {
                    text.push('s');
                }
            }
        }
        if !text.is_empty() {
            elements.push(TemplateElement::Static(text));
        }
        Template { elements }
    }

    pub fn elements(&self) -> &[TemplateElement] {
        &self.elements
    }
}

/// Operator precedence for parenthesization. Lower binds tighter; `-1`
/// means the operator's arguments are never parenthesized by precedence.
pub fn precedence(op: Op) -> i32 {
    use Op::*;
    match op {
        Negate => 6,
        Mult | Div | Mod => 10,
        Add | Sub => 12,
        Concat => 14,
        Eq | Ne | EqIc | Lt | Gt | Loe | Goe => 18,
        Like | StartsWith | StartsWithIc | EndsWith | EndsWithIc | StringContains
        | StringContainsIc | In | NotIn | Between | IsNull | IsNotNull => 24,
        Not => 30,
        And => 36,
        Or => 38,
        List => 40,
        _ => -1,
    }
}

/// Default patterns, shared by every profile and overlaid per dialect.
///
/// `Op::Like` is absent here: its pattern depends on the profile's escape
/// character and is produced by [`like_pattern`]. `Op::List` has no
/// pattern; the serializer renders it as a comma-joined sequence. The
/// `starts_with`/`ends_with`/`contains` family is rewritten to `Op::Like`
/// before template lookup.
static DEFAULT_PATTERNS: Lazy<HashMap<Op, &'static str>> = Lazy::new(|| {
    use Op::*;
    HashMap::from([
        (And, "{0} and {1}"),
        (Or, "{0} or {1}"),
        (Not, "not {0}"),
        (Eq, "{0} = {1}"),
        (Ne, "{0} != {1}"),
        (EqIc, "lower({0}) = lower({1})"),
        (Lt, "{0} < {1}"),
        (Gt, "{0} > {1}"),
        (Loe, "{0} <= {1}"),
        (Goe, "{0} >= {1}"),
        (Add, "{0} + {1}"),
        (Sub, "{0} - {1}"),
        (Mult, "{0} * {1}"),
        (Div, "{0} / {1}"),
        (Mod, "{0} % {1}"),
        (Negate, "-{0}"),
        (Concat, "{0} || {1}"),
        (Lower, "lower({0})"),
        (Upper, "upper({0})"),
        (Trim, "trim({0})"),
        (IsNull, "{0} is null"),
        (IsNotNull, "{0} is not null"),
        (In, "{0} in {1}"),
        (NotIn, "{0} not in {1}"),
        (Between, "{0} between {1} and {2}"),
        (Coalesce, "coalesce({0})"),
        (Exists, "exists {0}"),
        (Count, "count({0})"),
        (CountDistinct, "count(distinct {0})"),
        (CountAll, "count(*)"),
        (Sum, "sum({0})"),
        (Avg, "avg({0})"),
        (Min, "min({0})"),
        (Max, "max({0})"),
        (BoolAny, "some({0})"),
        (BoolAll, "every({0})"),
    ])
});

/// The LIKE pattern for a given escape character.
pub(crate) fn like_pattern(escape: char) -> String {
    format!("{{0}} like {{1}} escape '{}'", escape)
}

/// Build the merged catalog for a profile: defaults, the escape-dependent
/// LIKE entry, then dialect overrides.
pub(crate) fn build_catalog(
    like_escape: char,
    overrides: &HashMap<Op, String>,
) -> HashMap<Op, Template> {
    let mut catalog: HashMap<Op, Template> = DEFAULT_PATTERNS
        .iter()
        .map(|(op, pattern)| (*op, Template::parse(pattern)))
        .collect();
    catalog.insert(Op::Like, Template::parse(&like_pattern(like_escape)));
    for (op, pattern) in overrides {
        catalog.insert(*op, Template::parse(pattern));
    }
    catalog
}
