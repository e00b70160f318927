//! MySQL Dialect
//!
//! Key differences from standard SQL:
//! - || is the OR operator, not string concatenation (use CONCAT)
//! - Backticks for identifiers
//! - No NULLS FIRST/LAST in ORDER BY
//! - No EVERY aggregate

use super::{QuoteStyle, SqlTemplates};
use quell_core::Op;

pub(crate) fn templates() -> SqlTemplates {
    let mut t = SqlTemplates::generic();
    t.quote_style = QuoteStyle::Backtick;
    t.nulls_ordering = false;
    t.override_op(Op::Concat, "concat({0}, {1})");
    t.mark_unsupported(Op::BoolAll);
    t
}
