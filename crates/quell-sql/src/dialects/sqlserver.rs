//! SQL Server Dialect
//!
//! Key differences:
//! - TOP instead of LIMIT; no offset with TOP
//! - Square brackets for identifiers
//! - + for string concatenation
//! - No NULLS FIRST/LAST, no boolean select lists

use super::{LimitStyle, QuoteStyle, SqlTemplates};
use quell_core::Op;

pub(crate) fn templates() -> SqlTemplates {
    let mut t = SqlTemplates::generic();
    t.quote_style = QuoteStyle::Bracket;
    t.limit_style = LimitStyle::Top;
    t.nulls_ordering = false;
    t.select_boolean_literals = false;
    t.override_op(Op::Concat, "{0} + {1}");
    t
}
