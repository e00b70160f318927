//! Oracle Dialect
//!
//! Key differences:
//! - No boolean values in select lists (CASE WHEN wrapper)
//! - `offset .. rows fetch next .. rows only` paging
//! - Distinct/multi-column counts go through a wrapping subquery
//! - Table-valued functions are framed as `table(fn())`
//! - Double quotes for identifiers

use super::{FunctionWrap, LimitStyle, QuoteStyle, SqlTemplates};
use quell_core::Op;

pub(crate) fn templates() -> SqlTemplates {
    let mut t = SqlTemplates::generic();
    t.quote_style = QuoteStyle::DoubleQuote;
    t.limit_style = LimitStyle::OffsetFetch;
    t.function_wrap = FunctionWrap::Table;
    t.count_via_subquery = true;
    t.select_boolean_literals = false;
    t.override_op(Op::Concat, "{0} || {1}");
    t.override_op(Op::Trim, "trim(both from {0})");
    t
}
