//! Derby Dialect
//!
//! Key differences:
//! - Table-valued functions are framed as `table(fn())`
//! - `offset .. rows fetch next .. rows only` paging

use super::{FunctionWrap, LimitStyle, SqlTemplates};

pub(crate) fn templates() -> SqlTemplates {
    let mut t = SqlTemplates::generic();
    t.limit_style = LimitStyle::OffsetFetch;
    t.function_wrap = FunctionWrap::Table;
    t
}
