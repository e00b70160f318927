//! H2 Dialect
//!
//! Generic profile with parenthesized set-operation operands.

use super::SqlTemplates;

pub(crate) fn templates() -> SqlTemplates {
    let mut t = SqlTemplates::generic();
    t.parenthesize_set_operands = true;
    t
}
