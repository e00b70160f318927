//! PostgreSQL Dialect
//!
//! Close to the generic profile: native boolean selects, NULLS FIRST/LAST,
//! `limit` / `offset` paging. The boolean quantifiers use their PostgreSQL
//! names.

use super::SqlTemplates;
use quell_core::Op;

pub(crate) fn templates() -> SqlTemplates {
    let mut t = SqlTemplates::generic();
    t.override_op(Op::BoolAny, "bool_or({0})");
    t.override_op(Op::BoolAll, "bool_and({0})");
    t
}
