//! Generic SQL dialect (ANSI SQL)

use super::SqlTemplates;

pub(crate) fn templates() -> SqlTemplates {
    SqlTemplates::generic()
}
