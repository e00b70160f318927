//! Result grouping.
//!
//! Folds a row stream into an insertion-ordered mapping from a group key to
//! a [`Group`] of per-column aggregates. The first projected column is the
//! group key; every declared group expression owns one accumulator per
//! group, fed positionally from each row.
//!
//! ```rust,ignore
//! use quell_core::group::{GroupBy, GroupSpec};
//!
//! let by_id = GroupBy::new(
//!     survey_id,
//!     vec![GroupSpec::one(name), GroupSpec::sum(score)],
//! );
//! let groups = by_id.transform(rows)?;
//! ```
//!
//! The row source is closed on every exit path; upstream failures surface
//! as `RowStreamFailed` after the close has run.

use crate::error::{Error, Result};
use crate::expressions::Expression;
use crate::tuple::CloseableRows;
use crate::value::Value;
use indexmap::{IndexMap, IndexSet};

/// An aggregate specifier over one projected column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupSpec {
    /// First non-null value seen
    One(Expression),
    Min(Expression),
    Max(Expression),
    Sum(Expression),
    Avg(Expression),
    /// Encounter-ordered list, nulls included
    List(Expression),
    /// De-duplicated, first-encounter-ordered set
    Set(Expression),
    /// Key-value pairs in first-encounter order of keys.
    ///
    /// The projected column holds a two-element list value per row. When
    /// `overwrite` is false (the default), later occurrences of a key keep
    /// the first value.
    Map {
        key: Expression,
        value: Expression,
        overwrite: bool,
    },
}

impl GroupSpec {
    pub fn one(expr: Expression) -> Self {
        GroupSpec::One(expr)
    }

    pub fn min(expr: Expression) -> Self {
        GroupSpec::Min(expr)
    }

    pub fn max(expr: Expression) -> Self {
        GroupSpec::Max(expr)
    }

    pub fn sum(expr: Expression) -> Self {
        GroupSpec::Sum(expr)
    }

    pub fn avg(expr: Expression) -> Self {
        GroupSpec::Avg(expr)
    }

    pub fn list(expr: Expression) -> Self {
        GroupSpec::List(expr)
    }

    pub fn set(expr: Expression) -> Self {
        GroupSpec::Set(expr)
    }

    pub fn map(key: Expression, value: Expression) -> Self {
        GroupSpec::Map {
            key,
            value,
            overwrite: false,
        }
    }

    pub fn map_overwrite(key: Expression, value: Expression) -> Self {
        GroupSpec::Map {
            key,
            value,
            overwrite: true,
        }
    }

    /// The expression this specifier projects.
    ///
    /// A map specifier projects its key-value pair as one tuple column.
    pub fn expression(&self) -> Expression {
        match self {
            GroupSpec::One(e)
            | GroupSpec::Min(e)
            | GroupSpec::Max(e)
            | GroupSpec::Sum(e)
            | GroupSpec::Avg(e)
            | GroupSpec::List(e)
            | GroupSpec::Set(e) => e.clone(),
            GroupSpec::Map { key, value, .. } => {
                Expression::tuple(vec![key.clone(), value.clone()])
            }
        }
    }

    fn fresh_accumulator(&self) -> Accumulator {
        match self {
            GroupSpec::One(_) => Accumulator::One(None),
            GroupSpec::Min(_) => Accumulator::Min(None),
            GroupSpec::Max(_) => Accumulator::Max(None),
            GroupSpec::Sum(_) => Accumulator::Sum(None),
            GroupSpec::Avg(_) => Accumulator::Avg { sum: 0.0, count: 0 },
            GroupSpec::List(_) => Accumulator::List(Vec::new()),
            GroupSpec::Set(_) => Accumulator::Set(IndexSet::new()),
            GroupSpec::Map { overwrite, .. } => Accumulator::Map {
                entries: IndexMap::new(),
                overwrite: *overwrite,
            },
        }
    }
}

/// Running state of one aggregate within one group.
#[derive(Debug, Clone)]
enum Accumulator {
    One(Option<Value>),
    Min(Option<Value>),
    Max(Option<Value>),
    Sum(Option<Value>),
    Avg { sum: f64, count: u64 },
    List(Vec<Value>),
    Set(IndexSet<Value>),
    Map {
        entries: IndexMap<Value, Value>,
        overwrite: bool,
    },
}

impl Accumulator {
    fn feed(&mut self, value: Value) -> Result<()> {
        match self {
            Accumulator::One(slot) => {
                if slot.is_none() && !value.is_null() {
                    *slot = Some(value);
                }
                Ok(())
            }
            Accumulator::Min(slot) => Self::extremum(slot, value, std::cmp::Ordering::Less),
            Accumulator::Max(slot) => Self::extremum(slot, value, std::cmp::Ordering::Greater),
            Accumulator::Sum(slot) => {
                if value.is_null() {
                    return Ok(());
                }
                match slot.take() {
                    None => {
                        if value.as_f64().is_none() {
                            return Err(Error::projection_mismatch(format!(
                                "sum over non-numeric value {}",
                                value
                            )));
                        }
                        *slot = Some(value);
                        Ok(())
                    }
                    Some(current) => match current.try_add(&value) {
                        Some(next) => {
                            *slot = Some(next);
                            Ok(())
                        }
                        None => Err(Error::projection_mismatch(format!(
                            "sum cannot combine {} with {}",
                            current, value
                        ))),
                    },
                }
            }
            Accumulator::Avg { sum, count } => {
                if value.is_null() {
                    return Ok(());
                }
                match value.as_f64() {
                    Some(v) => {
                        *sum += v;
                        *count += 1;
                        Ok(())
                    }
                    None => Err(Error::projection_mismatch(format!(
                        "avg over non-numeric value {}",
                        value
                    ))),
                }
            }
            Accumulator::List(items) => {
                items.push(value);
                Ok(())
            }
            Accumulator::Set(items) => {
                items.insert(value);
                Ok(())
            }
            Accumulator::Map { entries, overwrite } => match value {
                Value::List(pair) => match <[Value; 2]>::try_from(pair) {
                    Ok([k, v]) => {
                        if *overwrite || !entries.contains_key(&k) {
                            entries.insert(k, v);
                        }
                        Ok(())
                    }
                    Err(pair) => Err(Error::projection_mismatch(format!(
                        "map expects a key-value pair column, got {} values",
                        pair.len()
                    ))),
                },
                other => Err(Error::projection_mismatch(format!(
                    "map expects a key-value pair column, got {}",
                    other
                ))),
            },
        }
    }

    fn extremum(slot: &mut Option<Value>, value: Value, keep: std::cmp::Ordering) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }
        match slot.take() {
            None => {
                *slot = Some(value);
                Ok(())
            }
            Some(current) => match value.compare(&current) {
                Some(ord) => {
                    *slot = Some(if ord == keep { value } else { current });
                    Ok(())
                }
                None => Err(Error::projection_mismatch(format!(
                    "cannot order {} against {}",
                    value, current
                ))),
            },
        }
    }

    fn finish(self) -> GroupValue {
        match self {
            Accumulator::One(slot)
            | Accumulator::Min(slot)
            | Accumulator::Max(slot)
            | Accumulator::Sum(slot) => GroupValue::One(slot.unwrap_or(Value::Null)),
            Accumulator::Avg { sum, count } => {
                if count == 0 {
                    GroupValue::One(Value::Null)
                } else {
                    GroupValue::One(Value::Double(sum / count as f64))
                }
            }
            Accumulator::List(items) => GroupValue::List(items),
            Accumulator::Set(items) => GroupValue::Set(items),
            Accumulator::Map { entries, .. } => GroupValue::Map(entries),
        }
    }
}

/// A finalized aggregate value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupValue {
    One(Value),
    List(Vec<Value>),
    Set(IndexSet<Value>),
    Map(IndexMap<Value, Value>),
}

impl GroupValue {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            GroupValue::One(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            GroupValue::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&IndexSet<Value>> {
        match self {
            GroupValue::Set(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<Value, Value>> {
        match self {
            GroupValue::Map(m) => Some(m),
            _ => None,
        }
    }
}

/// The finalized aggregates of one group, keyed by group-expression
/// identity and by declaration position.
#[derive(Debug, Clone)]
pub struct Group {
    entries: Vec<(Expression, GroupValue)>,
}

impl Group {
    /// Look up an aggregate by the expression it was declared over.
    pub fn get(&self, expr: &Expression) -> Option<&GroupValue> {
        self.entries
            .iter()
            .find(|(e, _)| e == expr)
            .map(|(_, v)| v)
    }

    /// Look up an aggregate by declaration position (0 is the key column).
    pub fn at(&self, index: usize) -> Option<&GroupValue> {
        self.entries.get(index).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Insertion-ordered mapping from group key to [`Group`].
pub type Groups = IndexMap<Value, Group>;

/// Groups a row stream by its first projected column.
#[derive(Debug, Clone)]
pub struct GroupBy {
    specs: Vec<GroupSpec>,
}

impl GroupBy {
    /// Create a transformer for the given key expression and aggregate
    /// specifiers. The key occupies column 0 as a first-value aggregate.
    pub fn new(key: Expression, specs: Vec<GroupSpec>) -> Self {
        let mut all = Vec::with_capacity(specs.len() + 1);
        all.push(GroupSpec::one(key));
        all.extend(specs);
        GroupBy { specs: all }
    }

    /// The projection the consumed rows must match, in column order.
    pub fn projection(&self) -> Vec<Expression> {
        self.specs.iter().map(|s| s.expression()).collect()
    }

    /// Fold the row stream into groups.
    ///
    /// The source is closed on every exit path. A fold error wins over a
    /// close error; a close error alone also fails the transform.
    pub fn transform<R: CloseableRows>(&self, mut rows: R) -> Result<Groups> {
        let outcome = self.fold(&mut rows);
        let closed = rows.close();
        let groups = outcome?;
        closed?;
        tracing::debug!(groups = groups.len(), "group transform complete");
        Ok(groups)
    }

    fn fold<R: CloseableRows>(&self, rows: &mut R) -> Result<Groups> {
        let mut accumulating: IndexMap<Value, Vec<Accumulator>> = IndexMap::new();

        loop {
            let row = match rows.next_row() {
                Ok(Some(row)) => row,
                Ok(None) => break,
                Err(e) => return Err(e.into_row_stream()),
            };
            if row.len() != self.specs.len() {
                return Err(Error::projection_mismatch(format!(
                    "expected {} columns per row, got {}",
                    self.specs.len(),
                    row.len()
                )));
            }
            let key = row.get(0).cloned().unwrap_or(Value::Null);
            let accumulators = accumulating
                .entry(key)
                .or_insert_with(|| self.specs.iter().map(GroupSpec::fresh_accumulator).collect());
            for (index, accumulator) in accumulators.iter_mut().enumerate() {
                let value = row.get(index).cloned().unwrap_or(Value::Null);
                accumulator.feed(value)?;
            }
        }

        let projection = self.projection();
        Ok(accumulating
            .into_iter()
            .map(|(key, accumulators)| {
                let entries = projection
                    .iter()
                    .cloned()
                    .zip(accumulators.into_iter().map(Accumulator::finish))
                    .collect();
                (key, Group { entries })
            })
            .collect())
    }
}
