//! Row tuples and closeable row sources.
//!
//! Executing a serialized query yields a stream of positional rows. The
//! group transformer consumes that stream through [`CloseableRows`], a
//! single-pass source with an explicit close step that is guaranteed to run
//! on every exit path, successful or not.

use crate::error::Result;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// One result row as an ordered sequence of values indexed by projection
/// position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row(Vec<Value>);

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Row(values)
    }

    /// Get a row element by projection index.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The row content as an owned value vector.
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.clone()
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Row(values)
    }
}

/// A lazy, finite, single-pass row source.
///
/// `next_row` returns `Ok(None)` once the source is exhausted. `close`
/// releases the underlying resources; callers must invoke it exactly once
/// on every exit path. Reading after close surfaces as a
/// `RowStreamFailed` error from the implementation.
pub trait CloseableRows {
    fn next_row(&mut self) -> Result<Option<Row>>;

    fn close(&mut self) -> Result<()>;
}

/// An in-memory row source over a fixed vector.
#[derive(Debug)]
pub struct VecRows {
    rows: std::vec::IntoIter<Row>,
    closed: bool,
}

impl VecRows {
    pub fn new(rows: Vec<Row>) -> Self {
        VecRows {
            rows: rows.into_iter(),
            closed: false,
        }
    }

    /// Build from raw value vectors.
    pub fn from_values(rows: Vec<Vec<Value>>) -> Self {
        Self::new(rows.into_iter().map(Row::new).collect())
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl CloseableRows for VecRows {
    fn next_row(&mut self) -> Result<Option<Row>> {
        if self.closed {
            return Err(crate::error::Error::row_stream("source already closed"));
        }
        Ok(self.rows.next())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
