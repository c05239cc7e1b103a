//! Train/validation/test splitters.
//!
//! Three windowing strategies over an ordered table, all with the same output
//! contract: a list of [`Split`]s whose partitions are disjoint, contiguous
//! row ranges of the parent table. Parameter validation happens at
//! construction time; window-versus-data overflow is only detectable when
//! `split` is invoked with a table.

mod expanding;
mod rolling;
mod straight;

pub use expanding::ExpandingSplit;
pub use rolling::RollingSplit;
pub use straight::StraightSplit;

use std::sync::Arc;

use polars::prelude::DataFrame;

use crate::types::{Partition, Split};

/// Assemble a split from (offset, length) partition ranges of the parent.
pub(crate) fn make_split(
    parent: &Arc<DataFrame>,
    train: (usize, usize),
    validation: (usize, usize),
    test: (usize, usize),
) -> Split {
    Split {
        parent: Arc::clone(parent),
        train: Partition::slice(parent, train.0, train.1),
        validation: Partition::slice(parent, validation.0, validation.1),
        test: Partition::slice(parent, test.0, test.1),
    }
}
