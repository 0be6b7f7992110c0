//! Validation rules

pub mod document;
pub mod references;

use crate::diagnostics::Diagnostic;
use crate::index::CorpusIndex;

/// Caller-owned accumulator threaded through every validation operation.
///
/// Holds the shared corpus identifier map and the collected diagnostics, so
/// a batch run continues past individual failures and no state hides inside
/// a validator instance.
#[derive(Debug, Default)]
pub struct RunContext {
    pub index: CorpusIndex,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl RunContext {
    pub fn new(index: CorpusIndex) -> Self {
        Self {
            index,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}
