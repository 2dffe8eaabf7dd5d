//! Module implementing the analysis algorithms.
//!
//! Every analysis follows the same pattern: it is constructed with a validated
//! parameter set and a tag list, pulls its own data from the store through a
//! [`DataStoreView`](crate::store::DataStoreView), computes locally and appends
//! write-once results back to the store. Construction fails with a
//! configuration error before any computation when a required parameter is
//! missing or invalid.

use crate::error::EphysError;
use crate::store::DataStore;

pub mod gsta;
pub mod precision;
pub mod tuning;
pub mod vector_average;

pub use gsta::Gsta;
pub use precision::Precision;
pub use tuning::AveragedOrientationTuning;
pub use vector_average::TuningCurvePreferenceVectorAverage;

/// An analysis algorithm: reads recordings from the store, computes derived
/// quantities and appends tagged results back to the store.
pub trait Analysis {
    /// Run the analysis against the given store.
    fn analyse(&self, store: &mut DataStore) -> Result<(), EphysError>;
}
