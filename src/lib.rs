//! This crate provides tools for analyzing simulated neural recordings in Rust:
//! orientation tuning curves, vector-average preference and selectivity,
//! spike-triggered averages of synaptic conductances and trial-to-trial
//! precision (PSTH autocorrelation).
//!
//! # Populating a Store
//!
//! ```rust
//! use rusty_ephys::segment::Segment;
//! use rusty_ephys::stimulus::{StimulusDescriptor, StimulusParameter};
//! use rusty_ephys::store::DataStore;
//!
//! let mut store = DataStore::new();
//!
//! // One 1000 ms trial of a grating at orientation 0, one neuron firing at 10 spikes/s
//! let stimulus = StimulusDescriptor::new(
//!     "FullfieldDriftingSinusoidalGrating",
//!     vec![
//!         StimulusParameter::new("orientation", 0.0),
//!         StimulusParameter::new("trial", 0.0),
//!     ],
//! )
//! .unwrap();
//! let times: Vec<f64> = (0..10).map(|i| i as f64 * 100.0).collect();
//! let segment = Segment::new(vec![times], 0.0, 1000.0, None, None).unwrap();
//! store.add_recording("V1_Exc", stimulus, segment);
//!
//! assert_eq!(store.sheets(), vec!["V1_Exc"]);
//! ```
//!
//! # Running Analyses
//!
//! ```rust
//! use rusty_ephys::analysis::{Analysis, AveragedOrientationTuning};
//! use rusty_ephys::segment::Segment;
//! use rusty_ephys::stimulus::{StimulusDescriptor, StimulusParameter};
//! use rusty_ephys::store::DataStore;
//!
//! let mut store = DataStore::new();
//! let stimulus = StimulusDescriptor::new(
//!     "FullfieldDriftingSinusoidalGrating",
//!     vec![
//!         StimulusParameter::new("orientation", 0.0),
//!         StimulusParameter::new("trial", 0.0),
//!     ],
//! )
//! .unwrap();
//! let segment = Segment::new(vec![vec![100.0, 350.0]], 0.0, 1000.0, None, None).unwrap();
//! store.add_recording("V1_Exc", stimulus, segment);
//!
//! // Build one cyclic tuning curve per sheet, averaging over trials
//! let analysis = AveragedOrientationTuning::new(
//!     "FullfieldDriftingSinusoidalGrating",
//!     0, // varying parameter: orientation
//!     1, // trial parameter
//!     vec!["example".to_string()],
//! )
//! .unwrap();
//! analysis.analyse(&mut store).unwrap();
//!
//! assert_eq!(store.tuning_curves("V1_Exc").len(), 1);
//! ```

pub mod analysis;
pub mod error;
pub mod results;
pub mod segment;
pub mod signal;
pub mod stimulus;
pub mod store;
