// crates/core/src/lib.rs
//! Simdeck core library.
//!
//! Engine-facing contracts and the collaborators the server delegates to:
//! the cooperative [`CancelToken`], the [`SimulationEngine`] trait and its
//! phase-1 implementation, payload validation, the preset catalog, and the
//! JSON/CSV exporter.

pub mod cancel;
pub mod engine;
pub mod error;
pub mod export;
pub mod payload;
pub mod presets;

pub use cancel::{CancelState, CancelToken};
pub use engine::{PhaseOneEngine, ProgressSink, SimOutcome, SimulationEngine};
pub use error::{EngineError, ExportError, PayloadError};
pub use export::Exporter;
pub use payload::{SimPayload, SimResult};
pub use presets::{PresetCatalog, PresetDescriptor};
