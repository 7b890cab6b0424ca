//! Tests for the projection and advisory engine
//!
//! Tests are organized by topic:
//! - `occurrence` - Month-resolution event scheduling
//! - `simulation` - Monthly wealth curve, rounding discipline, flow timing
//! - `projection` - Yearly aggregation and the annual projector
//! - `alignment` - Overlap fraction, categories, write-back
//! - `suggestions` - Goal contributions and rebalancing advice
//! - `properties` - Property-based checks across random inputs

mod simulation;
