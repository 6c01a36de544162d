//! # Data Model
//!
//! Plain DTOs that cross every boundary: caller ↔ client ↔ driver.
//!
//! Design rule: no driver types here. This module is pure data: no I/O,
//! no state, no async.

pub mod value;
pub mod property_map;
pub mod record;

pub use value::Value;
pub use property_map::PropertyMap;
pub use record::{RankRecord, PathRecord, PathStep, SENTINEL_NAME};
