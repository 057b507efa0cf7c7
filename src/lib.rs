//! Reactive NAPLAN performance and school funding dashboard.
//!
//! [`data::store::DatasetStore`] holds the source tables, [`data::filter::FilterState`]
//! carries one chart's selections, and [`chart::render`] turns both into a
//! [`chart::spec::ChartSpec`] that the UI draws.

pub mod app;
pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod state;
pub mod ui;

pub use chart::{render, ChartId};
pub use data::filter::{Choice, FilterState, SchoolSelection};
pub use data::store::DatasetStore;
pub use error::{Result, StoreError};
