//! Calendar-aligned chart datasets.
//!
//! Entries come out of the store as a sparse list of `(user, date, amount)`
//! rows. Charts want one dense axis of days and one aligned series per
//! user, which is what [`build_dataset`] produces.

mod dataset;

pub use dataset::{
    build_dataset, build_dataset_within, parse_date, ChartError, ChartRow, Dataset, DateLabel, DATE_FORMAT,
    DEFAULT_MAX_DAYS,
};
