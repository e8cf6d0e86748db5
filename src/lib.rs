//! Core library for the scholarship fund's reporting utilities.
//!
//! The library reads donor, donation and bill exports from the accounting
//! software, aggregates them by fiscal year, and writes report workbooks.
//! Spreadsheet adapters live under [`scholarship::reports::io`], the fiscal
//! calendar in [`scholarship::reports::calendar`], donor analytics under
//! [`scholarship::reports::donors`], the grant ledger under
//! [`scholarship::reports::grants`], the sheet flattening in
//! [`scholarship::reports::flatten`], and the run orchestration in
//! [`scholarship::reports::pipeline`].

pub mod scholarship;

pub use scholarship::reports::{
    FundError, Result, calendar, config, donors, error, flatten, grants, io, pipeline,
};
