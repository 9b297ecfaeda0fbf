//! Payroll and Time Tracking Engine
//!
//! This crate captures daily work time through a clock-in/break/clock-out
//! state machine with an approval workflow, classifies worked hours into
//! regular, overtime and double-time buckets, and turns approved hours and an
//! employee's compensation profile into gross pay, itemized tax and benefit
//! deductions, and net pay. Batches of employees are processed with
//! per-employee failure isolation.
//!
//! Storage is abstracted behind the traits in [`repository`]; in-memory
//! implementations are provided.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod service;
