//! gasfit - Gas cost modelling for benchmark results
//!
//! This library loads gas benchmark measurements, summarizes them, fits an
//! ordinary least squares cost model, renders diagnostic plots, and generates
//! a TypeScript estimator from the fitted coefficients.

pub mod cli;
pub mod codegen;
pub mod config;
pub mod dataset;
pub mod features;
pub mod pipeline;
pub mod plot;
pub mod regression;
pub mod report;
