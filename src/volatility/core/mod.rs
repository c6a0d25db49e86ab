//! core — building blocks shared by the GARCH models.
//!
//! Data containers ([`returns`], [`data`]), parameterization ([`params`],
//! [`workspace`], [`validation`]), the recursions ([`variance`],
//! [`forecasts`]) and their configuration ([`spec`], [`options`],
//! [`guards`], [`distribution`]). [`simulation`] generates synthetic paths.
pub mod data;
pub mod distribution;
pub mod forecasts;
pub mod guards;
pub mod options;
pub mod params;
pub mod returns;
pub mod simulation;
pub mod spec;
pub mod validation;
pub mod variance;
pub mod workspace;
