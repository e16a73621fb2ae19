//! Platform abstraction layer for the measurements taken around each call.
//!
//! This module allows switching between the real measurement probe and a fake one whose
//! readings are controlled by tests.

mod abstractions;
mod facade;
#[cfg(test)]
mod fake;
mod real;

pub(crate) use abstractions::MeasurementProbe;
pub(crate) use facade::ProbeFacade;
#[cfg(test)]
pub(crate) use fake::FakeProbe;
