//! Probe facade for switching between real and fake implementations.

use std::time::Duration;

use crate::pal::abstractions::MeasurementProbe;
#[cfg(test)]
use crate::pal::fake::FakeProbe;
use crate::pal::real::RealProbe;

#[derive(Clone, Debug)]
pub(crate) enum ProbeFacade {
    Real(RealProbe),

    #[cfg(test)]
    Fake(FakeProbe),
}

impl ProbeFacade {
    pub(crate) fn real() -> Self {
        Self::Real(RealProbe)
    }

    #[cfg(test)]
    pub(crate) fn fake(probe: FakeProbe) -> Self {
        Self::Fake(probe)
    }
}

impl MeasurementProbe for ProbeFacade {
    fn elapsed(&self) -> Duration {
        match self {
            Self::Real(probe) => probe.elapsed(),
            #[cfg(test)]
            Self::Fake(probe) => probe.elapsed(),
        }
    }

    fn gc_time(&self) -> Duration {
        match self {
            Self::Real(probe) => probe.gc_time(),
            #[cfg(test)]
            Self::Fake(probe) => probe.gc_time(),
        }
    }

    fn alloc_count(&self) -> u64 {
        match self {
            Self::Real(probe) => probe.alloc_count(),
            #[cfg(test)]
            Self::Fake(probe) => probe.alloc_count(),
        }
    }

    fn bytes_allocated(&self) -> u64 {
        match self {
            Self::Real(probe) => probe.bytes_allocated(),
            #[cfg(test)]
            Self::Fake(probe) => probe.bytes_allocated(),
        }
    }
}
