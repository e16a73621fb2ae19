use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::Timer;
use crate::pal::ProbeFacade;

/// Loopback on an ephemeral port: reachable by worker processes on the same machine only.
const DEFAULT_BIND_ADDRESS: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);

/// Configures a [`Timer`] before it is created.
///
/// # Examples
///
/// ```
/// use std::net::SocketAddr;
///
/// use par_timer::Timer;
///
/// # fn main() -> par_timer::Result<()> {
/// let timer = Timer::builder()
///     .bind_address(SocketAddr::from(([127, 0, 0, 1], 0)))
///     .build();
///
/// let handle = timer.remote_handle()?;
/// assert!(handle.address().ip().is_loopback());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
#[must_use]
pub struct TimerBuilder {
    bind_address: SocketAddr,
    probe: ProbeFacade,
}

impl TimerBuilder {
    pub(crate) fn new() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS,
            probe: ProbeFacade::real(),
        }
    }

    /// The address the listener for worker processes binds to once
    /// [`Timer::remote_handle()`] is first called.
    ///
    /// Defaults to `127.0.0.1:0`. Use port 0 to let the operating system pick a free port.
    pub fn bind_address(mut self, address: SocketAddr) -> Self {
        self.bind_address = address;
        self
    }

    #[cfg(test)]
    pub(crate) fn probe(mut self, probe: ProbeFacade) -> Self {
        self.probe = probe;
        self
    }

    /// Creates the timer. Its creation time is taken now.
    pub fn build(self) -> Timer {
        Timer::from_parts(self.bind_address, self.probe)
    }
}
