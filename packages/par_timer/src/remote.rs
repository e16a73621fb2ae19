//! Cross-process side of the record queue.
//!
//! The owning process runs a [`Listener`] on a loopback socket. Worker processes hold a
//! [`RemoteTimer`] connected to it and send each record as one frame. The listener pushes the
//! record into the timer's [`RecordQueue`] before acknowledging it, so once
//! [`RemoteTimer::enqueue()`] returns the record is drainable in the owning process.

use std::fmt;
use std::io::{BufReader, ErrorKind};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::pal::ProbeFacade;
use crate::{Error, Record, RecordQueue, Result, measure, try_measure, wire};

const HANDLE_SCHEME: &str = "tcp://";

/// Transmittable identity of a timer's queue.
///
/// Formats to and parses from a plain string so it can be handed to worker processes on the
/// command line or in an environment variable.
///
/// # Examples
///
/// ```
/// use par_timer::{RemoteHandle, Timer};
///
/// # fn main() -> par_timer::Result<()> {
/// let timer = Timer::new();
/// let handle = timer.remote_handle()?;
///
/// let text = handle.to_string();
/// let parsed: RemoteHandle = text.parse()?;
/// assert_eq!(parsed, handle);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct RemoteHandle {
    address: SocketAddr,
}

impl RemoteHandle {
    /// The socket address the owning process listens on.
    #[must_use]
    pub fn address(&self) -> SocketAddr {
        self.address
    }
}

impl fmt::Display for RemoteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{HANDLE_SCHEME}{}", self.address)
    }
}

impl FromStr for RemoteHandle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let address = s
            .strip_prefix(HANDLE_SCHEME)
            .ok_or_else(|| Error::InvalidHandle {
                invalid_value: s.to_string(),
                problem: format!("expected the '{HANDLE_SCHEME}' prefix"),
            })?
            .parse()
            .map_err(|e| Error::InvalidHandle {
                invalid_value: s.to_string(),
                problem: format!("not a socket address: {e}"),
            })?;

        Ok(Self { address })
    }
}

/// Accepts connections from worker processes and feeds their records into a queue.
///
/// Stops accepting and joins its thread when dropped. Connections that are still open finish
/// on their own once the worker closes them.
#[derive(Debug)]
pub(crate) struct Listener {
    handle: RemoteHandle,
    shutdown: Arc<AtomicBool>,
    accept_thread: Option<JoinHandle<()>>,
}

impl Listener {
    pub(crate) fn start(bind_address: SocketAddr, queue: RecordQueue) -> Result<Self> {
        let socket = TcpListener::bind(bind_address)?;
        let handle = RemoteHandle {
            address: socket.local_addr()?,
        };
        let shutdown = Arc::new(AtomicBool::new(false));

        let accept_thread = {
            let shutdown = Arc::clone(&shutdown);
            thread::Builder::new()
                .name("par_timer-listener".to_string())
                .spawn(move || accept_loop(&socket, &queue, &shutdown))?
        };

        debug!(%handle, "remote record listener started");

        Ok(Self {
            handle,
            shutdown,
            accept_thread: Some(accept_thread),
        })
    }

    pub(crate) fn handle(&self) -> RemoteHandle {
        self.handle
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        // Release pairs with the Acquire in the accept loop so it sees the flag once woken.
        self.shutdown.store(true, Ordering::Release);

        // Wake the accept call. If this fails the socket is already gone and so is the loop.
        drop(TcpStream::connect(self.handle.address));

        let panicked = self
            .accept_thread
            .take()
            .is_some_and(|thread| thread.join().is_err());

        if panicked {
            warn!(handle = %self.handle, "remote record listener thread panicked");
        }

        debug!(handle = %self.handle, "remote record listener stopped");
    }
}

fn accept_loop(socket: &TcpListener, queue: &RecordQueue, shutdown: &AtomicBool) {
    for stream in socket.incoming() {
        if shutdown.load(Ordering::Acquire) {
            break;
        }

        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "failed to accept remote record connection");
                continue;
            }
        };

        let peer = stream
            .peer_addr()
            .map_or_else(|_| "<unknown>".to_string(), |a| a.to_string());
        let queue = queue.clone();

        let spawned = thread::Builder::new()
            .name(format!("par_timer-conn-{peer}"))
            .spawn(move || serve_connection(stream, &queue, &peer));

        if let Err(e) = spawned {
            warn!(error = %e, "failed to spawn remote record connection thread");
        }
    }
}

fn serve_connection(stream: TcpStream, queue: &RecordQueue, peer: &str) {
    debug!(peer, "remote producer connected");

    match receive_records(stream, queue) {
        Ok(received) => debug!(peer, received, "remote producer disconnected"),
        Err(Error::Io(e)) if e.kind() == ErrorKind::ConnectionReset => {
            debug!(peer, "remote producer connection reset");
        }
        Err(e) => warn!(peer, error = %e, "dropping remote producer connection"),
    }
}

fn receive_records(stream: TcpStream, queue: &RecordQueue) -> Result<u64> {
    let mut writer = stream.try_clone()?;
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    let mut received: u64 = 0;

    while let Some(record) = wire::read_record(&mut reader, &mut line)? {
        trace!(name = record.name(), pid = record.process_id(), "remote record received");

        queue.enqueue(record);
        wire::write_ack(&mut writer)?;

        received = received.wrapping_add(1);
    }

    Ok(received)
}

#[derive(Debug)]
struct Connection {
    writer: TcpStream,
    reader: BufReader<TcpStream>,
}

impl Connection {
    fn open(address: SocketAddr) -> Result<Self> {
        let writer = TcpStream::connect(address)?;
        writer.set_nodelay(true)?;
        let reader = BufReader::new(writer.try_clone()?);

        Ok(Self { writer, reader })
    }

    fn send(&mut self, record: &Record) -> Result<()> {
        wire::write_record(&mut self.writer, record)?;
        wire::read_ack(&mut self.reader)
    }
}

/// Producer-only view of a [`Timer`](crate::Timer) living in another process.
///
/// Worker processes use this to record calls into the owning process's timer. It has no local
/// record store and no read operations. The type is thread-safe; concurrent recordings share one
/// connection and take turns sending. A connection that failed is closed and the next recording
/// opens a new one.
///
/// # Examples
///
/// ```
/// use par_timer::{RemoteTimer, Timer};
///
/// # fn main() -> par_timer::Result<()> {
/// let timer = Timer::new();
/// let handle = timer.remote_handle()?;
///
/// // In a worker process, the handle would be parsed from a string instead.
/// let remote = RemoteTimer::connect(&handle)?;
/// remote.record("from_worker", || std::hint::black_box(2 + 2))?;
///
/// let rows = timer.rows();
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].name(), "from_worker");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RemoteTimer {
    handle: RemoteHandle,
    // Empty after a transport error until the next enqueue reconnects.
    connection: Mutex<Option<Connection>>,
    probe: ProbeFacade,
}

impl RemoteTimer {
    /// Connects to the timer identified by `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the owning process cannot be reached.
    pub fn connect(handle: &RemoteHandle) -> Result<Self> {
        let connection = Connection::open(handle.address)?;

        debug!(%handle, "connected to remote timer");

        Ok(Self {
            handle: *handle,
            connection: Mutex::new(Some(connection)),
            probe: ProbeFacade::real(),
        })
    }

    /// The handle this producer is connected to.
    #[must_use]
    pub fn handle(&self) -> RemoteHandle {
        self.handle
    }

    /// Runs `f` once, sends its record to the owning process and returns `f`'s value.
    ///
    /// A panic in `f` propagates and sends nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the record could not be delivered. The value of `f` is dropped in
    /// that case.
    pub fn record<R>(&self, name: impl Into<String>, f: impl FnOnce() -> R) -> Result<R> {
        let (value, record) = measure(name.into(), &self.probe, f);
        self.enqueue(record)?;
        Ok(value)
    }

    /// Runs the fallible `f` once and sends its record only if it returned `Ok`.
    ///
    /// # Errors
    ///
    /// Returns the error of `f` untouched, or a delivery failure converted into `E`.
    pub fn try_record<T, E>(
        &self,
        name: impl Into<String>,
        f: impl FnOnce() -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E>
    where
        E: From<Error>,
    {
        let (value, record) = try_measure(name.into(), &self.probe, f)?;
        self.enqueue(record)?;
        Ok(value)
    }

    /// Sends an already measured record and waits until the owning process has queued it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the connection fails and [`Error::MissingAcknowledgement`] if
    /// the owning process closes the connection before confirming receipt. The connection is
    /// dropped in both cases and reopened by the next call.
    pub fn enqueue(&self, record: Record) -> Result<()> {
        let mut slot = self.connection.lock();

        let mut connection = match slot.take() {
            Some(connection) => connection,
            None => {
                debug!(handle = %self.handle, "reconnecting to remote timer");
                Connection::open(self.handle.address)?
            }
        };

        // Only a connection that completed a full exchange goes back into the slot.
        connection.send(&record)?;
        *slot = Some(connection);

        Ok(())
    }
}
