use std::{fmt, io};

/// Transport-level result. The `Wait` variant distinguishes "nothing went
/// wrong, there is just nothing to do yet" (`EAGAIN`/`EWOULDBLOCK`) from
/// every other error, so callers can retry on `Wait` and disconnect/log on
/// `Fatal` without matching on `io::ErrorKind` at every call site.
pub type TransportResult<T> = Result<T, TransportError>;

#[derive(Debug)]
pub enum TransportError {
    /// The operation would have blocked; nothing is actually wrong. Retry
    /// on the next readable/writable event.
    Wait,
    Fatal(ErrorKind),
}

#[derive(Debug)]
pub enum ErrorKind {
    Io(io::Error),
    /// A `send`/`sendto` completed but wrote fewer bytes than the frame.
    ShortSend { wrote: usize, needed: usize },
    /// `eapol-wire` rejected the frame.
    Validation(eapol_wire::WireError),
    /// `transmit` was attempted on a wireless main endpoint with no known
    /// BSSID and refresh did not resolve one.
    UnknownBssid,
    /// Socket setup (bind/join-multicast/non-blocking) failed fatally.
    SocketSetup(&'static str, io::Error),
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> TransportError {
        if err.kind() == io::ErrorKind::WouldBlock {
            TransportError::Wait
        } else {
            TransportError::Fatal(ErrorKind::Io(err))
        }
    }
}

impl From<eapol_wire::WireError> for TransportError {
    fn from(err: eapol_wire::WireError) -> TransportError {
        TransportError::Fatal(ErrorKind::Validation(err))
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Wait => write!(f, "would block"),
            TransportError::Fatal(kind) => write!(f, "{}", kind),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Io(err) => write!(f, "io error: {}", err),
            ErrorKind::ShortSend { wrote, needed } => {
                write!(f, "short send: wrote {} of {} bytes", wrote, needed)
            }
            ErrorKind::Validation(err) => write!(f, "invalid frame: {}", err),
            ErrorKind::UnknownBssid => write!(f, "transmit attempted with unknown bssid"),
            ErrorKind::SocketSetup(step, err) => write!(f, "socket setup failed at {}: {}", step, err),
        }
    }
}

impl std::error::Error for TransportError {}

impl TransportError {
    #[inline]
    pub fn is_wait(&self) -> bool {
        matches!(self, TransportError::Wait)
    }
}
