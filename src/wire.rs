//! Fixed-size request/response records exchanged with client processes.
//!
//! Every record is 12 bytes in host byte order: `pid: i32`,
//! `request: u32`, `time_ms: u32`. One record per read, one per write.

use std::fmt;

pub type Pid = i32;

/// Size in bytes of one encoded [`Message`].
pub const RECORD_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Request {
    /// Client asks for a CPU burst of `time_ms`.
    Run = 0,
    /// Client asks for an I/O wait of `time_ms`.
    Block = 1,
    /// Server acknowledges a request; `time_ms` is the server clock.
    Ack = 2,
    /// Server reports a finished burst or wait; `time_ms` is the server clock.
    Done = 3,
}

impl Request {
    fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Request::Run),
            1 => Some(Request::Block),
            2 => Some(Request::Ack),
            3 => Some(Request::Done),
            _ => None,
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::Run => write!(f, "RUN"),
            Request::Block => write!(f, "BLOCK"),
            Request::Ack => write!(f, "ACK"),
            Request::Done => write!(f, "DONE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub pid: Pid,
    pub request: Request,
    pub time_ms: u32,
}

impl Message {
    pub fn new(pid: Pid, request: Request, time_ms: u32) -> Self {
        Self {
            pid,
            request,
            time_ms,
        }
    }

    pub fn ack(pid: Pid, now_ms: u32) -> Self {
        Self::new(pid, Request::Ack, now_ms)
    }

    pub fn done(pid: Pid, now_ms: u32) -> Self {
        Self::new(pid, Request::Done, now_ms)
    }

    pub fn encode(&self) -> [u8; RECORD_LEN] {
        let mut out = [0u8; RECORD_LEN];
        out[0..4].copy_from_slice(&self.pid.to_ne_bytes());
        out[4..8].copy_from_slice(&(self.request as u32).to_ne_bytes());
        out[8..12].copy_from_slice(&self.time_ms.to_ne_bytes());
        out
    }

    /// Decodes exactly one record. Anything but `RECORD_LEN` bytes is an error.
    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() != RECORD_LEN {
            return Err(WireError::Truncated(buf.len()));
        }
        let word = |i: usize| [buf[i], buf[i + 1], buf[i + 2], buf[i + 3]];
        let pid = i32::from_ne_bytes(word(0));
        let raw = u32::from_ne_bytes(word(4));
        let time_ms = u32::from_ne_bytes(word(8));
        let request = Request::from_raw(raw).ok_or(WireError::UnknownRequest(raw))?;
        Ok(Self {
            pid,
            request,
            time_ms,
        })
    }
}

/// Error decoding a record read from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// Read returned a partial record of the given length.
    Truncated(usize),
    /// Request discriminant outside RUN/BLOCK/ACK/DONE.
    UnknownRequest(u32),
    /// A well-formed record that clients are not allowed to send.
    Unexpected(Request),
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::Truncated(len) => {
                write!(f, "expected {} byte record, got {} bytes", RECORD_LEN, len)
            }
            WireError::UnknownRequest(raw) => write!(f, "unknown request type {}", raw),
            WireError::Unexpected(req) => write!(f, "client sent server-only request {}", req),
        }
    }
}

impl std::error::Error for WireError {}
