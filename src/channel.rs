use crate::wire::{Message, RECORD_LEN};
use std::io;

/// Non-blocking byte channel to one client.
///
/// Both calls must return `ErrorKind::WouldBlock` instead of waiting.
/// `try_read` returning `Ok(0)` means the peer closed the channel.
pub trait Channel {
    fn try_read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    fn try_write(&mut self, buf: &[u8]) -> io::Result<usize>;
}

impl Channel for tokio::net::UnixStream {
    fn try_read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        tokio::net::UnixStream::try_read(self, buf)
    }

    fn try_write(&mut self, buf: &[u8]) -> io::Result<usize> {
        tokio::net::UnixStream::try_write(self, buf)
    }
}

/// Writes one whole record. A short write is reported as `WriteZero`.
pub fn write_record<C: Channel + ?Sized>(channel: &mut C, msg: &Message) -> io::Result<()> {
    let n = channel.try_write(&msg.encode())?;
    if n != RECORD_LEN {
        return Err(io::Error::new(
            io::ErrorKind::WriteZero,
            format!("short write: {} of {} bytes", n, RECORD_LEN),
        ));
    }
    Ok(())
}
