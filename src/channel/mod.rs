//! One-shot result channels
//!
//! Each worker gets its own pipe. The worker owns the write-end
//! ([`ResultSender`]) and the coordinator owns the read-end
//! ([`ResultReceiver`]). Both `send` and `receive` consume their endpoint, so
//! each end is used once and closed once; a double close cannot be expressed.
//!
//! # Wire format
//!
//! One signed 64-bit integer, little-endian, 8 bytes. A pipe write of fewer
//! than `PIPE_BUF` bytes is atomic, so the reader never observes a torn value
//! from a well-behaved writer. Bytes after the value are a protocol error.
//!
//! # Fork safety
//!
//! `ResultSender::send` only issues `write(2)` and `close(2)` and never
//! allocates, so it is safe to call in a child between `fork` and `_exit`.

use crate::error::ChannelError;
use std::io;
use std::os::unix::io::{AsFd, AsRawFd, BorrowedFd, FromRawFd, OwnedFd, RawFd};

/// Size of one encoded result on the wire
pub const VALUE_WIDTH: usize = std::mem::size_of::<i64>();

/// Create a connected result channel
///
/// Both descriptors are close-on-exec so an unrelated `exec` elsewhere in the
/// process never carries them along.
pub fn result_channel() -> io::Result<(ResultSender, ResultReceiver)> {
    let (read_fd, write_fd) = create_pipe()?;
    Ok((ResultSender { fd: write_fd }, ResultReceiver { fd: read_fd }))
}

#[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
fn create_pipe() -> io::Result<(OwnedFd, OwnedFd)> {
    let mut fds: [libc::c_int; 2] = [-1; 2];

    // SAFETY: fds is a valid two-element array for pipe2 to fill
    let result = unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) };
    if result < 0 {
        return Err(io::Error::last_os_error());
    }

    // SAFETY: pipe2 succeeded, both descriptors are open and owned by us
    unsafe { Ok((OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1]))) }
}

#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "freebsd")))]
fn create_pipe() -> io::Result<(OwnedFd, OwnedFd)> {
    let mut fds: [libc::c_int; 2] = [-1; 2];

    // SAFETY: fds is a valid two-element array for pipe to fill
    let result = unsafe { libc::pipe(fds.as_mut_ptr()) };
    if result < 0 {
        return Err(io::Error::last_os_error());
    }

    // SAFETY: pipe succeeded, both descriptors are open and owned by us
    let (read_fd, write_fd) = unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };
    for fd in [&read_fd, &write_fd] {
        // SAFETY: fd is a valid open descriptor
        if unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETFD, libc::FD_CLOEXEC) } < 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok((read_fd, write_fd))
}

/// Write-end of a result channel, owned by exactly one worker
#[derive(Debug)]
pub struct ResultSender {
    fd: OwnedFd,
}

impl ResultSender {
    /// Send the worker's single result and close the write-end
    ///
    /// Retries on `EINTR`. Any other failure (e.g. `EPIPE` when the reader is
    /// gone) is returned and the descriptor is still closed.
    pub fn send(self, value: i64) -> io::Result<()> {
        let bytes = value.to_le_bytes();
        write_all(self.fd.as_raw_fd(), &bytes)
    }
}

impl AsFd for ResultSender {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

/// Read-end of a result channel, owned by the coordinator
#[derive(Debug)]
pub struct ResultReceiver {
    fd: OwnedFd,
}

impl ResultReceiver {
    /// Block until the worker's value arrives and the write-end closes
    ///
    /// # Errors
    ///
    /// - `ChannelError::Empty` if the write-end closed before any byte arrived
    /// - `ChannelError::ReadFailed` on an I/O error, a truncated value, or
    ///   bytes following the value
    pub fn receive(self) -> Result<i64, ChannelError> {
        let mut buf = [0u8; VALUE_WIDTH];
        let filled = read_full(self.fd.as_raw_fd(), &mut buf).map_err(ChannelError::ReadFailed)?;

        match filled {
            0 => Err(ChannelError::Empty),
            VALUE_WIDTH => {
                // Exactly one value: the next read must be end-of-stream
                let mut extra = [0u8; 1];
                match read_full(self.fd.as_raw_fd(), &mut extra).map_err(ChannelError::ReadFailed)? {
                    0 => Ok(i64::from_le_bytes(buf)),
                    _ => Err(ChannelError::ReadFailed(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "unexpected bytes after result",
                    ))),
                }
            }
            partial => Err(ChannelError::ReadFailed(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("truncated result: {} of {} bytes", partial, VALUE_WIDTH),
            ))),
        }
    }
}

/// Write the whole buffer, retrying on interrupt
fn write_all(fd: RawFd, buf: &[u8]) -> io::Result<()> {
    let mut written = 0;

    while written < buf.len() {
        let remaining = &buf[written..];

        // SAFETY: remaining is a valid slice for the duration of the call
        let result = unsafe {
            libc::write(fd, remaining.as_ptr() as *const libc::c_void, remaining.len())
        };

        if result < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        if result == 0 {
            return Err(io::Error::from(io::ErrorKind::WriteZero));
        }

        written += result as usize;
    }

    Ok(())
}

/// Read until the buffer is full or end-of-stream; returns bytes read
fn read_full(fd: RawFd, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;

    while filled < buf.len() {
        let remaining = &mut buf[filled..];

        // SAFETY: remaining is a valid mutable slice for the duration of the call
        let result = unsafe {
            libc::read(fd, remaining.as_mut_ptr() as *mut libc::c_void, remaining.len())
        };

        if result < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        if result == 0 {
            break; // EOF
        }

        filled += result as usize;
    }

    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_pipe() -> (OwnedFd, OwnedFd) {
        create_pipe().expect("Failed to create pipe")
    }

    #[test]
    fn test_send_receive_single_value() {
        let (tx, rx) = result_channel().unwrap();
        tx.send(-42).unwrap();
        assert_eq!(rx.receive().unwrap(), -42);
    }

    #[test]
    fn test_receive_extreme_values() {
        for value in [i64::MIN, i64::MAX, 0] {
            let (tx, rx) = result_channel().unwrap();
            tx.send(value).unwrap();
            assert_eq!(rx.receive().unwrap(), value);
        }
    }

    #[test]
    fn test_receive_empty_when_sender_dropped() {
        let (tx, rx) = result_channel().unwrap();
        drop(tx);
        assert!(matches!(rx.receive(), Err(ChannelError::Empty)));
    }

    #[test]
    fn test_receive_truncated_value_is_read_failure() {
        let (read_fd, write_fd) = raw_pipe();
        write_all(write_fd.as_raw_fd(), &[1, 2, 3]).unwrap();
        drop(write_fd);

        let rx = ResultReceiver { fd: read_fd };
        match rx.receive() {
            Err(ChannelError::ReadFailed(err)) => {
                assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
                assert!(err.to_string().contains("3 of 8"));
            }
            other => panic!("Expected ReadFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_receive_rejects_second_value() {
        let (read_fd, write_fd) = raw_pipe();
        let mut bytes = 7i64.to_le_bytes().to_vec();
        bytes.extend_from_slice(&9i64.to_le_bytes());
        write_all(write_fd.as_raw_fd(), &bytes).unwrap();
        drop(write_fd);

        let rx = ResultReceiver { fd: read_fd };
        match rx.receive() {
            Err(ChannelError::ReadFailed(err)) => assert_eq!(err.kind(), io::ErrorKind::InvalidData),
            other => panic!("Expected ReadFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_send_to_closed_reader_fails() {
        let (tx, rx) = result_channel().unwrap();
        drop(rx);
        let err = tx.send(1).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_receive_blocks_until_value_arrives() {
        let (tx, rx) = result_channel().unwrap();
        let writer = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(20));
            tx.send(99).unwrap();
        });
        assert_eq!(rx.receive().unwrap(), 99);
        writer.join().unwrap();
    }
}
