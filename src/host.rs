// This module defines the hosting event loop seam and a minimal poll(2)
// based implementation used by the binary.

use std::io;
use std::os::unix::io::RawFd;
use std::time::Duration;
use tracing::{debug, warn};

/// Handle for a file descriptor registered with an [`EventLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(usize);

impl SourceId {
    /// For `EventLoop` implementations handing out their own ids.
    pub const fn new(index: usize) -> Self {
        SourceId(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

/// What the timer service and other fd-backed components need from the host.
pub trait EventLoop {
    fn add_fd(&mut self, fd: RawFd) -> io::Result<SourceId>;

    fn remove_source(&mut self, id: SourceId);
}

/// Level-triggered readiness on a small, fixed set of descriptors.
#[derive(Debug, Default)]
pub struct PollLoop {
    sources: Vec<Option<RawFd>>,
}

impl PollLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sources.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Waits until at least one source is readable, hung up or in error, or
    /// until `timeout` passes. An interrupted wait yields no sources.
    pub fn wait(&mut self, timeout: Option<Duration>) -> io::Result<Vec<SourceId>> {
        let (ids, mut fds): (Vec<SourceId>, Vec<libc::pollfd>) = self
            .sources
            .iter()
            .enumerate()
            .filter_map(|(slot, fd)| {
                fd.map(|fd| {
                    (
                        SourceId(slot),
                        libc::pollfd {
                            fd,
                            events: libc::POLLIN,
                            revents: 0,
                        },
                    )
                })
            })
            .unzip();

        let timeout_ms = match timeout {
            Some(t) => i32::try_from(t.as_millis()).unwrap_or(i32::MAX),
            None => -1,
        };

        // SAFETY: `fds` is a live, correctly sized array of pollfd.
        let n = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, timeout_ms) };
        if n < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                debug!("poll interrupted");
                return Ok(Vec::new());
            }
            return Err(err);
        }

        Ok(ids
            .into_iter()
            .zip(fds.iter())
            .filter(|(_, pfd)| pfd.revents != 0)
            .map(|(id, _)| id)
            .collect())
    }
}

impl EventLoop for PollLoop {
    fn add_fd(&mut self, fd: RawFd) -> io::Result<SourceId> {
        if fd < 0 {
            return Err(io::Error::from_raw_os_error(libc::EBADF));
        }
        let slot = match self.sources.iter().position(Option::is_none) {
            Some(slot) => {
                self.sources[slot] = Some(fd);
                slot
            }
            None => {
                self.sources.push(Some(fd));
                self.sources.len() - 1
            }
        };
        debug!(fd, slot, "event source added");
        Ok(SourceId(slot))
    }

    fn remove_source(&mut self, id: SourceId) {
        match self.sources.get_mut(id.0) {
            Some(slot @ Some(_)) => *slot = None,
            _ => warn!(?id, "removing unknown event source"),
        }
    }
}
