//! `timerfd` backed wakeup source on `CLOCK_MONOTONIC`.

use super::Wakeup;
use std::io;
use std::mem::size_of;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};

const US_PER_SEC: u64 = 1_000_000;

/// Reads `CLOCK_MONOTONIC` in microseconds.
pub fn monotonic_now_us() -> io::Result<u64> {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: `ts` is a valid, writable timespec.
    if unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(ts.tv_sec as u64 * US_PER_SEC + ts.tv_nsec as u64 / 1000)
}

fn timespec_from_us(us: u64) -> libc::timespec {
    libc::timespec {
        tv_sec: (us / US_PER_SEC) as _,
        tv_nsec: ((us % US_PER_SEC) * 1000) as _,
    }
}

/// A non-blocking, close-on-exec timerfd armed with absolute deadlines.
#[derive(Debug)]
pub struct TimerFd {
    fd: OwnedFd,
}

impl TimerFd {
    pub fn new() -> io::Result<Self> {
        // SAFETY: plain syscall, the result is checked below.
        let fd = unsafe {
            libc::timerfd_create(libc::CLOCK_MONOTONIC, libc::TFD_CLOEXEC | libc::TFD_NONBLOCK)
        };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: `fd` was just created and is owned by nobody else.
        let fd = unsafe { OwnedFd::from_raw_fd(fd) };
        Ok(TimerFd { fd })
    }
}

impl AsRawFd for TimerFd {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}

impl Wakeup for TimerFd {
    fn arm(&mut self, deadline: Option<u64>) -> io::Result<()> {
        // An all-zero it_value disarms the timer.
        let spec = libc::itimerspec {
            it_interval: timespec_from_us(0),
            it_value: timespec_from_us(deadline.unwrap_or(0)),
        };
        // SAFETY: `spec` is valid for reads, the old value is not requested.
        let ret = unsafe {
            libc::timerfd_settime(
                self.fd.as_raw_fd(),
                libc::TFD_TIMER_ABSTIME,
                &spec,
                std::ptr::null_mut(),
            )
        };
        if ret != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn drain(&mut self) -> io::Result<()> {
        let mut expirations: u64 = 0;
        // SAFETY: the buffer is a live u64 of exactly the size passed.
        let n = unsafe {
            libc::read(
                self.fd.as_raw_fd(),
                (&mut expirations as *mut u64).cast::<libc::c_void>(),
                size_of::<u64>(),
            )
        };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn now(&self) -> u64 {
        monotonic_now_us().unwrap_or(0)
    }

    fn raw_fd(&self) -> Option<RawFd> {
        Some(self.fd.as_raw_fd())
    }
}
