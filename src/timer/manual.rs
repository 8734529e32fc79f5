//! A wakeup source driven by an explicitly advanced clock, for replaying
//! recorded input and for tests.

use super::Wakeup;
use std::io;
use std::os::unix::io::RawFd;

#[derive(Debug, Clone, Default)]
pub struct ManualWakeup {
    now: u64,
    armed: Option<u64>,
    signaled: bool,
    clock_unavailable: bool,
    fail_arm: bool,
    /// Number of arm requests, successful or not.
    pub arm_calls: usize,
}

impl ManualWakeup {
    pub fn new(now: u64) -> Self {
        ManualWakeup {
            now,
            ..Self::default()
        }
    }

    /// Moves the clock forward; raises the signal once the armed deadline
    /// is reached. Returns whether the signal is pending.
    pub fn advance_to(&mut self, now: u64) -> bool {
        self.now = self.now.max(now);
        if self.armed.is_some_and(|deadline| deadline <= self.now) {
            self.armed = None;
            self.signaled = true;
        }
        self.signaled
    }

    pub fn advance_by(&mut self, us: u64) -> bool {
        self.advance_to(self.now.saturating_add(us))
    }

    /// The deadline the source is currently programmed for.
    pub fn armed(&self) -> Option<u64> {
        self.armed
    }

    pub fn is_signaled(&self) -> bool {
        self.signaled
    }

    /// Makes `now()` report the clock as unavailable.
    pub fn set_clock_unavailable(&mut self, unavailable: bool) {
        self.clock_unavailable = unavailable;
    }

    /// Makes subsequent `arm` calls fail.
    pub fn set_fail_arm(&mut self, fail: bool) {
        self.fail_arm = fail;
    }
}

impl Wakeup for ManualWakeup {
    fn arm(&mut self, deadline: Option<u64>) -> io::Result<()> {
        self.arm_calls += 1;
        if self.fail_arm {
            return Err(io::Error::from_raw_os_error(libc::EINVAL));
        }
        self.armed = deadline;
        // An absolute deadline that already passed fires immediately.
        if deadline.is_some_and(|d| d <= self.now) {
            self.armed = None;
            self.signaled = true;
        }
        Ok(())
    }

    fn drain(&mut self) -> io::Result<()> {
        if std::mem::take(&mut self.signaled) {
            Ok(())
        } else {
            Err(io::ErrorKind::WouldBlock.into())
        }
    }

    fn now(&self) -> u64 {
        if self.clock_unavailable {
            0
        } else {
            self.now
        }
    }

    fn raw_fd(&self) -> Option<RawFd> {
        None
    }
}
