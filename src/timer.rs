// This module defines the timer service: any number of logical timers
// multiplexed onto a single OS wakeup source, so the hosting event loop only
// watches one file descriptor regardless of how many timers are armed.
//
// Times are monotonic microseconds. A deadline of 0 is never valid.

pub mod manual;
pub mod timerfd;


use crate::error::TimerError;
use crate::host::{EventLoop, SourceId};
use crate::log_bug;
use crate::util::format_us;
use bitflags::bitflags;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::io;
use std::os::unix::io::RawFd;
use tracing::{debug, error, trace};

pub use manual::ManualWakeup;
pub use timerfd::{monotonic_now_us, TimerFd};

/// Deadlines further ahead than this are reported in debug builds.
pub const MAX_TIMER_OFFSET_US: u64 = 5_000_000;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TimerFlags: u8 {
        /// The deadline may already be in the past, e.g. when it was computed
        /// from an event timestamp that is older than now.
        const ALLOW_NEGATIVE = 1 << 0;
    }
}

/// Handle for a registered timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u32);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Disarmed,
    Armed { deadline: u64 },
}

/// The OS primitive behind a [`TimerService`].
pub trait Wakeup {
    /// Programs the next absolute wakeup, `None` disables it.
    fn arm(&mut self, deadline: Option<u64>) -> io::Result<()>;

    /// Consumes the pending signal. `WouldBlock` means nothing was pending.
    fn drain(&mut self) -> io::Result<()>;

    /// Current monotonic time, 0 if the clock is unavailable.
    fn now(&self) -> u64;

    /// Descriptor to watch in the event loop, if any.
    fn raw_fd(&self) -> Option<RawFd>;
}

/// Invoked with the wakeup time and the id of the timer that fired. The
/// timer is already disarmed; re-arming it from here is allowed.
pub type TimerCallback<W> = Box<dyn FnMut(u64, TimerId, &mut TimerService<W>)>;

struct Entry<W: Wakeup> {
    owner: String,
    state: TimerState,
    // Taken out while the callback runs.
    callback: Option<TimerCallback<W>>,
}

/// Deadline dispatch for any number of timers on one wakeup source.
pub struct TimerService<W: Wakeup = TimerFd> {
    wakeup: W,
    source: Option<SourceId>,
    entries: HashMap<TimerId, Entry<W>>,
    // Every armed timer and nothing else, ordered by deadline.
    active: BTreeSet<(u64, TimerId)>,
    // What the wakeup source was last successfully programmed for.
    armed: Option<u64>,
    next_id: u32,
}

impl<W: Wakeup> fmt::Debug for TimerService<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerService")
            .field("source", &self.source)
            .field("timers", &self.entries.len())
            .field("active", &self.active)
            .field("armed", &self.armed)
            .finish()
    }
}

impl TimerService<TimerFd> {
    /// Creates a service on a fresh timerfd and registers it with `host`.
    pub fn init(host: &mut dyn EventLoop) -> Result<Self, TimerError> {
        let fd = TimerFd::new().map_err(TimerError::Create)?;
        Self::with_wakeup(fd, Some(host))
    }
}

impl<W: Wakeup> TimerService<W> {
    /// Creates a service on `wakeup`. Its descriptor, if any, is registered
    /// with `host`; on failure the wakeup source is dropped.
    pub fn with_wakeup(wakeup: W, host: Option<&mut dyn EventLoop>) -> Result<Self, TimerError> {
        let source = match (host, wakeup.raw_fd()) {
            (Some(host), Some(fd)) => Some(host.add_fd(fd).map_err(TimerError::Register)?),
            _ => None,
        };

        debug!(?source, "timer service initialized");
        Ok(TimerService {
            wakeup,
            source,
            entries: HashMap::new(),
            active: BTreeSet::new(),
            armed: None,
            next_id: 0,
        })
    }

    /// Adds a disarmed timer. `owner` names the subsystem in diagnostics.
    pub fn register(
        &mut self,
        owner: impl Into<String>,
        callback: impl FnMut(u64, TimerId, &mut TimerService<W>) + 'static,
    ) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let owner = owner.into();
        trace!(%id, owner, "timer registered");
        self.entries.insert(
            id,
            Entry {
                owner,
                state: TimerState::Disarmed,
                callback: Some(Box::new(callback)),
            },
        );
        id
    }

    /// Removes a timer. Timers are expected to be canceled first.
    pub fn unregister(&mut self, id: TimerId) {
        if self.is_armed(id) {
            log_bug!("timer {}: unregistered while armed", self.owner(id));
            self.cancel(id);
        }
        self.entries.remove(&id);
    }

    pub fn set(&mut self, id: TimerId, deadline: u64) {
        self.set_with_flags(id, deadline, TimerFlags::empty());
    }

    /// Arms `id` for `deadline`, replacing any previous deadline.
    pub fn set_with_flags(&mut self, id: TimerId, deadline: u64, flags: TimerFlags) {
        if deadline == 0 {
            log_bug!("timer {}: refusing to arm for deadline 0", self.owner(id));
            return;
        }

        if cfg!(debug_assertions) {
            self.check_deadline(id, deadline, flags);
        }

        let Some(entry) = self.entries.get_mut(&id) else {
            log_bug!("timer {id}: not registered");
            return;
        };
        if let TimerState::Armed { deadline: old } = entry.state {
            self.active.remove(&(old, id));
        }
        entry.state = TimerState::Armed { deadline };
        self.active.insert((deadline, id));

        self.rearm();
    }

    fn check_deadline(&self, id: TimerId, deadline: u64, flags: TimerFlags) {
        let now = self.wakeup.now();
        if now == 0 {
            return;
        }
        if deadline < now && !flags.contains(TimerFlags::ALLOW_NEGATIVE) {
            log_bug!(
                "timer {}: scheduled expiry is in the past (-{}), system too slow?",
                self.owner(id),
                format_us(now - deadline)
            );
        } else if deadline.saturating_sub(now) > MAX_TIMER_OFFSET_US {
            log_bug!(
                "timer {}: offset more than 5s, now {} expire {}",
                self.owner(id),
                now,
                deadline
            );
        }
    }

    /// Disarms `id`. A no-op for a timer that is not armed.
    pub fn cancel(&mut self, id: TimerId) {
        if self.disarm(id) {
            self.rearm();
        }
    }

    fn disarm(&mut self, id: TimerId) -> bool {
        let Some(entry) = self.entries.get_mut(&id) else {
            return false;
        };
        match entry.state {
            TimerState::Disarmed => false,
            TimerState::Armed { deadline } => {
                entry.state = TimerState::Disarmed;
                self.active.remove(&(deadline, id));
                true
            }
        }
    }

    /// Programs the wakeup source for the earliest active deadline.
    fn rearm(&mut self) {
        let next = self.active.first().map(|(deadline, _)| *deadline);
        match self.wakeup.arm(next) {
            Ok(()) => self.armed = next,
            Err(e) => error!("timer: failed to arm wakeup source: {e}"),
        }
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.deadline(id).is_some()
    }

    pub fn deadline(&self, id: TimerId) -> Option<u64> {
        match self.entries.get(&id)?.state {
            TimerState::Armed { deadline } => Some(deadline),
            TimerState::Disarmed => None,
        }
    }

    /// The deadline the wakeup source is currently programmed for.
    pub fn armed_deadline(&self) -> Option<u64> {
        self.armed
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    fn owner(&self, id: TimerId) -> &str {
        self.entries.get(&id).map_or("<unknown>", |e| e.owner.as_str())
    }

    /// Fires every timer whose deadline has passed. Call when the wakeup
    /// source signals.
    pub fn on_wakeup(&mut self) {
        if let Err(e) = self.wakeup.drain() {
            if e.kind() != io::ErrorKind::WouldBlock {
                log_bug!("timer: error draining wakeup source: {e}");
            }
        }

        let now = self.wakeup.now();
        if now == 0 {
            return;
        }

        let due: Vec<TimerId> = self
            .active
            .iter()
            .take_while(|(deadline, _)| *deadline <= now)
            .map(|(_, id)| *id)
            .collect();

        for id in due {
            // An earlier callback may have canceled or moved this one.
            if !self.deadline(id).is_some_and(|deadline| deadline <= now) {
                continue;
            }
            self.disarm(id);

            let Some(mut callback) = self.entries.get_mut(&id).and_then(|e| e.callback.take())
            else {
                continue;
            };
            trace!(%id, now, "timer fired");
            callback(now, id, self);
            // The callback may have unregistered its own timer.
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.callback = Some(callback);
            }
        }

        self.rearm();
    }

    /// Tears the service down. Every timer must have been canceled.
    pub fn destroy(self, host: Option<&mut dyn EventLoop>) {
        assert!(
            self.active.is_empty(),
            "timer service destroyed with {} armed timer(s): {}",
            self.active.len(),
            self.active
                .iter()
                .map(|(_, id)| self.owner(*id))
                .collect::<Vec<_>>()
                .join(", ")
        );

        if let (Some(host), Some(source)) = (host, self.source) {
            host.remove_source(source);
        }
        debug!("timer service destroyed");
    }

    pub fn wakeup(&self) -> &W {
        &self.wakeup
    }

    pub fn wakeup_mut(&mut self) -> &mut W {
        &mut self.wakeup
    }

    /// Event loop source of the wakeup descriptor, if registered.
    pub fn source(&self) -> Option<SourceId> {
        self.source
    }
}
