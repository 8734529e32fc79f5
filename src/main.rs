// Main application entry point.
// Orchestrates command-line parsing, the single-threaded event loop over
// stdin and the timer service, signal handling, and final stats reporting.

use colored::*;
use input_dispatch::accel::{MotionFilter, PointerAccelerator};
use input_dispatch::cli::{self, DeviceClass};
use input_dispatch::config::Config;
use input_dispatch::dispatch::{Dispatch, PointerDispatch};
use input_dispatch::error::{AccelError, TimerError};
use input_dispatch::event::{event_microseconds, read_event};
use input_dispatch::host::{EventLoop, PollLoop};
use input_dispatch::logger::NotificationWriter;
use input_dispatch::pad::PadDispatch;
use input_dispatch::stats::StatsTracker;
use input_dispatch::telemetry;
use input_dispatch::timer::{TimerService, Wakeup};
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use std::cell::RefCell;
use std::fs::File;
use std::io::{self, ErrorKind, Write};
use std::os::fd::AsFd;
use std::os::unix::io::AsRawFd;
use std::process::exit;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Fatal conditions, each with its own exit status.
#[derive(Debug, Error)]
enum Fatal {
    #[error("failed to set up the event loop: {0}")]
    Setup(#[source] io::Error),
    #[error(transparent)]
    Timer(#[from] TimerError),
    #[error(transparent)]
    Accel(#[from] AccelError),
    #[error("error reading input event: {0}")]
    Read(#[source] io::Error),
    #[error("error writing notification: {0}")]
    Write(#[source] io::Error),
}

impl Fatal {
    fn exit_code(&self) -> i32 {
        match self {
            Fatal::Setup(_) | Fatal::Timer(_) | Fatal::Accel(_) => 1,
            Fatal::Read(_) => 3,
            Fatal::Write(_) => 4,
        }
    }
}

fn build_dispatch(cfg: &Config) -> Result<Box<dyn Dispatch>, Fatal> {
    Ok(match cfg.class {
        DeviceClass::Pad => Box::new(PadDispatch::new(&cfg.device())),
        DeviceClass::Pointer => {
            let mut accel = PointerAccelerator::new(cfg.profile.profile());
            accel.set_speed(cfg.speed)?;
            Box::new(PointerDispatch::new(Box::new(accel), cfg.scale))
        }
    })
}

fn run(cfg: &Config, stats: &Rc<RefCell<StatsTracker>>) -> Result<(), Fatal> {
    // SIGINT/SIGTERM only raise a flag; poll returns EINTR and the loop ends.
    let term = Arc::new(AtomicBool::new(false));
    for sig in [SIGINT, SIGTERM] {
        signal_hook::flag::register(sig, Arc::clone(&term)).map_err(Fatal::Setup)?;
    }

    let mut host = PollLoop::new();
    // An unbuffered handle, so poll readiness matches what is left to read.
    let mut input = File::from(io::stdin().as_fd().try_clone_to_owned().map_err(Fatal::Setup)?);
    let input_source = host.add_fd(input.as_raw_fd()).map_err(Fatal::Setup)?;

    let mut timers = TimerService::init(&mut host)?;
    let timer_source = timers.source();

    let stats_timer = cfg.stats_interval().map(|interval| {
        let period = u64::try_from(interval.as_micros()).unwrap_or(u64::MAX);
        let stats = Rc::clone(stats);
        let id = timers.register("stats", move |now, id, timers| {
            if let Err(e) = stats.borrow_mut().dump_periodic(io::stderr().lock()) {
                warn!("Failed to write periodic stats: {e}");
            }
            timers.set(id, now + period);
        });
        let now = timers.wakeup().now();
        timers.set(id, now + period);
        id
    });

    let mut dispatch = build_dispatch(cfg)?;
    let mut sink = NotificationWriter::new(io::stdout().lock(), cfg.format, Rc::clone(stats));
    info!(dispatch = dispatch.name(), "Processing events from stdin");

    let result = 'outer: loop {
        if term.load(Ordering::Relaxed) {
            info!("Received termination signal, shutting down");
            break Ok(());
        }

        let ready = match host.wait(None) {
            Ok(ready) => ready,
            Err(e) => break Err(Fatal::Setup(e)),
        };

        for source in ready {
            if Some(source) == timer_source {
                timers.on_wakeup();
                continue;
            }
            if source != input_source {
                continue;
            }
            match read_event(&mut input) {
                Ok(Some(ev)) => {
                    dispatch.process(&ev, event_microseconds(&ev), &mut sink);
                    if let Some(e) = sink.take_error() {
                        break 'outer Err(Fatal::Write(e));
                    }
                }
                Ok(None) => {
                    debug!("End of input");
                    break 'outer Ok(());
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => break 'outer Err(Fatal::Read(e)),
            }
        }
    };

    if let Err(e) = sink.flush() {
        warn!("Failed to flush output: {e}");
    }
    if let Some(id) = stats_timer {
        timers.cancel(id);
        timers.unregister(id);
    }
    timers.destroy(Some(&mut host));
    host.remove_source(input_source);
    result
}

fn main() {
    // Parse command-line arguments using clap.
    let args = cli::parse_args();

    let cfg = match Config::try_from(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{} {}", "Invalid configuration:".on_bright_black().red().bold(), e);
            exit(2);
        }
    };

    telemetry::init_tracing(&cfg);

    let interval_us = cfg
        .stats_interval()
        .map_or(0, |d| u64::try_from(d.as_micros()).unwrap_or(u64::MAX));
    let stats = Rc::new(RefCell::new(StatsTracker::new(
        cfg.class.as_str(),
        interval_us,
        cfg.stats_json,
    )));

    let result = run(&cfg, &stats);

    // Print final statistics, also after a fatal error.
    let mut stderr = io::stderr().lock();
    if let Err(e) = stats.borrow().dump_final(&mut stderr) {
        warn!("Failed to write final stats: {e}");
    }
    let _ = stderr.flush();

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".on_bright_black().red().bold(), e);
        exit(e.exit_code());
    }
}
