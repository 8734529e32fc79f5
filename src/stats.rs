// Statistics over the notifications a dispatcher produced, reported on exit
// and optionally at a fixed interval.

use crate::accel::Coords;
use crate::dispatch::ButtonState;
use crate::pad::axis::{AxisSet, PadAxis};
use crate::pad::codes::get_button_name;
use crate::util::format_us;
use colored::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};

/// Metadata included in JSON statistics output.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Meta {
    pub class: &'static str,
    pub report_type: &'static str,
    pub stats_interval_us: u64,
}

/// Press/release counts of one button.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ButtonStats {
    pub pressed: u64,
    pub released: u64,
}

/// Accumulated relative motion.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MotionStats {
    pub count: u64,
    /// Travelled distance after normalization, before acceleration.
    pub distance_unaccel: f64,
    pub distance_accel: f64,
    pub max_factor: f64,
}

impl MotionStats {
    /// Ratio of accelerated to unaccelerated distance.
    pub fn mean_factor(&self) -> f64 {
        if self.distance_unaccel > 0.0 {
            self.distance_accel / self.distance_unaccel
        } else {
            0.0
        }
    }
}

/// Top-level statistics collector for all notifications.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsCollector {
    pub axis_updates: u64,
    pub per_axis_updates: BTreeMap<&'static str, u64>,
    pub button_events: u64,
    pub per_button_stats: BTreeMap<u16, ButtonStats>,
    pub motion: MotionStats,
    pub first_us: Option<u64>,
    pub last_us: Option<u64>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn touch(&mut self, time: u64) {
        self.first_us.get_or_insert(time);
        self.last_us = Some(time);
    }

    pub fn record_axis_update(&mut self, time: u64, changed: AxisSet) {
        self.touch(time);
        self.axis_updates += 1;
        for axis in changed.axes() {
            *self.per_axis_updates.entry(axis.name()).or_default() += 1;
        }
    }

    pub fn record_button(&mut self, time: u64, code: u16, state: ButtonState) {
        self.touch(time);
        self.button_events += 1;
        let stats = self.per_button_stats.entry(code).or_default();
        match state {
            ButtonState::Pressed => stats.pressed += 1,
            ButtonState::Released => stats.released += 1,
        }
    }

    pub fn record_motion(&mut self, time: u64, accel: Coords, unaccel: Coords) {
        self.touch(time);
        let motion = &mut self.motion;
        motion.count += 1;
        let (a, u) = (accel.length(), unaccel.length());
        motion.distance_accel += a;
        motion.distance_unaccel += u;
        if u > 0.0 {
            motion.max_factor = motion.max_factor.max(a / u);
        }
    }

    /// Time between the first and the last recorded notification.
    pub fn runtime_us(&self) -> Option<u64> {
        Some(self.last_us?.saturating_sub(self.first_us?))
    }

    pub fn is_empty(&self) -> bool {
        self.axis_updates == 0 && self.button_events == 0 && self.motion.count == 0
    }

    /// Print human-readable stats.
    pub fn print_stats_human(&self, mut w: impl Write) -> io::Result<()> {
        writeln!(w, "{}", "--- input-dispatch status ---".on_bright_black().bold().blue().underline())?;
        if let Some(runtime) = self.runtime_us() {
            writeln!(
                w,
                "{} {}",
                "Event time span:".on_bright_black().bold().bright_yellow(),
                format_us(runtime).on_bright_black().bright_yellow().bold()
            )?;
        }

        writeln!(w, "\n{}", "--- Overall Statistics ---".on_bright_black().bold().blue().underline())?;
        writeln!(
            w,
            "{} {}",
            "Axis Updates:  ".on_bright_black().bold().bright_white(),
            self.axis_updates.to_string().on_bright_black().bright_white().bold()
        )?;
        writeln!(
            w,
            "{} {}",
            "Button Events: ".on_bright_black().bold().bright_green(),
            self.button_events.to_string().on_bright_black().bright_green().bold()
        )?;
        writeln!(
            w,
            "{} {}",
            "Motion Events: ".on_bright_black().bold().bright_cyan(),
            self.motion.count.to_string().on_bright_black().bright_cyan().bold()
        )?;

        if !self.per_axis_updates.is_empty() {
            writeln!(w, "\n{}", "--- Axis Updates Per Axis ---".on_bright_black().bold().blue().underline())?;
            for axis in PadAxis::ALL {
                if let Some(count) = self.per_axis_updates.get(axis.name()) {
                    writeln!(
                        w,
                        "  {:<7} {}",
                        axis.name().on_bright_black().bold().bright_yellow(),
                        count.to_string().on_bright_black().bright_white().bold()
                    )?;
                }
            }
        }

        if !self.per_button_stats.is_empty() {
            writeln!(w, "\n{}", "--- Button Statistics ---".on_bright_black().bold().blue().underline())?;
            writeln!(w, "{}", "Format: Button [Name] (Code): Pressed / Released".on_bright_black().dimmed())?;
            for (code, stats) in &self.per_button_stats {
                writeln!(
                    w,
                    "  Button [{}] ({:#x}): {} / {}",
                    get_button_name(*code).on_bright_black().bright_magenta().bold(),
                    code,
                    stats.pressed.to_string().on_bright_black().bright_green().bold(),
                    stats.released.to_string().on_bright_black().bright_red().bold()
                )?;
            }
        }

        if self.motion.count > 0 {
            writeln!(w, "\n{}", "--- Pointer Motion ---".on_bright_black().bold().blue().underline())?;
            writeln!(
                w,
                "{} {:.1} -> {:.1} (mean factor {:.3}, max {:.3})",
                "Distance (unaccel -> accel):".on_bright_black().bold().bright_cyan(),
                self.motion.distance_unaccel,
                self.motion.distance_accel,
                self.motion.mean_factor(),
                self.motion.max_factor
            )?;
        }

        writeln!(w, "{}", "----------------------------------------------------------".on_bright_black().blue().bold())
    }

    /// Print JSON stats, one object per line.
    pub fn print_stats_json(&self, meta: &Meta, mut w: impl Write) -> io::Result<()> {
        #[derive(Serialize)]
        struct Output<'a> {
            meta: &'a Meta,
            runtime_us: Option<u64>,
            stats: &'a StatsCollector,
        }

        let output = Output {
            meta,
            runtime_us: self.runtime_us(),
            stats: self,
        };
        serde_json::to_writer(&mut w, &output)?;
        writeln!(w)
    }
}

/// Cumulative totals for the whole run plus totals since the last
/// periodic dump.
#[derive(Debug, Default)]
pub struct StatsTracker {
    pub cumulative: StatsCollector,
    pub interval: StatsCollector,
    meta: Meta,
    json: bool,
}

impl StatsTracker {
    pub fn new(class: &'static str, stats_interval_us: u64, json: bool) -> Self {
        StatsTracker {
            meta: Meta {
                class,
                report_type: "Cumulative",
                stats_interval_us,
            },
            json,
            ..Self::default()
        }
    }

    pub fn record_axis_update(&mut self, time: u64, changed: AxisSet) {
        self.cumulative.record_axis_update(time, changed);
        self.interval.record_axis_update(time, changed);
    }

    pub fn record_button(&mut self, time: u64, code: u16, state: ButtonState) {
        self.cumulative.record_button(time, code, state);
        self.interval.record_button(time, code, state);
    }

    pub fn record_motion(&mut self, time: u64, accel: Coords, unaccel: Coords) {
        self.cumulative.record_motion(time, accel, unaccel);
        self.interval.record_motion(time, accel, unaccel);
    }

    fn meta(&self, report_type: &'static str) -> Meta {
        Meta {
            report_type,
            ..self.meta.clone()
        }
    }

    /// Dumps and resets the interval statistics.
    pub fn dump_periodic(&mut self, mut w: impl Write) -> io::Result<()> {
        let interval = std::mem::take(&mut self.interval);
        if self.json {
            interval.print_stats_json(&self.meta("Periodic"), w)
        } else {
            writeln!(
                w,
                "\n{} {} {}",
                "--- Periodic Stats Dump (Wallclock:".magenta().bold(),
                chrono::Local::now()
                    .format("%Y-%m-%d %H:%M:%S%.3f")
                    .to_string()
                    .on_bright_black()
                    .bright_yellow(),
                ") ---".magenta().bold()
            )?;
            interval.print_stats_human(w)
        }
    }

    pub fn dump_final(&self, w: impl Write) -> io::Result<()> {
        if self.json {
            self.cumulative.print_stats_json(&self.meta("Cumulative"), w)
        } else {
            self.cumulative.print_stats_human(w)
        }
    }
}
