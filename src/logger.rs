// This module defines the notification writer: the `Notify` sink used by the
// binary. It renders every notification to stdout (colored text or JSON
// lines) and feeds the statistics.

use crate::accel::Coords;
use crate::cli::OutputFormat;
use crate::dispatch::{ButtonState, Notify};
use crate::pad::axis::{AxisSet, AxisValues, SelectedAxes};
use crate::pad::codes::get_button_name;
use crate::stats::StatsTracker;
use crate::util::format_relative_us;
use colored::*;
use serde::Serialize;
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use tracing::error;

/// One output line in JSON mode.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Line<'a> {
    Axis {
        time: u64,
        changed: AxisSet,
        values: SelectedAxes<'a>,
    },
    Button {
        time: u64,
        code: u16,
        name: &'static str,
        state: ButtonState,
    },
    Motion {
        time: u64,
        dx: f64,
        dy: f64,
        dx_unaccel: f64,
        dy_unaccel: f64,
    },
}

/// Writes notifications to `out` and records them in the shared statistics.
///
/// Write errors cannot be returned through [`Notify`]; the first one is kept
/// and further output is suppressed until the caller collects it with
/// [`NotificationWriter::take_error`].
pub struct NotificationWriter<W: Write> {
    out: W,
    format: OutputFormat,
    stats: Rc<RefCell<StatsTracker>>,
    // Time of the first notification, for relative timestamps.
    first_us: Option<u64>,
    error: Option<io::Error>,
}

impl<W: Write> NotificationWriter<W> {
    pub fn new(out: W, format: OutputFormat, stats: Rc<RefCell<StatsTracker>>) -> Self {
        NotificationWriter {
            out,
            format,
            stats,
            first_us: None,
            error: None,
        }
    }

    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn relative(&mut self, time: u64) -> String {
        let first = *self.first_us.get_or_insert(time);
        format_relative_us(time.saturating_sub(first))
    }

    fn emit(&mut self, line: &Line<'_>, text: impl FnOnce(&mut Self) -> String) {
        if self.error.is_some() {
            return;
        }
        let result = match self.format {
            OutputFormat::Json => serde_json::to_writer(&mut self.out, line)
                .map_err(io::Error::from)
                .and_then(|()| writeln!(self.out)),
            OutputFormat::Text => {
                let text = text(self);
                writeln!(self.out, "{text}")
            }
        };
        if let Err(e) = result {
            error!("Error writing notification: {e}");
            self.error = Some(e);
        }
    }
}

impl<W: Write> Notify for NotificationWriter<W> {
    fn axis_update(&mut self, time: u64, changed: AxisSet, values: &AxisValues) {
        self.stats.borrow_mut().record_axis_update(time, changed);
        let line = Line::Axis {
            time,
            changed,
            values: values.select(changed),
        };
        self.emit(&line, |w| {
            let axes: Vec<String> = changed
                .axes()
                .map(|axis| format!("{}={:.3}", axis.name(), values[axis]))
                .collect();
            format!(
                "{} {} {}",
                "[AXIS]".on_blue().white().bold(),
                w.relative(time).on_bright_black().bright_yellow().bold(),
                axes.join(" ").bright_cyan()
            )
        });
    }

    fn button(&mut self, time: u64, _values: &AxisValues, code: u16, state: ButtonState) {
        self.stats.borrow_mut().record_button(time, code, state);
        let name = get_button_name(code);
        let line = Line::Button {
            time,
            code,
            name,
            state,
        };
        self.emit(&line, |w| {
            let tag = match state {
                ButtonState::Pressed => "[BTN+]".on_green().black().bold(),
                ButtonState::Released => "[BTN-]".on_red().white().bold(),
            };
            format!(
                "{} {} Button [{}] ({:#x}) {}",
                tag,
                w.relative(time).on_bright_black().bright_yellow().bold(),
                name.on_bright_black().bright_magenta().bold(),
                code,
                state.as_str()
            )
        });
    }

    fn motion(&mut self, time: u64, accel: Coords, unaccel: Coords) {
        self.stats.borrow_mut().record_motion(time, accel, unaccel);
        let line = Line::Motion {
            time,
            dx: accel.x,
            dy: accel.y,
            dx_unaccel: unaccel.x,
            dy_unaccel: unaccel.y,
        };
        self.emit(&line, |w| {
            format!(
                "{} {} {} (raw {})",
                "[MOVE]".on_cyan().black().bold(),
                w.relative(time).on_bright_black().bright_yellow().bold(),
                accel.to_string().bright_green(),
                unaccel.to_string().dimmed()
            )
        });
    }
}
