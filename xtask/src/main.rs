use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use clap_complete_nushell::Nushell;
use clap_mangen::Man;
use input_dispatch::cli::Args;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Developer tasks for input-dispatch.
#[derive(Parser, Debug)]
#[command(name = "xtask")]
struct XtaskArgs {
    #[command(subcommand)]
    command: Task,
}

#[derive(Subcommand, Debug)]
enum Task {
    /// Write the man page and all shell completions.
    GenerateDocs {
        /// Output directory, `docs/` in the workspace by default.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the man page to stdout, e.g. for `man -l -`.
    Man,
}

fn main() -> Result<()> {
    let cmd = Args::command();
    match XtaskArgs::parse().command {
        Task::GenerateDocs { out } => {
            let docs = out.unwrap_or_else(|| workspace_root().join("docs"));
            generate_docs(&cmd, &docs).context("Failed to generate docs")
        }
        Task::Man => {
            let page = render_man_page(&cmd)?;
            std::io::stdout().write_all(&page)?;
            Ok(())
        }
    }
}

fn workspace_root() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest.parent().unwrap_or(manifest).to_path_buf()
}

fn generate_docs(cmd: &clap::Command, docs: &Path) -> Result<()> {
    let man_dir = docs.join("man");
    let completions_dir = docs.join("completions");
    fs::create_dir_all(&man_dir).context("Failed to create man directory")?;
    fs::create_dir_all(&completions_dir).context("Failed to create completions directory")?;

    let man_path = man_dir.join(format!("{}.1", cmd.get_name()));
    fs::write(&man_path, render_man_page(cmd)?)
        .with_context(|| format!("Failed to write {}", man_path.display()))?;
    println!("wrote {}", man_path.display());

    write_completions(cmd, &completions_dir)
}

// Extra man sections, in roff. `{bin_name}` is substituted when rendering.

const MAN_BATCHING: &str = r#"
.B Pad frames
.PP
With \fB\-\-class pad\fR, \fB{bin_name}\fR treats everything between two \fBEV_SYN\fR events as one hardware frame. Button and axis events only update internal state; nothing is written until the sync event arrives.
.PP
On each sync, notifications are written in this order:
.IP 1. 4
One \fBaxis\fR notification if any ring or strip moved, listing only the changed axes.
.IP 2. 4
One \fBbutton\fR notification per released button, in ascending code order.
.IP 3. 4
One \fBbutton\fR notification per pressed button, in ascending code order.
.PP
A button pressed and released within the same frame produces no notification. Key repeats (value=2) count as pressed. The first sync after start reports every configured axis once.
.PP
.B Axis normalization
.IP \(bu 4
Rings (\fB\-\-ring\fR, \fB\-\-ring2\fR) wrap into [0, 1). 0 is the top of the ring, a quarter turn past the calibrated minimum, increasing clockwise. The calibrated minimum itself reads 0.75.
.IP \(bu 4
Strips (\fB\-\-strip\fR, \fB\-\-strip2\fR) map linearly into [0, 1] and are clamped outside the calibration.
.PP
Axes without a calibration option are treated as absent; events for them are dropped and reported as bugs (rate limited).
"#;

const MAN_ACCELERATION: &str = r#"
.B Pointer frames
.PP
With \fB\-\-class pointer\fR, \fBREL_X\fR and \fBREL_Y\fR values are summed per frame. On sync the sum is normalized by the device resolution and passed through the acceleration filter. Frames whose motion cancels out are not reported.
.PP
.B Velocity
.PP
The filter keeps the last 16 motions. Velocity is measured over the oldest of them that still belongs to the current movement: not older than 300ms, pointing in a compatible direction, and with a velocity within 1 unit/ms of the newest one.
.PP
.B Profiles (\-\-profile)
.IP "\fBpointer\fR" 4
Linear: slow motion below the threshold is decelerated, above it the factor grows with the incline up to the maximum.
.IP "\fBtouchpad\fR" 4
The pointer curve evaluated on slowed-down velocity.
.IP "\fBtouchpad\-low\-res\fR" 4
For touchpads with a low reported resolution.
.PP
The factor applied is a Simpson's rule average of the profile over the transition from the previous to the current velocity.
.PP
.B Speed (\-\-speed)
.PP
In [\-1, 1]. Higher values lower the threshold and raise the maximum factor and incline.
"#;

const MAN_EXAMPLES: &str = r#"
.PP
.B Watch a tablet pad:
.IP
.nf
sudo sh \-c 'intercept /dev/input/by\-id/your\-pad\-event | {bin_name} \-\-class pad \-\-ring 0:71 \-\-strip 0:4096'
.fi
.PP
Print one line per ring/strip update and button change. Use \fBevtest\fR(1) to find the axis ranges of your device.
.PP
.B Accelerated pointer motion as JSON:
.IP
.nf
sudo sh \-c 'intercept /dev/input/by\-id/your\-mouse\-event | {bin_name} \-\-class pointer \-\-dpi 1600 \-\-speed 0.3 \-\-format json'
.fi
.PP
.B Periodic statistics:
.IP
.nf
{bin_name} \-\-class pad \-\-stats\-interval 1000 \-\-stats\-json < recording.bin > /dev/null
.fi
.PP
Replay a recorded event stream and print JSON statistics to standard error every second and on exit.
"#;

const MAN_OUTPUT: &str = r#"
Notifications go to standard output, one per line.
.PP
.B Text (default)
.IP
\fB[AXIS]\fR, \fB[BTN+]\fR, \fB[BTN\-]\fR and \fB[MOVE]\fR tags followed by the time relative to the first notification.
.PP
.B JSON (\-\-format json)
.IP
One object per line with a \fBtype\fR of \fBaxis\fR, \fBbutton\fR or \fBmotion\fR and the event time in microseconds. Axis objects carry \fBchanged\fR and a \fBvalues\fR map of only the changed axes. Button objects carry \fBcode\fR, \fBname\fR and \fBstate\fR. Motion objects carry \fBdx\fR, \fBdy\fR and the unaccelerated \fBdx_unaccel\fR, \fBdy_unaccel\fR.
"#;

const MAN_STATISTICS: &str = r#"
Statistics are printed to standard error on exit and, with \fB\-\-stats\-interval\fR, periodically. The periodic dump is driven by the timer service and covers only the events since the previous dump.
.PP
Reported: number of axis updates in total and per axis, button press/release counts per button, pointer motion count, travelled distance before and after acceleration, and the mean and maximum acceleration factor.
.PP
With \fB\-\-stats\-json\fR each report is one JSON object with \fBmeta\fR (class, report_type "Cumulative" or "Periodic", stats_interval_us), \fBruntime_us\fR and \fBstats\fR.
"#;

const MAN_LOGGING: &str = r#"
Diagnostics use the \fBtracing\fR framework and go to standard error.
.IP "\fB\-\-log\-filter\fR" 4
EnvFilter directives, default \fBinput_dispatch=info\fR.
.IP "\fB\-\-verbose\fR" 4
Raise the default filter to DEBUG.
.IP "\fB\-\-log\-json\fR" 4
One JSON object per log line.
.PP
Contract violations, e.g. an event for an axis the device does not have, are logged at ERROR level with \fBbug=true\fR. Diagnostics triggered by device input are rate limited.
"#;

const MAN_SIGNALS: &str = r#"
SIGINT and SIGTERM stop the event loop. Pending output is flushed, timers are canceled and the final statistics are printed before exiting with status 0.
"#;

const MAN_EXIT_STATUS: &str = r#"
.IP 0 4
Success. End of input or a handled signal.
.IP 1 4
Setup error, e.g. the timer could not be created.
.IP 2 4
Invalid command line or configuration.
.IP 3 4
Error reading standard input.
.IP 4 4
Error writing standard output.
"#;

const MAN_ENVIRONMENT: &str = r#"
.TP
.B RUST_LOG
Takes precedence over \fB\-\-log\-filter\fR. Uses the \fBtracing_subscriber::EnvFilter\fR format, e.g. \fBRUST_LOG=input_dispatch::timer=trace\fR.
.TP
.B NO_COLOR
Disables colored text output.
"#;

const MAN_BUGS: &str = r#"
Events for axes that were not configured are dropped and logged at error level with \fBbug=true\fR. Such messages are rate limited to five per hour per device.
"#;

const MAN_SEE_ALSO: &str = r#"
\fBintercept\fR(1), \fBevtest\fR(1), \fBinput_event\fR(5), \fBlibinput\fR(1), \fBtimerfd_create\fR(2)
"#;

/// Renders clap's sections followed by the extra ones above.
fn render_man_page(cmd: &clap::Command) -> Result<Vec<u8>> {
    let bin_name = cmd.get_name();
    let date = chrono::Local::now().format("%B %d, %Y");
    let mut page = Vec::new();

    // clap_mangen does not emit a .TH header with a date.
    writeln!(
        page,
        r#".TH "{}" 1 "{}" "{}" "User Commands""#,
        bin_name.to_uppercase(),
        date,
        env!("CARGO_PKG_VERSION")
    )?;
    Man::new(cmd.clone()).render(&mut page)?;

    let sections = [
        ("EVENT BATCHING", MAN_BATCHING),
        ("POINTER ACCELERATION", MAN_ACCELERATION),
        ("OUTPUT", MAN_OUTPUT),
        ("EXAMPLES", MAN_EXAMPLES),
        ("STATISTICS", MAN_STATISTICS),
        ("LOGGING", MAN_LOGGING),
        ("SIGNALS", MAN_SIGNALS),
        ("EXIT STATUS", MAN_EXIT_STATUS),
        ("ENVIRONMENT", MAN_ENVIRONMENT),
        ("BUGS", MAN_BUGS),
        ("SEE ALSO", MAN_SEE_ALSO),
    ];
    for (title, body) in sections {
        writeln!(page, ".SH {title}")?;
        writeln!(page, "{}", body.replace("{bin_name}", bin_name))?;
    }
    Ok(page)
}

fn write_completions(cmd: &clap::Command, dir: &Path) -> Result<()> {
    let bin_name = cmd.get_name();
    for (shell, ext) in [
        (Shell::Bash, "bash"),
        (Shell::Elvish, "elv"),
        (Shell::Fish, "fish"),
        (Shell::PowerShell, "ps1"),
        (Shell::Zsh, "zsh"),
    ] {
        let path = dir.join(format!("{bin_name}.{ext}"));
        let mut file = fs::File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        generate(shell, &mut cmd.clone(), bin_name, &mut file);
        println!("wrote {}", path.display());
    }

    let path = dir.join(format!("{bin_name}.nu"));
    let mut file =
        fs::File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    generate(Nushell, &mut cmd.clone(), bin_name, &mut file);
    println!("wrote {}", path.display());
    Ok(())
}
