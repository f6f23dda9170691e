//! Amstrad PC1640 NVR/RTC configuration utility.
//!
//! Thin command layer over `nvr-core`: parse arguments, open the port
//! backend, dispatch, print. Must run as root for /dev/port access.

use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use nvr_core::nvr::clock::{AlarmSetting, ClockDate, ClockTime, RegBFlag};
use nvr_core::nvr::config::FloppyDrive;
use nvr_core::nvr::image::NvrImage;
use nvr_core::nvr::{regs, NvrBus, NvrError};
use nvr_core::port::{DevPort, PortIo};

mod report;

#[derive(Parser)]
#[command(
    name = "nvr",
    version,
    about = "Amstrad PC1640 NVR/RTC configuration utility",
    after_help = "Floppy types: 0=None 1=360K 5.25\" 2=1.2M 5.25\" 3=720K 3.5\" 4=1.44M 3.5\"\n\
                  HD types: 0=None 1-14=Standard geometries 15=Extended\n\
                  Video modes: 0=EGA 1=40col-CGA 2=80col-CGA 3=MDA/Hercules\n\
                  Must run as root for port I/O access."
)]
struct Cli {
    /// Increase debug verbosity (repeat for more)
    #[arg(short = 'd', long = "debug", action = ArgAction::Count, global = true)]
    debug: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show full system configuration (default)
    Show,
    /// Show current date and time
    Time,
    /// Show alarm settings
    Alarm,
    /// Show RTC status registers (detailed)
    Status,
    /// Show battery health
    Battery,
    /// Show diagnostic & shutdown status
    Diag,
    /// Show floppy drive configuration
    Floppy,
    /// Show hard disk configuration
    Harddisk,
    /// Show equipment byte breakdown
    Equipment,
    /// Show memory configuration
    Memory,
    /// Show Amstrad system status (ports/latches)
    Amstrad,
    /// NVR latch protocol trace
    Trace,
    /// Continuously display time (Ctrl+C to stop)
    Watch,
    /// Set the RTC time
    SetTime {
        /// HH:MM:SS
        time: String,
    },
    /// Set the RTC date
    SetDate {
        /// DD/MM/YYYY
        date: String,
    },
    /// Set day of week (1=Sunday .. 7=Saturday)
    SetDow { day: u8 },
    /// Set alarm time (-1 for wildcard, e.g. -1:-1:00)
    SetAlarm {
        /// HH:MM:SS
        time: String,
    },
    /// Enable the alarm interrupt
    AlarmEnable,
    /// Disable the alarm interrupt
    AlarmDisable,
    /// Set an RTC mode flag
    SetRtc {
        /// 24h, bcd, sqw, dse, pie, uie or rate
        mode: String,
        /// 0/1 for flags, 0-15 for rate
        value: String,
    },
    /// Set a floppy drive type (0-4)
    SetFloppy {
        /// A or B
        drive: String,
        r#type: String,
    },
    /// Set a hard disk type (0-15)
    SetHarddisk {
        /// 0/C or 1/D
        drive: String,
        r#type: String,
    },
    /// Set an equipment field (fpu 0|1, video 0-3, floppy-count 0-4)
    SetEquip { field: String, value: String },
    /// Set base memory in KB (64-640)
    SetBasemem { kb: String },
    /// Clear the diagnostic status byte
    ClearDiag,
    /// Hex dump of all 64 NVR bytes
    Dump,
    /// Read a single NVR byte (0x00-0x3F)
    Read { addr: String },
    /// Write a single NVR byte
    Write { addr: String, value: String },
    /// Fill an NVR range with a value
    Fill {
        start: String,
        end: String,
        value: String,
    },
    /// Verify the checksum, recalculating if invalid
    Checksum,
    /// Save the NVR contents to a binary file
    Save { file: PathBuf },
    /// Load NVR contents from a binary file
    Load { file: PathBuf },
    /// Compare live NVR contents against a saved file
    Compare { file: PathBuf },
    /// Reset the NVR to PC1640 factory defaults
    FactoryReset,
    /// Read an I/O port
    Inb { port: String },
    /// Write an I/O port
    Outb { port: String, value: String },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version are successes; everything else is a usage
            // error reported on stderr.
            let _ = e.print();
            return match e.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                    ExitCode::SUCCESS
                }
                _ => ExitCode::FAILURE,
            };
        }
    };

    let filter = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let ports = match DevPort::open() {
        Ok(ports) => ports,
        Err(e) => {
            eprintln!("Error: cannot open /dev/port: {e}");
            eprintln!("This tool needs root and raw port access.");
            return ExitCode::FAILURE;
        }
    };
    let mut bus = NvrBus::new(ports);

    match run(&mut bus, cli.command.unwrap_or(Command::Show)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run<P: PortIo>(bus: &mut NvrBus<P>, command: Command) -> Result<(), NvrError> {
    match command {
        Command::Show => report::show_all(bus),
        Command::Time => report::show_time(bus),
        Command::Alarm => report::show_alarm(bus),
        Command::Status => report::show_status(bus),
        Command::Battery => report::show_battery(bus),
        Command::Diag => report::show_diag(bus),
        Command::Floppy => report::show_floppy(bus),
        Command::Harddisk => report::show_harddisk(bus),
        Command::Equipment => report::show_equipment(bus),
        Command::Memory => report::show_memory(bus),
        Command::Amstrad => report::show_amstrad(bus),
        Command::Trace => report::show_trace(bus),
        Command::Watch => watch(bus),

        Command::SetTime { time } => {
            let time = parse_time(&time)?;
            bus.set_time(time);
            println!(
                "Time set to {:02}:{:02}:{:02}",
                time.hours, time.minutes, time.seconds
            );
        }
        Command::SetDate { date } => {
            let date = parse_date(&date)?;
            bus.set_date(date);
            println!(
                "Date set to {:02}/{:02}/{:04}",
                date.day, date.month, date.year
            );
        }
        Command::SetDow { day } => {
            bus.set_day_of_week(day)?;
            println!(
                "Day of week set to {} ({})",
                day,
                report::DAY_NAMES[day as usize]
            );
        }
        Command::SetAlarm { time } => {
            let alarm = parse_alarm(&time)?;
            bus.set_alarm(alarm);
            println!("Alarm set to {time}");
            println!("Note: Use 'nvr alarm-enable' to arm the alarm IRQ");
        }
        Command::AlarmEnable => {
            bus.set_reg_b_flag(RegBFlag::AlarmIrq, true);
            println!("Alarm IRQ ENABLED");
            println!("Note: On PC1640 the alarm routes to IRQ 1 (shared with keyboard)");
        }
        Command::AlarmDisable => {
            bus.set_reg_b_flag(RegBFlag::AlarmIrq, false);
            println!("Alarm IRQ disabled");
        }
        Command::SetRtc { mode, value } => set_rtc_mode(bus, &mode, &value)?,

        Command::SetFloppy { drive, r#type } => {
            let drive = parse_floppy_drive(&drive)?;
            let ftype = parse_num("floppy type", &r#type, 4)? as u8;
            bus.set_floppy(drive, ftype)?;
            println!(
                "Drive {} set to: {}",
                match drive {
                    FloppyDrive::A => "A",
                    FloppyDrive::B => "B",
                },
                nvr_core::nvr::config::floppy_type_name(ftype).unwrap_or("Unknown")
            );
        }
        Command::SetHarddisk { drive, r#type } => {
            let drive = parse_hd_drive(&drive)?;
            let hd_type = parse_num("hard disk type", &r#type, 15)? as u8;
            bus.set_hard_disk(drive, hd_type)?;
            println!("Drive {drive} set to type {hd_type}");
        }
        Command::SetEquip { field, value } => set_equipment(bus, &field, &value)?,
        Command::SetBasemem { kb } => {
            let kb = parse_num("base memory KB", &kb, 0xFFFF)? as u16;
            bus.set_base_memory(kb)?;
            println!("Base memory set to {kb} KB");
        }
        Command::ClearDiag => {
            bus.clear_diagnostics();
            println!("Diagnostic status cleared");
        }

        Command::Dump => report::show_dump(bus),
        Command::Read { addr } => {
            let addr = parse_num("address", &addr, 0x3F)? as u8;
            let value = bus.read(addr);
            println!("NVR[0x{addr:02X}] = 0x{value:02X} ({value})");
        }
        Command::Write { addr, value } => {
            let addr = parse_num("address", &addr, 0x3F)? as u8;
            let value = parse_num("value", &value, 0xFF)? as u8;
            bus.write_config(addr, value);
            println!("NVR[0x{addr:02X}] = 0x{value:02X} written");
        }
        Command::Fill { start, end, value } => {
            let start = parse_num("start address", &start, 0x3F)? as u8;
            let end = parse_num("end address", &end, 0x3F)? as u8;
            let value = parse_num("value", &value, 0xFF)? as u8;
            bus.fill(start, end, value)?;
            println!("NVR 0x{start:02X}-0x{end:02X} filled with 0x{value:02X}");
        }
        Command::Checksum => {
            if bus.verify_checksum() {
                println!("NVR checksum is valid");
            } else {
                println!("NVR checksum is INVALID - recalculating...");
                let sum = bus.update_checksum();
                println!("Checksum updated to 0x{sum:04X}");
            }
        }

        Command::Save { file } => {
            let image = NvrImage::snapshot(bus);
            std::fs::write(&file, image.as_bytes())?;
            println!("NVR saved to {} (64 bytes)", file.display());
        }
        Command::Load { file } => {
            let bytes = std::fs::read(&file)?;
            let image = NvrImage::from_bytes(&bytes)?;
            bus.restore_image(&image);
            println!("NVR loaded from {} (64 bytes)", file.display());
        }
        Command::Compare { file } => {
            let bytes = std::fs::read(&file)?;
            let saved = NvrImage::from_bytes(&bytes)?;
            let live = NvrImage::snapshot(bus);
            report::show_compare(&live, &saved, &file.display().to_string());
        }
        Command::FactoryReset => {
            bus.factory_reset();
            println!("NVR reset to PC1640 factory defaults");
            println!("Set the time and date with 'nvr set-time' / 'nvr set-date'");
        }

        Command::Inb { port } => {
            let port = parse_num("port", &port, 0xFFFF)? as u16;
            let value = bus.ports_mut().read(port);
            println!("Port 0x{port:04X} = 0x{value:02X} ({value})");
        }
        Command::Outb { port, value } => {
            let port = parse_num("port", &port, 0xFFFF)? as u16;
            let value = parse_num("value", &value, 0xFF)? as u8;
            bus.ports_mut().write(port, value);
            println!("Port 0x{port:04X} <- 0x{value:02X}");
        }
    }
    Ok(())
}

fn watch<P: PortIo>(bus: &mut NvrBus<P>) -> ! {
    println!("RTC Watch Mode (Ctrl+C to stop):\n");
    loop {
        let snap = bus.read_clock();
        print!("  {:02}:{:02}:{:02}\r", snap.hours, snap.minutes, snap.seconds);
        let _ = std::io::stdout().flush();
        let seconds = bus.read(regs::SECONDS);
        bus.wait_second_change(seconds);
    }
}

fn set_rtc_mode<P: PortIo>(bus: &mut NvrBus<P>, mode: &str, value: &str) -> Result<(), NvrError> {
    let on = parse_num("value", value, 0xFF)? != 0;
    match mode {
        "24h" => {
            bus.set_reg_b_flag(RegBFlag::Hour24, on);
            println!("Hour format set to {}", if on { "24-hour" } else { "12-hour" });
        }
        // "bcd 1" asks for BCD, which is the binary-mode bit cleared.
        "bcd" => {
            bus.set_reg_b_flag(RegBFlag::BinaryMode, !on);
            println!("Data mode set to {}", if on { "BCD" } else { "Binary" });
        }
        "sqw" => {
            bus.set_reg_b_flag(RegBFlag::SquareWave, on);
            println!("Square wave output {}", if on { "ENABLED" } else { "disabled" });
        }
        "dse" => {
            bus.set_reg_b_flag(RegBFlag::DaylightSavings, on);
            println!("Daylight savings {}", if on { "ENABLED" } else { "disabled" });
        }
        "pie" => {
            bus.set_reg_b_flag(RegBFlag::PeriodicIrq, on);
            println!("Periodic interrupt {}", if on { "ENABLED" } else { "disabled" });
        }
        "uie" => {
            bus.set_reg_b_flag(RegBFlag::UpdateIrq, on);
            println!("Update-ended interrupt {}", if on { "ENABLED" } else { "disabled" });
        }
        "rate" => {
            let rate = parse_num("rate select", value, 15)? as u8;
            bus.set_periodic_rate(rate)?;
            println!("Periodic rate set to {} ({})", rate, report::rate_name(rate));
        }
        _ => {
            return Err(NvrError::Format {
                what: "RTC mode",
                expected: "24h, bcd, sqw, dse, pie, uie or rate",
            });
        }
    }
    Ok(())
}

fn set_equipment<P: PortIo>(bus: &mut NvrBus<P>, field: &str, value: &str) -> Result<(), NvrError> {
    match field {
        "fpu" | "coprocessor" | "8087" => {
            let on = parse_num("value", value, 1)? != 0;
            bus.set_fpu_installed(on);
            println!("Math coprocessor: {}", if on { "Installed" } else { "Not installed" });
        }
        "video" => {
            let mode = parse_num("video mode", value, 3)? as u8;
            bus.set_video_mode(mode)?;
            println!("Initial video mode set to {mode}");
        }
        "floppy-count" => {
            let count = parse_num("floppy count", value, 4)? as u8;
            bus.set_floppy_count(count)?;
            println!("Floppy count set to {count}");
        }
        _ => {
            return Err(NvrError::Format {
                what: "equipment field",
                expected: "fpu, video or floppy-count",
            });
        }
    }
    Ok(())
}

/// Parse a decimal or 0x-prefixed hex number, bounded inclusively.
fn parse_num(what: &'static str, s: &str, max: i64) -> Result<i64, NvrError> {
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16)
    } else {
        s.parse()
    };
    let value = parsed.map_err(|_| NvrError::Format {
        what,
        expected: "a decimal or 0x-prefixed hex number",
    })?;
    nvr_core::nvr::error::check_range(what, value, 0, max)?;
    Ok(value)
}

fn parse_time(s: &str) -> Result<ClockTime, NvrError> {
    let bad = || NvrError::Format {
        what: "time",
        expected: "HH:MM:SS",
    };
    let mut parts = s.split(':');
    let hours = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
    let minutes = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
    let seconds = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
    if parts.next().is_some() {
        return Err(bad());
    }
    ClockTime::new(hours, minutes, seconds)
}

fn parse_date(s: &str) -> Result<ClockDate, NvrError> {
    let bad = || NvrError::Format {
        what: "date",
        expected: "DD/MM/YYYY",
    };
    let mut parts = s.split('/');
    let day = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
    let month = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
    let year = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
    if parts.next().is_some() {
        return Err(bad());
    }
    ClockDate::new(day, month, year)
}

/// Alarm time with -1 (or *) per field meaning wildcard.
fn parse_alarm(s: &str) -> Result<AlarmSetting, NvrError> {
    let bad = || NvrError::Format {
        what: "alarm time",
        expected: "HH:MM:SS with -1 or * for wildcards",
    };
    let field = |p: &str| -> Result<Option<u8>, NvrError> {
        if p == "-1" || p == "*" || p == "**" {
            return Ok(None);
        }
        p.parse().map(Some).map_err(|_| bad())
    };
    let mut parts = s.split(':');
    let hours = field(parts.next().ok_or_else(bad)?)?;
    let minutes = field(parts.next().ok_or_else(bad)?)?;
    let seconds = field(parts.next().ok_or_else(bad)?)?;
    if parts.next().is_some() {
        return Err(bad());
    }
    AlarmSetting::new(hours, minutes, seconds)
}

fn parse_floppy_drive(s: &str) -> Result<FloppyDrive, NvrError> {
    match s {
        "A" | "a" | "0" => Ok(FloppyDrive::A),
        "B" | "b" | "1" => Ok(FloppyDrive::B),
        _ => Err(NvrError::Format {
            what: "floppy drive",
            expected: "A or B",
        }),
    }
}

fn parse_hd_drive(s: &str) -> Result<u8, NvrError> {
    match s {
        "0" | "C" | "c" => Ok(0),
        "1" | "D" | "d" => Ok(1),
        _ => Err(NvrError::Format {
            what: "hard disk drive",
            expected: "0/C or 1/D",
        }),
    }
}
