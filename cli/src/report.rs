//! Report formatting for the command surface.
//!
//! Every function here reads through `nvr-core` and prints to stdout; no
//! hardware knowledge beyond cell/bit names lives in this crate.

use nvr_core::latch::{read_system_status1, read_system_status2, trace_latch};
use nvr_core::nvr::clock::AlarmField;
use nvr_core::nvr::config::{
    floppy_type_name, hd_geometry, shutdown_description, video_mode_name, HardDiskType,
};
use nvr_core::nvr::image::{cell_name, NvrImage};
use nvr_core::nvr::regs::{self, RegA, RegB};
use nvr_core::nvr::NvrBus;
use nvr_core::port::PortIo;

pub const DAY_NAMES: [&str; 8] = [
    "???",
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub const MONTH_NAMES: [&str; 13] = [
    "???",
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Periodic interrupt rate names, indexed by the Register A RS field.
pub fn rate_name(rate: u8) -> &'static str {
    match rate {
        0 => "None",
        1 => "256 Hz",
        2 => "128 Hz",
        3 => "8192 Hz",
        4 => "4096 Hz",
        5 => "2048 Hz",
        6 => "1024 Hz",
        7 => "512 Hz",
        8 => "256 Hz",
        9 => "128 Hz",
        10 => "64 Hz",
        11 => "32 Hz",
        12 => "16 Hz",
        13 => "8 Hz",
        14 => "4 Hz",
        _ => "2 Hz",
    }
}

/// Oscillator divider names, indexed by the Register A DV field.
pub fn divider_name(divider: u8) -> &'static str {
    match divider {
        0 => "4.194304 MHz (time base)",
        1 => "1.048576 MHz",
        2 => "32.768 kHz (standard crystal)",
        3 | 4 => "Test: any",
        _ => "Reset / divider held",
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "YES" } else { "no" }
}

pub fn show_time<P: PortIo>(bus: &mut NvrBus<P>) {
    let snap = bus.read_clock();
    println!(
        "Date: {} {} {} {}",
        DAY_NAMES[snap.day_of_week as usize], snap.day_of_month, MONTH_NAMES[snap.month as usize], snap.year
    );
    println!(
        "Time: {:02}:{:02}:{:02}",
        snap.hours, snap.minutes, snap.seconds
    );
    println!(
        "Mode: {}, {}",
        match snap.hour_mode {
            nvr_core::nvr::codec::HourMode::H24 => "24-hour",
            nvr_core::nvr::codec::HourMode::H12 => "12-hour",
        },
        match snap.data_mode {
            nvr_core::nvr::codec::DataMode::Binary => "Binary",
            nvr_core::nvr::codec::DataMode::Bcd => "BCD",
        }
    );
}

fn alarm_field(f: AlarmField) -> String {
    match f {
        AlarmField::Any => "**".into(),
        AlarmField::At(v) => format!("{v:02}"),
    }
}

pub fn show_alarm<P: PortIo>(bus: &mut NvrBus<P>) {
    let alarm = bus.read_alarm();
    let reg_b = RegB::from_byte(bus.read(regs::REG_B));

    println!("\nRTC Alarm:");
    if alarm.is_unset() {
        println!("  Alarm: Not set (all wildcards)");
    } else {
        println!(
            "  Alarm time: {}:{}:{}",
            alarm_field(alarm.hours),
            alarm_field(alarm.minutes),
            alarm_field(alarm.seconds)
        );
        println!("  (** = wildcard/don't care)");
    }
    println!(
        "  Alarm IRQ: {}",
        if reg_b.alarm_irq {
            "ENABLED (routes to IRQ 1 on PC1640)"
        } else {
            "Disabled"
        }
    );
}

pub fn show_status<P: PortIo>(bus: &mut NvrBus<P>) {
    let a = RegA::from_byte(bus.read(regs::REG_A));
    let b = RegB::from_byte(bus.read(regs::REG_B));
    let c = bus.take_interrupt_flags();
    let battery = bus.battery_ok();

    println!("\nRTC Status Registers:");
    println!("  Register A (0x0A): 0x{:02X}", a.raw);
    println!(
        "    Update In Progress: {}",
        if a.update_in_progress {
            "Yes (do not read time)"
        } else {
            "No"
        }
    );
    println!("    Divider: {} - {}", a.divider, divider_name(a.divider));
    println!("    Rate select: {} - {}", a.rate, rate_name(a.rate));

    println!("  Register B (0x0B): 0x{:02X}", b.raw);
    println!("    SET (halt updates):     {}", on_off(b.set));
    println!("    Periodic IRQ enable:    {}", on_off(b.periodic_irq));
    println!("    Alarm IRQ enable:       {}", on_off(b.alarm_irq));
    println!("    Update-end IRQ enable:  {}", on_off(b.update_irq));
    println!("    Square wave output:     {}", on_off(b.square_wave));
    println!(
        "    Data mode:              {}",
        if b.binary_mode { "Binary" } else { "BCD" }
    );
    println!(
        "    Hour format:            {}",
        if b.hour_24 { "24-hour" } else { "12-hour" }
    );
    println!("    Daylight savings:       {}", on_off(b.daylight_savings));

    println!("  Register C (0x0C): 0x{:02X}  [read clears flags]", c.raw);
    println!("    IRQ flag (composite):   {}", if c.irq { "SET" } else { "clear" });
    println!("    Periodic flag:          {}", if c.periodic { "SET" } else { "clear" });
    println!("    Alarm flag:             {}", if c.alarm { "SET" } else { "clear" });
    println!("    Update-ended flag:      {}", if c.update_ended { "SET" } else { "clear" });

    println!("  Register D (0x0D): 0x{:02X}", bus.read(regs::REG_D));
    println!(
        "    Battery: {}",
        if battery {
            "OK (valid RAM & time)"
        } else {
            "*** DEAD - REPLACE BATTERY ***"
        }
    );
}

pub fn show_battery<P: PortIo>(bus: &mut NvrBus<P>) {
    let health = bus.read_battery();

    println!("\nBattery Status:");
    println!(
        "  Register D VRT flag: {}",
        if health.vrt {
            "SET (battery OK, RAM valid)"
        } else {
            "CLEAR (battery dead!)"
        }
    );
    println!(
        "  Diagnostic bit 7:   {}",
        if health.power_was_lost {
            "SET (power was lost)"
        } else {
            "CLEAR (continuous power)"
        }
    );

    if !health.vrt {
        println!("\n  *** WARNING: Battery is dead or disconnected! ***");
        println!("  All NVR settings will be lost on power-off.");
        println!("  Replace the 4x AA batteries in the monitor base.");
    } else if health.power_was_lost {
        println!("\n  Battery was previously depleted or disconnected.");
        println!("  NVR may contain incorrect settings.");
        println!("  Use 'nvr factory-reset' to restore defaults.");
    } else {
        println!("\n  Battery and NVR RAM are healthy.");
    }
}

pub fn show_diag<P: PortIo>(bus: &mut NvrBus<P>) {
    let diag = bus.read_diagnostics();
    let shutdown = bus.read_shutdown_code();

    println!("\nDiagnostic Status (0x0E): 0x{:02X}", diag.raw);
    if diag.is_clear() {
        println!("  All clear - no errors");
    } else {
        for msg in diag.messages() {
            println!("  {msg}");
        }
    }

    print!("\nShutdown Status (0x0F): 0x{shutdown:02X}");
    match shutdown_description(shutdown) {
        Some(desc) => println!(" - {desc}"),
        None => println!(" - Code 0x{shutdown:02X}"),
    }
}

pub fn show_floppy<P: PortIo>(bus: &mut NvrBus<P>) {
    let f = bus.read_floppy();

    println!("\nFloppy Drive Configuration:");
    println!("  NVR byte 0x10: 0x{:02X}", f.raw);
    println!(
        "  Drive A: type {} - {}",
        f.drive_a,
        floppy_type_name(f.drive_a).unwrap_or("Unknown")
    );
    println!(
        "  Drive B: type {} - {}",
        f.drive_b,
        floppy_type_name(f.drive_b).unwrap_or("Unknown")
    );
    println!("  Equipment says: {} drive(s) installed", f.equip_count);
    println!("  Disk-change line: active-low (PC1640 specific)");
}

fn show_hd_slot(label: &str, slot: HardDiskType) {
    print!("  Drive {label}: ");
    match slot {
        HardDiskType::NotInstalled => println!("Not installed"),
        HardDiskType::Extended(ext) => println!("Extended type {ext}"),
        HardDiskType::Standard(t) => match hd_geometry(t) {
            Some(geo) => println!(
                "Type {} - {} cyl, {} heads, {} spt (~{} MB)",
                t,
                geo.cylinders,
                geo.heads,
                geo.sectors,
                geo.capacity_mb()
            ),
            None => println!("Unknown type {t}"),
        },
    }
}

pub fn show_harddisk<P: PortIo>(bus: &mut NvrBus<P>) {
    let hd = bus.read_hard_disk();

    println!("\nHard Disk Configuration:");
    println!("  NVR byte 0x12: 0x{:02X}", hd.raw);
    show_hd_slot("0 (C:)", hd.drive0);
    show_hd_slot("1 (D:)", hd.drive1);
}

pub fn show_equipment<P: PortIo>(bus: &mut NvrBus<P>) {
    let e = bus.read_equipment();

    println!("\nEquipment Byte (0x14): 0x{:02X}", e.raw);
    println!(
        "  Bit 0 - Floppy drives:     {}",
        if e.floppy_installed { "Installed" } else { "Not installed" }
    );
    println!(
        "  Bit 1 - Math coprocessor:  {}",
        if e.fpu_installed { "8087 installed" } else { "Not installed" }
    );
    println!(
        "  Bits 4-5 - Initial video:  {}",
        video_mode_name(e.video)
    );
    println!("  Bits 6-7 - Floppy count:   {} drive(s)", e.floppy_count);
}

pub fn show_memory<P: PortIo>(bus: &mut NvrBus<P>) {
    let m = bus.read_memory();

    println!("\nMemory Configuration:");
    print!("  Base memory:     {} KB", m.base_kb);
    if m.base_kb == 640 {
        print!(" (standard PC1640)");
    }
    println!();
    print!("  Extended memory: {} KB", m.extended_kb);
    if m.extended_kb == 0 {
        print!(" (normal - 8086 has no extended memory)");
    }
    println!();
}

pub fn show_amstrad<P: PortIo>(bus: &mut NvrBus<P>) {
    println!("\nAmstrad PC1640 System Status:");
    println!("------------------------------");

    let ports = bus.ports_mut();
    let pb = ports.read(regs::PB_PORT);
    println!("\n  PB Register (port 0x61): 0x{pb:02X}");
    println!("    Bit 0 - Speaker gate:      {}", if pb & 0x01 != 0 { "ON" } else { "off" });
    println!("    Bit 1 - Speaker enable:    {}", if pb & 0x02 != 0 { "ON" } else { "off" });
    println!(
        "    Bit 2 - Nibble select:     {} nibble",
        if pb & regs::PB_NIBBLE_SEL != 0 { "Low" } else { "High" }
    );
    println!(
        "    Bit 7 - Port 0x60 mode:    {}",
        if pb & regs::PB_STATUS_MODE != 0 { "System status" } else { "Keyboard data" }
    );

    let raw2 = ports.read(regs::STATUS2_PORT);
    println!("\n  Port 0x62 raw read: 0x{raw2:02X}");
    println!("    Bit 5 - Speaker output:    {}", if raw2 & 0x20 != 0 { "HIGH" } else { "low" });
    println!("    Bit 6 - NMI status:        {}", if raw2 & 0x40 != 0 { "ACTIVE" } else { "inactive" });

    let stat2 = read_system_status2(ports);
    println!("  System Status 2 (combined):  0x{stat2:02X}");

    let stat1 = read_system_status1(ports);
    println!("\n  System Status 1 (port 0x60): 0x{stat1:02X}");
}

pub fn show_trace<P: PortIo>(bus: &mut NvrBus<P>) {
    println!("\nNVR Protocol Trace (port 0x65 -> port 0x62):");
    println!("  Addr  Wr65  Rd62(hi)  Rd62(lo)  Combined");
    println!("  ----  ----  --------  --------  --------");
    for row in trace_latch(bus.ports_mut()) {
        println!(
            "  0x{0:02X}  0x{0:02X}    0x{1:X}       0x{2:X}      0x{3:02X}",
            row.written,
            row.high,
            row.low,
            row.combined()
        );
    }
}

pub fn show_dump<P: PortIo>(bus: &mut NvrBus<P>) {
    let image = NvrImage::snapshot(bus);

    println!("\nNVR Dump (64 bytes):");
    println!("       00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F");
    println!("       -- -- -- -- -- -- -- -- -- -- -- -- -- -- -- --");
    for (row, chunk) in image.as_bytes().chunks(16).enumerate() {
        print!("  {:02X}:  ", row * 16);
        for byte in chunk {
            print!("{byte:02X} ");
        }
        println!();
    }

    println!("\n  Regions:");
    println!("    0x00-0x09: RTC time/date registers");
    println!("    0x0A-0x0D: RTC status registers (A-D)");
    println!("    0x0E:      Diagnostic status");
    println!("    0x0F:      Shutdown status");
    println!("    0x10:      Floppy drive types");
    println!("    0x12:      Hard disk types");
    println!("    0x14:      Equipment byte");
    println!("    0x15-0x16: Base memory (KB)");
    println!("    0x17-0x18: Extended memory (KB)");
    println!("    0x19-0x1A: HD extended types");
    println!("    0x2E-0x2F: Checksum");
    println!("    0x32:      Century (BCD)");

    println!(
        "\n  Checksum (0x10-0x2D): {}",
        if bus.verify_checksum() { "VALID" } else { "*** INVALID ***" }
    );
}

pub fn show_compare(live: &NvrImage, file: &NvrImage, filename: &str) {
    println!("\nNVR Compare: live vs {filename}");
    println!("  Addr  Live  File  Description");
    println!("  ----  ----  ----  -----------");

    let diffs = live.diff(file);
    for &(addr, live_val, file_val) in &diffs {
        print!("  0x{addr:02X}  0x{live_val:02X}  0x{file_val:02X}");
        if let Some(name) = cell_name(addr) {
            print!("  {name}");
        }
        println!();
    }

    if diffs.is_empty() {
        println!("  No differences found");
    } else {
        println!("\n  Total: {} byte(s) differ", diffs.len());
    }
}

pub fn show_all<P: PortIo>(bus: &mut NvrBus<P>) {
    println!("Amstrad PC1640 NVR Full Configuration");
    println!("======================================");
    show_time(bus);
    show_alarm(bus);
    show_status(bus);
    show_floppy(bus);
    show_harddisk(bus);
    show_equipment(bus);
    show_memory(bus);
    show_diag(bus);
    show_amstrad(bus);
    println!(
        "\nNVR checksum: {}",
        if bus.verify_checksum() { "Valid" } else { "*** INVALID ***" }
    );
}
