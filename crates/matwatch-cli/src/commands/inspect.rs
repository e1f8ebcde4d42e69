//! Inspect command implementation.

use anyhow::Result;
use matwatch_core::frame::{is_contiguous, pointer_range_consistent};
use matwatch_core::{MatrixDescriptor, Refresh, SessionOptions, StrideInfo};
use serde::Serialize;

use crate::cli_utils::open_session;

#[derive(Debug, Serialize)]
struct InspectReport {
    pid: u32,
    address: u64,
    decoder: &'static str,
    present: bool,
    descriptor: Option<MatrixDescriptor>,
    type_description: Option<String>,
    stride: Option<StrideInfo>,
    contiguous: Option<bool>,
    pointer_range_consistent: Option<bool>,
}

/// Run the inspect command
pub fn run(pid: u32, address: u64, layout: Option<&str>, json: bool) -> Result<()> {
    let options = SessionOptions {
        check_content: false,
        ..SessionOptions::default()
    };
    let mut session = open_session(pid, address, layout, options)?;
    let refresh = session.refresh()?;

    let descriptor = session.descriptor().copied();
    let stride = session.stride().copied();
    let report = InspectReport {
        pid,
        address,
        decoder: session.decoder().name(),
        present: !matches!(refresh, Refresh::Absent),
        descriptor,
        type_description: descriptor.map(|d| d.matrix_type().description()),
        stride,
        contiguous: descriptor.zip(stride).map(|(d, s)| is_contiguous(&d, &s)),
        pointer_range_consistent: descriptor
            .zip(stride)
            .map(|(d, s)| pointer_range_consistent(&d, &s)),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report);
    Ok(())
}

fn print_report(report: &InspectReport) {
    println!(
        "Process {} / header 0x{:X} ({} decoder)",
        report.pid, report.address, report.decoder
    );

    let (Some(d), Some(stride)) = (&report.descriptor, &report.stride) else {
        println!("No matrix at this address (null, disposed or unreadable layout)");
        return;
    };

    println!();
    println!("=== Header ===");
    println!("  Type:        {}", report.type_description.as_deref().unwrap_or("?"));
    println!("  Flags:       0x{:08X}", d.flags);
    println!("  Dims:        {}", d.dims);
    println!("  Size:        {} x {} (cols x rows)", d.cols, d.rows);
    println!("  Data:        0x{:X}", d.data);
    println!("  Data start:  0x{:X}", d.data_start);
    println!("  Data end:    0x{:X}", d.data_end);
    println!("  Data limit:  0x{:X}", d.data_limit);
    println!("  Ref count:   0x{:X}", d.ref_count);

    println!();
    println!("=== Layout ===");
    println!("  Expected step: {} bytes", stride.expected);
    println!("  Actual step:   {} bytes", stride.actual);
    if stride.is_padded() {
        println!(
            "  Row padding:   {} bytes",
            stride.actual - stride.expected
        );
    }
    println!(
        "  Contiguous:    {}",
        if report.contiguous == Some(true) { "yes" } else { "no" }
    );
    if report.pointer_range_consistent == Some(false) {
        println!("  WARNING: data pointer range disagrees with rows x step");
    }
}
