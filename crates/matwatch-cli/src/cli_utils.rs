//! Common CLI utility functions shared across commands.

use anyhow::Result;
use matwatch_core::{Session, SessionOptions, SystemProcessProvider, load_layout};

/// Attach to `pid` and point the session at the header at `address`.
pub fn open_session(
    pid: u32,
    address: u64,
    layout: Option<&str>,
    options: SessionOptions,
) -> Result<Session<SystemProcessProvider>> {
    let mut session = Session::attach(SystemProcessProvider, pid, options)?;
    if let Some(path) = layout {
        let table = load_layout(path)?;
        println!("Using field layout for {} from {}", table.type_name, path);
        session = session.with_reflective(Box::new(table));
    }
    session.set_target(address);
    Ok(session)
}
