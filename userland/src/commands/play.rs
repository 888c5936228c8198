//! Spinning and the per-spin admin controls.

use std::io::Write;
use std::path::Path;

use spinwheel_abi::{DesignatedWinner, SpinMode, SpinNumber, SpinResult, StoreError, WheelError};
use spinwheel_core::{RemovalOutcome, SpinWheel};
use spinwheel_lib::klog_info;

use super::sets::read_image;
use crate::error::{CliError, CliResult};
use crate::session::{FrameClock, Session};

/// Frame period used to drive the animation (about 60 fps).
pub const FRAME_MS: u64 = 16;

/// Frames allowed past the nominal spin duration before giving up.
const FRAME_SLACK: u64 = 64;

fn parse_mode(text: &str) -> CliResult<SpinMode> {
    text.parse().map_err(CliError::Usage)
}

pub fn mode(session: &Session, mode: &str, spin: Option<SpinNumber>, out: &mut dyn Write) -> CliResult<()> {
    let mut wheel = session.wheel()?;
    match spin {
        Some(spin) => {
            let mode = parse_mode(mode)?;
            wheel.set_spin_mode(spin, mode)?;
            writeln!(out, "spin #{} is {}", spin, mode)?;
        }
        None if mode.eq_ignore_ascii_case("none") => {
            wheel.set_default_mode(None)?;
            writeln!(out, "default mode follows config ({})", session.config.default_mode)?;
        }
        None => {
            let mode = parse_mode(mode)?;
            wheel.set_default_mode(Some(mode))?;
            writeln!(out, "default mode is {}", mode)?;
        }
    }
    Ok(())
}

pub fn designate(
    session: &Session,
    spin: SpinNumber,
    name: Option<&str>,
    ticket: Option<&str>,
    clear: bool,
    out: &mut dyn Write,
) -> CliResult<()> {
    let mut wheel = session.wheel()?;
    if clear {
        let had = wheel.clear_designation(spin)?;
        writeln!(
            out,
            "spin #{}: {}",
            spin,
            if had { "designation cleared" } else { "nothing was designated" }
        )?;
        return Ok(());
    }

    let ticket = ticket.map(str::trim).filter(|t| !t.is_empty());
    let name = name.map(str::trim).unwrap_or_default();
    if ticket.is_none() && name.is_empty() {
        return Err(CliError::Usage("give a name, --ticket, or --clear".into()));
    }
    let winner = DesignatedWinner {
        ticket: ticket.map(str::to_string),
        name: name.to_string(),
    };
    let resolves = wheel.designate_winner(spin, winner.clone())?;
    writeln!(out, "spin #{} will land on {}", spin, winner)?;
    if !resolves {
        writeln!(out, "warning: no entry matches; that spin will be random")?;
    }
    let mode = wheel.state().mode_for_spin(spin, session.config.default_mode)?;
    if mode != SpinMode::Fixed {
        writeln!(out, "note: spin #{} is {}; set it with `mode fixed --spin {}`", spin, mode, spin)?;
    }
    Ok(())
}

/// Drive frames until the running spin resolves.
pub fn run_to_completion(wheel: &mut SpinWheel, clock: &FrameClock) -> CliResult<SpinResult> {
    let budget = wheel.config().spin_duration_ms / FRAME_MS + FRAME_SLACK;
    for _ in 0..budget {
        clock.step(FRAME_MS);
        if let Some(result) = wheel.frame()? {
            return Ok(result);
        }
    }
    Err(CliError::Stalled(budget))
}

pub fn spin(session: &Session, count: u32, remove: bool, out: &mut dyn Write) -> CliResult<()> {
    let mut wheel = session.wheel()?;
    for _ in 0..count.max(1) {
        let started = wheel.spin()?;
        writeln!(
            out,
            "spin #{} ({}) over {} slices",
            started.spin_number, started.mode, started.batch_len
        )?;
        let result = run_to_completion(&mut wheel, session.clock())?;
        writeln!(
            out,
            "winner: {} [slice {}]",
            result.winning_entry.label(),
            result.slice_index
        )?;

        if remove {
            match wheel.remove_winner()? {
                RemovalOutcome::Removed { entry, .. } => writeln!(out, "removed {}", entry.label())?,
                RemovalOutcome::Refused(reason) => {
                    writeln!(out, "not removed: {}", reason)?;
                    wheel.dismiss()?;
                }
            }
        } else {
            wheel.dismiss()?;
        }
    }
    klog_info!("cli: {} entries left after spinning", wheel.pool().len());
    Ok(())
}

pub fn remove(session: &Session, name: Option<&str>, ticket: Option<&str>, out: &mut dyn Write) -> CliResult<()> {
    if name.is_none() && ticket.is_none() {
        return Err(CliError::Usage("give a name or --ticket".into()));
    }
    let mut wheel = session.wheel()?;
    match wheel.remove_entry(ticket, name.unwrap_or_default())? {
        RemovalOutcome::Removed { entry, .. } => {
            writeln!(out, "removed {} ({} left)", entry.label(), wheel.pool().len())?;
            Ok(())
        }
        RemovalOutcome::Refused(reason) => Err(WheelError::RemovalRefused(reason).into()),
    }
}

pub fn winners(session: &Session, json: bool, out: &mut dyn Write) -> CliResult<()> {
    let winners = session.state()?.winners()?;
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&winners).map_err(StoreError::from)?)?;
        return Ok(());
    }
    if winners.is_empty() {
        writeln!(out, "no winners yet")?;
        return Ok(());
    }
    for result in &winners {
        writeln!(
            out,
            "#{:<3} {}  slice {}  {}",
            result.spin_number,
            result.winning_entry.label(),
            result.slice_index,
            result.timestamp.format("%Y-%m-%d %H:%M:%S")
        )?;
    }
    Ok(())
}

pub fn reset(session: &Session, out: &mut dyn Write) -> CliResult<()> {
    let mut wheel = session.wheel()?;
    wheel.reset_all()?;
    writeln!(out, "wheel reset; next spin is #1")?;
    Ok(())
}

pub fn image(session: &Session, path: Option<&Path>, mime: Option<&str>, clear: bool, out: &mut dyn Write) -> CliResult<()> {
    let mut wheel = session.wheel()?;
    match (path, clear) {
        (_, true) => {
            wheel.set_center_image(None)?;
            writeln!(out, "center image cleared")?;
        }
        (Some(path), false) => {
            let uri = read_image(path, mime)?;
            writeln!(out, "center image set ({} bytes encoded)", uri.len())?;
            wheel.set_center_image(Some(uri))?;
        }
        (None, false) => return Err(CliError::Usage("give an image path or --clear".into())),
    }
    Ok(())
}
