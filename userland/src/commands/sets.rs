//! Entry set administration.

use std::fs;
use std::io::Write;
use std::path::Path;

use spinwheel_abi::{EntrySetId, EntrySetSummary, NewEntrySet};
use spinwheel_drivers::{parse_upload, to_embeddable};
use spinwheel_fs::{SpinFileStore, check_upload_size, upload_name};
use spinwheel_lib::WheelRng;

use crate::error::CliResult;
use crate::session::Session;

pub struct UploadArgs<'a> {
    pub file: &'a Path,
    pub name: Option<&'a str>,
    pub image: Option<&'a Path>,
    pub mime: Option<&'a str>,
    pub ticket: Option<&'a str>,
}

/// Read an image file as a data URI.
pub fn read_image(path: &Path, mime: Option<&str>) -> CliResult<String> {
    let bytes = fs::read(path)?;
    check_upload_size(bytes.len())?;
    Ok(to_embeddable(&bytes, mime)?)
}

pub fn upload(session: &Session, args: UploadArgs<'_>, out: &mut dyn Write) -> CliResult<()> {
    let bytes = fs::read(args.file)?;
    check_upload_size(bytes.len())?;
    let source = args.file.to_string_lossy();
    let filename = upload_name(args.name, &source)?;
    let entries = parse_upload(&source, &bytes)?;
    let center_image = match args.image {
        Some(path) => Some(read_image(path, args.mime)?),
        None => None,
    };

    let set = session.store.create(NewEntrySet {
        filename,
        entries,
        center_image,
        pinned_ticket: args.ticket.map(str::to_string),
    })?;
    writeln!(
        out,
        "created set {} '{}' with {} records",
        set.id,
        set.filename,
        set.entries.len()
    )?;
    Ok(())
}

fn summary_line(s: &EntrySetSummary) -> String {
    let mut line = format!(
        "{:>4}  {:<8}  {:>6}  {}  {}",
        s.id,
        if s.active { "active" } else { "inactive" },
        s.record_count,
        s.created_at.format("%Y-%m-%d %H:%M"),
        s.filename
    );
    if let Some(ticket) = &s.pinned_ticket {
        line.push_str(&format!("  [pinned {}]", ticket));
    }
    line
}

pub fn list(session: &Session, all: bool, json: bool, out: &mut dyn Write) -> CliResult<()> {
    let summaries: Vec<EntrySetSummary> = session
        .store
        .list(!all)?
        .iter()
        .map(EntrySetSummary::from)
        .collect();
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&summaries).map_err(spinwheel_abi::StoreError::from)?)?;
        return Ok(());
    }
    if summaries.is_empty() {
        writeln!(out, "no entry sets")?;
        return Ok(());
    }
    for summary in &summaries {
        writeln!(out, "{}", summary_line(summary))?;
    }
    Ok(())
}

pub fn toggle(session: &Session, id: u64, out: &mut dyn Write) -> CliResult<()> {
    let active = session.store.toggle_active(EntrySetId(id))?;
    writeln!(out, "set {} is now {}", id, if active { "active" } else { "inactive" })?;
    Ok(())
}

pub fn delete(session: &Session, id: u64, out: &mut dyn Write) -> CliResult<()> {
    session.store.delete(EntrySetId(id))?;
    writeln!(out, "deleted set {}", id)?;
    Ok(())
}

pub fn pin(session: &Session, id: u64, ticket: Option<&str>, out: &mut dyn Write) -> CliResult<()> {
    session.store.set_pinned_ticket(EntrySetId(id), ticket)?;
    match session.store.get(EntrySetId(id))?.pinned_ticket {
        Some(ticket) => writeln!(out, "set {}: ticket {} wins spin #1", id, ticket)?,
        None => writeln!(out, "set {}: no pinned ticket", id)?,
    }
    Ok(())
}

pub fn draw(session: &Session, id: u64, out: &mut dyn Write) -> CliResult<()> {
    let mut rng = WheelRng::from_option(session.config.seed);
    let (index, record) = session.store.draw(EntrySetId(id), &mut rng)?;
    let entry = spinwheel_core::normalize_record(&record, index);
    writeln!(out, "drew record {}: {}", index + 1, entry.label())?;
    Ok(())
}

pub fn passwd(session: &Session, old: &str, new: &str, out: &mut dyn Write) -> CliResult<()> {
    session.store.update_secret(old, new)?;
    writeln!(out, "password updated")?;
    Ok(())
}
