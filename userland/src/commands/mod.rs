//! Command dispatch. Output goes to the writer passed in, so commands can
//! be driven from tests.

mod play;
mod sets;
mod view;

use std::io::Write;

use spinwheel_lib::klog_debug;

use crate::cli::{Cli, Command};
use crate::error::CliResult;
use crate::session::{Session, build_config};

pub fn run(cli: &Cli, out: &mut dyn Write) -> CliResult<()> {
    let live = matches!(cli.command, Command::Spin { live: true, .. });
    let session = Session::open(build_config(cli), live)?;
    klog_debug!("cli: {:?} in {}", cli.command, session.store.root().display());

    if cli.command.needs_admin() {
        session.authorize(cli.password.as_deref())?;
    }

    match &cli.command {
        Command::Upload {
            file,
            name,
            image,
            mime,
            ticket,
        } => sets::upload(
            &session,
            sets::UploadArgs {
                file,
                name: name.as_deref(),
                image: image.as_deref(),
                mime: mime.as_deref(),
                ticket: ticket.as_deref(),
            },
            out,
        ),
        Command::List { all, json } => sets::list(&session, *all, *json, out),
        Command::Toggle { id } => sets::toggle(&session, *id, out),
        Command::Delete { id } => sets::delete(&session, *id, out),
        Command::Pin { id, ticket } => sets::pin(&session, *id, ticket.as_deref(), out),
        Command::Draw { id } => sets::draw(&session, *id, out),
        Command::Passwd { old, new } => sets::passwd(&session, old, new, out),
        Command::Mode { mode, spin } => play::mode(&session, mode, *spin, out),
        Command::Designate {
            spin,
            name,
            ticket,
            clear,
        } => play::designate(&session, *spin, name.as_deref(), ticket.as_deref(), *clear, out),
        Command::Spin { count, remove, .. } => play::spin(&session, *count, *remove, out),
        Command::Remove { name, ticket } => play::remove(&session, name.as_deref(), ticket.as_deref(), out),
        Command::Winners { json } => play::winners(&session, *json, out),
        Command::Reset => play::reset(&session, out),
        Command::Image { path, mime, clear } => play::image(&session, path.as_deref(), mime.as_deref(), *clear, out),
        Command::View {
            rows,
            ppm,
            size,
            theme,
            shuffle,
            sort,
            no_colors,
        } => view::view(
            &session,
            view::ViewArgs {
                rows: *rows,
                ppm: ppm.as_deref(),
                size: *size,
                theme: theme.as_deref(),
                shuffle: *shuffle,
                sort: *sort,
                colors: !*no_colors,
            },
            out,
        ),
    }
}
