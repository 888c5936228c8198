use std::fs;
use std::io::Write;
use std::path::Path;

use spinwheel_abi::Theme;
use spinwheel_video::{Canvas, TextOptions, WheelLayout, WheelRenderer, render_text};

use crate::error::{CliError, CliResult};
use crate::session::Session;

const MIN_IMAGE_SIZE: u32 = 64;
const MAX_IMAGE_SIZE: u32 = 4096;

pub struct ViewArgs<'a> {
    pub rows: usize,
    pub ppm: Option<&'a Path>,
    pub size: u32,
    pub theme: Option<&'a str>,
    pub shuffle: bool,
    pub sort: bool,
    pub colors: bool,
}

pub fn view(session: &Session, args: ViewArgs<'_>, out: &mut dyn Write) -> CliResult<()> {
    let mut wheel = session.wheel()?;
    let mut state = session.state()?;

    let theme = match args.theme {
        Some(text) => {
            let theme = Theme::parse(text).ok_or_else(|| CliError::Usage(format!("unknown theme '{}'", text)))?;
            state.set_theme(theme)?;
            theme
        }
        None => state.theme()?,
    };
    if args.shuffle {
        wheel.shuffle_entries()?;
    } else if args.sort {
        wheel.sort_entries()?;
    }

    let next = wheel.spin_count()? + 1;
    let mode = state.mode_for_spin(next, session.config.default_mode)?;
    if let Some(name) = wheel.current_set_name() {
        writeln!(out, "set: {}", name)?;
    }
    writeln!(out, "pool: {} entries, next spin #{} ({})", wheel.pool().len(), next, mode)?;

    let frame = wheel.view();
    let text = render_text(
        &frame,
        &TextOptions {
            max_rows: args.rows,
            show_colors: args.colors,
        },
    );
    write!(out, "{}", text)?;

    if let Some(path) = args.ppm {
        let size = args.size.clamp(MIN_IMAGE_SIZE, MAX_IMAGE_SIZE);
        let mut canvas = Canvas::new(size, size);
        WheelRenderer::new(WheelLayout::fit(size, size), theme)
            .with_image_size(state.center_image_size()?)
            .render(&frame, &mut canvas);
        fs::write(path, canvas.to_ppm())?;
        writeln!(out, "wrote {}x{} {} image to {}", size, size, theme_name(theme), path.display())?;
    }
    Ok(())
}

fn theme_name(theme: Theme) -> &'static str {
    match theme {
        Theme::Night => "night",
        Theme::Normal => "normal",
        Theme::Light => "light",
    }
}
