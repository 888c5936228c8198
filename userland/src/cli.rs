use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "spinwheel")]
#[command(about = "Raffle spin wheel: upload entry lists, spin, keep a winner log")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, env = "SPINWHEEL_DATA_DIR")]
    #[arg(help = "Directory holding entry sets and wheel state")]
    pub data_dir: Option<PathBuf>,

    #[arg(long = "opt", global = true, value_name = "KEY=VALUE")]
    #[arg(help = "Config token, e.g. spin.duration=4000ms (repeatable)")]
    pub opts: Vec<String>,

    #[arg(long = "opts", global = true, env = "SPINWHEEL_OPTS", hide = true)]
    pub opts_line: Option<String>,

    #[arg(long, global = true)]
    #[arg(help = "RNG seed for reproducible spins")]
    pub seed: Option<u64>,

    #[arg(long, global = true, env = "SPINWHEEL_PASSWORD", hide_env_values = true)]
    #[arg(help = "Admin password")]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(about = "Upload a spreadsheet (.csv or .json) as a new entry set")]
    Upload {
        #[arg(help = "Spreadsheet file")]
        file: PathBuf,

        #[arg(long, help = "Set name (defaults to the file name)")]
        name: Option<String>,

        #[arg(long, help = "Center image file")]
        image: Option<PathBuf>,

        #[arg(long, help = "Image MIME type (sniffed when omitted)")]
        mime: Option<String>,

        #[arg(long, help = "Ticket that wins spin #1")]
        ticket: Option<String>,
    },

    #[command(about = "List entry sets, newest first")]
    List {
        #[arg(long, help = "Include inactive sets")]
        all: bool,

        #[arg(long, help = "Print JSON")]
        json: bool,
    },

    #[command(about = "Flip an entry set between active and inactive")]
    Toggle { id: u64 },

    #[command(about = "Delete an entry set")]
    Delete { id: u64 },

    #[command(about = "Pin a ticket to spin #1 of a set, or clear the pin")]
    Pin { id: u64, ticket: Option<String> },

    #[command(about = "Draw one random record from a set")]
    Draw { id: u64 },

    #[command(about = "Set the mode of one spin, or the default mode")]
    Mode {
        #[arg(help = "random, fixed, or none (default mode only)")]
        mode: String,

        #[arg(long, help = "Spin number; the default mode is set when omitted")]
        spin: Option<u32>,
    },

    #[command(about = "Designate the winner of a spin")]
    Designate {
        spin: u32,

        #[arg(help = "Entry name")]
        name: Option<String>,

        #[arg(long)]
        ticket: Option<String>,

        #[arg(long, help = "Remove the designation")]
        clear: bool,
    },

    #[command(about = "Spin the wheel")]
    Spin {
        #[arg(long, default_value_t = 1)]
        count: u32,

        #[arg(long, help = "Remove each winner from the wheel")]
        remove: bool,

        #[arg(long, help = "Animate in real time")]
        live: bool,
    },

    #[command(about = "Remove one entry by ticket or unique name")]
    Remove {
        name: Option<String>,

        #[arg(long)]
        ticket: Option<String>,
    },

    #[command(about = "Show the winner log")]
    Winners {
        #[arg(long, help = "Print JSON")]
        json: bool,
    },

    #[command(about = "Clear winners, designations, modes and removals")]
    Reset,

    #[command(about = "Change the admin password")]
    Passwd {
        #[arg(long)]
        old: String,

        #[arg(long)]
        new: String,
    },

    #[command(about = "Set or clear the wheel's center image")]
    Image {
        path: Option<PathBuf>,

        #[arg(long)]
        mime: Option<String>,

        #[arg(long)]
        clear: bool,
    },

    #[command(about = "Show the wheel")]
    View {
        #[arg(long, default_value_t = 24)]
        rows: usize,

        #[arg(long, help = "Also write the wheel face as a PPM image")]
        ppm: Option<PathBuf>,

        #[arg(long, default_value_t = 480)]
        size: u32,

        #[arg(long, help = "night, normal or light (saved)")]
        theme: Option<String>,

        #[arg(long)]
        shuffle: bool,

        #[arg(long)]
        sort: bool,

        #[arg(long)]
        no_colors: bool,
    },
}

impl Command {
    /// Commands that change entry sets or the outcome of future spins.
    pub fn needs_admin(&self) -> bool {
        matches!(
            self,
            Command::Upload { .. }
                | Command::Toggle { .. }
                | Command::Delete { .. }
                | Command::Pin { .. }
                | Command::Mode { .. }
                | Command::Designate { .. }
                | Command::Reset
                | Command::Image { .. }
        )
    }
}
