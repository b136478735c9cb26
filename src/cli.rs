use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "img-squeeze-session",
    about = "Compress a single JPEG/PNG image and compare before/after sizes",
    long_about = "img-squeeze-session keeps one image at a time, compresses it at a chosen quality \
                  (longest side capped at 1920px, output capped at 10MB), reports the savings and \
                  saves the result next to a `_compressed` name. Use `compress` for a one-shot run \
                  or `interactive` to drive a session from stdin.",
    version = "0.1.0",
    after_help = "EXAMPLES:\n  \
    img-squeeze-session compress photo.png -q 70\n  \
    img-squeeze-session compress photo.jpg -o ./out\n  \
    img-squeeze-session interactive -o ./out"
)]
pub struct Args {
    #[arg(short = 'Q', long, global = true, help = "Only print errors")]
    pub quiet: bool,

    #[arg(short = 'v', long, global = true, help = "Print per-step details")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SessionArgs {
    #[arg(
        short = 'q',
        long,
        value_parser = clap::value_parser!(u8).range(0..=100),
        help = "Compression quality (0-100, default: 80)"
    )]
    pub quality: Option<u8>,

    #[arg(
        short = 'o',
        long,
        help = "Directory compressed images are saved to",
        long_help = "Directory compressed images are saved to. Created if missing. \
                     Defaults to the input's directory for `compress` and the current \
                     directory for `interactive`."
    )]
    pub output: Option<PathBuf>,

    #[arg(
        short = 'j',
        long,
        help = "Number of threads for image encoding (default: auto)"
    )]
    pub threads: Option<usize>,

    #[arg(
        long,
        help = "Compress on the calling task instead of the blocking pool"
    )]
    pub no_worker: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Compress one image and save it",
        long_about = "Submit one JPEG/PNG image, compress it at the given quality and save \
                      the result as <name>_compressed.<ext>."
    )]
    Compress {
        #[arg(help = "Input image file path (JPEG or PNG)")]
        input: PathBuf,

        #[command(flatten)]
        session: SessionArgs,
    },

    #[command(
        about = "Drive a compression session from stdin",
        long_about = "Read commands from stdin, one per line: open <path>, quality <0-100>, \
                      commit, download, status, reset, help, quit."
    )]
    Interactive {
        #[command(flatten)]
        session: SessionArgs,
    },
}
