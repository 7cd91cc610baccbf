//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]

use std::{
    fs::File,
    io::{self, BufWriter, Read, Write},
};

use clap::Parser;
use log::{error, info};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use bzstream::tools::cli::Args;
use bzstream::{BzEncoder, Result};

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() {
    let args = Args::parse();

    // Logs go to stderr so they never mix with a stream written to stdout.
    if TermLogger::init(args.log_level(), Config::default(), TerminalMode::Stderr, ColorChoice::Auto).is_err() {
        eprintln!("Unable to start the logger");
    }

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let opts = args.to_opts()?;

    let mut input = Vec::new();
    match &args.filename {
        Some(name) => {
            File::open(name)?.read_to_end(&mut input)?;
        }
        None => {
            io::stdin().lock().read_to_end(&mut input)?;
        }
    }
    info!("Read {} bytes", input.len());

    let sink: Box<dyn Write> = match &args.output {
        Some(name) => Box::new(BufWriter::new(File::create(name)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut encoder = BzEncoder::new(sink, &opts)?;
    encoder.write_all(&input)?;
    encoder.finish()?.flush()?;
    info!("Done.");
    Ok(())
}
