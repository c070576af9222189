extern crate clap;
#[macro_use] extern crate log;
extern crate fern;
extern crate chrono;
extern crate krisp;
extern crate snafu;
extern crate term_grid;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use snafu::ResultExt;
use term_grid::{Cell, Direction, Filling, Grid, GridOptions};

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use krisp::compiler::error::WriteOutputSnafu;
use krisp::compiler::scanner::Scanner;
use krisp::compiler::sink::{AsmSink, Listing, WriterSink};
use krisp::{compiler, simulator, source, toolchain, CompileResult};

fn main() {
    let args = process_arguments();
    let verbosity = match args.subcommand() {
        (_, Some(sub)) => sub.occurrences_of("verbose").max(args.occurrences_of("verbose")),
        _ => args.occurrences_of("verbose"),
    };
    initialize_logging(verbosity);

    let result = match args.subcommand() {
        ("sim", Some(sub)) => simulation_mode(sub),
        ("comp", Some(sub)) => compilation_mode(sub),
        // clap rejects anything else before we get here.
        _ => Ok(()),
    };

    if let Err(err) = result {
        error!("fatal: {}", err);
        std::process::exit(1);
    }
}

fn max_size(args: &ArgMatches) -> usize {
    match args.value_of("max-size").map(str::parse::<usize>) {
        Some(Ok(limit)) => limit,
        Some(Err(err)) => {
            error!("fatal: invalid --max-size: {}", err);
            std::process::exit(1);
        }
        None => source::DEFAULT_MAX_SOURCE_LEN,
    }
}

fn simulation_mode(args: &ArgMatches) -> CompileResult<()> {
    let ipath = Path::new(args.value_of("INPUT").unwrap_or_default());
    let src = source::read_source(ipath, max_size(args))?;

    let sim = simulator::simulate(&src);
    println!("{}:{}", sim.text, sim.len);
    println!("Returning with value {}", sim.value);
    Ok(())
}

fn compilation_mode(args: &ArgMatches) -> CompileResult<()> {
    let ipath = Path::new(args.value_of("INPUT").unwrap_or_default());
    let opath = Path::new(args.value_of("output").unwrap_or("output.asm"));

    debug!("Arguments:\n\tInfile: {}\n\tOutfile: {}\n\tAssembly only: {}\n\tPrint tokens: {}\n\tPrint debug: {}",
        ipath.display(),
        opath.display(),
        args.is_present("assembly-only"),
        args.is_present("tokens"),
        args.is_present("print-debug"),
    );

    let src = source::read_source(ipath, max_size(args))?;

    if args.is_present("tokens") {
        print_tokens(&src);
    }

    // Compile into memory first so a bad program never leaves a partial file behind.
    let mut out = Listing::new();
    let core = compiler::compile(&src, &mut out)?;

    if args.is_present("print-debug") {
        print_listing(&core);
    }

    write_assembly(opath, out)?;
    info!("wrote `{}`", opath.display());

    if args.is_present("assembly-only") {
        return Ok(());
    }

    let artifacts = toolchain::Artifacts::for_assembly(opath);
    toolchain::Toolchain::default().build(&artifacts)
}

fn write_assembly(opath: &Path, listing: Listing) -> CompileResult<()> {
    let file = File::create(opath).context(WriteOutputSnafu { path: opath })?;
    let mut sink = WriterSink::new(BufWriter::new(file));
    for line in listing.lines() {
        sink.emit(line).context(WriteOutputSnafu { path: opath })?;
    }
    sink.into_inner().flush().context(WriteOutputSnafu { path: opath })
}

fn print_listing(core: &Listing) {
    let mut grid = Grid::new(GridOptions {
        filling:     Filling::Spaces(1),
        direction:   Direction::LeftToRight,
    });

    for (idx, line) in core.lines().iter().enumerate() {
        grid.add(Cell::from(format!("0x{:04X}:", idx)));
        grid.add(Cell::from(line.trim().to_string()));
    }

    println!("{}", grid.fit_into_columns(2));
}

fn print_tokens(src: &[u8]) {
    let mut grid = Grid::new(GridOptions {
        filling:     Filling::Spaces(1),
        direction:   Direction::LeftToRight,
    });

    for tok in Scanner::new(src) {
        grid.add(Cell::from(format!("{}..{}", tok.span.start, tok.span.end)));
        grid.add(Cell::from(format!("{:?}", tok.kind)));
        grid.add(Cell::from(tok.text(src).to_string()));
    }

    println!("{}", grid.fit_into_columns(3));
}

fn process_arguments() -> ArgMatches<'static> {
    let input = Arg::with_name("INPUT")
        .help("Sets the input file to use")
        .required(true)
        .multiple(false)
        .index(1);

    let limit = Arg::with_name("max-size")
        .long("max-size")
        .takes_value(true)
        .value_name("BYTES")
        .help("rejects input files larger than BYTES (default 4095)");

    App::new(option_env!("CARGO_PKG_NAME").unwrap_or("krisp"))
        .version(option_env!("CARGO_PKG_VERSION").unwrap_or("0.0.0"))
        .author(option_env!("CARGO_PKG_AUTHORS").unwrap_or(""))
        .about(option_env!("CARGO_PKG_DESCRIPTION").unwrap_or(""))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .takes_value(false)
            .global(true)
            .help("Sets the level of verbosity"))
        .subcommand(SubCommand::with_name("sim")
            .about("simulate the source file")
            .arg(input.clone())
            .arg(limit.clone()))
        .subcommand(SubCommand::with_name("comp")
            .about("compile the source file")
            .arg(input)
            .arg(limit)
            .arg(Arg::with_name("output")
                .short("o")
                .takes_value(true)
                .help("write assembly to this file (default output.asm)"))
            .arg(Arg::with_name("assembly-only")
                .short("S")
                .takes_value(false)
                .help("stop after writing assembly; do not run nasm or ld"))
            .arg(Arg::with_name("tokens")
                .short("t")
                .long("tokens")
                .takes_value(false)
                .help("prints the scanned tokens to STDOUT"))
            .arg(Arg::with_name("print-debug")
                .short("d")
                .alias("show")
                .takes_value(false)
                .help("prints the emitted instructions to STDOUT")))
        .get_matches()
}

fn initialize_logging(verbosity: u64) {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(match verbosity {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Warn,
            2 => log::LevelFilter::Info,
            3 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .chain(std::io::stderr())
        .apply().ok();
}
