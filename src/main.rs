// vim: set ai et ts=4 sts=4 sw=4:
#![allow(dead_code)]
use std::io;
use std::process::exit;
use std::sync::Arc;
use clap::{App, Arg};
use fern;
use log::{self, debug};

mod config;
mod grid;
mod line;
mod net;
mod puzzle;
mod slice;
mod solver;
mod task_queue;
mod util;

use self::config::Config;
use self::puzzle::run_solver;
use self::task_queue::TaskQueue;
use self::util::is_a_tty;

#[derive(Debug)]
pub struct Args {
    verbosity: u64,
    config_file: String,
    puzzle_files: Vec<String>,
    print: bool,
    emit_color: bool,
    threads: usize,
}

fn build_app<'a, 'b>() -> App<'a, 'b> {
    App::new("nonogram")
        .arg(Arg::with_name("config")
                  .help("JSON file with the solver configuration")
                  .long("config")
                  .takes_value(true))
        .arg(Arg::with_name("file")
                  .help("puzzle files (JSON) to solve")
                  .short("f")
                  .long("file")
                  .takes_value(true)
                  .multiple(true))
        .arg(Arg::with_name("files")
                  .help("puzzle files (JSON) to solve")
                  .multiple(true)
                  .index(1))
        .arg(Arg::with_name("print")
                  .help("print each solved grid below its result line")
                  .short("p")
                  .long("print"))
        .arg(Arg::with_name("color")
                  .help("whether to output ANSI color escape sequences")
                  .long("color")
                  .possible_values(&["yes", "no", "auto"])
                  .default_value("auto"))
        .arg(Arg::with_name("threads")
                  .help("number of solver worker threads")
                  .short("j")
                  .long("threads")
                  .takes_value(true)
                  .default_value("20"))
        .arg(Arg::with_name("verbose")
                  .help("Increases logging verbosity each use for up to 3 times")
                  .short("v")
                  .long("verbose")
                  .multiple(true))
}

fn main() {
    let matches = build_app().get_matches();

    let mut puzzle_files = Vec::<String>::new();
    if let Some(values) = matches.values_of("file") {
        puzzle_files.extend(values.map(String::from));
    }
    if let Some(values) = matches.values_of("files") {
        puzzle_files.extend(values.map(String::from));
    }

    let config_file = matches.value_of("config");
    if config_file.is_none() || puzzle_files.is_empty() {
        let _ = build_app().print_help();
        println!();
        exit(0);
    }

    let args = Args {
        verbosity: matches.occurrences_of("verbose"),
        config_file: config_file.unwrap().to_string(),
        puzzle_files,
        print: matches.is_present("print"),
        emit_color: match matches.value_of("color") {
            Some("yes") => true,
            Some("no")  => false,
            _ => is_a_tty(io::stdout()),
        },
        threads: matches.value_of("threads")
                        .and_then(|x| x.parse::<usize>().ok())
                        .filter(|&n| n > 0)
                        .unwrap_or(20),
    };

    // results own stdout, so the log goes to stderr
    let mut log_config = fern::Dispatch::new()
                            .format(|out, msg, _record| {
                                out.finish(format_args!("{}", msg))
                            })
                            .chain(io::stderr());
    log_config = match args.verbosity {
        0 => log_config.level(log::LevelFilter::Info),
        1 => log_config.level(log::LevelFilter::Debug),
        _ => log_config.level(log::LevelFilter::Trace),
    };
    log_config.apply().unwrap();

    let config = match Config::load(&args.config_file) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            eprintln!("invalid configuration: {}", e);
            exit(1);
        }
    };

    debug!("solving {} puzzle(s) on {} worker(s)", args.puzzle_files.len(), args.threads);

    let queue = TaskQueue::new(args.threads);
    for file in &args.puzzle_files {
        let config = Arc::clone(&config);
        let file = file.clone();
        let (print, emit_color) = (args.print, args.emit_color);
        queue.add(move || run_solver(&file, &config, print, emit_color));
    }
    queue.close();

    while let Some(result) = queue.get_result() {
        println!("{}", result);
    }
}
