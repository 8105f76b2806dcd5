extern crate getopts;
extern crate hafrecords;

use chrono::Utc;
use getopts::Options;
use std::env;
use std::process;
use self::hafrecords::db::{insert_result, load_course};
use self::hafrecords::gpx;
use self::hafrecords::{establish_connection, evaluate, logging, Config, HafError};

fn print_usage(program: &str, opts: Options) {
    let brief = format!("Usage: {} [options]", program);
    print!("{}", opts.usage(&brief));
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("r", "race", "race name", "RACE");
    opts.optopt("a", "athlete", "athlete name", "NAME");
    opts.optopt("g", "gpx", "GPX file", "FILE");
    opts.optflag("n", "dry-run", "evaluate the tracklog without storing it");
    opts.optflag("v", "verbose", "debug logging");
    opts.optflag("h", "help", "print this help menu");
    let matches = opts.parse(&args[1..])?;
    if matches.opt_present("h") {
        print_usage(&program, opts);
        return Ok(());
    }
    let file = match matches.opt_str("g") {
        Some(file) => file,
        None => {
            print_usage(&program, opts);
            return Ok(());
        }
    };
    let athlete = matches.opt_str("a").unwrap_or_default();

    logging::init(matches.opt_present("v"));
    let config = Config::from_env()?.with_race(matches.opt_str("r"));
    let mut db = establish_connection(&config)?;

    let course = load_course(&mut db, &config.race)?;
    let gpx_data = gpx::read_whole_file(&file)?;
    let track = gpx::parse_gpx(&gpx_data)?;

    let submitted_at = Utc::now();
    let result = match evaluate(&track, &course, &athlete, submitted_at) {
        Ok(result) => result,
        Err(HafError::Rejected(kind)) => {
            println!("Rejected ({}): {}", kind.code(), kind);
            process::exit(1);
        }
        Err(err) => return Err(err.into()),
    };

    println!(
        "{} {} - time up {} time down {} (finish at {})",
        result.athlete,
        result.date.format("%Y.%m.%d"),
        result.time_up,
        result.time_down,
        result.finish_coords
    );
    if matches.opt_present("n") {
        return Ok(());
    }

    match insert_result(&mut db, &config.race, &result, Some(&gpx_data)) {
        Ok(id) => println!("Created result with ID {}", id),
        Err(HafError::Rejected(kind)) => {
            println!("Rejected ({}): {}", kind.code(), kind);
            process::exit(1);
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}
