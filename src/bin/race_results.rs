extern crate getopts;
extern crate hafrecords;

use getopts::Options;
use std::env;
use self::hafrecords::db::leaderboard;
use self::hafrecords::{establish_connection, logging, Config};

fn print_usage(program: &str, opts: Options) {
    let brief = format!("Usage: {} [options]", program);
    print!("{}", opts.usage(&brief));
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("r", "race", "race name", "RACE");
    opts.optflag("h", "help", "print this help menu");
    let matches = opts.parse(&args[1..])?;
    if matches.opt_present("h") {
        print_usage(&program, opts);
        return Ok(());
    }

    logging::init(false);
    let config = Config::from_env()?.with_race(matches.opt_str("r"));
    let mut db = establish_connection(&config)?;

    let entries = leaderboard(&mut db, &config.race)?;
    println!("Results for {}:", config.race);
    for entry in entries {
        let r = &entry.record;
        println!(
            "{} - {} {} up {} down {}",
            entry.rank,
            r.athlete,
            r.date.format("%Y.%m.%d"),
            r.time_up,
            r.time_down
        );
    }
    Ok(())
}
