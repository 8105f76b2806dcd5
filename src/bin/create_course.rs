extern crate getopts;
extern crate hafrecords;

use anyhow::{bail, Context};
use getopts::Options;
use std::env;
use self::hafrecords::db::store_course;
use self::hafrecords::{establish_connection, logging, Config, Course, GeoFence, Role};

fn print_usage(program: &str, opts: Options) {
    let brief = format!("Usage: {} [options]", program);
    print!("{}", opts.usage(&brief));
}

fn parse_cylinder(role: Role, arg: &str) -> anyhow::Result<GeoFence> {
    let parts: Vec<&str> = arg.split(',').map(|s| s.trim()).collect();
    if parts.len() != 3 {
        bail!("{} must be given as LAT,LON,RADIUS", role.cylinder_name());
    }
    let lat: f64 = parts[0].parse().context("bad latitude")?;
    let lon: f64 = parts[1].parse().context("bad longitude")?;
    let radius: f64 = parts[2].parse().context("bad radius")?;
    Ok(GeoFence::new(role, lat, lon, radius)?)
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("r", "race", "race name", "RACE");
    opts.optopt("s", "start", "start cylinder", "LAT,LON,RADIUS");
    opts.optopt("t", "turnpoint", "turnpoint cylinder", "LAT,LON,RADIUS");
    opts.optflag("v", "verbose", "debug logging");
    opts.optflag("h", "help", "print this help menu");
    let matches = opts.parse(&args[1..])?;
    if matches.opt_present("h") {
        print_usage(&program, opts);
        return Ok(());
    }
    let start = matches.opt_str("s");
    let turnpoint = matches.opt_str("t");

    let (start, turnpoint) = match (start, turnpoint) {
        (Some(s), Some(t)) => (s, t),
        _ => {
            print_usage(&program, opts);
            return Ok(());
        }
    };

    logging::init(matches.opt_present("v"));
    let config = Config::from_env()?.with_race(matches.opt_str("r"));

    let course = Course::new(
        &config.race,
        parse_cylinder(Role::Start, &start)?,
        parse_cylinder(Role::Turnpoint, &turnpoint)?,
    )?;

    let mut db = establish_connection(&config)?;
    store_course(&mut db, &course)?;

    println!("Created course {}", course.race);
    for fence in [&course.startcylinder, &course.turnpoint] {
        println!("  {}: ({}, {}) r={}m", fence.role, fence.lat, fence.lon, fence.radius);
    }
    Ok(())
}
