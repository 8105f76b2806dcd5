extern crate hafrecords;
use self::hafrecords::db::empty_db;
use self::hafrecords::{establish_connection, logging, Config};

fn main() -> anyhow::Result<()> {
    logging::init(false);
    let config = Config::from_env()?;
    let mut db = establish_connection(&config)?;
    empty_db(&mut db)?;
    Ok(())
}
