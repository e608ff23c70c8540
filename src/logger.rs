use log::{Record, Metadata};
use chrono::Utc;

pub struct Logger;

impl log::Log for Logger {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!("{} [{}] {} - {}",
                Utc::now().format("%Y-%m-%d %H:%M:%S"),
                record.target(), record.level(), record.args());
        }
    }

    fn flush(&self) {}
}
