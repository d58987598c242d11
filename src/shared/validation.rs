use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for estimated service duration in `HH:MM` form
    /// - Valid: "01:30", "00:45", "12:00", "100:00"
    /// - Invalid: "1:30", "01:60", "0130", "01:3"
    pub static ref DURATION_REGEX: Regex = Regex::new(r"^\d{2,3}:[0-5]\d$").unwrap();
}
