pub mod regex;
pub mod fight_parser;

pub use fight_parser::{parse_fight_data, ValidationError};
pub use regex::sanitize_name;
