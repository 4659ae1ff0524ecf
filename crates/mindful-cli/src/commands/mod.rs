pub mod data;
pub mod guides;
pub mod history;
pub mod presets;
pub mod session;
pub mod settings;
pub mod stats;
pub mod videos;

use serde::Serialize;

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
