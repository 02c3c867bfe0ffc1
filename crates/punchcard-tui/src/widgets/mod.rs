mod card;
mod help;
mod status_bar;

pub use card::{card_lines, CardWidget};
pub use help::HelpWidget;
pub use status_bar::{status_text, StatusBarWidget};
