//! Output formatting for CLI commands

mod printer;
mod progress;
mod terse;

pub use printer::{print_info, print_key_value, print_success, print_warning, use_color};
pub use progress::TerminalProgress;
pub use terse::{management_group_kind, render_yaml, terse_line};
