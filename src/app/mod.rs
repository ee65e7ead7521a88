pub mod shell;

pub use shell::{ShellCommand, HELP};
