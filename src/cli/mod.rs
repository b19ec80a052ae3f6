mod interactive;
mod root;
mod run;

pub use root::Cli;
