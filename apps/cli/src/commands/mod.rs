//! 命令定义和实现

pub mod config;
pub mod exec;
pub mod goto;
pub mod output;
pub mod spin;

pub use config::ConfigCommand;
pub use exec::ExecCommand;
pub use goto::GotoCommand;
pub use output::OutputCommand;
pub use spin::SpinCommand;
