mod build;
mod info;
mod list;

pub use build::{BuildArgs, cmd_build};
pub use info::cmd_info;
pub use list::cmd_list;
