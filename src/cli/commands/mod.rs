mod init;
mod reset;
mod seed;

pub use init::cmd_init;
pub use reset::cmd_reset;
pub use seed::{DEMO_EMAIL, cmd_seed};
