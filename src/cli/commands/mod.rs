mod check;
mod init;
mod run;

pub use check::{execute_check, routing_table};
pub use init::execute_init;
pub use run::{apply_overrides, execute_run};
