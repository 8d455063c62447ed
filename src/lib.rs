pub mod board;
pub mod cli;
pub mod cli_handlers;
pub mod db;
pub mod error;
pub mod logging;
pub mod projects;
pub mod server;
pub mod tasks;

#[cfg(test)]
pub mod test_utils;
