//! Front ends built on the service layer

pub mod cli;
