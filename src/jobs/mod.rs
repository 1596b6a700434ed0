// Jobs module - Scheduled background work

pub mod sweeps;
