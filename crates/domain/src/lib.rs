pub mod backup;
pub mod counters;
pub mod likes;
pub mod ports;
pub mod reconcile;
