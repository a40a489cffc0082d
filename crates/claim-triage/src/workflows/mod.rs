pub mod markers;
pub mod stages;
pub mod statements;
pub mod status;
