// crates/types/src/lib.rs
pub mod job;
pub mod notification;
pub mod update;

pub use job::*;
pub use notification::*;
pub use update::*;
