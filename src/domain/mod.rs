pub mod checkpoint;
pub mod digest;
pub mod message;
pub mod ticket;
