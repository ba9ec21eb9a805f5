//! Plain data types shared by the queue, the dispatcher and the delivery state.

pub mod delivery;
pub mod order;

pub use delivery::*;
pub use order::*;
