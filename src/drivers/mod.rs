//! Input drivers with pure, host-testable logic.

pub mod switches;
