pub mod clock;
pub mod gravity;
pub mod physics;
pub mod time;
pub mod timers;
