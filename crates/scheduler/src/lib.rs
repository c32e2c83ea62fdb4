pub mod scheduler;

pub use scheduler::IntervalScheduler;
