//! Process lifecycle: turning OS signals into a run loop stop

mod shutdown;

pub use shutdown::ShutdownSignal;
