pub mod backoff;
pub mod shutdown;

pub use backoff::Backoff;
pub use shutdown::wait_for_shutdown;
