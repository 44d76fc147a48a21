pub mod client;
pub mod formatter;
pub mod logging;
pub mod poller;
pub mod validator;

pub use client::{StatusClient, StatusSource};
pub use poller::{PollOutcome, ReviewPoller};
