//! Inbound message pipeline.
//!
//! Every validated webhook message flows through:
//! 1. `GreetingTracker::should_greet()` — first contact gets the welcome sequence
//! 2. `ResponseRules::evaluate()` — ordered keyword rules pick a topic
//! 3. `Responder::respond()` — topic → canned reply (or the default prompt)
//! 4. `MessageProcessor` — sends everything through a `MessageSender`

pub mod greeting;
pub mod processor;
pub mod responder;
pub mod rules;
pub mod types;

pub use greeting::GreetingTracker;
pub use processor::{MessageProcessor, ProcessOutcome};
pub use responder::{Reply, Responder};
pub use rules::{ResponseRules, Topic};
pub use types::InboundMessage;
