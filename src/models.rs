//! The objects passed between the chat loop, the model gateway and the tools.
//!
//! They are converted to and from the remote wire format in `providers::utils`,
//! so they only carry what the loop itself needs plus a local id and timestamp.
pub mod message;
pub mod tool;
