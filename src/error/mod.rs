//! Error handling for adk-chat.
//!
//! | Type | Raised by | Handling |
//! |------|-----------|----------|
//! | [`TransportError`] | HTTP client, stream consumer | stored in `ChatState::error`, no retry |
//! | [`ParseError`](crate::sse::ParseError) | event parser | logged and skipped inside the stream loop |
//! | [`PreconditionError`] | controller guards | returned, no request, no state change |
//! | [`PreferencesError`](crate::preferences::PreferencesError) | preferences store | logged, defaults used |
//!
//! [`ChatError`] unifies them with `category()`, `user_message()` and
//! `error_code()`.

mod category;
mod chat_error;
mod context;
mod precondition;
mod result;
mod transport;

pub use category::ErrorCategory;
pub use chat_error::ChatError;
pub use context::ErrorContext;
pub use precondition::PreconditionError;
pub use result::{ChatResult, ResultExt};
pub use transport::TransportError;
