mod content;
mod event;
mod request;
mod session;
mod text_utils;

pub use content::{CodeExecutionResult, Content, FunctionCall, FunctionResponse, Part};
pub use event::{Event, EventActions};
pub use request::RunAgentRequest;
pub use session::{Session, SessionSummary};
pub use text_utils::{
    copy_text, function_calls, function_responses, has_trailing_code_execution_result,
    message_text,
};
