pub mod tool_args;
pub mod tool_catalog;
pub mod tool_dispatcher;
pub mod tool_error;

pub use tool_dispatcher::ToolDispatcher;
