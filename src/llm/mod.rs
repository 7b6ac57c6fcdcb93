pub mod provider;
pub mod providers;
pub mod tool_parser;
pub mod tools;
pub mod types;
