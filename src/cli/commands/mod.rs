pub mod inputs;
pub mod replay;
