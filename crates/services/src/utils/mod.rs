//! Presentation helpers shared by the HTTP layer and any UI built on top.

pub mod dates;
pub mod text;
