//! Foundation types shared by every stage of the nanoc pipeline.
//!
//! `nanoc-util` has no knowledge of the toy language's grammar or IR; it
//! only provides the one thing every stage needs: byte-offset spans into
//! the original source buffer.

mod span;

pub use span::Span;
