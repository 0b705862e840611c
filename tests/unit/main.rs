//! Unit-level integration tests

mod codec_test;
mod directive_test;
