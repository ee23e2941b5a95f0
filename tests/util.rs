//! Shared test utilities for integration tests
//!
//! Provides the fixture project used by the CLI tests.

#![allow(dead_code)]

use assert_fs::prelude::*;

/// Source file shared by the request and nearest tests
pub const LIB_RS: &str = "fn alpha() {}\n\nfn beta() {\n    let foo_bar = 1;\n}\n\nfn gamma() {}\n";

/// Create a project with a `.project-root` marker and a nested source file
pub fn make_project() -> assert_fs::TempDir
{
    // Initialize the temporary project root
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    // Marker the default configuration recognizes
    tmp.child(".project-root")
        .touch()
        .expect("marker");

    tmp.child("src/lib.rs")
        .write_str(LIB_RS)
        .expect("write lib.rs");

    // Byte offsets of alpha, beta and gamma in LIB_RS
    tmp.child("index.jsonl")
        .write_str(
            "{\"label\": \"Functions\", \"children\": [\
             {\"label\": \"alpha\", \"position\": 0}, \
             {\"label\": \"beta\", \"position\": 15}]}\n\
             {\"label\": \"gamma\", \"position\": 51}\n",
        )
        .expect("write index");

    tmp
}
