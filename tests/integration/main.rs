//! Integration tests for the Quill server.

mod document_test;
mod helpers;
mod ws_test;
