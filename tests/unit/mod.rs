/// Unit tests for the public domain and engine API
mod basic_tests;
