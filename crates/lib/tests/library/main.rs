mod common;
mod host_tests;
