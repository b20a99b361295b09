//! Dispatch core test suites.

mod http_tests;
mod message_flow_tests;
mod worker_tests;
