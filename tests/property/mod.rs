//! Property-based tests

mod replay_proptest;
