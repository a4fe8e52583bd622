//! Tests for the ringcache-engine crate.

mod helpers;
