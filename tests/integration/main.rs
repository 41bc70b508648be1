//! Integration test harness.

mod mock_source;
mod refresh;
