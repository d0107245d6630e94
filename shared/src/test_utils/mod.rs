//! Helpers shared by the test suites of every crate in the workspace.

pub mod dynamo_test_utils;
pub mod http_test_utils;
pub mod recording_store;
pub mod test_logging;
