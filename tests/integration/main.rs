//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against a mock tally service.  All tests run on the host (x86_64)
//! with no real hardware required.

mod controller_tests;
mod dispatch_tests;
mod mock_tally;
mod provisioning_tests;
