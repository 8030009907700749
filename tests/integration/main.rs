//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host (x86_64) with no
//! real hardware required.

mod boot_tests;
mod mock_link;
mod periodic_sync_tests;
mod session_flow_tests;
mod write_handling_tests;
