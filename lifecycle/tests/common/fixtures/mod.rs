//! Reusable test utilities:
//! - A recording power platform with switchable privilege and hang behavior
//! - Modules that record, fail, panic, or flip power flags
//! - Service hooks with configurable address, payload and sleep time

// Not every test binary uses every fixture
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_modules;
pub mod mock_platform;
pub mod test_hooks;

pub use mock_modules::*;
pub use mock_platform::{MockPlatform, PlatformCall};
pub use test_hooks::TestHooks;
