//! Shared test harness modules for the Stopover CLI.

use super::*;

mod helpers;
