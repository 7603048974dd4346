#![no_main]

use libfuzzer_sys::fuzz_target;
use tagjson_fuzz::{Input, check};

fuzz_target!(|input: Input| check(&input));
