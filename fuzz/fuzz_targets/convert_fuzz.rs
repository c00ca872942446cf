//! Conversion fuzz target: arbitrary text through parse, build and emit.
//! Every stage must return an error instead of panicking.
//! Build with: cargo fuzz run convert_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    let mut out = Vec::new();
    if dbcflip::convert(s, &dbcflip::ConvertOptions::default(), &mut out).is_ok() {
        assert!(String::from_utf8(out).is_ok());
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run convert_fuzz");
}
