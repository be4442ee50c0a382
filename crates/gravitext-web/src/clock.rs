use gravitext::Clock;

/// Today's UTC date from the JS `Date` object.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsClock;

impl Clock for JsClock {
    fn today(&self) -> String {
        let iso = String::from(js_sys::Date::new_0().to_iso_string());
        // "2024-05-01T12:34:56.789Z"
        iso.get(..10).unwrap_or(&iso).to_string()
    }
}

/// Milliseconds since the epoch, used to seed the RNG per page load.
pub fn now_seed() -> u64 {
    js_sys::Date::now() as u64
}
