//! Property-test run profile read from the environment.
//!
//! Suites pass their own default case count; CI raises or lowers it for
//! every suite at once through `PROPTEST_CASES`, and can isolate each case
//! in a child process through `TERTULIA_PBT_FORK`.

use std::env;

/// Environment variable overriding the number of cases per property.
pub const PROPTEST_CASES_ENV_KEY: &str = "PROPTEST_CASES";
/// Environment variable enabling forked execution of property cases.
pub const TERTULIA_PBT_FORK_ENV_KEY: &str = "TERTULIA_PBT_FORK";

/// Case count and fork mode for one property suite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProptestRunProfile {
    cases: u32,
    fork: bool,
}

impl ProptestRunProfile {
    /// Reads overrides from the environment, keeping the defaults for
    /// variables that are unset or unparsable.
    ///
    /// # Examples
    ///
    /// ```
    /// use tertulia_test_support::ci::property_test_profile::ProptestRunProfile;
    ///
    /// let profile = ProptestRunProfile::load(64, false);
    /// assert!(profile.cases() > 0);
    /// ```
    #[must_use]
    pub fn load(default_cases: u32, default_fork: bool) -> Self {
        Self {
            cases: override_from_env(PROPTEST_CASES_ENV_KEY, parse_cases).unwrap_or(default_cases),
            fork: override_from_env(TERTULIA_PBT_FORK_ENV_KEY, parse_switch)
                .unwrap_or(default_fork),
        }
    }

    /// Number of cases to run per property.
    #[must_use]
    pub fn cases(&self) -> u32 {
        self.cases
    }

    /// Whether each case runs in a forked child process.
    #[must_use]
    pub fn fork(&self) -> bool {
        self.fork
    }
}

fn override_from_env<T>(key: &'static str, parse: fn(&str) -> Option<T>) -> Option<T> {
    let raw = env::var(key).ok()?;
    let parsed = parse(raw.trim());
    if parsed.is_none() {
        tracing::warn!(env = key, raw = %raw, "ignoring invalid property-test override");
    }
    parsed
}

fn parse_cases(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok().filter(|cases| *cases > 0)
}

fn parse_switch(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use rstest::rstest;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Sets or clears a variable for the guard's lifetime.
    struct EnvGuard {
        key: &'static str,
        original: Option<String>,
    }

    impl EnvGuard {
        fn new(key: &'static str, value: Option<&str>) -> Self {
            let original = env::var(key).ok();
            apply(key, value);
            Self { key, original }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            apply(self.key, self.original.as_deref());
        }
    }

    fn apply(key: &str, value: Option<&str>) {
        match value {
            // SAFETY: tests serialize environment access with ENV_LOCK.
            Some(value) => unsafe { env::set_var(key, value) },
            // SAFETY: tests serialize environment access with ENV_LOCK.
            None => unsafe { env::remove_var(key) },
        }
    }

    fn load_with(cases: Option<&str>, fork: Option<&str>, default_fork: bool) -> ProptestRunProfile {
        let _lock = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let _cases = EnvGuard::new(PROPTEST_CASES_ENV_KEY, cases);
        let _fork = EnvGuard::new(TERTULIA_PBT_FORK_ENV_KEY, fork);
        ProptestRunProfile::load(64, default_fork)
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let profile = load_with(None, None, false);
        assert_eq!(profile.cases(), 64);
        assert!(!profile.fork());
    }

    #[rstest]
    #[case("1", 1)]
    #[case(" 250 ", 250)]
    #[case("25000", 25_000)]
    #[case("0", 64)]
    #[case("-1", 64)]
    #[case("many", 64)]
    fn case_overrides_must_be_positive_integers(#[case] raw: &str, #[case] expected: u32) {
        assert_eq!(load_with(Some(raw), None, false).cases(), expected);
    }

    #[rstest]
    #[case("true", false, true)]
    #[case("ON", false, true)]
    #[case("1", false, true)]
    #[case("no", true, false)]
    #[case("off", true, false)]
    #[case("maybe", true, true)]
    #[case("", false, false)]
    fn fork_overrides_accept_common_switch_spellings(
        #[case] raw: &str,
        #[case] default_fork: bool,
        #[case] expected: bool,
    ) {
        assert_eq!(load_with(None, Some(raw), default_fork).fork(), expected);
    }
}
