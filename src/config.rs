use std::env;
use std::fmt::Display;
use std::str::FromStr;

/// Returns the value of the named environment variable, or `default`
/// if it isn't set.
pub fn get_variable_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_owned())
}

/// Parses the named environment variable, falling back to `default`
/// if it isn't set. Panics if it is set but malformed.
pub fn parse_variable_or<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(value) => value
            .parse()
            .unwrap_or_else(|e| panic!("parse {} from `{}`: {}", name, value, e)),
        Err(_) => default,
    }
}
