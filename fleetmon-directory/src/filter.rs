// SPDX-License-Identifier: MIT

use std::fmt;

/// Conjunction of attribute clauses in the directory's encoded-query
/// syntax: `field=value` and `fieldINa,b,c`, joined by `^`.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<String>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: &str) -> Self {
        self.clauses.push(format!("{}={}", field, value));
        self
    }

    pub fn is_in<I, S>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.clauses.push(format!("{}IN{}", field, joined));
        self
    }

    pub fn encode(&self) -> String {
        self.clauses.join("^")
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
