// tinyclj-core - Runtime configuration
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Limits for a [`Runtime`](crate::Runtime).
//!
//! Defaults can be overridden from the environment:
//!
//! | variable                 | field            |
//! |--------------------------|------------------|
//! | `TINYCLJ_MAX_OBJECTS`    | `max_objects`    |
//! | `TINYCLJ_MAX_READ_DEPTH` | `max_read_depth` |
//! | `TINYCLJ_MAX_EVAL_DEPTH` | `max_eval_depth` |

use tinyclj_parser::reader::DEFAULT_MAX_READ_DEPTH;
use tinyclj_parser::{HeapConfig, ReaderConfig};

/// Maximum recursion depth for eval.
pub const DEFAULT_MAX_EVAL_DEPTH: usize = 10_000;

pub const ENV_MAX_OBJECTS: &str = "TINYCLJ_MAX_OBJECTS";
pub const ENV_MAX_READ_DEPTH: &str = "TINYCLJ_MAX_READ_DEPTH";
pub const ENV_MAX_EVAL_DEPTH: &str = "TINYCLJ_MAX_EVAL_DEPTH";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Live heap objects allowed at once; `None` is unbounded.
    pub max_objects: Option<usize>,
    /// Open collections and quotes allowed while reading.
    pub max_read_depth: usize,
    /// Nested evaluations allowed.
    pub max_eval_depth: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            max_objects: None,
            max_read_depth: DEFAULT_MAX_READ_DEPTH,
            max_eval_depth: DEFAULT_MAX_EVAL_DEPTH,
        }
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_objects(mut self, max: usize) -> Self {
        self.max_objects = Some(max);
        self
    }

    #[must_use]
    pub fn with_max_read_depth(mut self, depth: usize) -> Self {
        self.max_read_depth = depth;
        self
    }

    #[must_use]
    pub fn with_max_eval_depth(mut self, depth: usize) -> Self {
        self.max_eval_depth = depth;
        self
    }

    /// Defaults overridden by the `TINYCLJ_*` environment variables.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(n) = parse_limit(&lookup, ENV_MAX_OBJECTS) {
            config.max_objects = Some(n);
        }
        if let Some(n) = parse_limit(&lookup, ENV_MAX_READ_DEPTH) {
            config.max_read_depth = n;
        }
        if let Some(n) = parse_limit(&lookup, ENV_MAX_EVAL_DEPTH) {
            config.max_eval_depth = n;
        }
        config
    }

    pub fn heap_config(&self) -> HeapConfig {
        HeapConfig {
            max_objects: self.max_objects,
        }
    }

    pub fn reader_config(&self) -> ReaderConfig {
        ReaderConfig {
            max_depth: self.max_read_depth,
        }
    }
}

fn parse_limit(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<usize> {
    let raw = lookup(key)?;
    match raw.trim().parse::<usize>() {
        Ok(n) => Some(n),
        Err(_) => {
            log::warn!("ignoring {key}: expected a non-negative integer, got '{raw}'");
            None
        }
    }
}
