use crate::Config;
use crate::error::{Error, Result};

/// The resource ceilings of a single parse.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Limits {
    max_length: Option<usize>,
    max_params: Option<usize>,
    max_depth: Option<usize>,
}

impl From<Config> for Limits {
    fn from(config: Config) -> Self {
        Limits {
            max_length: config.max_length,
            max_params: config.max_params,
            max_depth: config.max_depth,
        }
    }
}

impl Limits {
    /// Checks the raw byte length of the whole input.
    pub fn check_length(&self, actual: usize) -> Result<()> {
        match self.max_length {
            Some(limit) if actual > limit => Err(Error::InputTooLong { limit, actual }),
            _ => Ok(()),
        }
    }

    /// Checks the number of non-empty pairs, before any of them is decoded.
    pub fn check_params(&self, actual: usize) -> Result<()> {
        match self.max_params {
            Some(limit) if actual > limit => Err(Error::TooManyParameters { limit, actual }),
            _ => Ok(()),
        }
    }

    /// Checks the bracket depth of a tokenized key.
    ///
    /// `key` is only evaluated when the limit is exceeded.
    pub fn check_depth(&self, depth: usize, key: impl FnOnce() -> String) -> Result<()> {
        match self.max_depth {
            Some(limit) if depth > limit => Err(Error::DepthExceeded {
                key: key(),
                depth,
                limit,
            }),
            _ => Ok(()),
        }
    }
}
