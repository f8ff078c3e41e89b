use std::error::Error;
use std::fmt;

/// A formula the math engine could not typeset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathError {
    pub source: String,
    pub message: String,
}

impl MathError {
    pub fn new(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for MathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot render formula `{}`: {}", self.source, self.message)
    }
}

impl Error for MathError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    Math(MathError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Math(err) => write!(f, "math rendering failed: {}", err),
        }
    }
}

impl Error for RenderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RenderError::Math(err) => Some(err),
        }
    }
}

impl From<MathError> for RenderError {
    fn from(err: MathError) -> Self {
        RenderError::Math(err)
    }
}
