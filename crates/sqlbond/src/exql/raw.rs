use super::fragment::Fragment;
use super::hash::ContentHasher;
use super::template::Template;

/// Literal SQL text, emitted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Raw {
    pub value: String,
}

impl Raw {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl Fragment for Raw {
    fn compile(&self, _template: &Template) -> String {
        self.value.clone()
    }

    fn hash_into(&self, hasher: &mut ContentHasher) {
        hasher.tag("raw").str(&self.value);
    }
}

impl From<&str> for Raw {
    fn from(value: &str) -> Self {
        Raw::new(value)
    }
}

impl From<String> for Raw {
    fn from(value: String) -> Self {
        Raw::new(value)
    }
}
