use super::hash::{ContentHash, ContentHasher};
use super::template::Template;
use std::fmt;
use std::sync::Arc;

/// A piece of a SQL statement that renders itself for a dialect and hashes
/// its own content.
///
/// The hash must depend only on what the fragment means, never on the
/// template it is later compiled with.
pub trait Fragment: fmt::Debug + Send + Sync {
    /// Render this fragment with the dialect's settings.
    fn compile(&self, template: &Template) -> String;

    /// Feed this fragment's content into `hasher`.
    ///
    /// Implementations start with a [`ContentHasher::tag`] naming the
    /// fragment kind.
    fn hash_into(&self, hasher: &mut ContentHasher);

    fn hash(&self) -> ContentHash {
        let mut hasher = ContentHasher::new();
        self.hash_into(&mut hasher);
        hasher.finish()
    }
}

impl<F: Fragment + ?Sized> Fragment for Box<F> {
    fn compile(&self, template: &Template) -> String {
        (**self).compile(template)
    }

    fn hash_into(&self, hasher: &mut ContentHasher) {
        (**self).hash_into(hasher)
    }
}

impl<F: Fragment + ?Sized> Fragment for Arc<F> {
    fn compile(&self, template: &Template) -> String {
        (**self).compile(template)
    }

    fn hash_into(&self, hasher: &mut ContentHasher) {
        (**self).hash_into(hasher)
    }
}

/// Compile an optional fragment; absent fragments render as "".
pub(crate) fn compile_opt(fragment: Option<&dyn Fragment>, template: &Template) -> String {
    fragment.map(|f| f.compile(template)).unwrap_or_default()
}

/// Hash an optional fragment slot.
pub(crate) fn hash_opt(fragment: Option<&dyn Fragment>, hasher: &mut ContentHasher) {
    match fragment {
        Some(f) => {
            hasher.child(&f.hash());
        }
        None => {
            hasher.absent();
        }
    }
}
