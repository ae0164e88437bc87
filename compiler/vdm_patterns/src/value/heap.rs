use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Shared, immutable heap storage for compound values.
///
/// The constructor is private to the value module: compound values are
/// built through the `Value` factory methods, which keep invariants such as
/// record field counts and map key uniqueness.
pub struct Heap<T: ?Sized>(Arc<T>);

impl<T> Heap<T> {
    #[inline]
    pub(super) fn new(value: T) -> Self {
        Heap(Arc::new(value))
    }
}

impl<T: ?Sized> Heap<T> {
    /// Identity comparison.
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }

    /// Address of the shared allocation, for identity ordering.
    #[inline]
    pub(crate) fn addr(this: &Self) -> usize {
        Arc::as_ptr(&this.0).cast::<()>() as usize
    }
}

impl<T: Clone> Heap<T> {
    /// Clone-on-write access to the contents.
    pub fn make_mut(this: &mut Self) -> &mut T {
        Arc::make_mut(&mut this.0)
    }

    /// Take the contents, cloning only if shared.
    pub fn into_inner(this: Self) -> T {
        Arc::try_unwrap(this.0).unwrap_or_else(|arc| (*arc).clone())
    }
}

impl<T: ?Sized> Clone for Heap<T> {
    #[inline]
    fn clone(&self) -> Self {
        Heap(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> Deref for Heap<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
