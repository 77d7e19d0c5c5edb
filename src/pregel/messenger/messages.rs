use core::iter::FusedIterator;

/// The messages delivered to one node for the current superstep.
#[derive(Debug, Clone)]
pub struct Messages<'a> {
    inner: Inner<'a>,
}

#[derive(Debug, Clone)]
enum Inner<'a> {
    Slice(core::slice::Iter<'a, f64>),
    Owned(std::vec::IntoIter<f64>),
    Single(Option<f64>),
}

impl<'a> Messages<'a> {
    /// No messages.
    pub fn empty() -> Self {
        Self {
            inner: Inner::Single(None),
        }
    }

    pub(crate) fn from_slice(messages: &'a [f64]) -> Self {
        Self {
            inner: Inner::Slice(messages.iter()),
        }
    }

    pub(crate) fn from_vec(messages: Vec<f64>) -> Self {
        Self {
            inner: Inner::Owned(messages.into_iter()),
        }
    }

    pub(crate) fn single(message: Option<f64>) -> Self {
        Self {
            inner: Inner::Single(message),
        }
    }

    /// Returns `true` if no messages remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Iterator for Messages<'_> {
    type Item = f64;

    #[inline]
    fn next(&mut self) -> Option<f64> {
        match &mut self.inner {
            Inner::Slice(it) => it.next().copied(),
            Inner::Owned(it) => it.next(),
            Inner::Single(m) => m.take(),
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = match &self.inner {
            Inner::Slice(it) => it.len(),
            Inner::Owned(it) => it.len(),
            Inner::Single(m) => usize::from(m.is_some()),
        };
        (n, Some(n))
    }
}

impl ExactSizeIterator for Messages<'_> {}

impl FusedIterator for Messages<'_> {}
