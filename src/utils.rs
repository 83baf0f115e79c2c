/// `value.let_(f)` is `f(value)`, for keeping a pipeline left to right.
pub(crate) trait LetChain: Sized {
    #[inline]
    fn let_<F, R>(self, f: F) -> R
    where
        F: FnOnce(Self) -> R,
    {
        f(self)
    }
}
impl<T> LetChain for T {}

/// Runs `f` on the value for its side effect and hands the value on.
pub(crate) trait AlsoChain: Sized {
    #[inline]
    fn also_<F, R>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut Self) -> R,
    {
        f(&mut self);
        self
    }
}
impl<T> AlsoChain for T {}
