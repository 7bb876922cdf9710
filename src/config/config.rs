/// Switches for one [`Front`](crate::driver::driver::Front) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontOptions {
    /// Prepend the `stdlib` module and make it visible everywhere
    pub with_stdlib: bool,
    /// Report narrowing and sign-changing implicit conversions
    pub warn_on_implicit_conversions: bool,
}

impl Default for FrontOptions {
    fn default() -> Self {
        FrontOptions {
            with_stdlib: true,
            warn_on_implicit_conversions: true,
        }
    }
}

impl FrontOptions {
    pub fn without_stdlib(mut self) -> Self {
        self.with_stdlib = false;
        self
    }

    pub fn without_warnings(mut self) -> Self {
        self.warn_on_implicit_conversions = false;
        self
    }
}
