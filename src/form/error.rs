//! Configuration errors raised while building a stacked form.

use thiserror::Error;

/// Errors that make a stacked form impossible to set up.
///
/// These are host programming errors. [`StackedForm::setup`](super::StackedForm::setup)
/// turns them into a panic; [`StackedForm::try_setup`](super::StackedForm::try_setup)
/// hands them back for hosts that want to report them themselves.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("ensure that the data source has been set before calling setup")]
    MissingDataSource,

    #[error("the number of steps in the form cannot be lesser than {min} (got {count})")]
    TooFewSteps { count: usize, min: usize },

    #[error("the number of steps in the form cannot be greater than {max} (got {count})")]
    TooManySteps { count: usize, max: usize },
}
