mod object;
pub mod pristine;
mod secrets;

pub use object::*;
pub use pristine::*;
pub use secrets::*;

use crate::errors::*;

err_impl! {ModelError,
    #[error("object has no apiVersion: {0}")]
    MissingApiVersion(String),

    #[error("object has no kind: {0}")]
    MissingKind(String),

    #[error("object has neither name nor generateName: {0}")]
    MissingName(String),

    #[error("unable to decode pristine annotation: {0}")]
    BadPristine(String),
}

#[cfg(test)]
mod tests;
