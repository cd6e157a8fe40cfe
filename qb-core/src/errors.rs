pub use anyhow::{
    anyhow,
    bail,
    ensure,
};
pub use paste::paste;
pub use thiserror::Error;

pub type EmptyResult = anyhow::Result<()>;

// This macro creates an enum which derives from thiserror::Error, and also
// creates constructor functions in snake case for each of the enum variants
#[macro_export]
macro_rules! err_impl {
    (@hidden $errtype:ident, $item:ident, String) => {
        paste! {
            pub(crate) fn [<$item:snake>](in_: &str) -> anyhow::Error {
                anyhow!{$errtype::$item(in_.into())}
            }
        }
    };

    (@hidden $errtype:ident, $item:ident, $($dtype:tt)::+) => {
        paste! {
            pub(crate) fn [<$item:snake>](in_: &$($dtype)::+) -> anyhow::Error {
                anyhow!{$errtype::$item(in_.clone())}
            }
        }
    };

    ($errtype:ident,
        $(#[$errinfo:meta] $item:ident($($dtype:tt)::+),)+
    ) => {
        #[derive(Debug, Error)]
        pub(crate) enum $errtype {
            $(#[$errinfo] $item($($dtype)::+)),+
        }

        impl $errtype {
            $(err_impl! {@hidden $errtype, $item, $($dtype)::+})+
        }
    };
}

pub use err_impl;

// Errors fall into two classes the CLI layer treats differently: usage
// errors (bad flags, conflicting filters, duplicate objects) print without
// their chain, everything else is a runtime error and prints in full.  The
// class markers ride along the anyhow chain so intermediate layers can wrap
// freely with context() without losing the classification.

#[derive(Debug, Error)]
#[error("{0}")]
pub struct UsageError(pub String);

#[derive(Debug, Error)]
#[error("canceled")]
pub struct Canceled;

pub fn usage_error(msg: impl Into<String>) -> anyhow::Error {
    anyhow!(UsageError(msg.into()))
}

pub fn canceled_error() -> anyhow::Error {
    anyhow!(Canceled)
}

pub fn is_usage_error(err: &anyhow::Error) -> bool {
    err.chain().any(|e| e.downcast_ref::<UsageError>().is_some())
}

pub fn is_canceled(err: &anyhow::Error) -> bool {
    err.chain().any(|e| e.downcast_ref::<Canceled>().is_some())
}

// Join errors from parallel work into a single newline-separated error;
// every item keeps its own context prefix.
pub fn join_errors(errs: Vec<anyhow::Error>) -> EmptyResult {
    match errs.len() {
        0 => Ok(()),
        1 => Err(errs.into_iter().next().unwrap()),
        _ => {
            let joined = errs.iter().map(|e| format!("{e:#}")).collect::<Vec<_>>().join("\n");
            Err(anyhow!(joined))
        },
    }
}

#[cfg(test)]
mod test {
    use anyhow::Context;
    use assertables::*;

    use super::*;

    #[test]
    fn test_usage_error_survives_context() {
        let err = usage_error("cannot include as well as exclude components")
            .context("apply failed");
        assert!(is_usage_error(&err));
        assert!(!is_canceled(&err));
    }

    #[test]
    fn test_runtime_error_is_not_usage() {
        let err = anyhow!("connection refused");
        assert!(!is_usage_error(&err));
    }

    #[test]
    fn test_join_errors() {
        assert_ok!(join_errors(vec![]));

        let joined = join_errors(vec![
            anyhow!("sync cm1 failed: boom"),
            anyhow!("sync cm2 failed: bang"),
        ])
        .unwrap_err();
        let msg = format!("{joined}");
        assert_contains!(msg, "cm1");
        assert_contains!(msg, "cm2");
        assert_contains!(msg, "\n");
    }
}
