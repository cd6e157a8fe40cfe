mod apiset;
mod gvk;
mod util;

pub use apiset::*;
pub use gvk::*;
pub use util::*;

use crate::errors::*;
use crate::prelude::*;

err_impl! {KubernetesError,
    #[error("no type information present on object: {0}")]
    MissingTypeInfo(String),

    #[error("server does not recognize kind: {0}")]
    UnknownKind(String),

    #[error("invalid apiVersion: {0}")]
    MalformedApiVersion(String),
}

pub trait KubeResourceExt {
    fn namespaced_name(&self) -> String;
}

impl<T: kube::Resource> KubeResourceExt for T {
    fn namespaced_name(&self) -> String {
        match self.namespace() {
            Some(ns) => format!("{}/{}", ns, self.name_any()),
            None => self.name_any().clone(),
        }
    }
}

#[cfg(test)]
pub mod tests;
