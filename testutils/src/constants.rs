use lazy_static::lazy_static;
use qb_core::k8s::GVK;

pub const TEST_APP: &str = "example1";
pub const TEST_ENVIRONMENT: &str = "dev";
pub const TEST_NAMESPACE: &str = "test";
pub const TEST_COMPONENT: &str = "service1";
pub const TEST_OTHER_COMPONENT: &str = "service2";

lazy_static! {
    pub static ref CM_GVK: GVK = GVK::new("", "v1", "ConfigMap");
    pub static ref SECRET_GVK: GVK = GVK::new("", "v1", "Secret");
    pub static ref SVC_GVK: GVK = GVK::new("", "v1", "Service");
    pub static ref NS_GVK: GVK = GVK::new("", "v1", "Namespace");
    pub static ref DEPL_GVK: GVK = GVK::new("apps", "v1", "Deployment");
}
