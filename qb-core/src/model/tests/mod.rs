mod pristine_test;
mod secrets_test;

use rstest::*;

use super::*;

#[fixture]
fn prov() -> Provenance {
    Provenance {
        app: "example1".into(),
        tag: None,
        component: "service1".into(),
        environment: "dev".into(),
    }
}

#[fixture]
fn tagged_prov(prov: Provenance) -> Provenance {
    Provenance { tag: Some("pr42".into()), ..prov }
}
