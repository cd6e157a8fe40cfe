use httpmock::prelude::*;
use serde_json::json;

// An httpmock server posing as just enough of an apiserver for the sync and
// client tests: discovery for the fixture groups plus per-path stubs for the
// get/create/patch round-trips the engine makes.  Stubs register eagerly;
// anything unstubbed gets httpmock's default 404, which the kube client
// surfaces as an error, so a test that forgets (or a sync that makes an
// unexpected write) fails instead of silently passing.
pub struct FakeApiserver {
    server: MockServer,
}

impl FakeApiserver {
    pub fn start() -> (FakeApiserver, kube::Client) {
        let fake = FakeApiserver { server: MockServer::start() };
        let uri = http::Uri::try_from(fake.server.url("/")).unwrap();
        let client = kube::Client::try_from(kube::Config::new(uri)).unwrap();
        (fake, client)
    }

    // discovery for the core and apps groups, which covers every kind the
    // object fixtures produce
    pub fn serve_discovery(&self) -> &Self {
        self.server.mock(|when, then| {
            when.method(GET).path("/api/v1");
            then.json_body(super::core_v1_discovery());
        });
        self.server.mock(|when, then| {
            when.method(GET).path("/apis/apps/v1");
            then.json_body(super::apps_v1_discovery());
        });
        self
    }

    // GETs of this path see the given document
    pub fn object_at(&self, path: &str, doc: serde_json::Value) -> &Self {
        let path = path.to_string();
        self.server.mock(move |when, then| {
            when.method(GET).path(&path);
            then.json_body(doc.clone());
        });
        self
    }

    // any request to this path gets a kubernetes NotFound status
    pub fn missing(&self, path: &str) -> &Self {
        let path = path.to_string();
        self.server.mock(move |when, then| {
            when.path(&path);
            then.status(404).json_body(json!({
                "kind": "Status",
                "apiVersion": "v1",
                "metadata": {},
                "status": "Failure",
                "reason": "NotFound",
                "code": 404,
            }));
        });
        self
    }

    // POSTs to this collection succeed with the given created object
    pub fn accept_create(&self, path: &str, created: serde_json::Value) -> &Self {
        let path = path.to_string();
        self.server.mock(move |when, then| {
            when.method(POST).path(&path);
            then.status(201).json_body(created.clone());
        });
        self
    }

    // PATCHes to this path succeed with the given resulting object
    pub fn accept_patch(&self, path: &str, patched: serde_json::Value) -> &Self {
        let path = path.to_string();
        self.server.mock(move |when, then| {
            when.method(PATCH).path(&path);
            then.json_body(patched.clone());
        });
        self
    }
}

// Path helpers for core-group resources, which is where almost all of the
// fixture traffic goes.
pub fn core_collection_path(ns: &str, plural: &str) -> String {
    format!("/api/v1/namespaces/{ns}/{plural}")
}

pub fn core_resource_path(ns: &str, plural: &str, name: &str) -> String {
    format!("/api/v1/namespaces/{ns}/{plural}/{name}")
}
