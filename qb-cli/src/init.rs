use std::fs;
use std::path::Path;

use qb_core::errors::*;
use tracing::*;

#[derive(clap::Args)]
pub struct Args {
    #[arg(long_help = "name of the app (a directory of this name is created)")]
    pub name: String,
}

const MANIFEST_TEMPLATE: &str = r#"apiVersion: qbec.io/v1alpha1
kind: App
metadata:
  name: {name}
spec:
  environments:
    default:
      defaultNamespace: default
"#;

const SAMPLE_COMPONENT: &str = r#"apiVersion: v1
kind: ConfigMap
metadata:
  name: hello
data:
  greeting: hello world
"#;

pub fn cmd(args: &Args) -> EmptyResult {
    let dir = Path::new(&args.name);
    if dir.exists() {
        return Err(usage_error(format!("directory {} already exists", dir.display())));
    }

    fs::create_dir_all(dir.join("components"))?;
    fs::write(dir.join(crate::app::MANIFEST_BASENAME), MANIFEST_TEMPLATE.replace("{name}", &args.name))?;
    fs::write(dir.join("components/hello.yaml"), SAMPLE_COMPONENT)?;

    info!("initialized app {} with a sample component", args.name);
    Ok(())
}
