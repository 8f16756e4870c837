use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    /// Writes `name` under the project root and returns its path.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[allow(dead_code)]
    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }
}

pub const SERVER_TEMPLATE: &str = r#"heat_template_version: 2015-04-30
parameters:
  image_name:
    type: string
  flavor_name:
    type: string
    default: m1.tiny
resources:
  net:
    type: OS::Neutron::Net
    properties:
      name: test-net
  server:
    type: OS::Nova::Server
    properties:
      image: { get_param: image_name }
      flavor: { get_param: flavor_name }
outputs:
  server_ip:
    value: { get_attr: [server, first_address] }
"#;
