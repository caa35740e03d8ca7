pub mod registry;

pub use registry::MockRegistry;

use std::path::Path;

/// Write workflow files into `dir`
pub fn write_workflows(dir: &Path, workflows: &[(&str, &str)]) {
    for (name, content) in workflows {
        std::fs::write(dir.join(name), content).unwrap();
    }
}
