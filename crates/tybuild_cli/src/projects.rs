//! `tybuild projects` — list discovered projects as `type name` lines.

use std::error::Error;

use tybuild_project::{discover_projects, GenerateError};

use crate::pipeline::load_workspace;
use crate::GlobalArgs;

/// Runs the `tybuild projects` command.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let (_config, layout) = load_workspace(global)?;
    let projects = discover_projects(&layout.project_root);
    if projects.is_empty() {
        return Err(GenerateError::NoProjects {
            path: layout.project_root,
        }
        .into());
    }
    for project in &projects {
        println!("{:<15} {}", project.kind, project.name);
    }
    Ok(0)
}
