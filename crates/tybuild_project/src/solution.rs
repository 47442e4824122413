//! Visual Studio 2022 solution emission.
//!
//! The layout mirrors what CMake's Visual Studio generator produces: an
//! `ALL_BUILD` project depending on everything, a `ZERO_CHECK` project every
//! other project depends on, and four x64 configurations.

use std::fmt::Write as _;

use crate::guid::{ALL_BUILD_GUID, ZERO_CHECK_GUID};

/// Project type GUID of Visual C++ projects.
pub const VC_PROJECT_TYPE_GUID: &str = "{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}";

/// Solution configurations, all targeting x64.
pub const CONFIGURATIONS: [&str; 4] = [
    "Debug|x64",
    "Release|x64",
    "MinSizeRel|x64",
    "RelWithDebInfo|x64",
];

/// One user project listed in the solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionProject {
    /// Project name; the project file is `<name>.vcxproj`.
    pub name: String,
    /// Project GUID without braces.
    pub guid: String,
}

fn braced(guid: &str) -> String {
    format!("{{{guid}}}")
}

fn project_block(out: &mut String, name: &str, guid: &str, depends_on: &[String]) {
    let _ = writeln!(
        out,
        "Project(\"{VC_PROJECT_TYPE_GUID}\") = \"{name}\", \"{name}.vcxproj\", \"{}\"",
        braced(guid)
    );
    out.push_str("\tProjectSection(ProjectDependencies) = postProject\n");
    for dep in depends_on {
        let _ = writeln!(out, "\t\t{dep} = {dep}");
    }
    out.push_str("\tEndProjectSection\n");
    out.push_str("EndProject\n");
}

fn configuration_lines(out: &mut String, guid: &str, build: bool) {
    let guid = braced(guid);
    for config in CONFIGURATIONS {
        let _ = writeln!(out, "\t\t{guid}.{config}.ActiveCfg = {config}");
        if build {
            let _ = writeln!(out, "\t\t{guid}.{config}.Build.0 = {config}");
        }
    }
}

/// Renders the complete solution file, starting with a UTF-8 byte-order mark.
pub fn render_solution(solution_guid: &str, projects: &[SolutionProject]) -> String {
    let zero_check = braced(ZERO_CHECK_GUID);
    let mut out = String::from("\u{feff}\n");
    out.push_str("Microsoft Visual Studio Solution File, Format Version 12.00\n");
    out.push_str("# Visual Studio Version 17\n");

    let mut all_build_deps: Vec<String> = projects.iter().map(|p| braced(&p.guid)).collect();
    all_build_deps.push(zero_check.clone());
    project_block(&mut out, "ALL_BUILD", ALL_BUILD_GUID, &all_build_deps);

    for project in projects {
        project_block(
            &mut out,
            &project.name,
            &project.guid,
            std::slice::from_ref(&zero_check),
        );
    }
    project_block(&mut out, "ZERO_CHECK", ZERO_CHECK_GUID, &[]);

    out.push_str("Global\n");
    out.push_str("\tGlobalSection(SolutionConfigurationPlatforms) = preSolution\n");
    for config in CONFIGURATIONS {
        let _ = writeln!(out, "\t\t{config} = {config}");
    }
    out.push_str("\tEndGlobalSection\n");

    out.push_str("\tGlobalSection(ProjectConfigurationPlatforms) = postSolution\n");
    configuration_lines(&mut out, ALL_BUILD_GUID, false);
    for project in projects {
        configuration_lines(&mut out, &project.guid, true);
    }
    configuration_lines(&mut out, ZERO_CHECK_GUID, true);
    out.push_str("\tEndGlobalSection\n");

    out.push_str("\tGlobalSection(ExtensibilityGlobals) = postSolution\n");
    let _ = writeln!(out, "\t\tSolutionGuid = {}", braced(solution_guid));
    out.push_str("\tEndGlobalSection\n");
    out.push_str("\tGlobalSection(ExtensibilityAddIns) = postSolution\n");
    out.push_str("\tEndGlobalSection\n");
    out.push_str("EndGlobal\n");
    out
}
