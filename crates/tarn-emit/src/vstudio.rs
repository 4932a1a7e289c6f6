//! Visual Studio solution and project generation.
//!
//! One `.vcxproj` per linked target plus a `.sln` tying them together;
//! `depends` becomes project references, which is how MSBuild orders
//! links. Project GUIDs are derived deterministically from target names
//! so regeneration never churns the solution file.

use std::collections::HashSet;
use std::path::Path;

use tarn_graph::{flatten, Solution};
use tarn_toolchain::{project_flags, BuildContext, Family, LinkKind};

use crate::error::Result;
use crate::model::{build_model, TargetRule};
use crate::util::{backslashed, project_guid, write_if_changed};
use crate::Generator;

// VS project-type GUID for C/C++ projects, fixed by the format.
const CPP_PROJECT_TYPE: &str = "{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}";

/// Emits `tarn.sln` plus one project file per linked target into a
/// directory.
#[derive(Debug, Default)]
pub struct VisualStudioGenerator;

fn configuration_type(kind: LinkKind) -> &'static str {
    match kind {
        LinkKind::Application => "Application",
        LinkKind::StaticLibrary => "StaticLibrary",
        LinkKind::DynamicLibrary => "DynamicLibrary",
    }
}

fn render_solution(targets: &[TargetRule]) -> String {
    let mut out = String::new();
    out.push_str("Microsoft Visual Studio Solution File, Format Version 12.00\n");
    out.push_str("# Generated by tarn-build; do not edit.\n");
    for target in targets {
        let guid = project_guid(&target.name);
        out.push_str(&format!(
            "Project(\"{CPP_PROJECT_TYPE}\") = \"{0}\", \"{0}.vcxproj\", \"{guid}\"\n",
            target.name
        ));
        if !target.dep_targets.is_empty() {
            out.push_str("\tProjectSection(ProjectDependencies) = postProject\n");
            for dep in &target.dep_targets {
                let dep_guid = project_guid(dep);
                out.push_str(&format!("\t\t{dep_guid} = {dep_guid}\n"));
            }
            out.push_str("\tEndProjectSection\n");
        }
        out.push_str("EndProject\n");
    }
    out.push_str("Global\n");
    out.push_str("\tGlobalSection(SolutionConfigurationPlatforms) = preSolution\n");
    out.push_str("\t\tRelease|x64 = Release|x64\n");
    out.push_str("\tEndGlobalSection\n");
    out.push_str("\tGlobalSection(ProjectConfigurationPlatforms) = postSolution\n");
    for target in targets {
        let guid = project_guid(&target.name);
        out.push_str(&format!("\t\t{guid}.Release|x64.ActiveCfg = Release|x64\n"));
        out.push_str(&format!("\t\t{guid}.Release|x64.Build.0 = Release|x64\n"));
    }
    out.push_str("\tEndGlobalSection\n");
    out.push_str("EndGlobal\n");
    out
}

fn render_project(solution: &Solution, index: usize, target: &TargetRule) -> Result<String> {
    let root = solution.targets()[index].root;
    let plan = flatten(solution, root)?;

    // Per-entity includes and definitions, rendered through the same
    // projection direct execution uses; order preserved, first occurrence
    // wins.
    let mut includes = Vec::new();
    let mut definitions = Vec::new();
    let mut seen = HashSet::new();
    for step in &plan.compile_steps {
        for inc in &step.request.includes {
            if seen.insert(format!("I{}", inc.display())) {
                includes.push(backslashed(inc));
            }
        }
        for def in &step.request.definitions {
            if seen.insert(format!("D{def}")) {
                definitions.push(def.clone());
            }
        }
    }

    // Options shared by every compile step form the project baseline;
    // the remainder stays on the owning source item, keeping per-file
    // flags scoped exactly as direct execution scopes them.
    let step_options: Vec<Vec<String>> = plan
        .compile_steps
        .iter()
        .map(|step| project_flags(Family::Msc, &step.request.flags))
        .collect();
    let mut baseline: Vec<String> = Vec::new();
    if let Some(first) = step_options.first() {
        for option in first {
            if !baseline.contains(option) && step_options.iter().all(|s| s.contains(option)) {
                baseline.push(option.clone());
            }
        }
    }

    let kind = target.kind.expect("project targets are link-capable");
    let artifact = target.artifact.as_ref().expect("linked target has artifact");
    let out_dir = artifact
        .parent()
        .map(backslashed)
        .unwrap_or_default();

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str("<Project DefaultTargets=\"Build\" xmlns=\"http://schemas.microsoft.com/developer/msbuild/2003\">\n");
    out.push_str("  <ItemGroup Label=\"ProjectConfigurations\">\n");
    out.push_str("    <ProjectConfiguration Include=\"Release|x64\">\n");
    out.push_str("      <Configuration>Release</Configuration>\n");
    out.push_str("      <Platform>x64</Platform>\n");
    out.push_str("    </ProjectConfiguration>\n");
    out.push_str("  </ItemGroup>\n");
    out.push_str("  <PropertyGroup Label=\"Globals\">\n");
    out.push_str(&format!(
        "    <ProjectGuid>{}</ProjectGuid>\n",
        project_guid(&target.name)
    ));
    out.push_str(&format!(
        "    <RootNamespace>{}</RootNamespace>\n",
        target.name
    ));
    out.push_str("  </PropertyGroup>\n");
    out.push_str("  <PropertyGroup>\n");
    out.push_str(&format!(
        "    <ConfigurationType>{}</ConfigurationType>\n",
        configuration_type(kind)
    ));
    out.push_str(&format!("    <OutDir>{out_dir}\\</OutDir>\n"));
    out.push_str("  </PropertyGroup>\n");
    out.push_str("  <ItemDefinitionGroup>\n");
    out.push_str("    <ClCompile>\n");
    out.push_str(&format!(
        "      <AdditionalIncludeDirectories>{}</AdditionalIncludeDirectories>\n",
        includes.join(";")
    ));
    out.push_str(&format!(
        "      <PreprocessorDefinitions>{}</PreprocessorDefinitions>\n",
        definitions.join(";")
    ));
    out.push_str(&format!(
        "      <AdditionalOptions>{}</AdditionalOptions>\n",
        baseline.join(" ")
    ));
    out.push_str("    </ClCompile>\n");
    if kind != LinkKind::StaticLibrary {
        if let Some(link) = &plan.link_step {
            let mut deps: Vec<String> = link
                .request
                .libraries
                .iter()
                .map(|l| format!("{l}.lib"))
                .collect();
            deps.extend(link.request.extern_libs.iter().map(|l| backslashed(l)));
            let dirs: Vec<String> = link
                .request
                .searches
                .iter()
                .map(|d| backslashed(d))
                .collect();
            out.push_str("    <Link>\n");
            out.push_str(&format!(
                "      <AdditionalDependencies>{}</AdditionalDependencies>\n",
                deps.join(";")
            ));
            out.push_str(&format!(
                "      <AdditionalLibraryDirectories>{}</AdditionalLibraryDirectories>\n",
                dirs.join(";")
            ));
            out.push_str(&format!(
                "      <AdditionalOptions>{}</AdditionalOptions>\n",
                project_flags(Family::Msc, &link.request.ldflags).join(" ")
            ));
            out.push_str("    </Link>\n");
        }
    }
    out.push_str("  </ItemDefinitionGroup>\n");
    out.push_str("  <ItemGroup>\n");
    for (step, options) in plan.compile_steps.iter().zip(&step_options) {
        let extra: Vec<&str> = options
            .iter()
            .filter(|o| !baseline.contains(*o))
            .map(|o| o.as_str())
            .collect();
        if extra.is_empty() {
            out.push_str(&format!(
                "    <ClCompile Include=\"{}\" />\n",
                backslashed(&step.request.source)
            ));
        } else {
            out.push_str(&format!(
                "    <ClCompile Include=\"{}\">\n",
                backslashed(&step.request.source)
            ));
            out.push_str(&format!(
                "      <AdditionalOptions>{} %(AdditionalOptions)</AdditionalOptions>\n",
                extra.join(" ")
            ));
            out.push_str("    </ClCompile>\n");
        }
    }
    out.push_str("  </ItemGroup>\n");
    if !target.dep_targets.is_empty() {
        out.push_str("  <ItemGroup>\n");
        for dep in &target.dep_targets {
            out.push_str(&format!(
                "    <ProjectReference Include=\"{dep}.vcxproj\">\n"
            ));
            out.push_str(&format!(
                "      <Project>{}</Project>\n",
                project_guid(dep)
            ));
            out.push_str("    </ProjectReference>\n");
        }
        out.push_str("  </ItemGroup>\n");
    }
    out.push_str("  <Import Project=\"$(VCTargetsPath)\\Microsoft.Cpp.targets\" />\n");
    out.push_str("</Project>\n");
    Ok(out)
}

impl Generator for VisualStudioGenerator {
    fn generate(&self, path: &Path, ctx: &BuildContext, solution: &Solution) -> Result<()> {
        let model = build_model(ctx, solution)?;

        // Only link-capable targets become projects; object groups are
        // folded into whoever links them.
        let projects: Vec<(usize, &TargetRule)> = model
            .targets
            .iter()
            .enumerate()
            .filter(|(_, t)| t.kind.is_some())
            .collect();

        let project_rules: Vec<TargetRule> =
            projects.iter().map(|(_, t)| (*t).clone()).collect();
        write_if_changed(&path.join("tarn.sln"), &render_solution(&project_rules))?;

        for (index, target) in projects {
            let content = render_project(solution, index, target)?;
            write_if_changed(&path.join(format!("{}.vcxproj", target.name)), &content)?;
        }
        Ok(())
    }
}
