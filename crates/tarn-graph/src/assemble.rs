//! Entity instantiation: configuration + module descriptors → solution.
//!
//! One object library per module, core modules aggregated into a static
//! library, one application, and one dynamic library per loadable
//! extension. Dynamic extensions re-specialize their modules as PIC
//! objects with distinct output paths.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tarn_config::{BuildConfig, ConfigError, ExtensionMode, ModuleSpec};
use tarn_toolchain::compiler::compiler_from_token;
use tarn_toolchain::linker::linker_from_token;
use tarn_toolchain::tool::tool_from_token;
use tarn_toolchain::{BuildContext, LinkKind, Tool, ToolId, ToolchainError};

use crate::entity::{
    artifact_file_name, object_output_path, CommonProps, Entity, EntityId, EntityKind, LinkProps,
    PostBuildCommand,
};
use crate::error::{GraphError, Result};
use crate::solution::Solution;

const SOURCE_ROOT: &str = "src";
const OBJS_ROOT: &str = "build/objs";

/// Resolve the platform and toolset tokens into a validated [`BuildContext`].
pub fn build_context(config: &BuildConfig) -> Result<BuildContext> {
    let platform = tarn_platform::lookup(&config.os_id)?;

    let mut compiler = None;
    let mut linker = None;
    let mut strip = None;
    let mut tcc = None;
    for sel in &config.toolset {
        let token = sel.token();
        let path = sel.path_override().map(PathBuf::as_path);
        if let Some(c) = compiler_from_token(token, path) {
            compiler = Some(c);
        } else if let Some(l) = linker_from_token(token, path) {
            linker = Some(l);
        } else if let Some(t) = tool_from_token(token, path) {
            match t.id {
                ToolId::Strip => strip = Some(t),
                ToolId::Tcc => tcc = Some(t),
            }
        } else {
            return Err(ToolchainError::UnknownTool {
                token: token.to_string(),
            }
            .into());
        }
    }

    let compiler = compiler.ok_or(GraphError::IncompleteToolset { role: "compiler" })?;
    let linker = linker.ok_or(GraphError::IncompleteToolset { role: "linker" })?;

    let mut ctx = BuildContext::new(platform, compiler, linker)?;
    if let Some(tool) = strip {
        ctx = ctx.with_strip(tool);
    }
    if config.with_tcc {
        ctx = ctx.with_tcc(tcc.unwrap_or_else(Tool::tcc));
    } else if let Some(tool) = tcc {
        ctx = ctx.with_tcc(tool);
    }
    Ok(ctx)
}

/// Build one object library for a module: an object file per source file,
/// flags layered project-first then module then per-file.
fn make_object_library(
    solution: &mut Solution,
    ctx: &BuildContext,
    config: &BuildConfig,
    module: &ModuleSpec,
    pic: bool,
) -> EntityId {
    let mut includes = config.includes.clone();
    includes.extend(module.includes.iter().cloned());

    let mut definitions = config.definitions.clone();
    definitions.extend(module.definitions.iter().cloned());
    if config.with_ffi {
        definitions.push("TARN_WITH_FFI".to_string());
    }
    if config.with_tcc {
        definitions.push("TARN_WITH_TCC".to_string());
    }

    let base_flags = config.effective_cflags();

    let mut members = Vec::new();
    for file in module.all_files() {
        let mut cflags = base_flags.clone();
        cflags.extend(file.flags.iter().cloned());
        let output = object_output_path(
            &ctx.platform,
            &file.path,
            Path::new(SOURCE_ROOT),
            Path::new(OBJS_ROOT),
            pic,
        );
        let name = format!(
            "{}/{}",
            module.name,
            file.path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        );
        members.push(solution.add_entity(Entity {
            common: CommonProps {
                name,
                includes: includes.clone(),
                definitions: definitions.clone(),
                cflags,
                optimization: config.optimize,
                debug: config.debug,
                standard: config.standard.clone(),
            },
            kind: EntityKind::ObjectFile {
                source: file.path.clone(),
                output,
                pic,
            },
        }));
    }

    let lib_name = if pic {
        format!("{}-shared", module.name)
    } else {
        module.name.clone()
    };
    solution.add_entity(Entity {
        common: CommonProps::named(lib_name),
        kind: EntityKind::ObjectLibrary { depends: members },
    })
}

/// Strip post-build action, unless this build wants symbols kept.
fn strip_action(ctx: &BuildContext, config: &BuildConfig, file: &Path) -> Vec<PostBuildCommand> {
    if ctx.strip.is_some() && !config.debug.wants_symbols() {
        vec![PostBuildCommand::Strip {
            file: file.to_path_buf(),
        }]
    } else {
        Vec::new()
    }
}

/// Instantiate the full entity graph for one build invocation.
///
/// Modules not claimed by any extension selection form the runtime core.
/// A selection naming a module without a descriptor is a configuration
/// error; excluded extensions contribute nothing.
pub fn assemble(
    ctx: &BuildContext,
    config: &BuildConfig,
    modules: &[ModuleSpec],
) -> Result<Solution> {
    let mut solution = Solution::new();
    let artifacts_root = PathBuf::from("build").join(&ctx.platform.os_id);

    let find_module = |ext: &str, name: &str| -> Result<&ModuleSpec> {
        modules
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| ConfigError::UnknownModule {
                extension: ext.to_string(),
                module: name.to_string(),
            })
            .map_err(GraphError::from)
    };

    let claimed: HashSet<&str> = config
        .extensions
        .iter()
        .flat_map(|sel| sel.modules.iter().map(String::as_str))
        .collect();

    // Core: one object library per unclaimed module, aggregated statically.
    let mut core_groups = Vec::new();
    let mut core_libraries = config.libraries.clone();
    for module in modules.iter().filter(|m| !claimed.contains(m.name.as_str())) {
        core_groups.push(make_object_library(&mut solution, ctx, config, module, false));
        core_libraries.extend(module.libraries.iter().cloned());
    }
    if config.with_ffi {
        core_libraries.push("ffi".to_string());
    }

    let core_lib_path = artifacts_root.join("lib").join(artifact_file_name(
        &ctx.platform,
        "tarn",
        LinkKind::StaticLibrary,
    ));
    let core_lib = solution.add_entity(Entity {
        common: CommonProps::named("libtarn"),
        kind: EntityKind::StaticLibrary(LinkProps::new(core_groups, core_lib_path)),
    });
    solution.add_target("libtarn", core_lib);

    // Builtin extensions join the application link; dynamic ones become
    // their own shared-library targets over PIC re-specializations.
    let mut app_depends = vec![core_lib];
    let mut app_libraries = core_libraries;
    let mut dynamic_targets = Vec::new();
    for sel in &config.extensions {
        match sel.mode {
            ExtensionMode::Excluded => {
                for name in &sel.modules {
                    // Still validate the reference; a typo here is silent
                    // module loss otherwise.
                    find_module(&sel.name, name)?;
                }
            }
            ExtensionMode::Builtin => {
                for name in &sel.modules {
                    let module = find_module(&sel.name, name)?;
                    app_depends.push(make_object_library(
                        &mut solution,
                        ctx,
                        config,
                        module,
                        false,
                    ));
                    app_libraries.extend(module.libraries.iter().cloned());
                }
            }
            ExtensionMode::Dynamic => {
                let mut groups = Vec::new();
                let mut libraries = config.libraries.clone();
                for name in &sel.modules {
                    let module = find_module(&sel.name, name)?;
                    groups.push(make_object_library(&mut solution, ctx, config, module, true));
                    libraries.extend(module.libraries.iter().cloned());
                }
                let output = artifacts_root.join("lib").join(artifact_file_name(
                    &ctx.platform,
                    &sel.name,
                    LinkKind::DynamicLibrary,
                ));
                let post_build = strip_action(ctx, config, &output);
                let dynlib = solution.add_entity(Entity {
                    common: CommonProps::named(sel.name.clone()),
                    kind: EntityKind::DynamicLibrary(LinkProps {
                        depends: groups,
                        output,
                        ldflags: config.ldflags.clone(),
                        libraries,
                        searches: Vec::new(),
                        statik: false,
                        post_build,
                    }),
                });
                dynamic_targets.push((sel.name.clone(), dynlib));
            }
        }
    }

    let app_output = artifacts_root.join("bin").join(artifact_file_name(
        &ctx.platform,
        "tarn",
        LinkKind::Application,
    ));
    let post_build = strip_action(ctx, config, &app_output);
    let app = solution.add_entity(Entity {
        common: CommonProps::named("tarn"),
        kind: EntityKind::Application(LinkProps {
            depends: app_depends,
            output: app_output,
            ldflags: config.ldflags.clone(),
            libraries: app_libraries,
            searches: Vec::new(),
            statik: config.statik,
            post_build,
        }),
    });
    solution.add_target("tarn", app);

    for (name, id) in dynamic_targets {
        solution.add_target(name, id);
    }

    Ok(solution)
}
