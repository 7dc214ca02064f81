// idlstub-codegen: reads resolved IDL descriptors, generates C stubs, prototypes
// and managed declarations.

pub mod schema;
pub mod lexpr;
pub mod naming;
pub mod config;
pub mod error;
pub mod context;
pub mod type_map;
pub mod typedefs;
pub mod dependency;
pub mod view;
pub mod validate;
pub mod method;
pub mod c_gen;
pub mod ml_gen;

use std::path::{Path, PathBuf};

use crate::c_gen::marshal::BasicMarshaller;
use crate::config::{IdlstubConfig, TargetNames};
use crate::context::CodegenContext;
use crate::error::{GenError, GenResult};
use crate::schema::ModuleFile;

/// The three artifacts generated for one module.
#[derive(Debug, Clone)]
pub struct GeneratedModule {
    pub module: String,
    /// `<module>_stubs.c`
    pub stubs: String,
    /// `<module>.h`
    pub header: String,
    /// `<module>.ml`
    pub ml: String,
    pub wrapper_count: usize,
}

/// Parse one descriptor file.
pub fn load_module(path: &Path) -> GenResult<ModuleFile> {
    let data = std::fs::read_to_string(path).map_err(|source| GenError::DescriptorRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| GenError::DescriptorParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Generate every artifact of `file` in memory.
pub fn generate_module(file: ModuleFile, target: TargetNames) -> GenResult<GeneratedModule> {
    validate::check_interfaces(&file.interfaces)?;

    let ctx = CodegenContext::new(file, target);
    log::info!(
        "module {}: {} functions, {} interfaces, {} typedefs",
        ctx.module,
        ctx.functions.len(),
        ctx.interfaces.len(),
        ctx.typedefs.len()
    );

    let wrappers = c_gen::generate_wrappers(&ctx, &BasicMarshaller)?;
    Ok(GeneratedModule {
        module: ctx.module.clone(),
        stubs: c_gen::stub_file(&ctx, &wrappers),
        header: c_gen::header_file(&ctx),
        ml: ml_gen::ml_file(&ctx.module, &wrappers),
        wrapper_count: wrappers.len(),
    })
}

fn load_config(config_path: &Path) -> GenResult<IdlstubConfig> {
    let config_str = std::fs::read_to_string(config_path).map_err(|source| GenError::ConfigRead {
        path: config_path.to_path_buf(),
        source,
    })?;
    toml::from_str(&config_str).map_err(|source| GenError::ConfigParse {
        path: config_path.to_path_buf(),
        source,
    })
}

/// Run the generate command. Main entry point for codegen.
pub fn run_generate(config_path: &Path) -> GenResult<()> {
    let config = load_config(config_path)?;
    let codegen = config.codegen;

    // Paths in the config are relative to the config file.
    let config_dir = config_path.parent().unwrap_or(Path::new("."));
    let input = config_dir.join(&codegen.paths.input);
    let out_dir = config_dir.join(&codegen.paths.out);

    log::info!("loading {}", input.display());
    let file = load_module(&input)?;

    log::info!("generating stubs...");
    let generated = generate_module(file, codegen.target)?;

    std::fs::create_dir_all(&out_dir).map_err(|source| GenError::Write {
        path: out_dir.clone(),
        source,
    })?;
    let outputs = [
        (format!("{}_stubs.c", generated.module), &generated.stubs),
        (format!("{}.h", generated.module), &generated.header),
        (format!("{}.ml", generated.module), &generated.ml),
    ];
    for (name, content) in outputs {
        let path = out_dir.join(name);
        std::fs::write(&path, content).map_err(|source| GenError::Write { path, source })?;
    }

    verify_output(&generated, &out_dir);
    log::info!("done!");
    Ok(())
}

/// Generate the stub source of a single descriptor file with default target names.
pub fn emit_stubs(input: &Path) -> GenResult<String> {
    let file = load_module(input)?;
    Ok(generate_module(file, TargetNames::default())?.stubs)
}

/// Post-generate check that every artifact landed on disk.
fn verify_output(generated: &GeneratedModule, out_dir: &Path) {
    let required: [PathBuf; 3] = [
        out_dir.join(format!("{}_stubs.c", generated.module)),
        out_dir.join(format!("{}.h", generated.module)),
        out_dir.join(format!("{}.ml", generated.module)),
    ];
    let mut missing = 0;
    for path in &required {
        match std::fs::metadata(path) {
            Ok(m) if m.len() > 0 => {}
            _ => {
                log::warn!("output missing or empty: {}", path.display());
                missing += 1;
            }
        }
    }
    if missing == 0 {
        log::info!("OK: {} wrappers in {}", generated.wrapper_count, out_dir.display());
    }
}
