use std::path::{Path, PathBuf};

const SCAFFOLD_DIR_NAME: &str = "scaffold";
const TARGET_ENV: &str = "REPRO_PATCH_TARGET";
const DEFAULT_TARGET: &str = "code/cockroach";
const LOCATION_HEADER: &str = "// target location:";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    On,
    Off,
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("scaffold") => scaffold(&args[1..]),
        Some(command) => usage_and_exit(&format!("unknown command `{command}`")),
        None => usage_and_exit("missing command"),
    }
}

fn usage_and_exit(error: &str) -> ! {
    eprintln!("Error: {error}");
    eprintln!("Usage: cargo xtask <command>");
    eprintln!("Available commands:");
    eprintln!("  scaffold <on|off> [--target <dir>]");
    std::process::exit(1);
}

fn scaffold(args: &[String]) {
    let mode = match args.first().map(String::as_str) {
        Some("on") => Mode::On,
        Some("off") => Mode::Off,
        Some(other) => usage_and_exit(&format!("unknown scaffold mode `{other}`")),
        None => usage_and_exit("missing scaffold mode"),
    };
    let target = match &args[1..] {
        [] => None,
        [flag, dir] if flag == "--target" => Some(PathBuf::from(dir)),
        _ => usage_and_exit("expected `--target <dir>`"),
    };

    if let Err(error) = scaffold_inner(mode, target) {
        eprintln!("{error}");
        std::process::exit(1);
    }
}

fn scaffold_inner(mode: Mode, target: Option<PathBuf>) -> Result<(), String> {
    let scaffold_dir = workspace_root()?.join(SCAFFOLD_DIR_NAME);
    let target_root = match target {
        Some(dir) => dir,
        None => default_target()?,
    };
    let touched = apply_scaffold(&scaffold_dir, &target_root, mode)?;
    if touched.is_empty() {
        println!("No scaffold files applied from {}", scaffold_dir.display());
    }
    Ok(())
}

/// Copy (`On`) or remove (`Off`) every scaffold file at the location named
/// by its header line, relative to `target_root`. Returns the target paths
/// that were written or removed.
fn apply_scaffold(scaffold_dir: &Path, target_root: &Path, mode: Mode) -> Result<Vec<PathBuf>, String> {
    let mut touched = Vec::new();
    for source in scaffold_files(scaffold_dir)? {
        let location = target_location(&source)?;
        let destination = target_root.join(&location);
        match mode {
            Mode::On => {
                if let Some(parent) = destination.parent() {
                    std::fs::create_dir_all(parent).map_err(|error| {
                        format!("failed to create directory {}: {error}", parent.display())
                    })?;
                }
                std::fs::copy(&source, &destination).map_err(|error| {
                    format!(
                        "failed to copy {} to {}: {error}",
                        source.display(),
                        destination.display()
                    )
                })?;
                println!("File copied to {}", destination.display());
                touched.push(destination);
            }
            Mode::Off => {
                if !destination.exists() {
                    continue;
                }
                std::fs::remove_file(&destination).map_err(|error| {
                    format!("failed to remove {}: {error}", destination.display())
                })?;
                println!("File removed from {}", destination.display());
                touched.push(destination);
            }
        }
    }
    Ok(touched)
}

fn scaffold_files(scaffold_dir: &Path) -> Result<Vec<PathBuf>, String> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(scaffold_dir).map_err(|error| {
        format!(
            "failed to read directory {}: {error}",
            scaffold_dir.display()
        )
    })? {
        let entry = entry.map_err(|error| {
            format!(
                "failed to read directory entry under {}: {error}",
                scaffold_dir.display()
            )
        })?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        let path = entry.path();
        if !hidden && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read `// target location: <relative path>` from the first line.
fn target_location(source: &Path) -> Result<PathBuf, String> {
    let contents = std::fs::read_to_string(source)
        .map_err(|error| format!("failed to read {}: {error}", source.display()))?;
    let first_line = contents.lines().next().unwrap_or_default().trim();
    let location = first_line
        .strip_prefix(LOCATION_HEADER)
        .map(str::trim)
        .filter(|location| !location.is_empty())
        .ok_or_else(|| format!("target location not found in the first line of {}", source.display()))?;

    let location = PathBuf::from(location);
    if location.is_absolute() || location.components().any(|c| c.as_os_str() == "..") {
        return Err(format!(
            "target location {} in {} must stay inside the target tree",
            location.display(),
            source.display()
        ));
    }
    Ok(location)
}

fn default_target() -> Result<PathBuf, String> {
    if let Some(dir) = std::env::var_os(TARGET_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var_os("HOME").ok_or(format!("neither {TARGET_ENV} nor HOME is set"))?;
    Ok(PathBuf::from(home).join(DEFAULT_TARGET))
}

fn workspace_root() -> Result<PathBuf, String> {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(Path::parent)
        .map(PathBuf::from)
        .ok_or_else(|| {
            format!(
                "failed to resolve workspace root from {}",
                manifest_dir.display()
            )
        })
}
