//! Runs the external assembler and linker over emitted assembly.
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use snafu::{ensure, ResultExt};

use crate::compiler::error::{CompileResult, SpawnToolSnafu, ToolFailedSnafu};

/// Files produced while building one program.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Artifacts {
    pub assembly: PathBuf,
    pub object: PathBuf,
    pub executable: PathBuf,
}

impl Artifacts {
    /// Derives the object and executable names from the assembly path:
    /// `output.asm` gives `output.o` and `output`.
    /// Neither derived name is ever the assembly path itself.
    pub fn for_assembly<P: AsRef<Path>>(assembly: P) -> Self {
        let assembly = assembly.as_ref().to_path_buf();
        let mut object = assembly.with_extension("o");
        if object == assembly {
            let mut name = assembly.clone().into_os_string();
            name.push(".o");
            object = PathBuf::from(name);
        }
        let mut executable = assembly.with_extension("");
        if executable == assembly {
            executable = assembly.with_extension("out");
        }
        Artifacts { assembly, object, executable }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Toolchain {
    pub assembler: String,
    pub linker: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Toolchain { assembler: "nasm".to_owned(), linker: "ld".to_owned() }
    }
}

impl Toolchain {
    /// Assembles and links `artifacts.assembly` into `artifacts.executable`.
    /// The intermediate object file is removed afterwards, even if linking fails.
    pub fn build(&self, artifacts: &Artifacts) -> CompileResult<()> {
        let asm = artifacts.assembly.as_os_str();
        let obj = artifacts.object.as_os_str();
        let exe = artifacts.executable.as_os_str();

        run(&self.assembler, &[OsStr::new("-felf64"), asm, OsStr::new("-o"), obj])?;
        let linked = run(&self.linker, &[OsStr::new("-o"), exe, obj]);
        remove_object(&artifacts.object);
        linked?;

        info!("built `{}`", artifacts.executable.display());
        Ok(())
    }
}

fn remove_object(object: &Path) {
    if let Err(err) = fs::remove_file(object) {
        warn!("unable to remove object file `{}`: {}", object.display(), err);
    }
}

fn run(program: &str, args: &[&OsStr]) -> CompileResult<()> {
    debug!("running {} {:?}", program, args);
    let status = Command::new(program)
        .args(args)
        .status()
        .context(SpawnToolSnafu { program })?;

    ensure!(status.success(), ToolFailedSnafu { program, status });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::CompileError;

    #[test]
    fn test_artifact_names() {
        let artifacts = Artifacts::for_assembly("output.asm");
        assert_eq!(artifacts.object, PathBuf::from("output.o"));
        assert_eq!(artifacts.executable, PathBuf::from("output"));

        let artifacts = Artifacts::for_assembly("build/prog.s");
        assert_eq!(artifacts.object, PathBuf::from("build/prog.o"));
        assert_eq!(artifacts.executable, PathBuf::from("build/prog"));

        // Never overwrite the assembly with the executable.
        let artifacts = Artifacts::for_assembly("prog");
        assert_eq!(artifacts.object, PathBuf::from("prog.o"));
        assert_eq!(artifacts.executable, PathBuf::from("prog.out"));

        // Nor with the object file.
        let artifacts = Artifacts::for_assembly("prog.o");
        assert_ne!(artifacts.object, artifacts.assembly);
        assert_eq!(artifacts.object, PathBuf::from("prog.o.o"));
        assert_eq!(artifacts.executable, PathBuf::from("prog"));

        let artifacts = Artifacts::for_assembly("out/a.b.o");
        assert_eq!(artifacts.object, PathBuf::from("out/a.b.o.o"));
        assert_eq!(artifacts.executable, PathBuf::from("out/a.b"));
    }

    #[test]
    fn test_missing_tool() {
        match run("krisp-no-such-assembler", &[]) {
            Err(CompileError::SpawnTool { program, .. }) => assert_eq!(program, "krisp-no-such-assembler"),
            other => panic!("expected SpawnTool, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_tool() {
        match run("sh", &[OsStr::new("-c"), OsStr::new("exit 3")]) {
            Err(CompileError::ToolFailed { program, status }) => {
                assert_eq!(program, "sh");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("expected ToolFailed, got {:?}", other),
        }
        assert!(run("sh", &[OsStr::new("-c"), OsStr::new("exit 0")]).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_object_removed_when_link_fails() {
        let dir = std::env::temp_dir().join(format!("krisp-toolchain-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let artifacts = Artifacts::for_assembly(dir.join("prog.asm"));
        fs::write(&artifacts.assembly, "section .text\n").unwrap();

        // `true` stands in for the assembler; the object file is written by hand.
        let toolchain = Toolchain { assembler: "true".to_owned(), linker: "false".to_owned() };
        fs::write(&artifacts.object, "").unwrap();
        match toolchain.build(&artifacts) {
            Err(CompileError::ToolFailed { program, .. }) => assert_eq!(program, "false"),
            other => panic!("expected ToolFailed, got {:?}", other),
        }
        assert!(!artifacts.object.exists());
        assert!(artifacts.assembly.exists());

        fs::remove_dir_all(&dir).unwrap();
    }
}
