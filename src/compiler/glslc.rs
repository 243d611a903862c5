//! External front-end: `glslc` from the Vulkan SDK.
//!
//! Used for HLSL and for GLSL stages naga cannot express (geometry,
//! tessellation). Source is piped through stdin and SPIR-V is read back from
//! stdout, so nothing is written to the project directory.

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::defines::MacroSet;
use super::{ShaderLanguage, ShaderStage};
use crate::errors::{Result, StudioError};
use crate::messages::MessageSink;

/// A located `glslc` executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glslc {
    path: PathBuf,
}

impl Glslc {
    /// Uses `explicit` when given, otherwise searches `PATH`, then
    /// `VULKAN_SDK`, then common SDK install roots.
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return if path.exists() {
                Ok(Self {
                    path: path.to_path_buf(),
                })
            } else {
                Err(StudioError::ToolNotFound(path.display().to_string()))
            };
        }
        find_glslc()
            .map(|path| Self { path })
            .ok_or_else(|| StudioError::ToolNotFound("glslc".into()))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Builds the argument list for one compile.
    #[must_use]
    pub fn arguments(
        language: &ShaderLanguage,
        stage: ShaderStage,
        entry: &str,
        defines: &MacroSet,
    ) -> Vec<String> {
        let mut args = vec![format!("-fshader-stage={}", stage.glslc_name())];

        match language {
            ShaderLanguage::Hlsl => {
                args.push("-x".into());
                args.push("hlsl".into());
                args.push(format!("-fentry-point={entry}"));
                args.push("--target-env=vulkan1.1".into());
            }
            ShaderLanguage::Glsl => {
                args.push("-x".into());
                args.push("glsl".into());
                args.push("--target-env=opengl".into());
            }
            _ => {
                args.push("-x".into());
                args.push("glsl".into());
                args.push("--target-env=vulkan1.1".into());
            }
        }

        args.extend([
            "-fauto-bind-uniforms".to_owned(),
            "-fauto-map-locations".to_owned(),
            "-g".to_owned(),
        ]);
        for (name, value) in defines.iter() {
            args.push(format!("-D{name}={value}"));
        }
        args.extend(["-o".to_owned(), "-".to_owned(), "-".to_owned()]);
        args
    }

    /// Compiles `source`; diagnostics go to `msgs`, success yields SPIR-V.
    pub fn compile(
        &self,
        language: &ShaderLanguage,
        stage: ShaderStage,
        source: &str,
        entry: &str,
        defines: &MacroSet,
        file: &str,
        msgs: &mut dyn MessageSink,
    ) -> Option<Vec<u32>> {
        let args = Self::arguments(language, stage, entry, defines);
        log::debug!("glslc {}", args.join(" "));

        let output = match self.run(&args, source) {
            Ok(output) => output,
            Err(e) => {
                msgs.log(&e.to_string(), true, Some(file), None);
                return None;
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        let reported_error = report_diagnostics(&stderr, file, msgs);

        if !output.status.success() {
            if !reported_error {
                msgs.log(
                    &format!("glslc exited with {}", output.status),
                    true,
                    Some(file),
                    None,
                );
            }
            return None;
        }

        let words = crate::spirv::words_from_bytes(&output.stdout);
        if words.first() != Some(&spirv::MAGIC_NUMBER) {
            msgs.log("glslc produced no SPIR-V output", true, Some(file), None);
            return None;
        }
        Some(words)
    }

    fn run(&self, args: &[String], source: &str) -> Result<std::process::Output> {
        let failed = |e: std::io::Error| StudioError::ToolFailed {
            tool: self.path.display().to_string(),
            message: e.to_string(),
        };

        let mut child = Command::new(&self.path)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(failed)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(source.as_bytes()).map_err(failed)?;
        }
        child.wait_with_output().map_err(failed)
    }
}

/// Forwards `<file>:<line>: error|warning: <text>` lines to the sink.
///
/// Returns whether at least one error was reported.
pub fn report_diagnostics(stderr: &str, file: &str, msgs: &mut dyn MessageSink) -> bool {
    let mut any_error = false;

    for line in stderr.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let (is_error, split) = if let Some(split) = line.split_once(": error: ") {
            (true, split)
        } else if let Some(split) = line.split_once(": warning: ") {
            (false, split)
        } else {
            // Summary lines such as "1 error generated."
            continue;
        };

        let (location, text) = split;
        let line_number = location
            .rsplit_once(':')
            .and_then(|(_, n)| n.trim().parse::<u32>().ok());

        if is_error {
            any_error = true;
            msgs.log(text, true, Some(file), line_number);
        } else {
            msgs.warn(text, Some(file), line_number);
        }
    }

    any_error
}

fn find_glslc() -> Option<PathBuf> {
    if let Ok(output) = Command::new("glslc").arg("--version").output()
        && output.status.success()
    {
        return Some(PathBuf::from("glslc"));
    }

    if let Ok(sdk) = env::var("VULKAN_SDK") {
        for candidate in [
            PathBuf::from(&sdk).join("Bin").join("glslc.exe"),
            PathBuf::from(&sdk).join("bin").join("glslc"),
        ] {
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    let base = Path::new(r"C:\VulkanSDK");
    if let Ok(entries) = fs::read_dir(base) {
        let mut versions: Vec<_> = entries
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
            .collect();
        versions.sort_by_key(|e| std::cmp::Reverse(e.file_name()));

        for entry in versions {
            let candidate = entry.path().join("Bin").join("glslc.exe");
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{MessageKind, MessageStack};

    #[test]
    fn test_diagnostics_are_parsed() {
        let stderr = "<stdin>:12: error: 'foo' : undeclared identifier\n\
                      <stdin>:3: warning: version 450 is preferred\n\
                      1 error generated.\n";
        let mut msgs = MessageStack::new();
        assert!(report_diagnostics(stderr, "shader.hlsl", &mut msgs));

        let m = msgs.messages();
        assert_eq!(m.len(), 2);
        assert_eq!(m[0].kind, MessageKind::Error);
        assert_eq!(m[0].line, Some(12));
        assert_eq!(m[0].file.as_deref(), Some("shader.hlsl"));
        assert_eq!(m[1].kind, MessageKind::Warning);
        assert_eq!(m[1].line, Some(3));
    }

    #[test]
    fn test_hlsl_arguments() {
        let defines = MacroSet::from(&[("LIGHTS", "4")][..]);
        let args = Glslc::arguments(&ShaderLanguage::Hlsl, ShaderStage::Pixel, "PSMain", &defines);
        assert!(args.contains(&"-fshader-stage=frag".to_owned()));
        assert!(args.contains(&"hlsl".to_owned()));
        assert!(args.contains(&"-fentry-point=PSMain".to_owned()));
        assert!(args.contains(&"-DLIGHTS=4".to_owned()));
        assert_eq!(&args[args.len() - 3..], ["-o", "-", "-"]);
    }

    #[test]
    fn test_missing_explicit_tool() {
        let missing = Path::new("/definitely/not/here/glslc");
        assert!(matches!(
            Glslc::locate(Some(missing)),
            Err(StudioError::ToolNotFound(_))
        ));
    }
}
