//! Automaton file format auto-detection

use super::args::AutomatonFormat;
use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;

/// Detected format with the method that found it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDetection {
    /// Detected format
    pub format: AutomatonFormat,
    /// Detection method used
    pub method: DetectionMethod,
}

/// Method used to detect the file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionMethod {
    /// Heuristic detection via file extension
    Extension,
    /// Heuristic detection via file content analysis
    Content,
    /// User explicitly specified
    UserSpecified,
}

impl std::fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Extension => write!(f, "heuristic (file extension)"),
            Self::Content => write!(f, "heuristic (content analysis)"),
            Self::UserSpecified => write!(f, "user specified"),
        }
    }
}

/// Detect the format of an automaton file
pub fn detect_format(path: &Path, user_format: Option<AutomatonFormat>) -> Result<FormatDetection> {
    if let Some(format) = user_format {
        return Ok(FormatDetection {
            format,
            method: DetectionMethod::UserSpecified,
        });
    }
    if let Some(detection) = detect_by_extension(path) {
        return Ok(detection);
    }
    detect_by_content(path)
}

/// Format implied by an output file name, fst2 otherwise
pub fn format_for_output(path: &Path) -> AutomatonFormat {
    detect_by_extension(path)
        .map(|d| d.format)
        .unwrap_or(AutomatonFormat::Fst2)
}

fn detect_by_extension(path: &Path) -> Option<FormatDetection> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    let format = match ext.as_str() {
        "fst2" | "elg" => AutomatonFormat::Fst2,
        "bin" | "bincode" => AutomatonFormat::Bincode,
        "json" => AutomatonFormat::Json,
        _ => return None,
    };
    Some(FormatDetection {
        format,
        method: DetectionMethod::Extension,
    })
}

/// Detect format by analyzing the first bytes of the file
fn detect_by_content(path: &Path) -> Result<FormatDetection> {
    let mut file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;

    let mut buffer = Vec::with_capacity(64);
    file.by_ref()
        .take(64)
        .read_to_end(&mut buffer)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    if buffer.is_empty() {
        bail!("Empty file: {}", path.display());
    }

    let format = match buffer.iter().copied().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') | Some(b'[') => AutomatonFormat::Json,
        _ if buffer.len() >= 10 && buffer[..10].iter().all(u8::is_ascii_digit) => {
            AutomatonFormat::Fst2
        }
        _ => AutomatonFormat::Bincode,
    };
    Ok(FormatDetection {
        format,
        method: DetectionMethod::Content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_extension_wins() {
        let detection = detect_format(Path::new("grammar-0.elg"), None).unwrap();
        assert_eq!(detection.format, AutomatonFormat::Fst2);
        assert_eq!(detection.method, DetectionMethod::Extension);

        let detection =
            detect_format(Path::new("grammar-0.elg"), Some(AutomatonFormat::Json)).unwrap();
        assert_eq!(detection.method, DetectionMethod::UserSpecified);
    }

    #[test]
    fn test_content() {
        let dir = tempfile::tempdir().unwrap();
        let fst2 = dir.path().join("text.data");
        fs::write(&fst2, "0000000001\n-1 s\n: \nf\n").unwrap();
        assert_eq!(detect_format(&fst2, None).unwrap().format, AutomatonFormat::Fst2);

        let json = dir.path().join("text.out");
        fs::write(&json, "  [\n]").unwrap();
        assert_eq!(detect_format(&json, None).unwrap().format, AutomatonFormat::Json);

        let bin = dir.path().join("text.raw");
        fs::write(&bin, [1u8, 0, 0, 0]).unwrap();
        assert_eq!(detect_format(&bin, None).unwrap().format, AutomatonFormat::Bincode);
    }
}
