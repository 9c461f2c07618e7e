//! Keys embedded in file names, e.g. the UF code in `mamografia_atendSP.csv`.

use std::path::Path;

use crate::{
  Result,
  error::{Error, FilenameProblem},
};

/// `<prefix><code><suffix>` with a fixed-length code. Prefix and suffix are
/// matched case-insensitively; the code is returned upper-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameCode {
  pub prefix: String,
  pub suffix: String,
  pub len:    usize,
}

impl FilenameCode {
  pub fn new(prefix: &str, suffix: &str, len: usize) -> Self {
    Self {
      prefix: prefix.to_lowercase(),
      suffix: suffix.to_lowercase(),
      len,
    }
  }

  /// Extract the code from the final component of `path`.
  pub fn extract(&self, path: &Path) -> Result<String> {
    let file = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default();
    let lower = file.to_lowercase();

    let malformed = |problem| Error::MalformedFilename { file: file.clone(), problem };

    let rest = lower
      .strip_prefix(&self.prefix)
      .ok_or_else(|| malformed(FilenameProblem::WrongPrefix(self.prefix.clone())))?;
    let code = rest
      .strip_suffix(&self.suffix)
      .ok_or_else(|| malformed(FilenameProblem::WrongSuffix(self.suffix.clone())))?;

    if code.chars().count() != self.len {
      return Err(malformed(FilenameProblem::WrongCodeLength {
        expected: self.len,
        found:    code.to_owned(),
      }));
    }

    Ok(code.to_uppercase())
  }
}
