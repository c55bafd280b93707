use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

pub struct Config {
    pub data_dir: PathBuf,
}

impl Config {
    /// Resolve the data directory: an explicit override (`--data-dir` or
    /// `PETDIARY_DATA_DIR`) wins, otherwise the platform data directory.
    pub fn load(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => ProjectDirs::from("", "", "petdiary")
                .context("Could not determine home directory")?
                .data_dir()
                .to_path_buf(),
        };

        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        Ok(Config { data_dir })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_is_created() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("nested").join("diary");

        let config = Config::load(Some(dir.clone())).unwrap();
        assert_eq!(config.data_dir, dir);
        assert!(dir.is_dir());
    }
}
