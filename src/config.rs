use std::path::PathBuf;

pub struct Config {
    pub db_path: PathBuf,
    pub verbose: bool,
}

impl Config {
    /// Resolution order: --db flag, LINKLEDGER_DB, then the platform
    /// data directory.
    pub fn resolve(
        db_flag: Option<PathBuf>,
        verbose: bool,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let db_path = match db_flag {
            Some(path) => path,
            None => match std::env::var_os("LINKLEDGER_DB") {
                Some(path) => PathBuf::from(path),
                None => default_db_path()?,
            },
        };

        Ok(Config { db_path, verbose })
    }
}

/// ~/.local/share/linkledger/linkledger.db or platform equivalent
fn default_db_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let data_dir = directories::ProjectDirs::from("", "", "linkledger")
        .ok_or("Could not determine data directory")?
        .data_dir()
        .to_path_buf();

    std::fs::create_dir_all(&data_dir)?;
    Ok(data_dir.join("linkledger.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_db_flag_and_verbosity_are_carried_through() {
        let config = Config::resolve(Some(PathBuf::from("/tmp/ledger.db")), true).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/ledger.db"));
        assert!(config.verbose);

        let config = Config::resolve(Some(PathBuf::from("/tmp/ledger.db")), false).unwrap();
        assert!(!config.verbose);
    }
}
