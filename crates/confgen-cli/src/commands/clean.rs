use crate::cli::CleanArgs;
use crate::error::{CliError, Result};
use confgen::workflows::output;
use tracing::info;

pub fn run(args: CleanArgs) -> Result<()> {
    if !args.dir.is_dir() {
        return Err(CliError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Not a directory: {}", args.dir.display()),
        )));
    }

    info!(root = %args.dir.display(), dry_run = args.dry_run, "Scanning for empty directories.");
    let found = output::remove_empty_dirs(&args.dir, args.dry_run)?;

    let verb = if args.dry_run { "Would remove" } else { "Removed" };
    for path in &found {
        println!("{}: {}", verb, path.display());
    }
    println!("{} {} empty director{}.", verb, found.len(), if found.len() == 1 { "y" } else { "ies" });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn dry_run_keeps_directories() {
        let root = tempdir().unwrap();
        fs::create_dir_all(root.path().join("batch_0000/empty")).unwrap();
        run(CleanArgs {
            dir: root.path().to_path_buf(),
            dry_run: true,
        })
        .unwrap();
        assert!(root.path().join("batch_0000/empty").exists());

        run(CleanArgs {
            dir: root.path().to_path_buf(),
            dry_run: false,
        })
        .unwrap();
        assert!(!root.path().join("batch_0000").exists());
        assert!(root.path().exists());
    }

    #[test]
    fn missing_root_is_an_error() {
        let root = tempdir().unwrap();
        let result = run(CleanArgs {
            dir: root.path().join("absent"),
            dry_run: false,
        });
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
