//! Init-model command: write an empty model file

use std::path::Path;

use colored::Colorize;

use cmdb_model::Model;

use crate::error::{CliError, Result};

pub fn run_init_model(path: &Path, name: &str) -> Result<()> {
    if path.exists() {
        return Err(CliError::user(format!(
            "{} already exists",
            path.display()
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let model = Model::new(name);
    model.save(path)?;
    tracing::debug!(?path, id = %model.id, "Model written");
    println!(
        "{} Model {} initialized at {}",
        "OK".green().bold(),
        name.cyan(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_a_loadable_model_once() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("models/infra.json");

        run_init_model(&path, "Infra").unwrap();
        let model = Model::load(&path).unwrap();
        assert_eq!(model.name, "Infra");
        assert_eq!(model.concepts().count(), 0);

        assert!(matches!(
            run_init_model(&path, "Infra"),
            Err(CliError::User { .. })
        ));
    }
}
