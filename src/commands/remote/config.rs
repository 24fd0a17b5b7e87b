use crate::areas::repository::Repository;
use crate::artifacts::remote::Remote;
use std::path::PathBuf;

impl Repository {
    pub async fn add_remote(&mut self, name: &str, path: &str) -> crate::errors::Result<()> {
        self.ensure_initialized()?;

        let mut config = self.config()?;
        config.add_remote(Remote::new(name.to_string(), PathBuf::from(path)))?;
        config.save(self.storage())?;

        Ok(())
    }

    pub async fn rm_remote(&mut self, name: &str) -> crate::errors::Result<()> {
        self.ensure_initialized()?;

        let mut config = self.config()?;
        config.remove_remote(name)?;
        config.save(self.storage())?;

        Ok(())
    }
}
