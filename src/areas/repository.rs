use crate::areas::config::Config;
use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::{HEAD_REF_NAME, Refs};
use crate::areas::storage::{FsStorage, Storage};
use crate::areas::workspace::{REPOSITORY_DIR, Workspace};
use crate::artifacts::branch::Branch;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::index::stage::Stage;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use anyhow::Context;
use std::cell::{RefCell, RefMut};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    storage: Arc<dyn Storage>,
    index: Arc<Mutex<Index>>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    /// Open the repository whose working directory is `path`
    pub fn new(path: &str, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let path = Path::new(path)
            .canonicalize()
            .with_context(|| format!("Unable to resolve working directory {path}"))?;
        let storage = Arc::new(FsStorage::new(
            path.join(REPOSITORY_DIR).into_boxed_path(),
        ));

        Ok(Self::with_storage(path.into_boxed_path(), storage, writer))
    }

    /// Run against an arbitrary storage root, e.g. a `MemoryStorage`
    pub fn with_storage(
        path: Box<Path>,
        storage: Arc<dyn Storage>,
        writer: Box<dyn std::io::Write>,
    ) -> Self {
        Repository {
            writer: RefCell::new(writer),
            index: Arc::new(Mutex::new(Index::new(storage.clone()))),
            database: Database::new(storage.clone()),
            workspace: Workspace::new(path.clone()),
            refs: Refs::new(storage.clone()),
            storage,
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn index(&self) -> Arc<Mutex<Index>> {
        self.index.clone()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn config(&self) -> anyhow::Result<Config> {
        Config::load(self.storage())
    }

    pub fn is_initialized(&self) -> bool {
        self.storage.exists(HEAD_REF_NAME)
    }

    pub fn ensure_initialized(&self) -> crate::errors::Result<()> {
        if !self.is_initialized() {
            return Err(RepositoryError::NotInitialized);
        }

        Ok(())
    }

    /// The checked-out branch
    pub fn current_branch(&self) -> crate::errors::Result<Branch> {
        self.ensure_initialized()?;

        Ok(self
            .refs
            .load_current()?
            .context("HEAD does not name a branch")?)
    }

    pub fn load_commit(&self, oid: &ObjectId) -> anyhow::Result<Commit> {
        self.database
            .load_commit(oid)?
            .with_context(|| format!("Missing commit {oid}"))
    }

    /// Load the stage of `branch_name` into `index`
    ///
    /// A branch created by a fetch has no stage yet; it starts as a clean
    /// stage of its head commit.
    pub fn rehydrate_stage(&self, index: &mut Index, branch_name: &BranchName) -> anyhow::Result<()> {
        if index.rehydrate(branch_name)? {
            return Ok(());
        }

        let branch = self
            .refs
            .load(branch_name)?
            .with_context(|| format!("Missing branch {branch_name}"))?;
        let commit = self.load_commit(branch.head())?;
        index.replace(Stage::from_commit(branch_name.clone(), &commit));

        Ok(())
    }

    /// Parent lookup over the local commit store, for history traversals
    pub fn parents_of(&self, oid: &ObjectId) -> anyhow::Result<Vec<ObjectId>> {
        Ok(self.load_commit(oid)?.parents().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::areas::storage::MemoryStorage;
    use crate::errors::{MergeAdvisory, NotFound, Precondition};
    use assert_fs::TempDir;
    use std::sync::Mutex as StdMutex;

    /// Output sink the test can read back after the repository wrote to it
    #[derive(Clone, Default)]
    struct SharedOutput(Arc<StdMutex<Vec<u8>>>);

    impl SharedOutput {
        fn take(&self) -> String {
            String::from_utf8(std::mem::take(&mut *self.0.lock().unwrap())).unwrap()
        }
    }

    impl std::io::Write for SharedOutput {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct Fixture {
        dir: TempDir,
        output: SharedOutput,
        repository: Repository,
    }

    impl Fixture {
        async fn commit_file(&mut self, file_name: &str, content: &str, message: &str) -> ObjectId {
            self.repository
                .workspace()
                .write_file(file_name, content.as_bytes())
                .unwrap();
            self.repository.add(file_name).await.unwrap();
            self.repository.commit(message).await.unwrap();
            self.head()
        }

        fn head(&self) -> ObjectId {
            self.repository.current_branch().unwrap().head().clone()
        }
    }

    async fn initialized() -> Fixture {
        colored::control::set_override(false);
        let dir = TempDir::new().expect("Failed to create temp dir");
        let output = SharedOutput::default();
        let mut repository = Repository::with_storage(
            dir.path().into(),
            Arc::new(MemoryStorage::new()),
            Box::new(output.clone()),
        );
        repository.init().await.unwrap();
        output.take();

        Fixture {
            dir,
            output,
            repository,
        }
    }

    #[tokio::test]
    async fn commands_before_init_are_rejected() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut repository = Repository::with_storage(
            dir.path().into(),
            Arc::new(MemoryStorage::new()),
            Box::new(SharedOutput::default()),
        );

        assert!(matches!(
            repository.status().await,
            Err(RepositoryError::NotInitialized)
        ));
    }

    #[tokio::test]
    async fn init_twice_fails() {
        let mut fixture = initialized().await;

        assert!(matches!(
            fixture.repository.init().await,
            Err(RepositoryError::Precondition(Precondition::AlreadyInitialized))
        ));
    }

    #[tokio::test]
    async fn committing_clears_the_stage() {
        let mut fixture = initialized().await;
        let head = fixture.commit_file("f.txt", "f\n", "Add f").await;

        let commit = fixture.repository.load_commit(&head).unwrap();
        assert!(commit.contains_file("f.txt"));

        let index = fixture.repository.index();
        let index = index.lock().await;
        let stage = index
            .load_stage(&BranchName::default_branch())
            .unwrap()
            .unwrap();
        assert!(!stage.is_changed());
        assert!(stage.is_tracked("f.txt"));
    }

    #[tokio::test]
    async fn log_prints_merge_parents() {
        let mut fixture = initialized().await;
        fixture.commit_file("a.txt", "a\n", "Add a").await;
        fixture.repository.branch("other").await.unwrap();
        fixture.commit_file("b.txt", "b\n", "Add b").await;
        fixture.repository.checkout_branch("other").await.unwrap();
        fixture.commit_file("c.txt", "c\n", "Add c").await;
        fixture.repository.checkout_branch("master").await.unwrap();

        fixture.repository.merge("other").await.unwrap();
        fixture.output.take();
        fixture.repository.log().await.unwrap();

        let log = fixture.output.take();
        let merge = fixture.repository.load_commit(&fixture.head()).unwrap();
        assert_eq!(merge.parents().len(), 2);
        assert!(log.starts_with(&format!("===\ncommit {}\nMerge: ", fixture.head())));
        assert!(log.contains("Merged other into master."));
        assert!(fixture.dir.path().join("c.txt").exists());
    }

    #[tokio::test]
    async fn fast_forward_creates_no_merge_commit() {
        let mut fixture = initialized().await;
        fixture.repository.branch("other").await.unwrap();
        fixture.repository.checkout_branch("other").await.unwrap();
        let other_head = fixture.commit_file("f.txt", "f\n", "Add f").await;
        fixture.repository.checkout_branch("master").await.unwrap();

        let result = fixture.repository.merge("other").await;

        assert!(matches!(
            result,
            Err(RepositoryError::Advisory(MergeAdvisory::FastForwarded))
        ));
        assert_eq!(fixture.head(), other_head);
        assert!(!fixture.repository.load_commit(&other_head).unwrap().is_merge());
    }

    #[tokio::test]
    async fn find_without_matches_fails() {
        let mut fixture = initialized().await;

        assert!(matches!(
            fixture.repository.find("no such message").await,
            Err(RepositoryError::NotFound(NotFound::CommitWithMessage))
        ));
    }

    #[tokio::test]
    async fn split_point_strategy_comes_from_the_config() {
        let fixture = initialized().await;

        assert_eq!(
            fixture.repository.config().unwrap().merge.split_point,
            crate::areas::config::SplitPointStrategy::Heuristic
        );
    }
}
