use anyhow::Result;
use bitlet::areas::repository::Repository;
use bitlet::artifacts::core::PagerWriter;
use bitlet::commands::porcelain::checkout::CheckoutTarget;
use bitlet::errors::RepositoryError;
use clap::{Parser, Subcommand};
use is_terminal::IsTerminal;
use minus::Pager;
use std::io::Write;

#[derive(Parser)]
#[command(
    name = "bitlet",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A small local version-control system",
    long_about = "Bitlet keeps snapshots of the flat set of files in a working directory. \
    It supports branches, three-way merges with conflict markers, and synchronization \
    with other Bitlet repositories on the same file system.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command creates the .bitlet directory in the current directory, \
        with an initial commit on the master branch."
    )]
    Init,
    #[command(
        name = "add",
        about = "Stage a file for the next commit",
        long_about = "This command stores the current contents of a file and stages it for addition. \
        Adding a file staged for removal only cancels the removal."
    )]
    Add {
        #[arg(index = 1, help = "The file to stage")]
        file: String,
    },
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command snapshots the staged changes on top of the current branch head."
    )]
    Commit {
        #[arg(index = 1, help = "The commit message")]
        message: String,
    },
    #[command(
        name = "rm",
        about = "Unstage a file or stage it for removal",
        long_about = "This command unstages a file staged for addition. A tracked file is staged \
        for removal and deleted from the working directory."
    )]
    Rm {
        #[arg(index = 1, help = "The file to remove")]
        file: String,
    },
    #[command(
        name = "log",
        about = "Show the history of the current branch",
        long_about = "This command lists the commits of the current branch, newest first, \
        following first parents only."
    )]
    Log,
    #[command(
        name = "global-log",
        about = "Show every commit ever made",
        long_about = "This command lists every commit in the object database, in no particular order."
    )]
    GlobalLog,
    #[command(
        name = "find",
        about = "Print the IDs of commits with the given message",
        long_about = "This command prints the ID of every commit whose message is exactly the given one."
    )]
    Find {
        #[arg(index = 1, help = "The commit message to look for")]
        message: String,
    },
    #[command(
        name = "status",
        about = "Show branches and the state of working files",
        long_about = "This command lists the branches, the staged files, the files staged for removal, \
        the unstaged modifications and the untracked files."
    )]
    Status,
    #[command(
        name = "checkout",
        about = "Switch branches or restore a file",
        long_about = "checkout <branch> switches the working directory to another branch. \
        checkout -- <file> restores a file from the current head. \
        checkout <commit> -- <file> restores a file from the given commit."
    )]
    Checkout {
        #[arg(index = 1, help = "The branch to switch to, or the commit to restore from")]
        target: Option<String>,
        #[arg(index = 2, last = true, help = "The file to restore")]
        file: Option<String>,
    },
    #[command(
        name = "branch",
        about = "Create a new branch at the current head",
        long_about = "This command creates a branch pointing at the current head. It does not switch to it."
    )]
    Branch {
        #[arg(index = 1, help = "The name of the new branch")]
        name: String,
    },
    #[command(
        name = "rm-branch",
        about = "Remove a branch",
        long_about = "This command removes a branch pointer and its stage. Commits are kept."
    )]
    RmBranch {
        #[arg(index = 1, help = "The branch to remove")]
        name: String,
    },
    #[command(
        name = "reset",
        about = "Move the current branch to a commit",
        long_about = "This command checks out every file of the given commit and points the \
        current branch at it. Commit IDs may be abbreviated to six characters."
    )]
    Reset {
        #[arg(index = 1, help = "The commit ID")]
        commit: String,
    },
    #[command(
        name = "merge",
        about = "Merge another branch into the current one",
        long_about = "This command merges the given branch into the current branch against their \
        split point. Conflicting files receive conflict markers."
    )]
    Merge {
        #[arg(index = 1, help = "The branch to merge")]
        branch: String,
    },
    #[command(
        name = "add-remote",
        about = "Register a remote repository",
        long_about = "This command saves the path of another repository's .bitlet directory under a name."
    )]
    AddRemote {
        #[arg(index = 1, help = "The remote name")]
        name: String,
        #[arg(index = 2, help = "The path of the remote .bitlet directory")]
        path: String,
    },
    #[command(name = "rm-remote", about = "Forget a remote repository")]
    RmRemote {
        #[arg(index = 1, help = "The remote name")]
        name: String,
    },
    #[command(
        name = "push",
        about = "Copy the current branch to a remote branch",
        long_about = "This command copies the history of the current branch into the remote and \
        points the remote branch at the current head. The remote branch must have been fetched first."
    )]
    Push {
        #[arg(index = 1, help = "The remote name")]
        remote: String,
        #[arg(index = 2, help = "The remote branch")]
        branch: String,
    },
    #[command(
        name = "fetch",
        about = "Copy a remote branch into <remote>/<branch>",
        long_about = "This command copies the history of a remote branch and records its head \
        in the local branch <remote>/<branch>."
    )]
    Fetch {
        #[arg(index = 1, help = "The remote name")]
        remote: String,
        #[arg(index = 2, help = "The remote branch")]
        branch: String,
    },
    #[command(
        name = "pull",
        about = "Fetch a remote branch and merge it",
        long_about = "This command fetches a remote branch and merges <remote>/<branch> into the current branch."
    )]
    Pull {
        #[arg(index = 1, help = "The remote name")]
        remote: String,
        #[arg(index = 2, help = "The remote branch")]
        branch: String,
    },
}

impl Commands {
    fn is_paged(&self) -> bool {
        matches!(self, Commands::Log | Commands::GlobalLog)
            && std::io::stdout().is_terminal()
            && std::env::var_os("NO_PAGER").is_none()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let pager = Pager::new();
    let paged = cli.command.is_paged();
    let writer: Box<dyn Write> = if paged {
        Box::new(PagerWriter::new(pager.clone()))
    } else {
        Box::new(std::io::stdout())
    };

    let pwd = std::env::current_dir()?;
    let mut repository = Repository::new(&pwd.to_string_lossy(), writer)?;

    let result = run(&mut repository, cli.command).await;
    repository.writer().flush()?;

    if paged {
        minus::page_all(pager)?;
    }

    match result {
        Ok(()) => Ok(()),
        Err(error) if error.is_advisory() => {
            println!("{error}");
            Ok(())
        }
        Err(error) if error.is_internal() => Err(error.into()),
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1)
        }
    }
}

async fn run(repository: &mut Repository, command: Commands) -> bitlet::errors::Result<()> {
    match command {
        Commands::Init => repository.init().await,
        Commands::Add { file } => repository.add(&file).await,
        Commands::Commit { message } => repository.commit(&message).await,
        Commands::Rm { file } => repository.rm(&file).await,
        Commands::Log => repository.log().await,
        Commands::GlobalLog => repository.global_log().await,
        Commands::Find { message } => repository.find(&message).await,
        Commands::Status => repository.status().await,
        Commands::Checkout { target, file } => {
            let target = match (target, file) {
                (Some(branch), None) => CheckoutTarget::Branch(branch),
                (None, Some(file_name)) => CheckoutTarget::File(file_name),
                (Some(commit), Some(file_name)) => CheckoutTarget::CommitFile { commit, file_name },
                (None, None) => return Err(RepositoryError::IncorrectOperands),
            };

            repository.checkout(target).await
        }
        Commands::Branch { name } => repository.branch(&name).await,
        Commands::RmBranch { name } => repository.rm_branch(&name).await,
        Commands::Reset { commit } => repository.reset(&commit).await,
        Commands::Merge { branch } => repository.merge(&branch).await,
        Commands::AddRemote { name, path } => repository.add_remote(&name, &path).await,
        Commands::RmRemote { name } => repository.rm_remote(&name).await,
        Commands::Push { remote, branch } => repository.push(&remote, &branch).await,
        Commands::Fetch { remote, branch } => repository.fetch(&remote, &branch).await,
        Commands::Pull { remote, branch } => repository.pull(&remote, &branch).await,
    }
}
