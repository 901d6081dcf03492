//! Actor-based runtime that owns a `Session` on its own task.

use std::sync::Arc;

use log::debug;
use tokio::sync::{mpsc, oneshot};

use crate::error::{FsError, Result};
use crate::fs::{Entry, InitOptions, ListedEntry, MoveOptions, PathRef, Stat, Transfer, Usage};
use crate::session::core::Session;
use crate::store::EntryStore;

/// Cloneable handle to a session running on a spawned task.
///
/// Commands are handled one at a time in the order they arrive, so
/// re-initialization never interleaves with another operation.
#[derive(Clone)]
pub struct FsHandle {
    tx: mpsc::Sender<FsCommand>,
}

enum FsCommand {
    Init {
        options: InitOptions,
        reply: oneshot::Sender<Result<()>>,
    },
    ReadFile {
        path: PathRef,
        reply: oneshot::Sender<Result<Vec<u8>>>,
    },
    ReadFileToString {
        path: PathRef,
        reply: oneshot::Sender<Result<String>>,
    },
    WriteFile {
        path: PathRef,
        data: Vec<u8>,
        append: bool,
        reply: oneshot::Sender<Result<Entry>>,
    },
    Unlink {
        path: PathRef,
        reply: oneshot::Sender<Result<()>>,
    },
    Mkdir {
        path: PathRef,
        reply: oneshot::Sender<Result<Entry>>,
    },
    Rmdir {
        path: PathRef,
        reply: oneshot::Sender<Result<()>>,
    },
    MoveOrCopy {
        old_path: PathRef,
        new_path: String,
        transfer: Transfer,
        options: MoveOptions,
        reply: oneshot::Sender<Result<()>>,
    },
    Exists {
        path: PathRef,
        reply: oneshot::Sender<Result<bool>>,
    },
    Stat {
        path: PathRef,
        reply: oneshot::Sender<Result<Stat>>,
    },
    Readdir {
        path: PathRef,
        deep: bool,
        reply: oneshot::Sender<Result<Vec<ListedEntry>>>,
    },
    GetEntry {
        path: PathRef,
        reply: oneshot::Sender<Result<Entry>>,
    },
    GetUrl {
        path: PathRef,
        reply: oneshot::Sender<Result<String>>,
    },
    Usage {
        reply: oneshot::Sender<Result<Usage>>,
    },
    Clear {
        reply: oneshot::Sender<Result<()>>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

struct FsActor {
    session: Session,
    rx: mpsc::Receiver<FsCommand>,
}

impl FsHandle {
    /// Spawn an uninitialized session over `store`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(store: Arc<dyn EntryStore>) -> FsHandle {
        FsActor::spawn(Session::new(store))
    }

    /// Spawn a session and initialize it.
    pub async fn open(store: Arc<dyn EntryStore>, options: InitOptions) -> Result<FsHandle> {
        let handle = FsHandle::spawn(store);
        handle.init(options).await?;
        Ok(handle)
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<R>>) -> FsCommand,
    ) -> Result<R> {
        let (tx, rx) = oneshot::channel();
        let cmd = build(tx);
        self.tx
            .send(cmd)
            .await
            .map_err(|_| FsError::Custom("Session actor stopped".to_string()))?;
        rx.await
            .map_err(|_| FsError::Custom("Session actor stopped".to_string()))?
    }

    pub async fn init(&self, options: InitOptions) -> Result<()> {
        self.request(|reply| FsCommand::Init { options, reply })
            .await
    }

    pub async fn read_file(&self, path: impl Into<PathRef>) -> Result<Vec<u8>> {
        let path = path.into();
        self.request(|reply| FsCommand::ReadFile { path, reply })
            .await
    }

    pub async fn read_file_to_string(&self, path: impl Into<PathRef>) -> Result<String> {
        let path = path.into();
        self.request(|reply| FsCommand::ReadFileToString { path, reply })
            .await
    }

    pub async fn write_file(
        &self,
        path: impl Into<PathRef>,
        data: impl Into<Vec<u8>>,
    ) -> Result<Entry> {
        let path = path.into();
        let data = data.into();
        self.request(|reply| FsCommand::WriteFile {
            path,
            data,
            append: false,
            reply,
        })
        .await
    }

    pub async fn append_file(
        &self,
        path: impl Into<PathRef>,
        data: impl Into<Vec<u8>>,
    ) -> Result<Entry> {
        let path = path.into();
        let data = data.into();
        self.request(|reply| FsCommand::WriteFile {
            path,
            data,
            append: true,
            reply,
        })
        .await
    }

    pub async fn unlink(&self, path: impl Into<PathRef>) -> Result<()> {
        let path = path.into();
        self.request(|reply| FsCommand::Unlink { path, reply })
            .await
    }

    pub async fn mkdir(&self, path: impl Into<PathRef>) -> Result<Entry> {
        let path = path.into();
        self.request(|reply| FsCommand::Mkdir { path, reply })
            .await
    }

    pub async fn rmdir(&self, path: impl Into<PathRef>) -> Result<()> {
        let path = path.into();
        self.request(|reply| FsCommand::Rmdir { path, reply })
            .await
    }

    pub async fn rename(
        &self,
        old_path: impl Into<PathRef>,
        new_path: &str,
        options: MoveOptions,
    ) -> Result<()> {
        self.move_or_copy(old_path.into(), new_path, Transfer::Move, options)
            .await
    }

    pub async fn copy(
        &self,
        old_path: impl Into<PathRef>,
        new_path: &str,
        options: MoveOptions,
    ) -> Result<()> {
        self.move_or_copy(old_path.into(), new_path, Transfer::Copy, options)
            .await
    }

    async fn move_or_copy(
        &self,
        old_path: PathRef,
        new_path: &str,
        transfer: Transfer,
        options: MoveOptions,
    ) -> Result<()> {
        self.request(|reply| FsCommand::MoveOrCopy {
            old_path,
            new_path: new_path.to_string(),
            transfer,
            options,
            reply,
        })
        .await
    }

    pub async fn exists(&self, path: impl Into<PathRef>) -> Result<bool> {
        let path = path.into();
        self.request(|reply| FsCommand::Exists { path, reply })
            .await
    }

    pub async fn stat(&self, path: impl Into<PathRef>) -> Result<Stat> {
        let path = path.into();
        self.request(|reply| FsCommand::Stat { path, reply })
            .await
    }

    pub async fn readdir(&self, path: impl Into<PathRef>, deep: bool) -> Result<Vec<ListedEntry>> {
        let path = path.into();
        self.request(|reply| FsCommand::Readdir { path, deep, reply })
            .await
    }

    pub async fn get_entry(&self, path: impl Into<PathRef>) -> Result<Entry> {
        let path = path.into();
        self.request(|reply| FsCommand::GetEntry { path, reply })
            .await
    }

    pub async fn get_url(&self, path: impl Into<PathRef>) -> Result<String> {
        let path = path.into();
        self.request(|reply| FsCommand::GetUrl { path, reply })
            .await
    }

    pub async fn usage(&self) -> Result<Usage> {
        self.request(|reply| FsCommand::Usage { reply }).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.request(|reply| FsCommand::Clear { reply }).await
    }

    /// Stop the actor. Later requests fail with "Session actor stopped".
    pub async fn shutdown(&self) {
        let (tx, rx) = oneshot::channel();
        let _ = self.tx.send(FsCommand::Shutdown { reply: tx }).await;
        let _ = rx.await;
    }
}

impl FsActor {
    fn spawn(session: Session) -> FsHandle {
        let (tx, rx) = mpsc::channel(64);
        let actor = FsActor { session, rx };
        tokio::spawn(actor.run());
        FsHandle { tx }
    }

    async fn run(mut self) {
        while let Some(cmd) = self.rx.recv().await {
            if self.handle_command(cmd).await {
                break;
            }
        }
        debug!("session actor stopped");
    }

    async fn handle_command(&mut self, cmd: FsCommand) -> bool {
        match cmd {
            FsCommand::Init { options, reply } => {
                let res = self.session.init(options).await;
                let _ = reply.send(res);
            }
            FsCommand::ReadFile { path, reply } => {
                let res = self.session.read_file(path).await;
                let _ = reply.send(res);
            }
            FsCommand::ReadFileToString { path, reply } => {
                let res = self.session.read_file_to_string(path).await;
                let _ = reply.send(res);
            }
            FsCommand::WriteFile {
                path,
                data,
                append,
                reply,
            } => {
                let res = if append {
                    self.session.append_file(path, data).await
                } else {
                    self.session.write_file(path, data).await
                };
                let _ = reply.send(res);
            }
            FsCommand::Unlink { path, reply } => {
                let res = self.session.unlink(path).await;
                let _ = reply.send(res);
            }
            FsCommand::Mkdir { path, reply } => {
                let res = self.session.mkdir(path).await;
                let _ = reply.send(res);
            }
            FsCommand::Rmdir { path, reply } => {
                let res = self.session.rmdir(path).await;
                let _ = reply.send(res);
            }
            FsCommand::MoveOrCopy {
                old_path,
                new_path,
                transfer,
                options,
                reply,
            } => {
                let res = self
                    .session
                    .move_or_copy(old_path, &new_path, transfer, options)
                    .await;
                let _ = reply.send(res);
            }
            FsCommand::Exists { path, reply } => {
                let res = self.session.exists(path).await;
                let _ = reply.send(res);
            }
            FsCommand::Stat { path, reply } => {
                let res = self.session.stat(path).await;
                let _ = reply.send(res);
            }
            FsCommand::Readdir { path, deep, reply } => {
                let res = self.session.readdir(path, deep).await;
                let _ = reply.send(res);
            }
            FsCommand::GetEntry { path, reply } => {
                let res = self.session.get_entry(path).await;
                let _ = reply.send(res);
            }
            FsCommand::GetUrl { path, reply } => {
                let res = self.session.get_url(path).await;
                let _ = reply.send(res);
            }
            FsCommand::Usage { reply } => {
                let res = self.session.usage().await;
                let _ = reply.send(res);
            }
            FsCommand::Clear { reply } => {
                let res = self.session.clear().await;
                let _ = reply.send(res);
            }
            FsCommand::Shutdown { reply } => {
                let _ = reply.send(());
                return true;
            }
        }
        false
    }
}
