use crate::{
    args::Args,
    protocol::{ParseError, Request, Response, STATUS_FAILURE, STATUS_MALFORMED},
};
use kchain_consensus::{config::TreeConfig, errors::TreeError, tree::BlockTree};
use kchain_core::{debug, error, info, trace, warn};
use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DaemonError {
    #[error("failed opening input {0}: {1}")]
    OpenInput(String, #[source] io::Error),

    #[error("failed reading request: {0}")]
    Read(#[source] io::Error),

    #[error("failed writing response: {0}")]
    Write(#[source] io::Error),
}

pub type DaemonResult<T> = std::result::Result<T, DaemonError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub requests: u64,
    pub failures: u64,
    pub malformed: u64,
}

/// Serves protocol requests against a single [`BlockTree`]
pub struct Session {
    tree: BlockTree,
    fold_malformed: bool,
    stats: SessionStats,
}

impl Session {
    pub fn new(config: TreeConfig, fold_malformed: bool) -> Self {
        Self { tree: BlockTree::with_config(config), fold_malformed, stats: Default::default() }
    }

    pub fn from_args(args: &Args) -> Self {
        Self::new(args.tree_config(), args.fold_malformed)
    }

    pub fn tree(&self) -> &BlockTree {
        &self.tree
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Parses and executes one request line. Errors never escape: they are logged and
    /// turned into a failure status, leaving the tree as it was.
    pub fn handle_line(&mut self, line: &str) -> Response {
        self.stats.requests += 1;
        let response = match line.parse::<Request>() {
            Ok(request) => self.execute(request),
            Err(err) => self.malformed(err),
        };
        if !response.is_success() {
            self.stats.failures += 1;
        }
        response
    }

    pub fn execute(&mut self, request: Request) -> Response {
        trace!("Executing {:?}", request);
        let result = match request {
            Request::Insert { id, parent } => self.tree.insert(id, parent).map(|block| vec![block.depth()]),
            Request::Leader { id } => self.tree.leader(id).map(|leader| vec![leader.id(), leader.depth()]),
            Request::Chain { id, max } => self.tree.chain(id, max).map(|chain| chain.map(|block| block.id()).collect()),
        };
        match result {
            Ok(items) => Response::from_items(items),
            Err(err) => Self::failed(request, err),
        }
    }

    fn failed(request: Request, err: TreeError) -> Response {
        if err.is_unknown_reference() {
            debug!("{:?} failed: {}", request, err);
        } else {
            warn!("{:?} refused: {}", request, err);
        }
        Response::Failure(STATUS_FAILURE)
    }

    fn malformed(&mut self, err: ParseError) -> Response {
        debug!("Malformed request: {}", err);
        self.stats.malformed += 1;
        Response::Failure(if self.fold_malformed { STATUS_FAILURE } else { STATUS_MALFORMED })
    }

    /// Answers every line of `input` on `output`, flushing after each response,
    /// until `input` is exhausted.
    pub fn serve<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> DaemonResult<SessionStats> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf).map_err(DaemonError::Read)? == 0 {
                break;
            }
            // Invalid UTF-8 cannot match any command and is reported as malformed
            let line = String::from_utf8_lossy(&buf);
            let response = self.handle_line(&line);
            writeln!(output, "{}", response).and_then(|_| output.flush()).map_err(DaemonError::Write)?;
        }
        Ok(self.stats)
    }
}

/// Runs a session over the configured input (stdin by default) and stdout
pub fn run(args: &Args) -> DaemonResult<SessionStats> {
    let mut session = Session::from_args(args);
    info!(
        "Serving block tree requests from {} (duplicates: {})",
        args.input.as_deref().unwrap_or("stdin"),
        session.tree().config().duplicate_policy
    );

    let stdout = io::stdout();
    let result = match &args.input {
        Some(path) => File::open(path)
            .map_err(|err| DaemonError::OpenInput(path.clone(), err))
            .and_then(|file| session.serve(BufReader::new(file), stdout.lock())),
        None => session.serve(io::stdin().lock(), stdout.lock()),
    };

    match &result {
        Ok(stats) => info!(
            "Input exhausted after {} requests ({} failed, {} malformed), {} blocks in tree, tip at depth {}",
            stats.requests,
            stats.failures,
            stats.malformed,
            session.tree().block_count(),
            session.tree().tip().depth()
        ),
        Err(err) => error!("{}", err),
    }
    result
}
