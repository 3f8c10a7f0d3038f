// ABOUTME: Injected I/O handle — resolves `input(path)` and performs `output(args)`

use crate::error::InterpreterError;
use cap_std::fs::Dir;
use std::path::PathBuf;

/// Filesystem roots an `IoHandle` may read from, plus the network allowlist it will
/// honor for `http://`/`https://` resolution.
pub struct IoHandleConfig {
    pub fs_roots: Vec<PathBuf>,
    pub max_file_size: u64,
    pub allow_net: bool,
    pub net_allow: Vec<String>,
}

impl Default for IoHandleConfig {
    fn default() -> Self {
        IoHandleConfig { fs_roots: vec![PathBuf::from("./data"), PathBuf::from(".")], max_file_size: 10 * 1024 * 1024, allow_net: false, net_allow: Vec::new() }
    }
}

/// The default `input`/`output` implementation: local paths resolve
/// through a `cap_std::fs::Dir` capability per configured root, `http(s)://` URLs
/// resolve via a blocking GET, and `aoc://YEAR/DAY` resolves to a cached file under
/// the first configured root.
pub struct IoHandle {
    fs_roots: Vec<Dir>,
    max_file_size: u64,
    allow_net: bool,
    net_allow: Vec<String>,
}

impl IoHandle {
    pub fn new(config: IoHandleConfig) -> Result<Self, InterpreterError> {
        let mut fs_roots = Vec::new();
        for path in &config.fs_roots {
            std::fs::create_dir_all(path).map_err(|e| InterpreterError::io(format!("cannot open {}: {e}", path.display()), 0, 0))?;
            let dir = Dir::open_ambient_dir(path, cap_std::ambient_authority())
                .map_err(|e| InterpreterError::io(format!("cannot open {}: {e}", path.display()), 0, 0))?;
            fs_roots.push(dir);
        }
        Ok(IoHandle { fs_roots, max_file_size: config.max_file_size, allow_net: config.allow_net, net_allow: config.net_allow })
    }

    /// `input(path) -> string`. Dispatches on the path's shape.
    pub fn input(&self, path: &str) -> Result<String, InterpreterError> {
        log::debug!("resolving input({path:?})");
        let result = if let Some(rest) = path.strip_prefix("aoc://") {
            self.input_aoc(rest)
        } else if path.starts_with("http://") || path.starts_with("https://") {
            self.input_http(path)
        } else {
            self.read_local(path)
        };
        match &result {
            Ok(contents) => log::debug!("input({path:?}) resolved to {} bytes", contents.len()),
            Err(e) => log::warn!("input({path:?}) failed: {e}"),
        }
        result
    }

    /// `output(args) -> void`. Zero arguments is a no-op.
    pub fn output(&self, args: &[String]) {
        if args.is_empty() {
            return;
        }
        log::trace!("output: {} args", args.len());
        println!("{}", args.join(" "));
    }

    fn read_local(&self, path: &str) -> Result<String, InterpreterError> {
        if path.starts_with('/') || path.starts_with('\\') || path.contains("..") {
            return Err(InterpreterError::io(format!("path not allowed: {path}"), 0, 0));
        }
        for root in &self.fs_roots {
            match root.metadata(path) {
                Ok(meta) => {
                    if meta.len() > self.max_file_size {
                        return Err(InterpreterError::io(format!("{path}: file exceeds {} byte limit", self.max_file_size), 0, 0));
                    }
                    return root.read_to_string(path).map_err(|e| InterpreterError::io(format!("cannot read {path}: {e}"), 0, 0));
                }
                Err(_) => continue,
            }
        }
        Err(InterpreterError::io(format!("file not found: {path}"), 0, 0))
    }

    fn is_address_allowed(&self, url: &str) -> bool {
        if !self.allow_net {
            return false;
        }
        if self.net_allow.is_empty() {
            return true;
        }
        self.net_allow.iter().any(|allowed| url.contains(allowed.as_str()))
    }

    fn input_http(&self, url: &str) -> Result<String, InterpreterError> {
        if !self.allow_net {
            return Err(InterpreterError::io("network I/O is disabled; pass --allow-net to enable", 0, 0));
        }
        if !self.is_address_allowed(url) {
            return Err(InterpreterError::io(format!("network address not allowed: {url}"), 0, 0));
        }
        let response = ureq::get(url).call().map_err(|e| InterpreterError::io(format!("GET {url} failed: {e}"), 0, 0))?;
        response.into_string().map_err(|e| InterpreterError::io(format!("failed to read response body: {e}"), 0, 0))
    }

    /// `aoc://YEAR/DAY`: cached to `aocYEAR_dayDD.input` under the first configured
    /// root, fetched over HTTP only if not already cached. No puzzle-input provider
    /// endpoint is specified anywhere, so an actual fetch raises an `IoError`; the
    /// caching path (check file, serve if present) is the part of this protocol the
    /// core can own without inventing an external API contract.
    fn input_aoc(&self, rest: &str) -> Result<String, InterpreterError> {
        let (year, day) = rest
            .split_once('/')
            .ok_or_else(|| InterpreterError::io(format!("malformed aoc:// path: {rest}"), 0, 0))?;
        let day: u32 = day.parse().map_err(|_| InterpreterError::io(format!("malformed aoc:// day: {day}"), 0, 0))?;
        let cache_name = format!("aoc{year}_day{day:02}.input");

        for root in &self.fs_roots {
            if root.metadata(&cache_name).is_ok() {
                return root.read_to_string(&cache_name).map_err(|e| InterpreterError::io(format!("cannot read {cache_name}: {e}"), 0, 0));
            }
        }

        Err(InterpreterError::io(
            format!("aoc://{rest} is not cached at {cache_name} and no puzzle-input provider is configured"),
            0,
            0,
        ))
    }
}
