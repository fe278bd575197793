use std::fs;

/// The I/O capability injected into a run.
///
/// Both operations are synchronous from the interpreter's point of view;
/// an embedding built on an asynchronous fetcher is responsible for
/// presenting a blocking face here.
pub trait IoHandle {
    /// Resolves a resource path to its string contents.
    ///
    /// # Errors
    /// Returns a human-readable message when the resource cannot be
    /// resolved; the evaluator surfaces it as an I/O error at the call
    /// site.
    fn input(&self, path: &str) -> Result<String, String>;

    /// Emits one output line. Implementations receive at least one
    /// argument; the interpreter turns zero-argument `puts` calls into
    /// no-ops before they get here.
    fn output(&self, args: &[String]);
}

/// The CLI's handle: local files, plus `aoc://YEAR/DAY` resolved against a
/// puzzle-input cache in the working directory. Output goes to stdout.
#[derive(Debug, Default)]
pub struct ConsoleIo;

impl ConsoleIo {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl IoHandle for ConsoleIo {
    fn input(&self, path: &str) -> Result<String, String> {
        let file = match aoc_cache_path(path) {
            Some(cache) => {
                if !std::path::Path::new(&cache).exists() {
                    return Err(format!("no cached puzzle input '{cache}'; download it next to \
                                        the solution first"));
                }
                cache
            },
            None if path.starts_with("http://") || path.starts_with("https://") => {
                return Err("URL fetching is not available in this embedding".to_string());
            },
            None => path.to_string(),
        };

        fs::read_to_string(&file).map_err(|e| format!("failed to read '{file}': {e}"))
    }

    fn output(&self, args: &[String]) {
        println!("{}", args.join(" "));
    }
}

/// Maps `aoc://YEAR/DAY` to its conventional cache file name,
/// `aocYEAR_dayDD.input`.
fn aoc_cache_path(path: &str) -> Option<String> {
    let rest = path.strip_prefix("aoc://")?;
    let (year, day) = rest.split_once('/')?;
    let year: u16 = year.parse().ok()?;
    let day: u8 = day.parse().ok()?;
    Some(format!("aoc{year}_day{day:02}.input"))
}

/// A handle for embeddings without any I/O: `read` fails, `puts` vanishes.
#[derive(Debug, Default)]
pub struct NullIo;

impl IoHandle for NullIo {
    fn input(&self, path: &str) -> Result<String, String> {
        Err(format!("no I/O available to resolve '{path}'"))
    }

    fn output(&self, _args: &[String]) {}
}
