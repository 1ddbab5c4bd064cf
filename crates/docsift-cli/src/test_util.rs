use std::sync::Arc;

use docsift_lib::extract::Page;
use docsift_lib::output::BufferedIO;
use docsift_lib::runtime::Runtime;
use docsift_lib::test_util::{FakeExtractor, FakeObjectStore, KeywordEmbedder, MemoryIndex};

pub use docsift_lib::test_util::page;

/// A [`Runtime`] over in-memory fakes. `key` is the only object the store
/// knows, and it extracts to `pages`.
pub fn fake_runtime(key: &str, pages: Vec<Page>, keywords: &[&str]) -> (Runtime, Arc<MemoryIndex>) {
    let index = Arc::new(MemoryIndex::new());
    let runtime = Runtime::new(
        Arc::new(FakeObjectStore::with_keys(&[key])),
        Arc::new(FakeExtractor::new(pages)),
        Arc::new(KeywordEmbedder::new(keywords)),
        Arc::clone(&index) as Arc<dyn docsift_lib::index::VectorIndex>,
    );
    (runtime, index)
}

/// Run the CLI against `runtime` and capture its output.
pub async fn run_cli(args: &[&str], runtime: Runtime) -> (anyhow::Result<()>, String, String) {
    let mut io = BufferedIO::new();
    let result = crate::try_run(args, |_| Ok(runtime), &mut io).await;
    (result, io.stdout_to_string(), io.stderr_to_string())
}
