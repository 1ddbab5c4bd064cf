use std::io::Write;

use docsift_lib::output::ConsoleIO;
use docsift_lib::retrieve_context;
use docsift_lib::runtime::Runtime;

/// Run the `docsift query` command.
pub async fn run_query<OUT, ERR>(
    file_key: &str,
    text: &str,
    runtime: &Runtime,
    io: &mut dyn ConsoleIO<OUT, ERR>,
) -> anyhow::Result<()>
where
    OUT: Write,
    ERR: Write,
{
    let context = retrieve_context(runtime, text, file_key).await?;

    if context.is_empty() {
        writeln!(io.stdout(), "No matching context found.")?;
    } else {
        writeln!(io.stdout(), "{context}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::test_util::{fake_runtime, page, run_cli};

    #[tokio::test]
    async fn try_run_query_after_ingest() {
        let (runtime, _index) = fake_runtime(
            "animals.pdf",
            vec![page("apple orchard", 1), page("zebra\nherd", 2)],
            &["apple", "zebra"],
        );

        let (result, _, _) = run_cli(&["docsift", "ingest", "animals.pdf"], runtime.clone()).await;
        result.unwrap();
        let (result, stdout, stderr) =
            run_cli(&["docsift", "query", "animals.pdf", "zebra"], runtime).await;

        result.unwrap();
        assert_eq!(stdout, "zebraherd\n");
        assert_eq!(stderr, "");
    }

    #[tokio::test]
    async fn try_run_query_no_results() {
        let (runtime, _index) = fake_runtime("animals.pdf", vec![page("apple", 1)], &["apple"]);

        let (result, stdout, _) =
            run_cli(&["docsift", "query", "animals.pdf", "something else"], runtime).await;

        result.unwrap();
        assert_eq!(stdout, "No matching context found.\n");
    }
}
