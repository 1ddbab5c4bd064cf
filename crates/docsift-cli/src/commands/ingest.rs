use std::io::Write;

use docsift_lib::output::ConsoleIO;
use docsift_lib::runtime::Runtime;
use docsift_lib::{derive_namespace, ingest_document};

/// Run the `docsift ingest` command.
pub async fn run_ingest<OUT, ERR>(
    file_key: &str,
    runtime: &Runtime,
    io: &mut dyn ConsoleIO<OUT, ERR>,
) -> anyhow::Result<()>
where
    OUT: Write,
    ERR: Write,
{
    writeln!(io.stderr(), "Ingesting {file_key}...")?;
    let first_page = ingest_document(runtime, file_key).await?;

    writeln!(io.stdout(), "Namespace: {}", derive_namespace(file_key))?;
    writeln!(io.stdout(), "First page chunks: {}", first_page.len())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::test_util::{fake_runtime, page, run_cli};

    #[tokio::test]
    async fn try_run_ingest_reports_namespace_and_chunks() {
        let (runtime, index) = fake_runtime(
            "reports/q1 ü.pdf",
            vec![page("first page", 1), page("second page", 2)],
            &[],
        );

        let (result, stdout, stderr) =
            run_cli(&["docsift", "ingest", "reports/q1 ü.pdf"], runtime).await;

        result.unwrap();
        assert_eq!(stdout, "Namespace: reports/q1 .pdf\nFirst page chunks: 1\n");
        assert_eq!(stderr, "Ingesting reports/q1 ü.pdf...\n");
        assert_eq!(index.records("reports/q1 .pdf").len(), 2);
    }

    #[tokio::test]
    async fn try_run_ingest_missing_object() {
        let (runtime, index) = fake_runtime("known.pdf", vec![page("text", 1)], &[]);

        let (result, stdout, _) = run_cli(&["docsift", "ingest", "unknown.pdf"], runtime).await;

        assert_eq!(
            result.unwrap_err().to_string(),
            "could not download `unknown.pdf` from object storage"
        );
        assert_eq!(stdout, "");
        assert_eq!(index.upsert_calls(), 0);
    }
}
